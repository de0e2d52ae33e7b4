//! Client layer: owns the current connection, encodes requests, and maps transport ↔ domain.

mod connection;

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    CarrierError, ENQUEUE_MAX_RECIPIENTS, EnqueueBatch, GatewayConfig, SendOutcome, SendSms,
    translate,
};
use crate::transport::{TransportError, decode_enqueue_response, encode_enqueue_envelope};

pub use connection::{AuthMode, CARRIER_TIMEOUT, GatewayConnection, TransportPolicy};

use connection::{Connector, ReqwestConnector};

const DEFAULT_ENDPOINT: &str = "https://sms.magfa.com/services/urn:SOAPSmsQueue";

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsGatewayClient`].
///
/// This error preserves:
/// - transport failures (connection, TLS, timeouts, non-2xx statuses, SOAP faults),
/// - carrier rejections (result codes below 1000),
/// - encoding/parse failures and a rejected endpoint override.
pub enum SmsGatewayError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned without a SOAP fault.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The service answered with a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    /// The request envelope could not be produced.
    #[error("encode error: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body could not be parsed as an `enqueue` response.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The carrier rejected the message with a result code below 1000.
    #[error(transparent)]
    Carrier(#[from] CarrierError),

    /// The endpoint override is not a valid `https` URL.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl SmsGatewayError {
    /// Whether this is a transport failure caused by one of the connection timeouts.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(err) => err
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout),
            _ => false,
        }
    }

    /// The carrier rejection, if this error is one.
    pub fn carrier(&self) -> Option<&CarrierError> {
        match self {
            Self::Carrier(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for SmsGatewayError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Fault { code, message } => Self::Fault { code, message },
            encode @ TransportError::Encode(_) => Self::Encode(Box::new(encode)),
            other => Self::Parse(Box::new(other)),
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsGatewayClient`].
///
/// Use this when you need to customize the endpoint or user-agent.
pub struct SmsGatewayClientBuilder {
    config: Arc<GatewayConfig>,
    endpoint: String,
    user_agent: Option<String>,
}

impl SmsGatewayClientBuilder {
    /// Create a builder with the default endpoint and no user-agent override.
    pub fn new(config: impl Into<Arc<GatewayConfig>>) -> Self {
        Self {
            config: config.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            user_agent: None,
        }
    }

    /// Override the carrier endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SmsGatewayClient`] and its first connection.
    pub fn build(self) -> Result<SmsGatewayClient, SmsGatewayError> {
        let url =
            url::Url::parse(&self.endpoint).map_err(|err| SmsGatewayError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            })?;
        if url.scheme() != "https" {
            return Err(SmsGatewayError::InvalidEndpoint {
                reason: format!("scheme `{}` is not allowed, use https", url.scheme()),
                endpoint: self.endpoint,
            });
        }

        let connector = ReqwestConnector {
            user_agent: self.user_agent,
        };
        SmsGatewayClient::with_connector(self.config, self.endpoint, Arc::new(connector))
    }
}

#[derive(Clone)]
/// Gateway client for the Magfa SMS queue.
///
/// Holds exactly one live [`GatewayConnection`] built from the most recent configuration.
/// [`SmsGatewayClient::reconfigure`] replaces it as a whole; each send works on the snapshot it
/// took when it started, so a send in flight during a reconfiguration finishes against the old
/// connection. Clones share the same connection slot.
pub struct SmsGatewayClient {
    endpoint: Arc<str>,
    connector: Arc<dyn Connector>,
    current: Arc<RwLock<Arc<GatewayConnection>>>,
}

impl SmsGatewayClient {
    /// Create a client for the default endpoint.
    ///
    /// For more customization, use [`SmsGatewayClient::builder`].
    pub fn new(config: impl Into<Arc<GatewayConfig>>) -> Result<Self, SmsGatewayError> {
        SmsGatewayClientBuilder::new(config).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(config: impl Into<Arc<GatewayConfig>>) -> SmsGatewayClientBuilder {
        SmsGatewayClientBuilder::new(config)
    }

    fn with_connector(
        config: Arc<GatewayConfig>,
        endpoint: impl Into<Arc<str>>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, SmsGatewayError> {
        let endpoint = endpoint.into();
        let connection = GatewayConnection::build(config, &endpoint, connector.as_ref())
            .map_err(SmsGatewayError::Transport)?;
        Ok(Self {
            endpoint,
            connector,
            current: Arc::new(RwLock::new(Arc::new(connection))),
        })
    }

    /// Rebuild the connection from `config` and swap it in.
    ///
    /// On error the previous connection stays in place. Sends already in flight are not
    /// affected either way.
    pub fn reconfigure(
        &self,
        config: impl Into<Arc<GatewayConfig>>,
    ) -> Result<(), SmsGatewayError> {
        let config = config.into();
        let connection = GatewayConnection::build(config, &self.endpoint, self.connector.as_ref())
            .map_err(SmsGatewayError::Transport)?;
        let connection = Arc::new(connection);

        info!(
            username = connection.config().username().as_str(),
            domain = connection.config().domain().as_str(),
            sender = connection.config().sender_number().as_str(),
            "gateway connection rebuilt"
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = connection;
        Ok(())
    }

    /// The connection new sends will use.
    pub fn connection(&self) -> Arc<GatewayConnection> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// The configuration snapshot of the current connection.
    pub fn current_config(&self) -> Arc<GatewayConfig> {
        Arc::clone(self.connection().config())
    }

    /// Apply every configuration published on `updates` until the sender is dropped.
    ///
    /// The value already in the channel is treated as seen; call [`SmsGatewayClient::reconfigure`]
    /// first if it has not been applied. Must be called within a Tokio runtime.
    pub fn follow(&self, mut updates: watch::Receiver<Arc<GatewayConfig>>) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let config = Arc::clone(&updates.borrow_and_update());
                if let Err(err) = client.reconfigure(config) {
                    error!(error = %err, "failed to apply gateway configuration");
                }
            }
            debug!("configuration source closed");
        })
    }

    /// Send one message to all recipients through the carrier's `enqueue` operation.
    ///
    /// Only the first result code is inspected. An empty result is not an error: it returns
    /// [`SendOutcome::Indeterminate`].
    ///
    /// Errors:
    /// - [`SmsGatewayError::Transport`], [`SmsGatewayError::HttpStatus`], and
    ///   [`SmsGatewayError::Fault`] when the call itself fails,
    /// - [`SmsGatewayError::Carrier`] when the first result code is below 1000,
    /// - [`SmsGatewayError::Parse`] for an unreadable response.
    #[instrument(skip(self, request), fields(recipients = request.recipients().len()))]
    pub async fn send_sms(&self, request: SendSms) -> Result<SendOutcome, SmsGatewayError> {
        let connection = self.connection();

        debug!(
            text = request.text(),
            recipients = ?request.recipients(),
            "sending sms"
        );
        if request.recipients().len() > ENQUEUE_MAX_RECIPIENTS {
            warn!(
                max = ENQUEUE_MAX_RECIPIENTS,
                "recipient count is above the carrier limit"
            );
        }

        let batch = EnqueueBatch::broadcast(connection.config(), &request);
        let envelope = encode_enqueue_envelope(&batch)?;

        let response = connection
            .enqueue(envelope)
            .await
            .map_err(SmsGatewayError::Transport)?;

        let decoded = decode_enqueue_response(&response.body);
        if !(200..=299).contains(&response.status) {
            if let Err(TransportError::Fault { code, message }) = decoded {
                return Err(SmsGatewayError::Fault { code, message });
            }
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(SmsGatewayError::HttpStatus {
                status: response.status,
                body,
            });
        }
        let codes = decoded?;

        let Some(first) = codes.first().copied() else {
            warn!("enqueue returned no result codes; delivery status unknown");
            return Ok(SendOutcome::Indeterminate);
        };
        if codes.len() > 1 {
            debug!(count = codes.len(), "inspecting the first result code only");
        }

        let code = translate(first).inspect_err(|err| {
            warn!(code = %err.code(), error = %err, "carrier rejected sms");
        })?;
        debug!(message_id = code.as_i64(), "sms queued");
        Ok(SendOutcome::Queued { code })
    }
}

impl fmt::Debug for SmsGatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsGatewayClient")
            .field("endpoint", &self.endpoint)
            .field("connection", &self.connection())
            .finish_non_exhaustive()
    }
}
