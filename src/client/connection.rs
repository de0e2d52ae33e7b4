//! Live, authenticated handle to the carrier endpoint.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::GatewayConfig;
use crate::transport::{CONTENT_TYPE, SOAP_ACTION};

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;
pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-phase timeout applied to every connection.
pub const CARRIER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Transport-level authentication scheme.
pub enum AuthMode {
    /// HTTP Basic username/password; only sent over TLS.
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transport settings shared by every connection, independent of the configuration.
pub struct TransportPolicy {
    pub open_timeout: Duration,
    pub send_timeout: Duration,
    pub receive_timeout: Duration,
    pub close_timeout: Duration,
    /// Ceiling for a single message; the carrier payload is the real bound.
    ///
    /// Kept at `u64::MAX`, which is what `reqwest` already does: it has no body size limit, so
    /// this field is recorded rather than applied.
    pub max_message_size: u64,
    /// Same as `max_message_size`; `reqwest` buffers the whole response body.
    pub max_buffer_size: u64,
    /// Nesting depth accepted when parsing responses. `quick-xml` has no depth limit, which is
    /// what `usize::MAX` records here.
    pub max_reader_depth: usize,
    pub cookies: bool,
    pub require_tls: bool,
    pub auth: AuthMode,
}

impl TransportPolicy {
    /// The policy used for the carrier: 10 second phases, unbounded sizes, cookies kept,
    /// basic auth over TLS.
    pub fn carrier_default() -> Self {
        Self {
            open_timeout: CARRIER_TIMEOUT,
            send_timeout: CARRIER_TIMEOUT,
            receive_timeout: CARRIER_TIMEOUT,
            close_timeout: CARRIER_TIMEOUT,
            max_message_size: u64::MAX,
            max_buffer_size: u64::MAX,
            max_reader_depth: usize::MAX,
            cookies: true,
            require_tls: true,
            auth: AuthMode::Basic,
        }
    }
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self::carrier_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

pub(crate) struct SoapRequest<'a> {
    pub(crate) url: &'a str,
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
    pub(crate) body: String,
}

pub(crate) trait HttpTransport: Send + Sync {
    fn post_soap<'a>(
        &'a self,
        request: SoapRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

/// Builds the HTTP handle of a new connection.
pub(crate) trait Connector: Send + Sync {
    fn connect(&self, policy: &TransportPolicy) -> Result<Arc<dyn HttpTransport>, BoxError>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
    auth: AuthMode,
}

impl ReqwestTransport {
    fn request(&self, request: SoapRequest<'_>) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(request.url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("SOAPAction", SOAP_ACTION)
            .body(request.body);
        match self.auth {
            AuthMode::Basic => builder.basic_auth(request.username, Some(request.password)),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_soap<'a>(
        &'a self,
        request: SoapRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self.request(request).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ReqwestConnector {
    pub(crate) user_agent: Option<String>,
}

impl Connector for ReqwestConnector {
    fn connect(&self, policy: &TransportPolicy) -> Result<Arc<dyn HttpTransport>, BoxError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(policy.open_timeout)
            .timeout(policy.send_timeout)
            .read_timeout(policy.receive_timeout)
            .pool_idle_timeout(policy.close_timeout)
            .cookie_store(policy.cookies)
            .https_only(policy.require_tls);
        if let Some(user_agent) = self.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build()?;
        Ok(Arc::new(ReqwestTransport {
            client,
            auth: policy.auth,
        }))
    }
}

/// An immutable connection built from exactly one [`GatewayConfig`].
///
/// The basic-auth pair sent with each request and the parameters written into the message body
/// come from the same snapshot, so a connection never mixes two configurations.
pub struct GatewayConnection {
    config: Arc<GatewayConfig>,
    endpoint: String,
    policy: TransportPolicy,
    http: Arc<dyn HttpTransport>,
}

impl GatewayConnection {
    pub(crate) fn build(
        config: Arc<GatewayConfig>,
        endpoint: &str,
        connector: &dyn Connector,
    ) -> Result<Self, BoxError> {
        let policy = TransportPolicy::carrier_default();
        let http = connector.connect(&policy)?;
        Ok(Self {
            config,
            endpoint: endpoint.to_owned(),
            policy,
            http,
        })
    }

    /// Configuration snapshot this connection was built from.
    pub fn config(&self) -> &Arc<GatewayConfig> {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> &TransportPolicy {
        &self.policy
    }

    /// Post an encoded `enqueue` envelope with this connection's credentials.
    pub(crate) async fn enqueue(&self, envelope: String) -> Result<HttpResponse, BoxError> {
        self.http
            .post_soap(SoapRequest {
                url: &self.endpoint,
                username: self.config.username().as_str(),
                password: self.config.password().expose(),
                body: envelope,
            })
            .await
    }
}

impl std::fmt::Debug for GatewayConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConnection")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullTransport;

    impl HttpTransport for NullTransport {
        fn post_soap<'a>(
            &'a self,
            _request: SoapRequest<'a>,
        ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
            Box::pin(async {
                Ok(HttpResponse {
                    status: 200,
                    body: String::new(),
                })
            })
        }
    }

    struct NullConnector;

    impl Connector for NullConnector {
        fn connect(&self, _policy: &TransportPolicy) -> Result<Arc<dyn HttpTransport>, BoxError> {
            Ok(Arc::new(NullTransport))
        }
    }

    #[test]
    fn carrier_policy_matches_fixed_transport_settings() {
        let policy = TransportPolicy::carrier_default();
        assert_eq!(policy.open_timeout, Duration::from_secs(10));
        assert_eq!(policy.send_timeout, Duration::from_secs(10));
        assert_eq!(policy.receive_timeout, Duration::from_secs(10));
        assert_eq!(policy.close_timeout, Duration::from_secs(10));
        assert_eq!(policy.max_message_size, u64::MAX);
        assert_eq!(policy.max_buffer_size, u64::MAX);
        assert_eq!(policy.max_reader_depth, usize::MAX);
        assert!(policy.cookies);
        assert!(policy.require_tls);
        assert_eq!(policy.auth, AuthMode::Basic);
        assert_eq!(TransportPolicy::default(), policy);
    }

    #[test]
    fn connection_keeps_its_config_snapshot() {
        let config = Arc::new(GatewayConfig::new("alerts", "pw", "magfa", "3000").unwrap());
        let connection =
            GatewayConnection::build(Arc::clone(&config), "https://example.invalid/q", &NullConnector)
                .unwrap();
        assert!(Arc::ptr_eq(connection.config(), &config));
        assert_eq!(connection.endpoint(), "https://example.invalid/q");
        assert_eq!(connection.policy(), &TransportPolicy::carrier_default());
        assert!(format!("{connection:?}").contains("[REDACTED]"));
    }

    #[test]
    fn basic_auth_mode_sets_authorization_header() {
        let transport = ReqwestTransport {
            client: reqwest::Client::new(),
            auth: AuthMode::Basic,
        };
        let request = transport
            .request(SoapRequest {
                url: "https://example.invalid/q",
                username: "alerts",
                password: "pw",
                body: "<x/>".to_owned(),
            })
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).unwrap(),
            "Basic YWxlcnRzOnB3"
        );
        assert_eq!(headers.get("SOAPAction").unwrap(), SOAP_ACTION);
        assert_eq!(
            headers.get(reqwest::header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE
        );
    }

    #[test]
    fn reqwest_connector_builds_with_carrier_policy() {
        let connector = ReqwestConnector {
            user_agent: Some("magfa-gateway-test".to_owned()),
        };
        assert!(connector.connect(&TransportPolicy::carrier_default()).is_ok());
    }
}
