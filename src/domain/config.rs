use std::fmt;

use serde::Deserialize;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CheckingMessageId, Domain, Encoding, MessageClass, Password, Priority, SenderNumber, Username,
};

#[derive(Deserialize)]
/// Immutable snapshot of carrier credentials and send parameters.
///
/// A configuration change is a new value; clients share snapshots as `Arc<GatewayConfig>`.
/// Keys are snake_case; the PascalCase names used by appsettings-style sources are accepted too.
pub struct GatewayConfig {
    #[serde(alias = "Username")]
    username: Username,
    #[serde(alias = "Password")]
    password: Password,
    #[serde(alias = "Domain")]
    domain: Domain,
    #[serde(alias = "SenderNumber")]
    sender_number: SenderNumber,
    #[serde(default, alias = "Encoding")]
    encoding: Encoding,
    #[serde(default, alias = "MessageClass")]
    message_class: MessageClass,
    #[serde(default, alias = "Priority")]
    priority: Priority,
    #[serde(default, alias = "CheckingMessageId")]
    checking_message_id: Option<CheckingMessageId>,
}

impl GatewayConfig {
    /// Create a configuration with default encoding, normal message class, priority `0`, and no
    /// checking message id.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
        sender_number: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
            domain: Domain::new(domain)?,
            sender_number: SenderNumber::new(sender_number)?,
            encoding: Encoding::default(),
            message_class: MessageClass::normal(),
            priority: Priority::default(),
            checking_message_id: None,
        })
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_message_class(mut self, message_class: MessageClass) -> Self {
        self.message_class = message_class;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_checking_message_id(mut self, id: CheckingMessageId) -> Self {
        self.checking_message_id = Some(id);
        self
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn sender_number(&self) -> &SenderNumber {
        &self.sender_number
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn message_class(&self) -> &MessageClass {
        &self.message_class
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn checking_message_id(&self) -> Option<CheckingMessageId> {
        self.checking_message_id
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("sender_number", &self.sender_number)
            .field("encoding", &self.encoding)
            .field("message_class", &self.message_class)
            .field("priority", &self.priority)
            .field("checking_message_id", &self.checking_message_id)
            .finish()
    }
}
