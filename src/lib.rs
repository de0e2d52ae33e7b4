//! Typed Rust client for the Magfa SOAP SMS queue (`enqueue`).
//!
//! The crate keeps three layers apart: a domain layer of strong types (configuration, request
//! batching, and the result-code table), a transport layer for the SOAP wire format, and a client
//! layer that owns the live connection and swaps it atomically when credentials rotate.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use magfa_gateway::{GatewayConfig, RawPhoneNumber, SendSms, SmsGatewayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::new("user", "secret", "magfa", "30001234")?;
//!     let client = SmsGatewayClient::new(config)?;
//!
//!     let phone = RawPhoneNumber::new("+989121234567")?;
//!     let outcome = client.send_sms(SendSms::new("db-01 is down", vec![phone])).await?;
//!     println!("confirmed: {}", outcome.is_confirmed());
//!
//!     // Rotate credentials; sends already in flight finish on the old connection.
//!     let rotated = GatewayConfig::new("user", "rotated", "magfa", "30001234")?;
//!     client.reconfigure(Arc::new(rotated))?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    AuthMode, CARRIER_TIMEOUT, GatewayConnection, SmsGatewayClient, SmsGatewayClientBuilder,
    SmsGatewayError, TransportPolicy,
};
pub use domain::{
    CarrierError, CheckingMessageId, Domain, ENQUEUE_MAX_RECIPIENTS, Encoding, EnqueueBatch,
    GatewayConfig, KnownRejection, MessageClass, Password, PhoneNumber, Priority, RawPhoneNumber,
    ResultCode, SendOutcome, SendSms, SenderNumber, Username, ValidationError, translate,
};
pub use transport::TransportError;
