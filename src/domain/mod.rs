//! Domain layer: strong types with validation and invariants (no I/O).

mod config;
mod request;
mod response;
mod result_code;
mod validation;
mod value;

pub use config::GatewayConfig;
pub use request::{ENQUEUE_MAX_RECIPIENTS, EnqueueBatch, SendSms};
pub use response::SendOutcome;
pub use result_code::{CarrierError, KnownRejection, ResultCode, translate};
pub use validation::ValidationError;
pub use value::{
    CheckingMessageId, Domain, Encoding, MessageClass, Password, PhoneNumber, Priority,
    RawPhoneNumber, SenderNumber, Username,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reports_confirmation() {
        let queued = SendOutcome::Queued {
            code: ResultCode::new(123_456),
        };
        assert!(queued.is_confirmed());
        assert_eq!(queued.message_id(), Some(123_456));

        assert!(!SendOutcome::Indeterminate.is_confirmed());
        assert_eq!(SendOutcome::Indeterminate.message_id(), None);
    }

    #[test]
    fn translated_codes_feed_outcomes() {
        let code = translate(ResultCode::new(5_000)).unwrap();
        assert_eq!(SendOutcome::Queued { code }.message_id(), Some(5_000));

        let err = translate(ResultCode::new(106)).unwrap_err();
        assert_eq!(err.kind(), Some(KnownRejection::EmptyRecipients));
    }

    #[test]
    fn phone_number_parses_with_default_region_and_trims() {
        let pn = PhoneNumber::parse(Some(PhoneNumber::DEFAULT_REGION), " 09121234567 ").unwrap();
        assert_eq!(pn.raw(), "09121234567");
        assert_eq!(pn.e164(), "+989121234567");
    }

    #[test]
    fn password_rejects_empty() {
        assert!(matches!(
            Password::new(""),
            Err(ValidationError::Empty {
                field: Password::FIELD
            })
        ));
    }
}
