use crate::domain::config::GatewayConfig;
use crate::domain::value::{
    CheckingMessageId, Domain, Encoding, MessageClass, Priority, RawPhoneNumber, SenderNumber,
};

/// Recipient count the carrier accepts per `enqueue` call (code `107` above it).
pub const ENQUEUE_MAX_RECIPIENTS: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One message body broadcast to a list of recipients.
///
/// Neither the text nor the recipient list is checked locally: an empty text or list is sent
/// as-is and answered by the carrier (codes `13` and `106`).
pub struct SendSms {
    text: String,
    recipients: Vec<RawPhoneNumber>,
}

impl SendSms {
    pub fn new(text: impl Into<String>, recipients: Vec<RawPhoneNumber>) -> Self {
        Self {
            text: text.into(),
            recipients,
        }
    }

    /// Convenience for a single recipient.
    pub fn to_one(text: impl Into<String>, recipient: RawPhoneNumber) -> Self {
        Self::new(text, vec![recipient])
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn recipients(&self) -> &[RawPhoneNumber] {
        &self.recipients
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parallel arrays of a single `enqueue` call.
///
/// The carrier requires any multi-valued field other than recipients to match the recipient
/// count; [`EnqueueBatch::broadcast`] sends one body, sender, encoding, class, and priority for
/// all recipients, no UDH, and at most one checking message id.
pub struct EnqueueBatch {
    pub domain: Domain,
    pub message_bodies: Vec<String>,
    pub recipient_numbers: Vec<RawPhoneNumber>,
    pub sender_numbers: Vec<SenderNumber>,
    pub encodings: Vec<Encoding>,
    pub udhs: Vec<String>,
    pub message_classes: Vec<MessageClass>,
    pub priorities: Vec<Priority>,
    pub checking_message_ids: Vec<CheckingMessageId>,
}

impl EnqueueBatch {
    pub fn broadcast(config: &GatewayConfig, request: &SendSms) -> Self {
        Self {
            domain: config.domain().clone(),
            message_bodies: vec![request.text().to_owned()],
            recipient_numbers: request.recipients().to_vec(),
            sender_numbers: vec![config.sender_number().clone()],
            encodings: vec![config.encoding()],
            udhs: Vec::new(),
            message_classes: vec![config.message_class().clone()],
            priorities: vec![config.priority()],
            checking_message_ids: config.checking_message_id().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig::new("alerts", "pw", "magfa", "30001234").unwrap()
    }

    fn phones(count: usize) -> Vec<RawPhoneNumber> {
        (0..count)
            .map(|idx| RawPhoneNumber::new(format!("+98912000{idx:04}")).unwrap())
            .collect()
    }

    #[test]
    fn broadcast_keeps_single_valued_fields_single() {
        let request = SendSms::new("disk full", phones(5));
        let batch = EnqueueBatch::broadcast(&config(), &request);

        assert_eq!(batch.domain.as_str(), "magfa");
        assert_eq!(batch.message_bodies, vec!["disk full".to_owned()]);
        assert_eq!(batch.recipient_numbers.len(), 5);
        assert_eq!(batch.sender_numbers.len(), 1);
        assert_eq!(batch.encodings.len(), 1);
        assert!(batch.udhs.is_empty());
        assert_eq!(batch.message_classes.len(), 1);
        assert_eq!(batch.priorities.len(), 1);
        assert!(batch.checking_message_ids.is_empty());
    }

    #[test]
    fn broadcast_includes_checking_message_id_when_configured() {
        let config = config().with_checking_message_id(CheckingMessageId::new(9));
        let batch = EnqueueBatch::broadcast(&config, &SendSms::new("hi", phones(2)));
        assert_eq!(batch.checking_message_ids, vec![CheckingMessageId::new(9)]);
    }

    #[test]
    fn empty_recipients_are_left_to_the_carrier() {
        let request = SendSms::new("", Vec::new());
        let batch = EnqueueBatch::broadcast(&config(), &request);
        assert!(batch.recipient_numbers.is_empty());
        assert_eq!(batch.message_bodies, vec![String::new()]);
        assert_eq!(batch.sender_numbers.len(), 1);
    }

    #[test]
    fn recipients_keep_their_order() {
        let recipients = phones(3);
        let request = SendSms::new("hi", recipients.clone());
        let batch = EnqueueBatch::broadcast(&config(), &request);
        assert_eq!(batch.recipient_numbers, recipients);
    }
}
