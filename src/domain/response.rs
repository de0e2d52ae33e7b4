use crate::domain::result_code::ResultCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a send that the carrier did not reject.
pub enum SendOutcome {
    /// The first result code was accepted; the code is the carrier's message id.
    Queued { code: ResultCode },
    /// The carrier returned no result codes; delivery status is unknown.
    Indeterminate,
}

impl SendOutcome {
    /// Whether the carrier confirmed it queued the message.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }

    /// The carrier message id, if the send was confirmed.
    pub fn message_id(&self) -> Option<i64> {
        match self {
            Self::Queued { code } => Some(code.as_i64()),
            Self::Indeterminate => None,
        }
    }
}
