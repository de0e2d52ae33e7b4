//! Translation of `enqueue` result codes into outcomes.
//!
//! Every code at or above [`ResultCode::ACCEPTED_FLOOR`] is a queued message id; everything below
//! is a rejection. Rejection messages are the carrier's own wording.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Result code returned by `enqueue`, one per queued unit.
///
/// This value is preserved as-is even when the code is unknown to this crate.
pub struct ResultCode(i64);

impl ResultCode {
    /// Smallest code that means "accepted"; such codes are the carrier's message ids.
    pub const ACCEPTED_FLOOR: i64 = 1000;

    /// Construct a result code from its integer representation.
    pub fn new(code: i64) -> Self {
        Self(code)
    }

    /// Get the integer code as returned by the carrier.
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Whether the carrier accepted the message.
    pub fn is_accepted(self) -> bool {
        self.0 >= Self::ACCEPTED_FLOOR
    }

    /// Map this code to a known rejection, if one exists.
    ///
    /// Accepted codes never map to a rejection.
    pub fn known_rejection(self) -> Option<KnownRejection> {
        if self.is_accepted() {
            return None;
        }
        KnownRejection::from_code(self.0)
    }

    /// Returns `true` if this code points at the account credentials or permissions.
    pub fn is_auth_error(self) -> bool {
        matches!(self.known_rejection(), Some(kind) if kind.is_auth_error())
    }

    /// Returns `true` if this code points at the account's billing or activation state.
    pub fn is_account_error(self) -> bool {
        matches!(self.known_rejection(), Some(kind) if kind.is_account_error())
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Rejections documented by the carrier for `enqueue`.
pub enum KnownRejection {
    ReportTargetUnavailable,
    InvalidRecipientNumbers,
    InvalidSenderNumbers,
    InvalidEncoding,
    InvalidMessageClass,
    InvalidUdh,
    AccountNumberRangeMismatch,
    NullMessageText,
    InsufficientCredit,
    ServerFailure,
    AccountInactive,
    AccountExpired,
    InvalidCredentialsOrDomain,
    IncorrectCredentials,
    UnrecognizedService,
    NoWebServicePermission,
    ServerOverloaded,
    InvalidMessageId,
    TextCountMismatch,
    MessageClassCountMismatch,
    SenderCountMismatch,
    UdhCountMismatch,
    EmptyRecipients,
    TooManyRecipients,
    EmptySenders,
    EncodingCountMismatch,
    CheckingMessageIdCountMismatch,
}

impl KnownRejection {
    /// Convert a raw integer code into a known rejection.
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            -1 => Self::ReportTargetUnavailable,
            1 => Self::InvalidRecipientNumbers,
            2 => Self::InvalidSenderNumbers,
            3 => Self::InvalidEncoding,
            4 => Self::InvalidMessageClass,
            6 => Self::InvalidUdh,
            12 => Self::AccountNumberRangeMismatch,
            13 => Self::NullMessageText,
            14 => Self::InsufficientCredit,
            15 => Self::ServerFailure,
            16 => Self::AccountInactive,
            17 => Self::AccountExpired,
            18 => Self::InvalidCredentialsOrDomain,
            19 => Self::IncorrectCredentials,
            20 => Self::UnrecognizedService,
            22 => Self::NoWebServicePermission,
            23 => Self::ServerOverloaded,
            24 => Self::InvalidMessageId,
            101 => Self::TextCountMismatch,
            102 => Self::MessageClassCountMismatch,
            103 => Self::SenderCountMismatch,
            104 => Self::UdhCountMismatch,
            106 => Self::EmptyRecipients,
            107 => Self::TooManyRecipients,
            108 => Self::EmptySenders,
            109 => Self::EncodingCountMismatch,
            110 => Self::CheckingMessageIdCountMismatch,
            _ => return None,
        })
    }

    /// The carrier's integer code for this rejection.
    pub fn code(self) -> i64 {
        match self {
            Self::ReportTargetUnavailable => -1,
            Self::InvalidRecipientNumbers => 1,
            Self::InvalidSenderNumbers => 2,
            Self::InvalidEncoding => 3,
            Self::InvalidMessageClass => 4,
            Self::InvalidUdh => 6,
            Self::AccountNumberRangeMismatch => 12,
            Self::NullMessageText => 13,
            Self::InsufficientCredit => 14,
            Self::ServerFailure => 15,
            Self::AccountInactive => 16,
            Self::AccountExpired => 17,
            Self::InvalidCredentialsOrDomain => 18,
            Self::IncorrectCredentials => 19,
            Self::UnrecognizedService => 20,
            Self::NoWebServicePermission => 22,
            Self::ServerOverloaded => 23,
            Self::InvalidMessageId => 24,
            Self::TextCountMismatch => 101,
            Self::MessageClassCountMismatch => 102,
            Self::SenderCountMismatch => 103,
            Self::UdhCountMismatch => 104,
            Self::EmptyRecipients => 106,
            Self::TooManyRecipients => 107,
            Self::EmptySenders => 108,
            Self::EncodingCountMismatch => 109,
            Self::CheckingMessageIdCountMismatch => 110,
        }
    }

    /// Descriptive message for operators.
    pub fn message(self) -> &'static str {
        match self {
            Self::ReportTargetUnavailable => {
                "The target of report is not available(e.g. no message is associated with entered IDs)"
            }
            Self::InvalidRecipientNumbers => {
                "the Strings You presented as recipient numbers are not valid phone numbers, please check them again"
            }
            Self::InvalidSenderNumbers => {
                "the Strings You presented as sender numbers(3000-blah blah blahs) are not valid numbers, please check them again"
            }
            Self::InvalidEncoding => {
                "are You sure You've entered the right encoding for this message? You can try other encodings to bypass this error code"
            }
            Self::InvalidMessageClass => {
                "entered MessageClass is not valid. for a normal MClass, leave this entry empty"
            }
            Self::InvalidUdh => {
                "entered UDH is invalid. in order to send a simple message, leave this entry empty"
            }
            Self::AccountNumberRangeMismatch => {
                "you're trying to use a service from another account??? check your UN/Password/NumberRange again"
            }
            Self::NullMessageText => "check the text of your message. it seems to be null.",
            Self::InsufficientCredit => {
                "Your credit's not enough to send this message. you might want to buy some credit.call "
            }
            Self::ServerFailure => {
                "something bad happened on server side, you might want to call MAGFA Support about this:"
            }
            Self::AccountInactive => "Your account is not active right now, call -- to activate it",
            Self::AccountExpired => {
                "looks like Your account's reached its expiration time, call -- for more information"
            }
            Self::InvalidCredentialsOrDomain => {
                "the combination of entered Username/Password/Domain is not valid. check them again"
            }
            Self::IncorrectCredentials => {
                "You're not entering the correct combination of Username/Password"
            }
            Self::UnrecognizedService => {
                "check the service type you're requesting. we don't get what service you want to use. your sender number might be wrong, too."
            }
            Self::NoWebServicePermission => {
                "your current number range doesn't have the permission to use Webservices"
            }
            Self::ServerOverloaded => {
                "Sorry, Server's under heavy traffic pressure, try testing another time please"
            }
            Self::InvalidMessageId => {
                "entered message-id seems to be invalid, are you sure You entered the right thing?"
            }
            Self::TextCountMismatch => {
                "when you have N > 1 texts to send, you have to define N recipient-numbers..."
            }
            Self::MessageClassCountMismatch => {
                "this happens when you try to define MClasses for your messages. in this case you must define one recipient number for each MClass"
            }
            Self::SenderCountMismatch => {
                "This error happens when you have more than one sender-number for message. when you have more than one sender number, for each sender-number you must define a recipient number..."
            }
            Self::UdhCountMismatch => {
                "this happens when you try to define UDHs for your messages. in this case you must define one recipient number for each udh"
            }
            Self::EmptyRecipients => "array of recipient numbers must have at least one member",
            Self::TooManyRecipients => "the maximum number of recipients per message is 90",
            Self::EmptySenders => "array of sender numbers must have at least one member",
            Self::EncodingCountMismatch => {
                "this happens when you try to define encodings for your messages. in this case you must define one recipient number for each Encoding"
            }
            Self::CheckingMessageIdCountMismatch => {
                "this happens when you try to define checking-message-ids for your messages. in this case you must define one recipient number for each checking-message-id"
            }
        }
    }

    /// Whether this rejection indicates wrong credentials, domain, or permissions.
    pub fn is_auth_error(self) -> bool {
        matches!(
            self,
            Self::AccountNumberRangeMismatch
                | Self::InvalidCredentialsOrDomain
                | Self::IncorrectCredentials
                | Self::NoWebServicePermission
        )
    }

    /// Whether this rejection indicates the account cannot currently send.
    pub fn is_account_error(self) -> bool {
        matches!(
            self,
            Self::InsufficientCredit | Self::AccountInactive | Self::AccountExpired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
/// A result code below [`ResultCode::ACCEPTED_FLOOR`].
pub enum CarrierError {
    /// A documented rejection.
    #[error("{}", .kind.message())]
    Rejected { kind: KnownRejection, code: ResultCode },

    /// A rejection code this crate does not know.
    #[error("unknown error happened. code: {code}")]
    Unknown { code: ResultCode },
}

impl CarrierError {
    /// The raw code reported by the carrier.
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Rejected { code, .. } | Self::Unknown { code } => *code,
        }
    }

    /// The known rejection kind, if any.
    pub fn kind(&self) -> Option<KnownRejection> {
        match self {
            Self::Rejected { kind, .. } => Some(*kind),
            Self::Unknown { .. } => None,
        }
    }
}

/// Resolve a result code: accepted codes pass through, anything else becomes a [`CarrierError`].
pub fn translate(code: ResultCode) -> Result<ResultCode, CarrierError> {
    if code.is_accepted() {
        return Ok(code);
    }
    match KnownRejection::from_code(code.as_i64()) {
        Some(kind) => Err(CarrierError::Rejected { kind, code }),
        None => Err(CarrierError::Unknown { code }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [i64; 27] = [
        -1, 1, 2, 3, 4, 6, 12, 13, 14, 15, 16, 17, 18, 19, 20, 22, 23, 24, 101, 102, 103, 104, 106,
        107, 108, 109, 110,
    ];

    #[test]
    fn codes_at_or_above_floor_are_accepted() {
        for code in [1000, 1001, 123_456_789, i64::MAX] {
            assert_eq!(translate(ResultCode::new(code)), Ok(ResultCode::new(code)));
        }
    }

    #[test]
    fn every_table_code_round_trips_through_its_kind() {
        for code in TABLE {
            let kind = KnownRejection::from_code(code).unwrap();
            assert_eq!(kind.code(), code);

            let err = translate(ResultCode::new(code)).unwrap_err();
            assert_eq!(err.kind(), Some(kind));
            assert_eq!(err.code(), ResultCode::new(code));
            assert_eq!(err.to_string(), kind.message());
        }
    }

    #[test]
    fn codes_outside_the_table_are_unknown() {
        for code in [-2, 0, 5, 7, 11, 21, 25, 100, 105, 111, 999, i64::MIN] {
            let err = translate(ResultCode::new(code)).unwrap_err();
            assert_eq!(
                err,
                CarrierError::Unknown {
                    code: ResultCode::new(code)
                }
            );
            assert_eq!(err.to_string(), format!("unknown error happened. code: {code}"));
        }
    }

    #[test]
    fn messages_match_carrier_wording() {
        assert_eq!(
            translate(ResultCode::new(14)).unwrap_err().to_string(),
            "Your credit's not enough to send this message. you might want to buy some credit.call "
        );
        assert_eq!(
            translate(ResultCode::new(107)).unwrap_err().to_string(),
            "the maximum number of recipients per message is 90"
        );
        assert_eq!(
            KnownRejection::EmptyRecipients.message(),
            "array of recipient numbers must have at least one member"
        );
        assert_eq!(
            KnownRejection::IncorrectCredentials.message(),
            "You're not entering the correct combination of Username/Password"
        );
    }

    #[test]
    fn helpers_classify_known_kinds() {
        assert!(ResultCode::new(19).is_auth_error());
        assert!(ResultCode::new(18).is_auth_error());
        assert!(!ResultCode::new(19).is_account_error());

        assert!(ResultCode::new(14).is_account_error());
        assert!(ResultCode::new(17).is_account_error());

        let unknown = ResultCode::new(999);
        assert!(unknown.known_rejection().is_none());
        assert!(!unknown.is_auth_error());
        assert!(!unknown.is_account_error());

        assert!(ResultCode::new(1014).known_rejection().is_none());
    }
}
