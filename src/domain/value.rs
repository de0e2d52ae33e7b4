use std::fmt;

use phonenumber::country;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::validation::ValidationError;

fn non_empty_trimmed(value: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
/// Magfa account username.
///
/// Invariant: non-empty after trimming.
pub struct Username(String);

impl Username {
    /// Configuration key for the username.
    pub const FIELD: &'static str = "username";

    /// Create a validated [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty_trimmed(value.into(), Self::FIELD).map(Self)
    }

    /// Borrow the validated username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Deserialize)]
#[serde(try_from = "String")]
/// Magfa account password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed). The value is kept in a
/// [`SecretString`] and never printed by `Debug`.
pub struct Password(SecretString);

impl Password {
    /// Configuration key for the password.
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(SecretString::new(value)))
    }

    /// Expose the password for the duration of a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl TryFrom<String> for Password {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
/// Carrier account namespace (`domain`), e.g. `magfa`.
///
/// Invariant: non-empty after trimming.
pub struct Domain(String);

impl Domain {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "domain";

    /// Create a validated [`Domain`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty_trimmed(value.into(), Self::FIELD).map(Self)
    }

    /// Borrow the validated domain.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Domain {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
/// Sender line assigned to the account (for example `3000xxxx`).
///
/// Invariant: non-empty after trimming. The carrier decides whether the number is valid for the
/// account (result codes `2` and `20`).
pub struct SenderNumber(String);

impl SenderNumber {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "senderNumbers";

    /// Create a validated [`SenderNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty_trimmed(value.into(), Self::FIELD).map(Self)
    }

    /// Borrow the validated sender number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SenderNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(transparent)]
/// Carrier encoding code (`encodings`). `0` lets the carrier pick its default.
pub struct Encoding(i32);

impl Encoding {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "encodings";

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(transparent)]
/// Message class (`messageClasses`). Empty means the normal class.
pub struct MessageClass(String);

impl MessageClass {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "messageClasses";

    /// Create a message class; no validation is performed (code `4` is the carrier's answer).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The normal message class.
    pub fn normal() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(transparent)]
/// Delivery priority (`priorities`).
pub struct Priority(i32);

impl Priority {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "priorities";

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
/// Carrier-side id used to correlate a send with a later status query (`checkingMessageIds`).
pub struct CheckingMessageId(i64);

impl CheckingMessageId {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "checkingMessageIds";

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unvalidated phone number as sent to the carrier (`recipientNumbers`).
///
/// Invariant: non-empty after trimming. This is the only check made locally: the caller's string
/// is not sent verbatim (surrounding whitespace is dropped and blank entries are refused), while
/// whether the number is dialable is left to the carrier (result code 1). This type does not
/// normalize; if you want E.164 normalization, parse into [`PhoneNumber`] and convert it into
/// [`RawPhoneNumber`].
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// SOAP element name used by the `enqueue` operation.
    pub const FIELD: &'static str = "recipientNumbers";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        non_empty_trimmed(value.into(), Self::FIELD).map(Self)
    }

    /// Raw (trimmed) value as sent to the carrier.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert an already-parsed phone number to a normalized raw value (E.164).
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Region assumed for numbers without a country prefix.
    pub const DEFAULT_REGION: country::Id = country::Id::IR;

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty {
                field: RawPhoneNumber::FIELD,
            });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let username = Username::new(" alerts ").unwrap();
        assert_eq!(username.as_str(), "alerts");
        assert!(Username::new("  ").is_err());

        let domain = Domain::new(" magfa ").unwrap();
        assert_eq!(domain.as_str(), "magfa");
        assert!(matches!(
            Domain::new(""),
            Err(ValidationError::Empty {
                field: Domain::FIELD
            })
        ));

        let sender = SenderNumber::new(" 30001234 ").unwrap();
        assert_eq!(sender.as_str(), "30001234");
        assert!(SenderNumber::new(" ").is_err());
    }

    #[test]
    fn password_preserves_whitespace_and_is_redacted() {
        let password = Password::new(" s3cret ").unwrap();
        assert_eq!(password.expose(), " s3cret ");
        assert_eq!(format!("{password:?}"), "Password([REDACTED])");
        assert!(Password::new("").is_err());
    }

    #[test]
    fn message_class_allows_empty_normal_class() {
        assert_eq!(MessageClass::normal().as_str(), "");
        assert_eq!(MessageClass::new("0").as_str(), "0");
    }

    #[test]
    fn raw_phone_number_trims_and_exposes_raw() {
        let raw = RawPhoneNumber::new(" +989121234567 ").unwrap();
        assert_eq!(raw.raw(), "+989121234567");
        assert!(RawPhoneNumber::new("").is_err());
    }

    #[test]
    fn phone_number_parsing_and_equality_use_e164() {
        let p1 = PhoneNumber::parse(None, "+989121234567").unwrap();
        let p2 = PhoneNumber::parse(Some(PhoneNumber::DEFAULT_REGION), "0912 123 4567").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.e164(), "+989121234567");
        assert_eq!(p2.raw(), "0912 123 4567");

        let raw: RawPhoneNumber = p2.into();
        assert_eq!(raw.raw(), "+989121234567");
        assert!(PhoneNumber::parse(None, "not-a-number").is_err());
    }
}
