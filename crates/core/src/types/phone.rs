//! Russian phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input does not look like a Russian mobile/landline number.
    #[error("phone number must match +7XXXXXXXXXX or 8XXXXXXXXXX")]
    InvalidFormat,
}

/// A normalized Russian phone number.
///
/// Accepts free-form user input such as `+7 (999) 123-45-67` or
/// `89991234567`: everything except digits and a leading `+` is
/// stripped, then the number must be a leading `+7` or `8` followed by
/// exactly ten digits. A leading `8` is rewritten to `+7`, so the
/// stored form is always `+7XXXXXXXXXX`.
///
/// ## Examples
///
/// ```
/// use chefport_core::Phone;
///
/// let phone = Phone::parse("8 (999) 123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+79991234567");
///
/// assert!(Phone::parse("12345").is_err());
/// assert!(Phone::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a `Phone` from free-form user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not normalize to
    /// `+7` plus ten digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        // Keep digits and a leading plus, drop spaces/braces/dashes.
        let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();

        let digits = if let Some(rest) = cleaned.strip_prefix("+7") {
            rest
        } else if let Some(rest) = cleaned.strip_prefix('8') {
            rest
        } else {
            return Err(PhoneError::InvalidFormat);
        };

        if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(format!("+7{digits}")))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed normalized
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plus_seven() {
        let phone = Phone::parse("+79991234567").unwrap();
        assert_eq!(phone.as_str(), "+79991234567");
    }

    #[test]
    fn test_parse_rewrites_leading_eight() {
        let phone = Phone::parse("89991234567").unwrap();
        assert_eq!(phone.as_str(), "+79991234567");
    }

    #[test]
    fn test_parse_strips_punctuation() {
        let phone = Phone::parse("+7 (999) 123-45-67").unwrap();
        assert_eq!(phone.as_str(), "+79991234567");

        let phone = Phone::parse("8 999 123 45 67").unwrap();
        assert_eq!(phone.as_str(), "+79991234567");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
        assert!(matches!(Phone::parse("   "), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(Phone::parse("12345"), Err(PhoneError::InvalidFormat)));
        assert!(matches!(Phone::parse("+7999123456"), Err(PhoneError::InvalidFormat)));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Phone::parse("+799912345678"),
            Err(PhoneError::InvalidFormat)
        ));
    }

    #[test]
    fn test_parse_wrong_country_prefix() {
        assert!(matches!(
            Phone::parse("+19991234567"),
            Err(PhoneError::InvalidFormat)
        ));
    }

    #[test]
    fn test_display() {
        let phone = Phone::parse("89991234567").unwrap();
        assert_eq!(format!("{phone}"), "+79991234567");
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("+79991234567").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+79991234567\"");

        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }

    #[test]
    fn test_from_str() {
        let phone: Phone = "89991234567".parse().unwrap();
        assert_eq!(phone.as_str(), "+79991234567");
    }
}
