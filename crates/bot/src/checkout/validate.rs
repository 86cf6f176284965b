//! Free-text input validators.
//!
//! Validation failures are local to the dialog: the caller re-prompts
//! the same state and the draft stays untouched.

use thiserror::Error;

/// Minimum length of a customer name.
const MIN_NAME_LEN: usize = 2;

/// Minimum length of a delivery address. A coarse sanity check, not
/// geocoding.
const MIN_ADDRESS_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name shorter than {MIN_NAME_LEN} characters")]
    NameTooShort,

    #[error("address shorter than {MIN_ADDRESS_LEN} characters")]
    AddressTooShort,
}

/// Validate and normalize a customer name.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize a delivery address.
pub fn validate_address(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.chars().count() < MIN_ADDRESS_LEN {
        return Err(ValidationError::AddressTooShort);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_accepts_two_characters() {
        assert_eq!(validate_name("Ян"), Ok("Ян".to_string()));
        assert_eq!(validate_name("  Иван  "), Ok("Иван".to_string()));
    }

    #[test]
    fn test_name_rejects_short_input() {
        assert_eq!(validate_name("Я"), Err(ValidationError::NameTooShort));
        assert_eq!(validate_name("   "), Err(ValidationError::NameTooShort));
    }

    #[test]
    fn test_address_minimum_length() {
        assert!(validate_address("ул. Ленина, д. 1").is_ok());
        assert_eq!(
            validate_address("короткий"),
            Err(ValidationError::AddressTooShort)
        );
    }

    #[test]
    fn test_address_length_counts_characters_not_bytes() {
        // Ten Cyrillic characters are twenty bytes; must still pass.
        assert!(validate_address("Багратиона").is_ok());
    }
}
