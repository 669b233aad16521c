use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::{MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};

lazy_static! {
    /// Anything that is not an ASCII digit; stripped from phone numbers
    pub static ref NON_DIGIT_REGEX: Regex = Regex::new(r"[^0-9]").unwrap();

    /// Characters a human might type in a phone number
    /// - Valid: "+27 82 123 4567", "(071) 234-5678", "0712345678"
    /// - Invalid: "call me", "071-ABC-5678"
    pub static ref PHONE_INPUT_REGEX: Regex = Regex::new(r"^\+?[0-9 ()./-]+$").unwrap();
}

/// Reject strings that are empty once trimmed
pub fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Reject phone numbers that could never be messaged: stray characters or
/// a digit count outside 7 to 15. Blank values are left to `validate_not_blank`.
pub fn validate_phone_input(value: &str) -> Result<(), validator::ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    if !PHONE_INPUT_REGEX.is_match(trimmed) {
        return Err(validator::ValidationError::new("phone_characters"));
    }

    let digits = NON_DIGIT_REGEX.replace_all(trimmed, "").len();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(validator::ValidationError::new("phone_digits"));
    }
    Ok(())
}
