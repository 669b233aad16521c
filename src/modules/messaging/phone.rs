use crate::shared::constants::{MAX_PHONE_DIGITS, MIN_PHONE_DIGITS};
use crate::shared::validation::{NON_DIGIT_REGEX, PHONE_INPUT_REGEX};

/// Strip every non-digit character from a phone number.
///
/// The messaging transport only understands a canonical numeric address, so
/// this runs before any deep link is composed.
pub fn normalize_phone(raw: &str) -> String {
    NON_DIGIT_REGEX.replace_all(raw, "").into_owned()
}

/// Regional phone-number rule applied when a link is issued.
///
/// With a country code configured, numbers must be `<code>` followed by
/// exactly `subscriber_digits` digits; the national trunk form (`0` followed
/// by the subscriber digits) is accepted and rewritten to the international
/// form. Without a country code any number of 7 to 15 digits passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRule {
    country_code: Option<String>,
    subscriber_digits: usize,
}

impl PhoneRule {
    pub fn new(country_code: Option<String>, subscriber_digits: usize) -> Self {
        Self {
            country_code: country_code.filter(|c| !c.is_empty()),
            subscriber_digits,
        }
    }

    /// Rule that accepts any plausible international number
    pub fn permissive() -> Self {
        Self::new(None, 0)
    }

    /// Validate a human-entered number and return its canonical digits
    pub fn canonicalize(&self, raw: &str) -> Result<String, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Phone number is required".to_string());
        }
        if !PHONE_INPUT_REGEX.is_match(trimmed) {
            return Err(format!("Phone number '{}' contains invalid characters", raw));
        }

        let digits = normalize_phone(trimmed);

        let Some(code) = &self.country_code else {
            if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
                return Ok(digits);
            }
            return Err(format!(
                "Phone number must have between {} and {} digits",
                MIN_PHONE_DIGITS, MAX_PHONE_DIGITS
            ));
        };

        if digits.len() == code.len() + self.subscriber_digits && digits.starts_with(code.as_str())
        {
            return Ok(digits);
        }

        if digits.len() == 1 + self.subscriber_digits && digits.starts_with('0') {
            return Ok(format!("{}{}", code, &digits[1..]));
        }

        Err(format!(
            "Phone number must be +{} followed by {} digits",
            code, self.subscriber_digits
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn south_africa() -> PhoneRule {
        PhoneRule::new(Some("27".to_string()), 9)
    }

    #[test]
    fn test_normalize_strips_spaces() {
        assert_eq!(normalize_phone("071 234 5678"), "0712345678");
    }

    #[test]
    fn test_normalize_strips_punctuation_and_letters() {
        assert_eq!(normalize_phone("+27 (82) 123-4567"), "27821234567");
        assert_eq!(normalize_phone("tel:+27.82.123.4567 ext"), "27821234567");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn test_normalize_keeps_missing_country_code_as_is() {
        // No regional guessing happens at this layer
        assert_eq!(normalize_phone("082 123 4567"), "0821234567");
    }

    #[test]
    fn test_rule_accepts_international_form() {
        assert_eq!(
            south_africa().canonicalize("+27821234567").unwrap(),
            "27821234567"
        );
        assert_eq!(
            south_africa().canonicalize("27 82 123 4567").unwrap(),
            "27821234567"
        );
    }

    #[test]
    fn test_rule_rewrites_national_form() {
        assert_eq!(
            south_africa().canonicalize("071 234 5678").unwrap(),
            "27712345678"
        );
    }

    #[test]
    fn test_rule_rejects_wrong_length_and_country() {
        assert!(south_africa().canonicalize("+2782123456").is_err());
        assert!(south_africa().canonicalize("+44 20 7946 0958").is_err());
        assert!(south_africa().canonicalize("").is_err());
        assert!(south_africa().canonicalize("082-CALL-NOW").is_err());
    }

    #[test]
    fn test_permissive_rule() {
        let rule = PhoneRule::permissive();
        assert_eq!(rule.canonicalize("+44 20 7946 0958").unwrap(), "442079460958");
        assert!(rule.canonicalize("12345").is_err());
        assert!(rule.canonicalize("1234567890123456").is_err());
    }
}
