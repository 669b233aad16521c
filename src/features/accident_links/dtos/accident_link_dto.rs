use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::shared::validation::validate_not_blank;

/// Request DTO for issuing an accident form link
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccidentLinkDto {
    #[validate(
        length(min = 1, max = 128, message = "Name must be 1-128 characters"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: String,
}

/// Response DTO for a newly issued link
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedLinkDto {
    pub link_id: Uuid,
    /// Raw token; only returned here
    pub token: String,
    pub form_url: String,
    /// WhatsApp deep link inviting the client to open the form
    pub wa_link: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_link_validation() {
        let dto = CreateAccidentLinkDto {
            name: "Thandi".to_string(),
            email: Some("thandi@example.com".to_string()),
            phone: "+27821234567".to_string(),
        };
        assert!(dto.validate().is_ok());

        let blank = CreateAccidentLinkDto {
            name: "   ".to_string(),
            ..dto.clone()
        };
        assert!(blank.validate().is_err());

        let bad_email = CreateAccidentLinkDto {
            email: Some("not-an-email".to_string()),
            ..dto
        };
        assert!(bad_email.validate().is_err());
    }
}
