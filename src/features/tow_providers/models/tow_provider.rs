use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::messaging::normalize_phone;

/// Column widths of `provider_name` and `provider_contact`
const MAX_NAME_LENGTH: usize = 128;
const MAX_ADDRESS_LENGTH: usize = 32;

/// A tow company that can be dispatched to an accident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TowProvider {
    pub name: String,
    /// Phone number the dispatch deep link is addressed to
    #[serde(alias = "whatsappNumber", alias = "whatsapp_number")]
    pub notification_address: String,
}

impl TowProvider {
    pub fn new(name: impl Into<String>, notification_address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notification_address: notification_address.into(),
        }
    }

    /// Providers used when no `TOW_PROVIDERS` list is configured
    pub fn defaults() -> Vec<TowProvider> {
        vec![
            TowProvider::new("QuickTow Services", "+27698053809"),
            TowProvider::new("Speedy Tow", "+27698053809"),
            TowProvider::new("Rapid Tow Co", "+27698053809"),
            TowProvider::new("Eugene Towing", "+27740881414"),
        ]
    }

    /// Check a configured provider fits the report columns and can be messaged
    pub fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Tow provider name must not be empty".to_string());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(format!(
                "Tow provider name '{}' exceeds {} characters",
                name, MAX_NAME_LENGTH
            ));
        }
        if self.notification_address.chars().count() > MAX_ADDRESS_LENGTH {
            return Err(format!(
                "Notification address of '{}' exceeds {} characters",
                name, MAX_ADDRESS_LENGTH
            ));
        }
        if normalize_phone(&self.notification_address).is_empty() {
            return Err(format!("Notification address of '{}' has no digits", name));
        }
        Ok(())
    }

    /// Name comparison used for dispatch lookups
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
