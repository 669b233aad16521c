use thiserror::Error;

use super::phone::normalize_phone;
use crate::core::error::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeepLinkError {
    #[error("Recipient address '{0}' has no digits")]
    InvalidRecipient(String),
}

impl From<DeepLinkError> for AppError {
    fn from(err: DeepLinkError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Builds a URL that opens a messaging app addressed to `address` with
/// `message` pre-filled. Building a link never sends anything.
pub trait DeepLinkTransport: Send + Sync {
    fn build_link(&self, address: &str, message: &str) -> Result<String, DeepLinkError>;
}

/// `wa.me` click-to-chat links
pub struct WhatsAppLinks {
    base_url: String,
}

impl WhatsAppLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for WhatsAppLinks {
    fn default() -> Self {
        Self::new("https://wa.me")
    }
}

impl DeepLinkTransport for WhatsAppLinks {
    fn build_link(&self, address: &str, message: &str) -> Result<String, DeepLinkError> {
        let recipient = normalize_phone(address);
        if recipient.is_empty() {
            return Err(DeepLinkError::InvalidRecipient(address.to_string()));
        }

        Ok(format!(
            "{}/{}?text={}",
            self.base_url,
            recipient,
            urlencoding::encode(message)
        ))
    }
}
