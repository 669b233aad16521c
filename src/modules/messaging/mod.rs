//! Deep-link messaging transport
//!
//! Notifications are delivered as URLs that open a messaging app with the
//! recipient and message pre-filled. Delivery itself is up to whoever opens
//! the link.

mod deep_link;
mod phone;

pub use deep_link::{DeepLinkError, DeepLinkTransport, WhatsAppLinks};
pub use phone::{normalize_phone, PhoneRule};
