//! Accident form links.
//!
//! An operator issues a link for a client; the raw token is handed out once
//! inside the form URL and only its SHA-256 hash is stored. Validation is a
//! pure read. Consumption is a separate atomic operation.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/accident-links` | Issue a link and its WhatsApp invite |
//! | GET | `/api/accident-links/validate/{token}` | Check a token (public) |
//! | POST | `/api/accident-links/consume/{token}` | Mark a token as used |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::LinkTokenService;
pub use stores::{InMemoryLinkTokenStore, LinkTokenStore, PgLinkTokenStore};
