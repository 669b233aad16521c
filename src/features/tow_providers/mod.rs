//! Tow provider reference data.
//!
//! Providers come from an injected [`ProviderDirectory`] so the list can be
//! configured per deployment and swapped out in tests.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/tow-providers` | List tow providers in directory order |

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::TowProvider;
pub use services::{ProviderDirectory, StaticProviderDirectory};
