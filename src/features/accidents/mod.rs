//! Accident reports: intake, status machine, dispatch and client notification.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/accident-form` | Submit a report with photos (public, token gated) |
//! | GET | `/api/accidents` | List reports (`search`, `status`) |
//! | GET | `/api/accidents/{id}` | Get a report |
//! | PATCH | `/api/accidents/{id}/assign-tow` | Assign a tow provider |
//! | POST | `/api/accidents/{id}/notify-client` | Build the client WhatsApp link |
//! | PATCH | `/api/accidents/{id}/mark-completed` | Complete an assigned report |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use handlers::AccidentState;
pub use services::{ClientNotifier, DispatchService, IntakeService, ReportService};
pub use stores::{InMemoryReportStore, PgReportStore, ReportStore};
