//! Message templates for deep-link notifications.

mod engine;

pub use engine::{render_template, TemplateError, CLIENT_ASSIGNED, LINK_INVITE, PROVIDER_DISPATCH};
