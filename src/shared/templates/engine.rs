//! Jinja-syntax templates for the messages carried by notification deep links.
//!
//! Templates are compiled into the binary; wording changes go through review
//! like any other code change.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::error::AppError;

/// Invitation sent to a reporter with their accident form link
pub const LINK_INVITE: &str = "link_invite";

/// Dispatch request sent to the assigned tow provider
pub const PROVIDER_DISPATCH: &str = "provider_dispatch";

/// Confirmation sent to the reporter once a provider is assigned
pub const CLIENT_ASSIGNED: &str = "client_assigned";

const TEMPLATES: &[(&str, &str)] = &[
    (
        LINK_INVITE,
        "Hello {{ name }}, please use this secure link to report your accident \
         and request a tow: {{ form_url }}",
    ),
    (
        PROVIDER_DISPATCH,
        "New tow request (ref {{ reference }}). \
         Vehicle: {{ vehicle }}. \
         Location: {{ address }}.\
         {% if map_url %} Map: {{ map_url }}{% endif %}",
    ),
    (
        CLIENT_ASSIGNED,
        "Hello {{ name }}, a tow company ({{ provider }}) has been assigned to assist \
         with your vehicle at {{ address }}.",
    ),
];

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

impl From<TemplateError> for AppError {
    fn from(err: TemplateError) -> Self {
        AppError::Internal(err.to_string())
    }
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        }
    }
    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a named message template.
///
/// # Example
/// ```ignore
/// let text = render_template(CLIENT_ASSIGNED, minijinja::context! {
///     name => "Thandi", provider => "QuickTow Services", address => "N1, Cape Town",
/// })?;
/// ```
pub fn render_template(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_render_client_assigned() {
        let text = render_template(
            CLIENT_ASSIGNED,
            context! { name => "A", provider => "QuickTow Services", address => "N1 Highway" },
        )
        .unwrap();

        assert_eq!(
            text,
            "Hello A, a tow company (QuickTow Services) has been assigned to assist with your vehicle at N1 Highway."
        );
    }

    #[test]
    fn test_provider_dispatch_omits_missing_map() {
        let with_map = render_template(
            PROVIDER_DISPATCH,
            context! {
                reference => "abc",
                vehicle => "Toyota Corolla",
                address => "N1",
                map_url => "https://www.google.com/maps?q=1,2",
            },
        )
        .unwrap();
        assert!(with_map.contains("Map: https://www.google.com/maps?q=1,2"));

        let without_map = render_template(
            PROVIDER_DISPATCH,
            context! { reference => "abc", vehicle => "Toyota Corolla", address => "N1", map_url => () },
        )
        .unwrap();
        assert!(!without_map.contains("Map:"));
    }

    #[test]
    fn test_unknown_template() {
        let err = render_template("missing", context! {}).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
