use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::accident_links::{
    dtos as accident_links_dtos, handlers as accident_links_handlers,
    models as accident_links_models,
};
use crate::features::accidents::{
    dtos as accidents_dtos, handlers as accidents_handlers, models as accidents_models,
};
use crate::features::location::{
    dtos as location_dtos, handlers as location_handlers, models as location_models,
};
use crate::features::tow_providers::{
    handlers as tow_providers_handlers, models as tow_providers_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Accident links
        accident_links_handlers::issue_link,
        accident_links_handlers::validate_link,
        accident_links_handlers::consume_link,
        // Accident form (public, token gated)
        accidents_handlers::submit_accident_form,
        location_handlers::resolve_location,
        // Accidents (operator)
        accidents_handlers::list_accidents,
        accidents_handlers::get_accident,
        accidents_handlers::assign_tow,
        accidents_handlers::notify_client,
        accidents_handlers::mark_completed,
        // Tow providers
        tow_providers_handlers::list_tow_providers,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Accident links
            accident_links_dtos::CreateAccidentLinkDto,
            accident_links_dtos::IssuedLinkDto,
            accident_links_models::BoundIdentity,
            accident_links_models::LinkTokenStatus,
            ApiResponse<accident_links_dtos::IssuedLinkDto>,
            ApiResponse<accident_links_models::BoundIdentity>,
            // Location
            location_models::Coordinates,
            location_models::LocationSource,
            location_models::LocationFailure,
            location_models::ResolvedLocation,
            location_dtos::FailureCode,
            location_dtos::ResolveLocationDto,
            location_dtos::LocationResolutionStatus,
            location_dtos::LocationResolutionDto,
            ApiResponse<location_dtos::LocationResolutionDto>,
            // Accidents
            accidents_models::ReportStatus,
            accidents_models::AssignedProvider,
            accidents_models::Reporter,
            accidents_models::Vehicle,
            accidents_models::AccidentLocation,
            accidents_models::Attachments,
            accidents_models::AccidentReport,
            accidents_dtos::AttachmentKind,
            accidents_dtos::AttachmentFailure,
            accidents_dtos::SubmitAccidentFormDoc,
            accidents_dtos::SubmissionOutcomeDto,
            accidents_dtos::ListAccidentsQuery,
            accidents_dtos::AssignTowDto,
            accidents_dtos::DispatchOutcomeDto,
            accidents_dtos::NotifyClientDto,
            ApiResponse<accidents_dtos::SubmissionOutcomeDto>,
            ApiResponse<accidents_models::AccidentReport>,
            ApiResponse<Vec<accidents_models::AccidentReport>>,
            ApiResponse<accidents_dtos::DispatchOutcomeDto>,
            ApiResponse<accidents_dtos::NotifyClientDto>,
            // Tow providers
            tow_providers_models::TowProvider,
            ApiResponse<Vec<tow_providers_models::TowProvider>>,
        )
    ),
    tags(
        (name = "accident-links", description = "Accident form links issued to clients"),
        (name = "accident-form", description = "Public accident form (token gated)"),
        (name = "accidents", description = "Accident reports and tow dispatch (operator)"),
        (name = "tow-providers", description = "Tow provider directory (operator)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "AIS API",
        version = "0.1.0",
        description = "Accident intake and tow dispatch",
    )
)]
pub struct ApiDoc;

/// Adds the operator basic auth scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "operator_basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_dispatch_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/accident-links",
            "/api/accident-form",
            "/api/accident-form/location",
            "/api/accidents/{id}/assign-tow",
            "/api/tow-providers",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
