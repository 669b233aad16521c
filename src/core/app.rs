//! Service wiring and the API router
//!
//! `main` picks the collaborator implementations from configuration; tests
//! wire the same services over in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};

use crate::core::config::Config;
use crate::core::middleware;
use crate::features::accident_links::{routes as accident_links_routes, LinkTokenService, LinkTokenStore};
use crate::features::accidents::{
    routes as accidents_routes, AccidentState, ClientNotifier, DispatchService, IntakeService,
    ReportService, ReportStore,
};
use crate::features::location::models::PositionOptions;
use crate::features::location::{routes as location_routes, LocationService};
use crate::features::tow_providers::{routes as tow_providers_routes, ProviderDirectory};
use crate::modules::geocoding::Geocoder;
use crate::modules::messaging::{DeepLinkTransport, PhoneRule};
use crate::modules::storage::BlobStorage;

/// External collaborators the services depend on
pub struct Collaborators {
    pub link_store: Arc<dyn LinkTokenStore>,
    pub report_store: Arc<dyn ReportStore>,
    pub storage: Arc<dyn BlobStorage>,
    pub geocoder: Arc<dyn Geocoder>,
    pub directory: Arc<dyn ProviderDirectory>,
    pub transport: Arc<dyn DeepLinkTransport>,
}

pub struct ServiceSettings {
    pub phone_rule: PhoneRule,
    pub frontend_url: String,
    pub link_ttl: Duration,
    pub position_options: PositionOptions,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            phone_rule: PhoneRule::new(
                config.dispatch.phone_country_code.clone(),
                config.dispatch.phone_subscriber_digits,
            ),
            frontend_url: config.app.frontend_url.clone(),
            link_ttl: config.dispatch.link_ttl,
            position_options: PositionOptions::with_timeout(config.geocoding.location_timeout),
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    pub links: Arc<LinkTokenService>,
    pub location: Arc<LocationService>,
    pub directory: Arc<dyn ProviderDirectory>,
    pub accidents: AccidentState,
}

impl AppServices {
    pub fn new(collaborators: Collaborators, settings: ServiceSettings) -> Self {
        let Collaborators {
            link_store,
            report_store,
            storage,
            geocoder,
            directory,
            transport,
        } = collaborators;

        let links = Arc::new(LinkTokenService::new(
            link_store,
            Arc::clone(&transport),
            settings.phone_rule,
            settings.frontend_url,
            settings.link_ttl,
        ));
        let location = Arc::new(LocationService::new(
            Arc::clone(&links),
            geocoder,
            settings.position_options,
        ));

        let reports = Arc::new(ReportService::new(report_store));
        let accidents = AccidentState {
            intake: Arc::new(IntakeService::new(
                Arc::clone(&links),
                Arc::clone(&reports),
                storage,
            )),
            dispatch: Arc::new(DispatchService::new(
                Arc::clone(&reports),
                Arc::clone(&directory),
                Arc::clone(&transport),
            )),
            notifier: Arc::new(ClientNotifier::new(Arc::clone(&reports), transport)),
            reports,
        };

        Self {
            links,
            location,
            directory,
            accidents,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes plus `/health`. Operator routes sit behind basic auth when
/// credentials are given.
pub fn api_router(services: &AppServices, operator_credentials: Option<String>) -> Router {
    let operator_routes = Router::new()
        .merge(accident_links_routes::operator_routes(Arc::clone(
            &services.links,
        )))
        .merge(accidents_routes::operator_routes(services.accidents.clone()))
        .merge(tow_providers_routes::routes(Arc::clone(&services.directory)));

    let operator_routes = match operator_credentials {
        Some(credentials) => {
            tracing::info!("Operator basic auth enabled");
            operator_routes.route_layer(from_fn(middleware::basic_auth_middleware(
                Arc::new(credentials),
                "operator",
            )))
        }
        None => {
            tracing::warn!("Operator basic auth disabled (no credentials configured)");
            operator_routes
        }
    };

    let public_routes = Router::new()
        .merge(accident_links_routes::public_routes(Arc::clone(
            &services.links,
        )))
        .merge(accidents_routes::public_routes(services.accidents.clone()))
        .merge(location_routes::routes(Arc::clone(&services.location)))
        .route("/health", get(health_check));

    Router::new().merge(operator_routes).merge(public_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_services, StaticGeocoder};
    use axum::http::{header, HeaderValue};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use base64::prelude::*;
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::{json, Value};

    fn server_with(credentials: Option<&str>) -> TestServer {
        let services = test_services(Arc::new(StaticGeocoder::new(Some("N1, Cape Town"))));
        TestServer::new(api_router(&services, credentials.map(str::to_string))).unwrap()
    }

    fn server() -> TestServer {
        server_with(None)
    }

    async fn issue_token(server: &TestServer, name: &str) -> String {
        let response = server
            .post("/api/accident-links")
            .json(&json!({ "name": name, "phone": "082 123 4567" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn accident_form(token: &str, reporter: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("token", token.to_string())
            .add_text("reporterName", reporter.to_string())
            .add_text("reporterPhone", "+27821234567")
            .add_text("vehicleMake", "Toyota")
            .add_text("vehicleModel", "Corolla")
            .add_text("latitude", "-33.92")
            .add_text("longitude", "18.42")
            .add_text("address", "N1, Cape Town")
            .add_text("locationSource", "device")
            .add_part(
                "registrationImage",
                Part::bytes(vec![0xFF, 0xD8, 0xFF])
                    .file_name("registration.jpg")
                    .mime_type("image/jpeg"),
            )
    }

    #[tokio::test]
    async fn test_health() {
        server().get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_dispatch_workflow_end_to_end() {
        let server = server();
        let reporter: String = Name().fake();
        let token = issue_token(&server, &reporter).await;

        server
            .get(&format!("/api/accident-links/validate/{}", token))
            .await
            .assert_status_ok();

        let submitted = server
            .post("/api/accident-form")
            .multipart(accident_form(&token, &reporter))
            .await;
        submitted.assert_status(StatusCode::CREATED);
        let body: Value = submitted.json();
        let report = &body["data"]["report"];
        assert_eq!(report["status"], "pending");
        assert_eq!(report["reporter"]["name"], reporter.as_str());
        assert!(report["attachments"]["registrationImage"]
            .as_str()
            .unwrap()
            .starts_with("memory://"));
        assert_eq!(body["data"]["attachmentFailures"], json!([]));
        let id = report["id"].as_str().unwrap().to_string();

        let listed: Value = server.get("/api/accidents?status=pending").await.json();
        assert_eq!(listed["meta"]["total"], 1);

        let assigned = server
            .patch(&format!("/api/accidents/{}/assign-tow", id))
            .json(&json!({ "towCompany": "Speedy Tow" }))
            .await;
        assigned.assert_status_ok();
        let body: Value = assigned.json();
        assert_eq!(body["data"]["report"]["status"], "assigned");
        assert!(body["data"]["waLink"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/27698053809?text="));

        let notified: Value = server
            .post(&format!("/api/accidents/{}/notify-client", id))
            .await
            .json();
        assert!(notified["data"]["waLink"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/27821234567?text="));

        let completed = server
            .patch(&format!("/api/accidents/{}/mark-completed", id))
            .await;
        completed.assert_status_ok();
        let body: Value = completed.json();
        assert_eq!(body["data"]["status"], "completed");

        server
            .patch(&format!("/api/accidents/{}/assign-tow", id))
            .json(&json!({ "providerName": "Speedy Tow" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_form_skips_photos_over_the_limit() {
        let server = server();
        let token = issue_token(&server, "Naledi").await;

        let mut form = accident_form(&token, "Naledi").add_part(
            "registrationImage",
            Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("second-registration.jpg")
                .mime_type("image/jpeg"),
        );
        for i in 0..6 {
            form = form.add_part(
                "sceneImages",
                Part::bytes(vec![0xFF, 0xD8, 0xFF])
                    .file_name(format!("scene-{}.jpg", i))
                    .mime_type("image/jpeg"),
            );
        }

        let response = server.post("/api/accident-form").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let attachments = &body["data"]["report"]["attachments"];
        assert_eq!(attachments["sceneImages"].as_array().unwrap().len(), 4);
        assert!(attachments["registrationImage"].is_string());
        assert_eq!(body["data"]["attachmentFailures"], json!([]));
    }

    #[tokio::test]
    async fn test_form_rejects_non_finite_coordinates() {
        let server = server();
        let token = issue_token(&server, "Kagiso").await;

        let form = MultipartForm::new()
            .add_text("token", token)
            .add_text("reporterName", "Kagiso")
            .add_text("reporterPhone", "+27821234567")
            .add_text("vehicleMake", "Toyota")
            .add_text("vehicleModel", "Corolla")
            .add_text("latitude", "NaN")
            .add_text("longitude", "NaN");

        server
            .post("/api/accident-form")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_rejects_unknown_token() {
        let response = server()
            .post("/api/accident-form")
            .multipart(accident_form("not-a-real-token", "Sipho"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_consumed_token_is_rejected() {
        let server = server();
        let token = issue_token(&server, "Sipho Dlamini").await;

        server
            .post(&format!("/api/accident-links/consume/{}", token))
            .await
            .assert_status_ok();
        server
            .post(&format!("/api/accident-links/consume/{}", token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get(&format!("/api/accident-links/validate/{}", token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_codes_for_operator_errors() {
        let server = server();
        let missing = uuid::Uuid::now_v7();

        server
            .get(&format!("/api/accidents/{}", missing))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let token = issue_token(&server, "Lerato").await;
        let body: Value = server
            .post("/api/accident-form")
            .multipart(accident_form(&token, "Lerato"))
            .await
            .json();
        let id = body["data"]["report"]["id"].as_str().unwrap().to_string();

        server
            .post(&format!("/api/accidents/{}/notify-client", id))
            .await
            .assert_status(StatusCode::PRECONDITION_FAILED);
        server
            .patch(&format!("/api/accidents/{}/mark-completed", id))
            .await
            .assert_status(StatusCode::CONFLICT);
        server
            .patch(&format!("/api/accidents/{}/assign-tow", id))
            .json(&json!({ "providerName": "Nobody Towing" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let unchanged: Value = server.get(&format!("/api/accidents/{}", id)).await.json();
        assert_eq!(unchanged["data"]["status"], "pending");
    }

    #[tokio::test]
    async fn test_location_failure_offers_manual_entry() {
        let server = server();
        let token = issue_token(&server, "Ayanda").await;

        let response = server
            .post("/api/accident-form/location")
            .json(&json!({ "token": token, "errorCode": 1 }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "unavailable");
        assert_eq!(body["data"]["failure"], "permission_denied");
        assert_eq!(body["data"]["manualEntry"], true);

        let resolved: Value = server
            .post("/api/accident-form/location")
            .json(&json!({ "token": token, "lat": -33.92, "lng": 18.42 }))
            .await
            .json();
        assert_eq!(resolved["data"]["location"]["address"], "N1, Cape Town");
    }

    #[tokio::test]
    async fn test_tow_providers_listed() {
        let body: Value = server().get("/api/tow-providers").await.json();
        assert_eq!(body["meta"]["total"], 4);
        assert_eq!(body["data"][0]["name"], "QuickTow Services");
    }

    #[tokio::test]
    async fn test_operator_routes_require_credentials_when_configured() {
        let server = server_with(Some("dispatch:secret"));

        server
            .get("/api/accidents")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server.get("/health").await.assert_status_ok();

        let auth = format!("Basic {}", BASE64_STANDARD.encode("dispatch:secret"));
        server
            .get("/api/accidents")
            .add_header(header::AUTHORIZATION, HeaderValue::from_str(&auth).unwrap())
            .await
            .assert_status_ok();
    }
}
