//! # API REST
//!
//! REST API implementation for the patient registry.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON decoding, status mapping, CORS, request tracing)
//!
//! Uses `api-shared` for common response bodies and `registry-core` for every patient operation.

#![warn(rust_2018_idioms)]

pub mod error;
mod patients;

use api_shared::{HealthRes, HealthService, MessageRes, WelcomeRes};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use registry_core::{
    Address, AddressRequest, AddressUpdateRequest, CreatePatientRequest, Patient, PatientService,
    PatientStatus, UpdatePatientRequest,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{INTERNAL_ERROR_MESSAGE, ROUTE_NOT_FOUND_MESSAGE};

/// Application state shared across REST API handlers
///
/// Holds the one `PatientService` built at startup; cloning it shares the same store handle.
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        health,
        patients::list_patients,
        patients::get_patient,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
    ),
    components(schemas(
        HealthRes,
        WelcomeRes,
        MessageRes,
        Patient,
        Address,
        PatientStatus,
        CreatePatientRequest,
        UpdatePatientRequest,
        AddressRequest,
        AddressUpdateRequest,
    ))
)]
pub struct ApiDoc;

/// Build the full REST application around `patient_service`.
///
/// Includes the patient routes, `/` and `/health`, Swagger UI, the JSON route-not-found fallback,
/// and the CORS, tracing and panic layers.
pub fn router(patient_service: PatientService) -> Router {
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/api/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/api/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .with_state(AppState { patient_service });

    with_layers(app)
}

fn with_layers(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = WelcomeRes)
    )
)]
/// Welcome endpoint
async fn root() -> Json<WelcomeRes> {
    Json(WelcomeRes::default())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Does not touch the patient store.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

async fn route_not_found() -> (StatusCode, Json<MessageRes>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageRes::new(ROUTE_NOT_FOUND_MESSAGE)),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(%detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageRes::new(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use registry_core::{CoreConfig, FileStore, MemoryStore, StoreKind};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn memory_app() -> Router {
        router(PatientService::new(Arc::new(MemoryStore::new())))
    }

    fn file_app() -> (TempDir, CoreConfig, Router) {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().to_path_buf(), StoreKind::File).unwrap();
        let store = FileStore::open(&cfg).unwrap();
        let app = router(PatientService::new(Arc::new(store)));
        (temp, cfg, app)
    }

    fn alice() -> Value {
        json!({
            "firstName": "Alice",
            "lastName": "Johnson",
            "dateOfBirth": "1995-10-20",
            "status": "Active",
            "address": {
                "street": "789 Pine St",
                "city": "Elsewhere",
                "state": "TX",
                "zipCode": "54321"
            }
        })
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Body,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        send_raw(app, method, uri, body).await
    }

    async fn create_alice(app: &Router) -> Value {
        let (status, body) = send(app, Method::POST, "/api/patients", Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let app = memory_app();

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to the Patient Registry API");

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty_array() {
        let app = memory_app();
        let (status, body) = send(&app, Method::GET, "/api/patients", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn create_returns_supplied_fields_with_id_and_timestamps() {
        let app = memory_app();
        let body = create_alice(&app).await;

        assert_eq!(body["firstName"], "Alice");
        assert_eq!(body["lastName"], "Johnson");
        assert_eq!(body["dateOfBirth"], "1995-10-20");
        assert_eq!(body["status"], "Active");
        assert_eq!(body["address"], alice()["address"]);
        assert!(body["id"].is_string());
        assert!(body["createdAt"].is_string());
        assert_eq!(body["createdAt"], body["updatedAt"]);

        let (status, listed) = send(&app, Method::GET, "/api/patients", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([body]));
    }

    #[tokio::test]
    async fn get_returns_created_patient() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn create_with_missing_field_is_bad_request() {
        let app = memory_app();
        let mut payload = alice();
        payload.as_object_mut().unwrap().remove("firstName");

        let (status, body) = send(&app, Method::POST, "/api/patients", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Error creating patient");
        assert!(body["error"].as_str().unwrap().contains("firstName"));
    }

    #[tokio::test]
    async fn zip_codes_are_checked_on_create() {
        let app = memory_app();

        for (zip, expected) in [
            ("12345", StatusCode::CREATED),
            ("12345-6789", StatusCode::CREATED),
            ("1234", StatusCode::BAD_REQUEST),
            ("ABCDE", StatusCode::BAD_REQUEST),
        ] {
            let mut payload = alice();
            payload["address"]["zipCode"] = json!(zip);
            let (status, _) = send(&app, Method::POST, "/api/patients", Some(payload)).await;
            assert_eq!(status, expected, "zip {zip}");
        }
    }

    #[tokio::test]
    async fn undecodable_create_bodies_are_bad_request() {
        let app = memory_app();

        let mut unknown_status = alice();
        unknown_status["status"] = json!("Inactive");
        let mut client_id = alice();
        client_id["id"] = json!("0123456789abcdef0123456789abcdef");
        let mut wrong_type = alice();
        wrong_type["firstName"] = json!(42);

        for payload in [unknown_status, client_id, wrong_type] {
            let (status, body) = send(&app, Method::POST, "/api/patients", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Error creating patient");
        }

        let (status, _) =
            send_raw(&app, Method::POST, "/api/patients", Body::from("{ not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, listed) = send(&app, Method::GET, "/api/patients", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn update_merges_partial_body() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "status": "Churned", "address": { "zipCode": "12345-6789" } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Churned");
        assert_eq!(body["address"]["zipCode"], "12345-6789");
        assert_eq!(body["address"]["street"], "789 Pine St");
        assert_eq!(body["firstName"], "Alice");
        assert_eq!(body["createdAt"], created["createdAt"]);
        assert_ne!(body["updatedAt"], created["updatedAt"]);
    }

    #[tokio::test]
    async fn update_accepts_fetched_record_echoed_back() {
        let app = memory_app();
        let mut created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());
        created["middleName"] = json!("Marie");

        let (status, body) = send(&app, Method::PUT, &uri, Some(created.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["middleName"], "Marie");

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({ "middleName": "" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("middleName").is_none());
    }

    #[tokio::test]
    async fn update_with_mismatched_id_is_bad_request() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "id": "0123456789abcdef0123456789abcdef" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Error updating patient");
    }

    #[tokio::test]
    async fn invalid_update_on_existing_patient_is_bad_request() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        for payload in [
            json!({ "status": "Inactive" }),
            json!({ "address": { "zipCode": "ABCDE" } }),
            json!({ "firstName": "" }),
        ] {
            let (status, _) = send(&app, Method::PUT, &uri, Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn null_on_required_field_is_bad_request() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        for payload in [
            json!({ "firstName": null }),
            json!({ "lastName": null }),
            json!({ "dateOfBirth": null }),
            json!({ "status": null }),
            json!({ "address": null }),
            json!({ "address": { "zipCode": null } }),
            json!({ "address": { "street": null } }),
        ] {
            let (status, body) = send(&app, Method::PUT, &uri, Some(payload.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(body["message"], "Error updating patient");
            assert!(body["error"].as_str().unwrap().contains("cannot be null"));
        }

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn null_middle_name_clears_it() {
        let app = memory_app();
        let mut payload = alice();
        payload["middleName"] = json!("Marie");
        let (_, created) = send(&app, Method::POST, "/api/patients", Some(payload)).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({ "middleName": null }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("middleName").is_none());
    }

    #[tokio::test]
    async fn malformed_echoed_timestamp_is_bad_request() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, _) =
            send(&app, Method::PUT, &uri, Some(json!({ "createdAt": "yesterday" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_on_unknown_id_is_not_found_whatever_the_body() {
        let app = memory_app();
        let uri = "/api/patients/0123456789abcdef0123456789abcdef";

        for body in [
            Body::from(alice().to_string()),
            Body::from("{ not json"),
            Body::from(r#"{"status":"Inactive"}"#),
        ] {
            let (status, body) = send_raw(&app, Method::PUT, uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Patient not found");
        }
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let app = memory_app();

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/api/patients/not-an-id", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Patient not found");
        }
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/patients/507f1f77bcf86cd799439011",
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let app = memory_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Patient deleted successfully" }));

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let (_temp, _cfg, app) = file_app();
        let created = create_alice(&app).await;
        let uri = format!("/api/patients/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);
    }

    #[tokio::test]
    async fn store_failures_are_internal_errors() {
        let (_temp, cfg, app) = file_app();
        std::fs::remove_dir_all(cfg.patients_dir()).unwrap();
        std::fs::write(cfg.patients_dir(), "not a directory").unwrap();

        let (status, body) = send(&app, Method::GET, "/api/patients", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error fetching patients");
        assert!(body["error"].is_string());

        let (status, body) = send(&app, Method::POST, "/api/patients", Some(alice())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Error creating patient");
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = memory_app();
        let (status, body) = send(&app, Method::GET, "/api/doctors", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[tokio::test]
    async fn panicking_handler_is_internal_error() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = with_layers(Router::new().route("/boom", get(boom)));

        let (status, body) = send(&app, Method::GET, "/boom", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn openapi_document_lists_patient_routes() {
        let app = memory_app();
        let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/patients"].is_object());
        assert!(body["paths"]["/api/patients/{id}"].is_object());
    }
}
