//! REST API for the packing service.
//!
//! Exposes the packing pipeline over HTTP. Uses Axum as the web framework
//! and supports CORS.

use std::collections::HashSet;
use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use crate::config::{ApiConfig, OptimizerConfig};
use crate::cost::{RunResult, UldLoad, UnclaimedPackage};
use crate::model::{Package, Placement, Priority, Uld, ValidationError};
use crate::optimizer::{
    PackEvent, PackingConfig, pack_packages_with_config, pack_packages_with_progress,
};

#[derive(Clone)]
struct ApiState {
    optimizer_config: OptimizerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>uld-packer API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js"
            integrity="sha384-2YH8WDRaj7V2OqU/trsmzSagmk/E2SutiCsGkdgoQwC9pNUJV1u/141DHB6jgs8t"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                const ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                    presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                    layout: "StandaloneLayout",
                });
                window.ui = ui;
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the packing endpoints.
///
/// `priority_uld_cost` and `collision_check` override the server
/// configuration for this request only.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "ulds": [
            { "id": "U1", "dims": [224, 318, 162], "weight_limit": 2500 }
        ],
        "packages": [
            { "id": "P-1", "dims": [99, 53, 55], "weight": 61, "priority": "economy", "deferral_cost": 176 },
            { "id": "P-2", "dims": [56, 99, 81], "weight": 53, "priority": "priority" }
        ],
        "priority_uld_cost": 40,
        "collision_check": true
    })
)]
pub struct PackRequest {
    pub ulds: Vec<Uld>,
    pub packages: Vec<PackageInput>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub priority_uld_cost: Option<u64>,
    #[serde(default)]
    #[schema(nullable = true)]
    pub collision_check: Option<bool>,
}

/// A package as submitted in a pack request.
#[derive(Deserialize, ToSchema)]
pub struct PackageInput {
    #[schema(example = "P-1")]
    pub id: String,
    #[schema(value_type = [u32; 3], example = json!([99, 53, 55]))]
    pub dims: (u32, u32, u32),
    #[schema(example = 61)]
    pub weight: u32,
    pub priority: Priority,
    /// Required for Economy packages, ignored for Priority packages
    #[serde(default)]
    #[schema(nullable = true, example = 176)]
    pub deferral_cost: Option<u32>,
}

impl PackageInput {
    fn into_package(self) -> Result<Package, PackRequestValidationError> {
        let deferral_cost = match (self.priority, self.deferral_cost) {
            (Priority::Economy, None) => {
                return Err(PackRequestValidationError::MissingDeferralCost(self.id));
            }
            (_, cost) => cost.unwrap_or(0),
        };
        Package::new(self.id, self.dims, self.weight, self.priority, deferral_cost)
            .map_err(PackRequestValidationError::InvalidPackage)
    }
}

#[derive(Debug)]
struct ValidatedPackRequest {
    ulds: Vec<Uld>,
    packages: Vec<Package>,
    priority_uld_cost: Option<u64>,
    collision_check: Option<bool>,
}

impl ValidatedPackRequest {
    fn packing_config(&self, base: PackingConfig) -> PackingConfig {
        PackingConfig::builder()
            .priority_uld_cost(self.priority_uld_cost.unwrap_or(base.priority_uld_cost))
            .collision_check(self.collision_check.unwrap_or(base.collision_check))
            .worker_threads(base.worker_threads)
            .build()
    }
}

#[derive(Debug, PartialEq)]
enum PackRequestValidationError {
    MissingUlds,
    InvalidUld(ValidationError),
    InvalidPackage(ValidationError),
    MissingDeferralCost(String),
    DuplicateId(String),
    PriorityUldCostOutOfRange(u64),
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), PackRequestValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PackRequestValidationError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

impl PackRequest {
    fn into_validated(self) -> Result<ValidatedPackRequest, PackRequestValidationError> {
        if self.ulds.is_empty() {
            return Err(PackRequestValidationError::MissingUlds);
        }
        if let Some(cost) = self.priority_uld_cost {
            if cost > PackingConfig::MAX_PRIORITY_ULD_COST {
                return Err(PackRequestValidationError::PriorityUldCostOutOfRange(cost));
            }
        }

        let ulds = self
            .ulds
            .into_iter()
            .map(Uld::validated)
            .collect::<Result<Vec<_>, ValidationError>>()
            .map_err(PackRequestValidationError::InvalidUld)?;

        let packages = self
            .packages
            .into_iter()
            .map(PackageInput::into_package)
            .collect::<Result<Vec<_>, _>>()?;

        ensure_unique(ulds.iter().map(|u| u.id.as_str()))?;
        ensure_unique(packages.iter().map(|p| p.id.as_str()))?;

        Ok(ValidatedPackRequest {
            ulds,
            packages,
            priority_uld_cost: self.priority_uld_cost,
            collision_check: self.collision_check,
        })
    }
}

/// Response of the `/pack` endpoint.
#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    pub result: RunResult,
    pub is_complete: bool,
    pub collision_check: bool,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn parse_pack_request(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<ValidatedPackRequest, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => {
            return Err(error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid JSON data",
                err.to_string(),
            ));
        }
    };

    payload.into_validated().map_err(|err| match err {
        PackRequestValidationError::MissingUlds => {
            validation_error("At least one ULD must be specified")
        }
        PackRequestValidationError::InvalidUld(err) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid ULD configuration",
            err.to_string(),
        ),
        PackRequestValidationError::InvalidPackage(err) => validation_error(err.to_string()),
        PackRequestValidationError::MissingDeferralCost(id) => {
            validation_error(format!("Economy package '{id}' has no deferral_cost"))
        }
        PackRequestValidationError::DuplicateId(id) => {
            validation_error(format!("Duplicate identifier '{id}'"))
        }
        PackRequestValidationError::PriorityUldCostOutOfRange(cost) => validation_error(format!(
            "priority_uld_cost {cost} exceeds the maximum of {}",
            PackingConfig::MAX_PRIORITY_ULD_COST
        )),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack, handle_pack_stream),
    components(
        schemas(
            PackRequest,
            PackResponse,
            RunResult,
            Placement,
            UldLoad,
            UnclaimedPackage,
            Uld,
            PackageInput,
            Priority,
            ErrorResponse
        )
    ),
    tags((name = "packing", description = "Endpoints for ULD packing"))
)]
struct ApiDoc;

fn router(optimizer_config: OptimizerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pack", post(handle_pack))
        .route("/pack_stream", post(handle_pack_stream))
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(ApiState { optimizer_config })
}

/// Starts the API server.
///
/// Configures CORS for cross-origin requests. Runs until the server is
/// terminated.
pub async fn start_api_server(
    config: ApiConfig,
    optimizer_config: OptimizerConfig,
) -> std::io::Result<()> {
    let app = router(optimizer_config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("Local access: http://localhost:{}", config.port());
    }
    info!("API endpoints: POST /pack, POST /pack_stream");
    info!("Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /pack endpoint.
///
/// Packs the given packages into the given ULDs and returns the run result.
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Packing run finished", body = PackResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request, ULD or package data",
            body = ErrorResponse
        ),
        (status = INTERNAL_SERVER_ERROR, description = "Packing task failed", body = ErrorResponse)
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Response {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.packing_config(state.optimizer_config.packing_config());
    info!(
        ulds = request.ulds.len(),
        packages = request.packages.len(),
        "new pack request"
    );

    let ValidatedPackRequest { ulds, packages, .. } = request;
    let joined =
        tokio::task::spawn_blocking(move || pack_packages_with_config(ulds, packages, config))
            .await;

    match joined {
        Ok(result) => {
            info!(
                total_cost = result.total_cost,
                total_claimed = result.total_claimed,
                unclaimed = result.unclaimed_count(),
                "pack request finished"
            );
            let response = PackResponse {
                is_complete: result.is_complete(),
                collision_check: config.collision_check,
                result,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!(%err, "packing task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Packing failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for POST /pack_stream endpoint (SSE).
///
/// Streams pack events as Server-Sent Events (text/event-stream) while the
/// ULDs are being packed. If the packing task fails, a final
/// `{"type": "Error"}` event is sent before the stream closes.
#[utoipa::path(
    post,
    path = "/pack_stream",
    request_body = PackRequest,
    responses(
        (
            status = 200,
            description = "Streams pack events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request, ULD or package data",
            body = ErrorResponse
        )
    ),
    tag = "packing"
)]
async fn handle_pack_stream(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Response {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = request.packing_config(state.optimizer_config.packing_config());
    let ValidatedPackRequest { ulds, packages, .. } = request;

    let events = spawn_event_stream(move |emit| {
        pack_packages_with_progress(ulds, packages, config, emit);
    });

    let stream = events
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Runs `work` on a blocking worker and streams the events it emits as
/// JSON strings. A failed task ends the stream with an `Error` event.
fn spawn_event_stream<F>(work: F) -> ReceiverStream<String>
where
    F: FnOnce(&(dyn Fn(&PackEvent) + Sync)) + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(32);

    let error_tx = tx.clone();
    let task = tokio::task::spawn_blocking(move || {
        let emit = |evt: &PackEvent| {
            if let Ok(json) = serde_json::to_string(evt) {
                // A closed receiver means the client went away; later events are dropped.
                let _ = tx.blocking_send(json);
            }
        };
        work(&emit);
    });
    tokio::spawn(async move {
        if let Err(err) = task.await {
            error!(%err, "streamed packing task failed");
            let event = json!({ "type": "Error", "message": err.to_string() });
            let _ = error_tx.send(event.to_string()).await;
        }
    });

    ReceiverStream::new(rx)
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json(body: &str) -> PackRequest {
        serde_json::from_str(body).expect("Should parse valid JSON")
    }

    fn test_state() -> ApiState {
        ApiState {
            optimizer_config: crate::config::AppConfig::from_env().optimizer,
        }
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        assert!(
            paths.contains_key("/pack"),
            "OpenAPI documentation is missing the /pack path"
        );
        assert!(
            paths.contains_key("/pack_stream"),
            "OpenAPI documentation is missing the /pack_stream path"
        );
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        let schemas = &components.schemas;
        for name in ["PackRequest", "PackResponse", "RunResult", "ErrorResponse"] {
            assert!(
                schemas.contains_key(name),
                "Expected schema '{}' is missing from the OpenAPI document",
                name
            );
        }
    }

    #[test]
    fn pack_request_overrides_are_optional() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [{"id": "P1", "dims": [5, 5, 5], "weight": 10, "priority": "priority"}]
            }"#,
        );
        assert_eq!(request.priority_uld_cost, None);
        assert_eq!(request.collision_check, None);

        let validated = request.into_validated().expect("Should validate");
        let base = PackingConfig::builder()
            .priority_uld_cost(7)
            .collision_check(false)
            .build();
        assert_eq!(validated.packing_config(base), base);
    }

    #[test]
    fn pack_request_overrides_take_precedence() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [],
                "priority_uld_cost": 120,
                "collision_check": true
            }"#,
        );
        let validated = request.into_validated().expect("Should validate");
        let config = validated.packing_config(
            PackingConfig::builder()
                .collision_check(false)
                .worker_threads(3)
                .build(),
        );

        assert_eq!(config.priority_uld_cost, 120);
        assert!(config.collision_check);
        assert_eq!(config.worker_threads, 3);
    }

    #[test]
    fn request_without_ulds_is_rejected() {
        let request = request_json(r#"{"ulds": [], "packages": []}"#);
        assert_eq!(
            request.into_validated().unwrap_err(),
            PackRequestValidationError::MissingUlds
        );
    }

    #[test]
    fn request_with_zero_dimension_is_rejected() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [{"id": "P1", "dims": [0, 5, 5], "weight": 10, "priority": "economy", "deferral_cost": 3}]
            }"#,
        );
        assert!(matches!(
            request.into_validated(),
            Err(PackRequestValidationError::InvalidPackage(
                ValidationError::InvalidDimension(_)
            ))
        ));
    }

    #[test]
    fn request_with_duplicate_package_ids_is_rejected() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [
                    {"id": "P1", "dims": [1, 1, 1], "weight": 1, "priority": "priority"},
                    {"id": "P1", "dims": [2, 2, 2], "weight": 1, "priority": "priority"}
                ]
            }"#,
        );
        assert_eq!(
            request.into_validated().unwrap_err(),
            PackRequestValidationError::DuplicateId("P1".to_string())
        );
    }

    #[test]
    fn economy_package_without_deferral_cost_is_rejected() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [{"id": "E1", "dims": [1, 1, 1], "weight": 1, "priority": "economy"}]
            }"#,
        );
        assert_eq!(
            request.into_validated().unwrap_err(),
            PackRequestValidationError::MissingDeferralCost("E1".to_string())
        );
    }

    #[test]
    fn priority_package_ignores_deferral_cost() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [{"id": "P1", "dims": [1, 1, 1], "weight": 1, "priority": "priority", "deferral_cost": 55}]
            }"#,
        );
        let validated = request.into_validated().expect("Should validate");
        assert_eq!(validated.packages[0].deferral_cost, 0);
    }

    #[test]
    fn priority_uld_cost_above_maximum_is_rejected() {
        let request = request_json(&format!(
            r#"{{
                "ulds": [{{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}}],
                "packages": [],
                "priority_uld_cost": {}
            }}"#,
            u64::MAX
        ));
        assert_eq!(
            request.into_validated().unwrap_err(),
            PackRequestValidationError::PriorityUldCostOutOfRange(u64::MAX)
        );
    }

    #[tokio::test]
    async fn pack_handler_rejects_missing_deferral_cost() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "U1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [{"id": "E1", "dims": [1, 1, 1], "weight": 1, "priority": "economy"}]
            }"#,
        );

        let response = handle_pack(State(test_state()), Ok(Json(request))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn pack_stream_emits_events_in_order() {
        let request = request_json(
            r#"{
                "ulds": [
                    {"id": "U1", "dims": [10, 10, 10], "weight_limit": 100},
                    {"id": "U2", "dims": [10, 10, 10], "weight_limit": 100}
                ],
                "packages": [
                    {"id": "P1", "dims": [10, 10, 6], "weight": 10, "priority": "priority"},
                    {"id": "E1", "dims": [10, 10, 6], "weight": 10, "priority": "economy", "deferral_cost": 5},
                    {"id": "E2", "dims": [10, 10, 6], "weight": 10, "priority": "economy", "deferral_cost": 7}
                ]
            }"#,
        );

        let response = handle_pack_stream(State(test_state()), Ok(Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = String::from_utf8(body.to_vec()).expect("Should be UTF-8");
        let events: Vec<serde_json::Value> = body
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .filter(|data| *data != "keep-alive")
            .map(|data| serde_json::from_str(data).expect("Each event should be JSON"))
            .collect();

        let last = events.last().expect("Stream should not be empty");
        assert_eq!(last["type"], "Finished");
        assert_eq!(last["total_claimed"], 2);
        assert_eq!(
            events.iter().filter(|e| e["type"] == "Finished").count(),
            1
        );

        for uld_id in ["U1", "U2"] {
            let kinds: Vec<&str> = events
                .iter()
                .filter(|e| e["uld_id"] == uld_id)
                .map(|e| e["type"].as_str().expect("Event should carry a type"))
                .collect();
            assert_eq!(kinds.first(), Some(&"UldStarted"), "{uld_id}: {kinds:?}");
            assert_eq!(kinds.last(), Some(&"UldFinished"), "{uld_id}: {kinds:?}");
            assert!(
                kinds[1..kinds.len() - 1]
                    .iter()
                    .all(|kind| *kind == "PackagePlaced"),
                "{uld_id}: {kinds:?}"
            );
        }
    }

    #[tokio::test]
    async fn failed_stream_task_ends_with_error_event() {
        let events: Vec<String> = spawn_event_stream(|emit| {
            emit(&PackEvent::UldStarted {
                uld_id: "U1".to_string(),
                dims: (1, 1, 1),
                weight_limit: 1,
            });
            panic!("packing aborted");
        })
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        let first: serde_json::Value = serde_json::from_str(&events[0]).unwrap();
        let last: serde_json::Value = serde_json::from_str(&events[1]).unwrap();
        assert_eq!(first["type"], "UldStarted");
        assert_eq!(last["type"], "Error");
    }

    #[tokio::test]
    async fn pack_handler_returns_run_result() {
        let request = request_json(
            r#"{
                "ulds": [{"id": "C1", "dims": [10, 10, 10], "weight_limit": 100}],
                "packages": [
                    {"id": "P1", "dims": [5, 5, 5], "weight": 10, "priority": "priority"},
                    {"id": "P2", "dims": [20, 5, 5], "weight": 10, "priority": "priority"}
                ],
                "priority_uld_cost": 40
            }"#,
        );

        let response = handle_pack(State(test_state()), Ok(Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("Should be JSON");
        assert_eq!(json["result"]["total_cost"], 40);
        assert_eq!(json["result"]["total_claimed"], 1);
        assert_eq!(json["result"]["priority_uld_count"], 1);
        assert_eq!(json["result"]["placements"][0]["package_id"], "P1");
        assert_eq!(json["is_complete"], false);
    }

    #[tokio::test]
    async fn pack_handler_rejects_invalid_payload() {
        let request = request_json(r#"{"ulds": [], "packages": []}"#);

        let response = handle_pack(State(test_state()), Ok(Json(request))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
