//! REST API for the packing service.
//!
//! Exposes the pack pipeline over HTTP. Uses Axum as the web framework and
//! supports CORS. Every response uses the `{success, data}` / `{success, error}`
//! envelope.

use std::io;
use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::config::ApiConfig;
use crate::error::PackError;
use crate::model::{
    ContainerSpec, ItemSpec, PackRequest, PackResult, PackingOptions, Placement, Stats,
    UnfittedGroup,
};
use crate::optimizer::{HeuristicSolver, SolverConfig};
use crate::pipeline::pack_request;
use crate::units::LengthUnit;

#[derive(Clone)]
struct ApiState {
    solver_config: SolverConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>pack-normalizer API Docs</title>
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
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Successful pack response.
#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    pub success: bool,
    pub data: PackResult,
}

#[derive(Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub data: HealthStatus,
}

/// Error payload.
///
/// # Fields
/// * `code` - `INVALID_JSON`, `INVALID_REQUEST` or `PACKING_FAILED`
/// * `message` - Human readable summary
/// * `details` - `{field, reason}` for validation errors, `{error}` for packing failures
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[schema(value_type = Object)]
    pub details: Value,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

fn error_response(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
    details: Value,
) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };
    (status, Json(body)).into_response()
}

fn invalid_json_error(detail: String) -> Response {
    warn!(error = %detail, "Rejected body that is not JSON");
    error_response(
        StatusCode::BAD_REQUEST,
        "INVALID_JSON",
        "Request body must be JSON",
        json!({ "error": detail }),
    )
}

fn json_rejection_error(err: JsonRejection) -> Response {
    invalid_json_error(err.body_text())
}

fn pack_error_response(err: &PackError) -> Response {
    match err {
        PackError::InvalidRequest { field, reason } => error_response(
            StatusCode::BAD_REQUEST,
            err.code(),
            err.to_string(),
            json!({ "field": field, "reason": reason }),
        ),
        _ => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.code(),
            "Packing failed",
            json!({ "error": err.to_string() }),
        ),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_pack, handle_health),
    components(
        schemas(
            PackRequest,
            ContainerSpec,
            ItemSpec,
            PackingOptions,
            LengthUnit,
            PackResponse,
            PackResult,
            Placement,
            UnfittedGroup,
            Stats,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ErrorBody
        )
    ),
    tags((name = "packing", description = "Container packing with unit normalization"))
)]
struct ApiDoc;

/// Builds the application router with all routes and the CORS layer.
pub fn router(solver_config: SolverConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState { solver_config };

    Router::new()
        .route("/pack", post(handle_pack))
        .route("/health", get(handle_health))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until the server terminates.
///
/// # Errors
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn start_api_server(config: ApiConfig, solver_config: SolverConfig) -> io::Result<()> {
    let app = router(solver_config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        host = config.display_host(),
        port = config.port(),
        "Server running on http://{}:{}",
        config.display_host(),
        config.port()
    );
    if config.binds_to_all_interfaces() {
        info!("Local access: http://localhost:{}", config.port());
    }
    info!("Endpoints: POST /pack, GET /health, GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /pack.
///
/// Validates the body, packs it into the single container with a fresh solver
/// and reports placements in the caller's units.
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Packing finished (possibly with unfitted items)", body = PackResponse),
        (status = BAD_REQUEST, description = "Body is not JSON or fails validation", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Solver or internal failure", body = ErrorResponse)
    ),
    tag = "packing"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let Json(raw) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_rejection_error(err),
    };
    // a literal `null` carries no document
    if raw.is_null() {
        return invalid_json_error("body is null".to_string());
    }

    info!("New pack request");
    let solver_config = state.solver_config;
    let outcome = tokio::task::spawn_blocking(move || {
        let mut solver = HeuristicSolver::new(solver_config);
        pack_request(&raw, &mut solver)
    })
    .await;

    match outcome {
        Ok(Ok(mut result)) => {
            result.stats.total_time_ms = Some(started.elapsed().as_millis() as u64);
            let response = PackResponse {
                success: true,
                data: result,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(Err(err)) => {
            if !err.is_client_error() {
                error!(code = err.code(), error = %err, "Pack request failed");
            }
            pack_error_response(&err)
        }
        Err(join_err) => {
            error!(error = %join_err, "Packing task aborted");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PACKING_FAILED",
                "Packing failed",
                json!({ "error": join_err.to_string() }),
            )
        }
    }
}

/// Handler for GET /health.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "packing"
)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        data: HealthStatus {
            status: "ok".to_string(),
        },
    })
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::{Request, header};

    fn state() -> State<ApiState> {
        State(ApiState {
            solver_config: SolverConfig::default(),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    }

    fn cube_body() -> Value {
        json!({
            "units": "cm",
            "container": { "length": 100, "width": 100, "height": 100, "max_weight": 1000 },
            "items": [{
                "item_id": "A", "label": "Cube", "length": 50, "width": 50,
                "height": 50, "weight": 10, "quantity": 2
            }]
        })
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
            paths.contains_key("/health"),
            "OpenAPI documentation is missing the /health path"
        );
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc().clone();
        let components = doc
            .components
            .expect("OpenAPI documentation contains no components");
        let schemas = &components.schemas;
        for name in ["PackRequest", "PackResponse", "Placement", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "schema {name} is missing");
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(response) = handle_health().await;
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "status": "ok" } }));
    }

    #[tokio::test]
    async fn pack_returns_envelope_with_timing() {
        let response = handle_pack(state(), Ok(Json(cube_body()))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["units"], json!("cm"));
        assert_eq!(body["data"]["stats"]["expanded_items"], json!(2));
        assert_eq!(body["data"]["stats"]["fitted_count"], json!(2));
        assert!(body["data"]["stats"]["total_time_ms"].is_u64());
        assert_eq!(body["data"]["placements"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn invalid_request_maps_to_bad_request() {
        let mut body = cube_body();
        body["units"] = json!("ft");
        let response = handle_pack(state(), Ok(Json(body))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INVALID_REQUEST"));
        assert_eq!(body["error"]["details"]["field"], json!("units"));
    }

    #[tokio::test]
    async fn non_object_body_is_invalid_request() {
        let response = handle_pack(state(), Ok(Json(json!([1, 2, 3])))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], json!("INVALID_REQUEST"));
    }

    async fn extract_json(raw: &'static str) -> Result<Json<Value>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/pack")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .expect("Failed to build request");
        Json::<Value>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn malformed_body_maps_to_invalid_json() {
        let payload = extract_json("{\"units\": \"cm\",").await;
        assert!(payload.is_err());

        let response = handle_pack(state(), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INVALID_JSON"));
        assert_eq!(body["error"]["message"], json!("Request body must be JSON"));
    }

    #[tokio::test]
    async fn null_body_maps_to_invalid_json() {
        let payload = extract_json("null").await;
        let response = handle_pack(state(), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INVALID_JSON"));
    }

    #[test]
    fn internal_errors_map_to_packing_failed() {
        let err = PackError::Invariant("lost units".to_string());
        let response = pack_error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
