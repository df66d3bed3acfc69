use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::labels::LabelDecoder;
use crate::catalog::store::ReferenceDatabase;
use crate::cli::ServeArgs;
use crate::core::prediction::Prediction;
use crate::core::types::ClassIndex;
use crate::matching::engine::{MatchError, MatchingConfig, MatchingEngine};
use crate::matching::report::identify;
use crate::parsing::ocr::{join_detections, parse_detections, DEFAULT_SEPARATOR};
use crate::utils::validation::{
    parse_class_index, validate_imprint, validate_upload, ValidationError,
};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 1024 * 1024; // 1MB
pub const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024; // 64KB

/// Upper bound for the `result_limit` form field
pub const MAX_RESULT_LIMIT: usize = 50;

const WELCOME_MESSAGE: &str = "Welcome to the drug identification service!";

/// Shared application state
///
/// Loaded once at startup and shared read-only by every request.
pub struct AppState {
    pub database: ReferenceDatabase,
    pub decoder: LabelDecoder,
    pub config: MatchingConfig,
}

impl AppState {
    #[must_use]
    pub fn new(database: ReferenceDatabase, decoder: LabelDecoder) -> Self {
        Self {
            database,
            decoder,
            config: MatchingConfig::default(),
        }
    }
}

/// Prediction and options extracted from a multipart form
#[derive(Debug)]
struct IdentifyRequest {
    prediction: Prediction,
    result_limit: usize,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn bad_request(error_type: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(create_safe_error_response(error_type, message, None)),
    )
        .into_response()
}

fn too_large(error_type: &str, message: &str) -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        Json(create_safe_error_response(error_type, message, None)),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the database cannot be loaded, the tokio runtime
/// cannot be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let (database, decoder) = args.source.load()?;
    if database.is_empty() {
        tracing::warn!("Reference database is empty; every identification will fail");
    }
    let state = Arc::new(AppState::new(database, decoder));

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Create the application router with all routes and middleware configured.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?;

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/api/identify", post(identify_handler))
        .route("/api/database", get(database_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                // IP-based rate limiting to prevent abuse
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100))
                // Largest upload plus multipart overhead
                .layer(DefaultBodyLimit::max(MAX_FILE_FIELD_SIZE + 64 * 1024)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    let records = state.database.len();
    let app = create_router(state)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting pill-matcher web server at http://{addr}");
    tracing::info!(%addr, records, "Serving drug identification");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Liveness endpoint
async fn index_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": WELCOME_MESSAGE }))
}

/// API endpoint for identifying a pill
async fn identify_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let start_time = std::time::Instant::now();

    let request = match extract_request_data(&mut multipart).await {
        Ok(request) => request,
        Err(error_response) => return error_response,
    };

    let task_state = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        let engine = MatchingEngine::with_config(
            &task_state.database,
            &task_state.decoder,
            task_state.config.clone(),
        );
        identify(&engine, &request.prediction, request.result_limit)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => {
            tracing::info!(
                drug = %report.identified_drug_name,
                index = report.best.index,
                total = report.best.score.total,
                elapsed_ms = start_time.elapsed().as_millis(),
                "Identified pill"
            );
            Json(report).into_response()
        }
        Ok(Err(err)) => {
            let (error_type, message) = match &err {
                MatchError::EmptyDatabase => ("empty_database", "Reference database is empty"),
                MatchError::UnknownLabel { .. } => {
                    ("unknown_label", "Matched record has no known drug name")
                }
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(create_safe_error_response(
                    error_type,
                    message,
                    Some(&err.to_string()),
                )),
            )
                .into_response()
        }
        Err(join_error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(create_safe_error_response(
                "internal_error",
                "Identification failed",
                Some(&join_error.to_string()),
            )),
        )
            .into_response(),
    }
}

/// Read the identification form.
///
/// Fields: `color` and `shape` (required class indices), `imprint` (text) or
/// `ocr` (JSON detections file), `separator` for joining detections, and
/// `result_limit` (1..=50, default 1).
#[allow(clippy::too_many_lines)]
async fn extract_request_data(multipart: &mut Multipart) -> Result<IdentifyRequest, Response> {
    let mut color: Option<ClassIndex> = None;
    let mut shape: Option<ClassIndex> = None;
    let mut imprint: Option<String> = None;
    let mut ocr_content: Option<String> = None;
    let mut separator = DEFAULT_SEPARATOR.to_string();
    let mut result_limit = 1usize;

    let mut fields_received = 0usize;

    loop {
        // Check field count limit before processing
        if fields_received >= MAX_MULTIPART_FIELDS {
            return Err(bad_request("field_limit_exceeded", "Too many form fields"));
        }

        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return Err(bad_request(
                    "invalid_multipart",
                    "Failed to parse form data",
                ))
            }
        };
        fields_received += 1;
        let name = field.name().unwrap_or_default().to_string();

        if name == "ocr" {
            let filename = field.file_name().map(std::string::ToString::to_string);
            let Ok(bytes) = field.bytes().await else {
                return Err(bad_request("invalid_multipart", "Failed to read upload"));
            };
            if bytes.len() > MAX_FILE_FIELD_SIZE {
                return Err(too_large("file_too_large", "File size exceeds limit"));
            }

            match validate_upload(filename.as_deref(), &bytes) {
                Ok(_) => ocr_content = Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(ValidationError::FilenameTooLong) => {
                    return Err(bad_request(
                        "filename_too_long",
                        "Filename exceeds maximum length limit",
                    ))
                }
                Err(ValidationError::InvalidFilename | ValidationError::EmptyFilename) => {
                    return Err(bad_request(
                        "invalid_filename",
                        "Filename contains invalid or dangerous characters",
                    ))
                }
                Err(_) => {
                    return Err(bad_request(
                        "invalid_content",
                        "File content appears malformed or corrupted",
                    ))
                }
            }
            continue;
        }

        let Ok(text) = field.text().await else {
            return Err(bad_request("invalid_multipart", "Failed to read form field"));
        };
        if text.len() > MAX_TEXT_FIELD_SIZE {
            return Err(too_large("text_too_large", "Text field size exceeds limit"));
        }

        match name.as_str() {
            "color" => match parse_class_index(&text) {
                Ok(class) => color = Some(class),
                Err(_) => return Err(bad_request("invalid_color", "Color must be a class index")),
            },
            "shape" => match parse_class_index(&text) {
                Ok(class) => shape = Some(class),
                Err(_) => return Err(bad_request("invalid_shape", "Shape must be a class index")),
            },
            "imprint" => imprint = Some(text),
            "separator" => separator = text,
            "result_limit" => match text.trim().parse::<usize>() {
                Ok(limit) => result_limit = limit.clamp(1, MAX_RESULT_LIMIT),
                Err(_) => {
                    return Err(bad_request(
                        "invalid_result_limit",
                        "result_limit must be a positive integer",
                    ))
                }
            },
            _ => {} // Ignore unknown fields
        }
    }

    let (Some(color_class), Some(shape_class)) = (color, shape) else {
        return Err(bad_request(
            "missing_input",
            "Both color and shape class indices are required",
        ));
    };

    let imprint_text = match (imprint, ocr_content) {
        (Some(_), Some(_)) => {
            return Err(bad_request(
                "conflicting_input",
                "Provide either imprint text or OCR detections, not both",
            ))
        }
        (Some(text), None) => text,
        (None, Some(content)) => match parse_detections(&content) {
            Ok(detections) => join_detections(&detections, &separator),
            Err(_) => {
                return Err(bad_request(
                    "invalid_ocr",
                    "OCR detections must be a JSON array of {bbox, text} objects",
                ))
            }
        },
        (None, None) => String::new(),
    };

    if validate_imprint(&imprint_text).is_err() {
        return Err(bad_request("imprint_too_long", "Imprint text is too long"));
    }

    Ok(IdentifyRequest {
        prediction: Prediction {
            color_class,
            shape_class,
            imprint_text,
        },
        result_limit,
    })
}

/// Database overview endpoint
async fn database_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let summary = state.database.summary();

    Json(serde_json::json!({
        "count": summary.record_count,
        "labels": state.decoder.len(),
        "summary": summary,
    }))
}
