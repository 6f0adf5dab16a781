use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{CorsOrigins, ServiceConfig};
use crate::error::MixError;
use crate::inference::artifact::ARTIFACT_VERSION;
use crate::inference::InferenceService;
use crate::mix::{parse_timestamp, CompactCodeEncoder, CompactPayload, MixRecord, MixRecordBuilder, ReportRenderer};

/// Request failure rendered as `{"error": ...}` with a status chosen by kind.
#[derive(Debug)]
pub enum ServerError {
    BadRequest(String),
    Mix(MixError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Mix(MixError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Mix(MixError::Encoding(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Mix(MixError::Inference(_)) | ServerError::Mix(MixError::ArtifactLoad(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ServerError::BadRequest(msg) => msg,
            ServerError::Mix(err) => err.to_string(),
        };
        if status.is_server_error() {
            warn!("Request failed ({}): {}", status, message);
        } else {
            info!("Request rejected ({}): {}", status, message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<MixError>,
{
    fn from(err: E) -> Self {
        Self::Mix(err.into())
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub renderer: ReportRenderer,
    pub encoder: CompactCodeEncoder,
}

impl AppState {
    pub fn new(service: InferenceService) -> Self {
        Self {
            service: Arc::new(service),
            renderer: ReportRenderer::new(),
            encoder: CompactCodeEncoder::new(),
        }
    }
}

/// Measurements plus the metadata needed to document a mix.
#[derive(Debug, Deserialize)]
pub struct MixRequest {
    pub name: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// RFC 3339; defaults to the time the request is handled.
    #[serde(default)]
    pub timestamp: Option<String>,
    pub inputs: Value,
}

impl MixRequest {
    /// Predict from `inputs` and attach the metadata. A missing timestamp means now.
    pub fn into_record(self, service: &InferenceService) -> Result<MixRecord, MixError> {
        let generated_at = match self.timestamp.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => Utc::now(),
        };
        let prediction = service.predict(&self.inputs)?;
        let record = MixRecordBuilder::new(self.name)
            .project(self.project)
            .location(self.location)
            .notes(self.notes)
            .generated_at(generated_at)
            .build(&prediction)?;
        Ok(record)
    }
}

pub fn router(state: AppState, cors_origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/v1/mix/report", post(mix_report))
        .route("/v1/mix/code", post(mix_code))
        .route("/v1/mix/payload", post(mix_payload))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        })),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn run_server(config: ServiceConfig, service: InferenceService) -> anyhow::Result<()> {
    info!("Model ready ({}), starting HTTP surface", service.model_kind());
    let app = router(AppState::new(service), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Concrete strength service listening at http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.service.model_kind(),
        "artifact_version": ARTIFACT_VERSION,
    }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
    let raw = body(payload)?;
    let result = state.service.predict(&raw)?;
    Ok(Json(json!({ "predicted_strength": result.strength_mpa })))
}

async fn mix_report(
    State(state): State<AppState>,
    payload: Result<Json<MixRequest>, JsonRejection>,
) -> Result<Html<String>, ServerError> {
    let record = body(payload)?.into_record(&state.service)?;
    // The report stands on its own; a failed code only drops the image.
    let html = match state.encoder.encode(&record) {
        Ok(code) => state.renderer.render_with_code(&record, &code),
        Err(e) => {
            warn!("Rendering report for {} without code: {}", record.name, e);
            state.renderer.render(&record)
        }
    };
    Ok(Html(html))
}

async fn mix_code(
    State(state): State<AppState>,
    payload: Result<Json<MixRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let record = body(payload)?.into_record(&state.service)?;
    let png = state.encoder.encode(&record)?.to_png()?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn mix_payload(
    State(state): State<AppState>,
    payload: Result<Json<MixRequest>, JsonRejection>,
) -> Result<Json<CompactPayload>, ServerError> {
    let record = body(payload)?.into_record(&state.service)?;
    Ok(Json(CompactPayload::from_record(&record)))
}
