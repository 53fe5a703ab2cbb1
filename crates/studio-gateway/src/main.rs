//! Content Studio Gateway: local JSON API for the browser front end.
//! Carousel, video and single-post batches, image edits, ZIP and PDF export.

use axum::{
    body::Body,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use studio_core::{
    archive_naming, export_pdf, export_zip,
    prompts::{PLATFORMS, STYLE_PRESETS, TEXT_STYLES},
    Artifact, BatchTicket, CarouselRequest, ContentStudio, CredentialHolder, Lane, PromptEntry,
    ReferenceImage, SceneDirectives, SinglePostRequest, StudioConfig, StudioError, StudioResult,
    Ticketed, VideoBatchRequest, BULK_SEPARATOR, CAROUSEL_PDF_NAME,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Uploads arrive base64-encoded inside JSON.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    studio: ContentStudio,
}

/// Base64 image as sent by the browser; `data` may be a full data URL.
#[derive(Deserialize)]
struct ImagePayload {
    data: String,
    #[serde(default = "default_mime")]
    mime_type: String,
}

fn default_mime() -> String {
    "image/png".to_string()
}

impl ImagePayload {
    fn decode(self) -> StudioResult<ReferenceImage> {
        ReferenceImage::from_base64(&self.data, self.mime_type)
    }
}

fn decode_reference(payload: Option<ImagePayload>) -> StudioResult<Option<ReferenceImage>> {
    payload.map(ImagePayload::decode).transpose()
}

#[derive(Deserialize)]
struct CredentialBody {
    api_key: String,
}

#[derive(Deserialize)]
struct CarouselBody {
    reference: Option<ImagePayload>,
    prompts: PromptEntry,
    #[serde(default)]
    directives: SceneDirectives,
}

#[derive(Deserialize)]
struct VideosBody {
    reference: Option<ImagePayload>,
    prompts: PromptEntry,
    #[serde(default)]
    directives: SceneDirectives,
    #[serde(default)]
    with_speech: bool,
}

#[derive(Deserialize)]
struct PostBody {
    reference: Option<ImagePayload>,
    draft: String,
    #[serde(default = "default_platform")]
    platform: String,
    #[serde(default = "default_text_style")]
    text_style: String,
}

fn default_platform() -> String {
    PLATFORMS[0].to_string()
}

fn default_text_style() -> String {
    TEXT_STYLES[0].to_string()
}

#[derive(Deserialize)]
struct EditBody {
    image: Artifact,
    instruction: String,
}

#[derive(Deserialize)]
struct ExportBody {
    #[serde(default = "default_lane")]
    lane: Lane,
    artifacts: Vec<Option<Artifact>>,
}

#[derive(Deserialize)]
struct PdfExportBody {
    artifacts: Vec<Option<Artifact>>,
}

fn default_lane() -> Lane {
    Lane::Carousel
}

#[derive(Serialize)]
struct StyleOption {
    label: &'static str,
    directive: &'static str,
}

#[derive(Serialize)]
struct OptionsResponse {
    styles: Vec<StyleOption>,
    platforms: &'static [&'static str],
    text_styles: &'static [&'static str],
    max_slots: usize,
    bulk_separator: &'static str,
}

#[derive(Serialize)]
struct CredentialStatus {
    present: bool,
}

/// JSON error body with the status mapped from the studio taxonomy.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn stale(ticket: &BatchTicket) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: format!("Batch {} was superseded by a newer request", ticket.batch_id),
        }
    }
}

fn status_for(err: &StudioError) -> StatusCode {
    match err {
        StudioError::Precondition(_) | StudioError::Decode(_) | StudioError::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        StudioError::MissingCredential | StudioError::InvalidCredential(_) => {
            StatusCode::UNAUTHORIZED
        }
        StudioError::BatchFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StudioError::Superseded { .. } => StatusCode::CONFLICT,
        StudioError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        StudioError::Export(_) | StudioError::Io(_) | StudioError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::warn!(error = %err, status = status.as_u16(), "Request rejected");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Only results for the latest batch on a lane reach the client.
fn current<T>(studio: &ContentStudio, result: Ticketed<T>) -> ApiResult<Json<Ticketed<T>>> {
    let ticket = result.ticket;
    studio
        .supervisor()
        .accept(&ticket, result)
        .map(Json)
        .ok_or_else(|| ApiError::stale(&ticket))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StudioConfig::load()?;
    let credentials = CredentialHolder::with_initial(StudioConfig::api_key_from_env());
    if credentials.is_present().await {
        tracing::info!("🔑 API key loaded from environment");
    }
    let bind_addr: SocketAddr = config.bind_addr.parse()?;
    let studio = ContentStudio::with_gemini(config, credentials)?;

    let app = router(AppState { studio });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("🎨 Content Studio gateway listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/options", get(options_handler))
        .route(
            "/api/v1/credentials",
            put(set_credential_handler)
                .delete(clear_credential_handler)
                .get(credential_status_handler),
        )
        .route("/api/v1/carousel", post(carousel_handler))
        .route("/api/v1/videos", post(videos_handler))
        .route("/api/v1/post", post(post_handler))
        .route("/api/v1/edit", post(edit_handler))
        .route("/api/v1/export/zip", post(export_zip_handler))
        .route("/api/v1/export/pdf", post(export_pdf_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(log_request))
}

async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    tracing::info!(%addr, method = %request.method(), path = %request.uri().path(), "request");
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

/// Presets the front end offers in its dropdowns.
async fn options_handler(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        styles: STYLE_PRESETS
            .iter()
            .map(|&(label, directive)| StyleOption { label, directive })
            .collect(),
        platforms: PLATFORMS,
        text_styles: TEXT_STYLES,
        max_slots: state.studio.config().max_slots,
        bulk_separator: BULK_SEPARATOR,
    })
}

async fn credential_status_handler(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(CredentialStatus {
        present: state.studio.credentials().is_present().await,
    })
}

async fn set_credential_handler(
    State(state): State<AppState>,
    Json(body): Json<CredentialBody>,
) -> ApiResult<StatusCode> {
    state.studio.credentials().set(body.api_key).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_credential_handler(State(state): State<AppState>) -> StatusCode {
    state.studio.credentials().clear().await;
    tracing::info!("API key cleared");
    StatusCode::NO_CONTENT
}

async fn carousel_handler(
    State(state): State<AppState>,
    Json(body): Json<CarouselBody>,
) -> ApiResult<impl IntoResponse> {
    let request = CarouselRequest {
        reference: decode_reference(body.reference)?,
        prompts: body.prompts,
        directives: body.directives,
    };
    let result = state.studio.generate_carousel(request).await?;
    current(&state.studio, result)
}

async fn videos_handler(
    State(state): State<AppState>,
    Json(body): Json<VideosBody>,
) -> ApiResult<impl IntoResponse> {
    let request = VideoBatchRequest {
        reference: decode_reference(body.reference)?,
        prompts: body.prompts,
        directives: body.directives,
        with_speech: body.with_speech,
    };
    let result = state.studio.generate_videos(request).await?;
    current(&state.studio, result)
}

async fn post_handler(
    State(state): State<AppState>,
    Json(body): Json<PostBody>,
) -> ApiResult<impl IntoResponse> {
    let request = SinglePostRequest {
        reference: decode_reference(body.reference)?,
        draft: body.draft,
        platform: body.platform,
        text_style: body.text_style,
    };
    let result = state.studio.generate_single_post(request).await?;
    current(&state.studio, result)
}

async fn edit_handler(
    State(state): State<AppState>,
    Json(body): Json<EditBody>,
) -> ApiResult<Json<Artifact>> {
    let edited = state.studio.edit_image(&body.image, &body.instruction).await?;
    Ok(Json(edited))
}

async fn export_zip_handler(Json(body): Json<ExportBody>) -> ApiResult<impl IntoResponse> {
    let (prefix, file_name) = archive_naming(body.lane);
    let bytes = export_zip(&body.artifacts, prefix)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

async fn export_pdf_handler(Json(body): Json<PdfExportBody>) -> ApiResult<impl IntoResponse> {
    let bytes = export_pdf(&body.artifacts)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CAROUSEL_PDF_NAME),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            status_for(&StudioError::Precondition("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&StudioError::MissingCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&StudioError::InvalidCredential("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&StudioError::BatchFailed { attempted: 3 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&StudioError::QuotaExceeded("x".into())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(&StudioError::Collaborator("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&StudioError::NoArtifact), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&StudioError::Superseded {
                batch_id: uuid::Uuid::nil()
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn stale_result_is_conflict() {
        let studio = ContentStudio::with_gemini(StudioConfig::default(), CredentialHolder::new())
            .unwrap();
        let old = studio.supervisor().begin(Lane::Carousel);
        let _newer = studio.supervisor().begin(Lane::Carousel);

        let err = current(&studio, Ticketed { ticket: old, value: () }).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn post_body_defaults() {
        let body: PostBody = serde_json::from_str(r#"{"draft":"hello"}"#).unwrap();
        assert_eq!(body.platform, "Instagram");
        assert_eq!(body.text_style, "Default");
        assert!(body.reference.is_none());
    }
}
