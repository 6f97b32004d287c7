use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::services::WebhookService;
use crate::signature::SIGNATURE_HEADER;

const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Clone)]
pub struct AppState {
    pub webhook_service: WebhookService,
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = signature_header(&headers)?;

    if body.len() > MAX_BODY_BYTES {
        return Err(AppError::PayloadTooLarge);
    }
    let body = std::str::from_utf8(&body).map_err(|_| AppError::InvalidBody)?;
    info!("Request body: {}", body);

    state.webhook_service.handle(body, signature).await?;

    Ok("OK")
}

/// A present header that is not visible ASCII cannot match any signature.
fn signature_header(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(SIGNATURE_HEADER)
        .ok_or(AppError::MissingSignature)?
        .to_str()
        .map_err(|_| AppError::InvalidSignature)
}

async fn health() -> &'static str {
    "OK"
}
