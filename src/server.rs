//! HTTP surface: `POST /convert`.
//!
//! The handler takes the raw body rather than axum's `Json` extractor so
//! every malformed request gets the same `{"error": …}` shape and status
//! that the library's own validation produces.

use crate::config::{RenderConfig, ServiceConfig};
use crate::convert;
use crate::error::ConvertError;
use crate::output::ConversionResponse;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub render: Arc<RenderConfig>,
}

impl AppState {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            render: Arc::new(render),
        }
    }
}

/// Build the application router.
pub fn router(config: &ServiceConfig) -> Router {
    Router::new()
        .route("/convert", post(convert_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config.render.clone()))
}

/// `POST /convert`.
pub async fn convert_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ConversionResponse>, ApiError> {
    let response = convert::convert_body(&body, &state.render).await?;
    Ok(Json(response))
}

/// A [`ConvertError`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ConvertError);

impl From<ConvertError> for ApiError {
    fn from(e: ConvertError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            ConvertError::Validation(_) | ConvertError::Decode(_) => StatusCode::BAD_REQUEST,
            ConvertError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_client_error() {
            tracing::debug!("Client error: {}", self.0);
        } else {
            tracing::error!("Error while processing request: {}", self.0);
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError(ConvertError::Validation("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(ConvertError::Decode("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(ConvertError::Internal("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_error_body_is_json() {
        let response = ApiError(ConvertError::Internal("task panicked".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(v["error"].as_str().unwrap().contains("task panicked"));
    }
}
