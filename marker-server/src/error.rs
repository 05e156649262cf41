//! Maps `marker_core::MarkerError` onto HTTP, the thin contract-shaped
//! translation `spec.md` §9 calls for — "the core returns data only".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marker_core::MarkerError;
use serde::Serialize;

pub struct ApiError(pub MarkerError);

impl From<MarkerError> for ApiError {
    fn from(err: MarkerError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            MarkerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            MarkerError::BadTarget(_) => (StatusCode::BAD_REQUEST, "bad_target"),
            MarkerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            MarkerError::Overlap(_) => (StatusCode::CONFLICT, "overlap"),
            MarkerError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            MarkerError::Overflow(_) => (StatusCode::UNPROCESSABLE_ENTITY, "overflow"),
            MarkerError::FeatureDisabled(_) => (StatusCode::FORBIDDEN, "feature_disabled"),
            MarkerError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            MarkerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = ErrorBody { error: kind, message: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}
