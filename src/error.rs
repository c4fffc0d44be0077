use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed, missing, or out-of-range input.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate business key on create. Surfaced with the same status as
    /// validation failures.
    #[error("{0}")]
    Conflict(String),

    /// Purchase quantity exceeds on-hand stock.
    #[error("{0}")]
    InsufficientStock(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::InsufficientStock(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Db(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            AppError::Io(e) => {
                error!(error = %e, "io error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            status_of(AppError::BadRequest("price must be >= 0".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::NotFound("Sweet 1001 not found".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn conflict_maps_to_400() {
        // duplicate sweetId is reported with the validation status, not 409
        assert_eq!(
            status_of(AppError::Conflict("sweet 1001 already exists".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn insufficient_stock_maps_to_400() {
        assert_eq!(
            status_of(AppError::InsufficientStock("requested 25, on hand 20".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn db_error_maps_to_500_with_generic_message() {
        let resp = AppError::Db(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
