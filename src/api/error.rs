use crate::error::{group_by_field, FoodgramError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// HTTP face of `FoodgramError`
#[derive(Debug)]
pub struct ApiError(pub FoodgramError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<FoodgramError> for ApiError {
    fn from(err: FoodgramError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(FoodgramError::invalid("non_field_errors", rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FoodgramError::Validation(_) => StatusCode::BAD_REQUEST,
            FoodgramError::NotFound { .. } => StatusCode::NOT_FOUND,
            FoodgramError::Unauthorized => StatusCode::UNAUTHORIZED,
            FoodgramError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            FoodgramError::Validation(fields) => json!(group_by_field(fields)),
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %err, "request failed");
                json!({ "detail": "Internal server error" })
            }
            err => json!({ "detail": err.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(FoodgramError::not_found("Recipe")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(FoodgramError::Unauthorized).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError(FoodgramError::Forbidden).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError(FoodgramError::Validation(vec![FieldError::new("tags", "x")])).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(FoodgramError::Internal { message: "boom".into() }).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
