//! Rendering of domain errors as HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use postboard_shared::AppError;

/// Render an error as `{ "error": code, "message": text }`.
///
/// Server-side failures are logged and their details withheld from the client.
pub fn error_response(err: impl Into<AppError>) -> Response {
    let err = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if err.is_server_error() {
        error!(error = %err, "Request failed");
        "An error occurred".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message
        })),
    )
        .into_response()
}

/// Shorthand for a 422 with a message.
pub fn validation_response(message: impl Into<String>) -> Response {
    error_response(AppError::Validation(message.into()))
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use rstest::rstest;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = error_response(AppError::NotFound("Post not found".to_string()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Not found: Post not found");
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let response = error_response(AppError::Database("password=hunter2".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "database_error");
        assert_eq!(body["message"], "An error occurred");
    }

    #[rstest]
    #[case(AppError::Validation(String::new()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(AppError::Conflict(String::new()), StatusCode::CONFLICT)]
    #[case(AppError::Forbidden(String::new()), StatusCode::FORBIDDEN)]
    #[case(AppError::ExternalService(String::new()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] err: AppError, #[case] expected: StatusCode) {
        assert_eq!(error_response(err).status(), expected);
    }
}
