//! Gateway-generated responses.
//!
//! Worker responses pass through untouched apart from hop-by-hop headers.
//! The only response the gateway writes itself is the forwarding failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// 500 returned when a worker cannot be reached or does not answer in time.
pub fn forward_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "message": "Internal Server Error",
            "error": "Failed to forward request",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn forward_failure_body() {
        let response = forward_failure();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            json!({"message": "Internal Server Error", "error": "Failed to forward request"})
        );
    }
}
