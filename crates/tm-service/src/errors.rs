//! Trades Management error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl. Database
//! and availability failures return a generic client message; the actual
//! cause is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Handler error type.
///
/// - BadRequest: 400
/// - Unauthorized: 401 (with `WWW-Authenticate`)
/// - NotFound: 404
/// - ServiceUnavailable: 503
/// - Database: 500
#[derive(Debug, Error)]
pub enum TmError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl TmError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            TmError::BadRequest(_) => 400,
            TmError::Unauthorized(_) => 401,
            TmError::NotFound(_) => 404,
            TmError::ServiceUnavailable(_) => 503,
            TmError::Database(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for TmError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            TmError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason),
            TmError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", reason),
            TmError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource),
            TmError::ServiceUnavailable(reason) => {
                tracing::warn!(target: "tm.availability", reason = %reason, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            TmError::Database(err) => {
                tracing::error!(target: "tm.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"trades-management\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl From<sqlx::Error> for TmError {
    fn from(err: sqlx::Error) -> Self {
        TmError::Database(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TmError::BadRequest("'name' is a required field".to_string()).to_string(),
            "Bad request: 'name' is a required field"
        );
        assert_eq!(
            TmError::NotFound("Broker not found".to_string()).to_string(),
            "Not found: Broker not found"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TmError::BadRequest("x".to_string()).status_code(), 400);
        assert_eq!(TmError::Unauthorized("x".to_string()).status_code(), 401);
        assert_eq!(TmError::NotFound("x".to_string()).status_code(), 404);
        assert_eq!(
            TmError::ServiceUnavailable("x".to_string()).status_code(),
            503
        );
        assert_eq!(TmError::Database("x".to_string()).status_code(), 500);
    }

    #[tokio::test]
    async fn test_into_response_bad_request() {
        let response = TmError::BadRequest("Invalid broker".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("WWW-Authenticate").is_none());

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "BAD_REQUEST");
        assert_eq!(body_json["error"]["message"], "Invalid broker");
    }

    #[tokio::test]
    async fn test_into_response_unauthorized() {
        let response = TmError::Unauthorized("token is expired".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get("WWW-Authenticate")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.starts_with("Bearer realm=\"trades-management\""));

        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body_json["error"]["message"], "token is expired");
    }

    #[tokio::test]
    async fn test_into_response_not_found() {
        let response = TmError::NotFound("Trade not found".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "NOT_FOUND");
        assert_eq!(body_json["error"]["message"], "Trade not found");
    }

    #[tokio::test]
    async fn test_into_response_service_unavailable_is_generic() {
        let response =
            TmError::ServiceUnavailable("jwks fetch timed out".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(
            body_json["error"]["message"],
            "Service temporarily unavailable"
        );
    }

    #[tokio::test]
    async fn test_into_response_database_error_is_generic() {
        let response =
            TmError::Database("relation \"brokers\" does not exist".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body_json = read_body_json(response.into_body()).await;
        assert_eq!(body_json["error"]["code"], "DATABASE_ERROR");
        assert_eq!(
            body_json["error"]["message"],
            "An internal database error occurred"
        );
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: TmError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, TmError::Database(_)));
    }
}
