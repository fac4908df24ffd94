//! services/api/src/web/response.rs
//!
//! Turns handler outcomes into HTTP responses. Only this module writes error
//! bodies; everything below the web layer speaks `DomainError`.

use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use qa_core::error::DomainError;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

pub const INVALID_ID_MESSAGE: &str = "invalid id format";
pub const INVALID_JSON_MESSAGE: &str = "invalid JSON format";

/// The body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

//=========================================================================================
// Request-level Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("invalid id format: {0}")]
    InvalidId(String),
    #[error("invalid JSON format: {0}")]
    InvalidJson(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RestError {
    /// The status and client message. A status the HTTP layer cannot represent
    /// falls back to the generic 500.
    fn public_parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidId(_) => (StatusCode::BAD_REQUEST, INVALID_ID_MESSAGE),
            Self::InvalidJson(_) => (StatusCode::BAD_REQUEST, INVALID_JSON_MESSAGE),
            Self::Domain(e) => match StatusCode::from_u16(e.status_code()) {
                Ok(status) => (status, e.message()),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DomainError::DatabaseQuery.message(),
                ),
            },
        }
    }
}

/// A `RestError` together with the log prefix naming the failed operation.
#[derive(Debug)]
pub struct Failure {
    context: &'static str,
    error: RestError,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let (status, message) = self.error.public_parts();
        if status.is_server_error() {
            error!("{}: {}", self.context, self.error);
        } else {
            warn!("{}: {}", self.context, self.error);
        }
        send_error(status, message)
    }
}

/// Attaches the log prefix to a fallible step of a handler.
pub trait OrFail<T> {
    fn or_fail(self, context: &'static str) -> Result<T, Failure>;
}

impl<T, E> OrFail<T> for Result<T, E>
where
    E: Into<RestError>,
{
    fn or_fail(self, context: &'static str) -> Result<T, Failure> {
        self.map_err(|e| Failure {
            context,
            error: e.into(),
        })
    }
}

//=========================================================================================
// Input Decoding
//=========================================================================================

/// Parses a path id, accepting only a plain integer.
pub fn parse_id(raw: &str) -> Result<i64, RestError> {
    raw.parse::<i64>()
        .map_err(|e| RestError::InvalidId(format!("'{}': {}", raw, e)))
}

/// Parses the `{id}` segment. A segment that cannot even be extracted, such as
/// one that percent-decodes to invalid UTF-8, is just another malformed id.
pub fn parse_path_id(path: Result<Path<String>, PathRejection>) -> Result<i64, RestError> {
    let Path(raw) = path.map_err(|e| RestError::InvalidId(e.body_text()))?;
    parse_id(&raw)
}

/// Decodes a JSON body. Nothing of a body that fails to decode is used.
pub fn decode_json<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, RestError> {
    let bytes = body.map_err(|e| RestError::InvalidJson(e.body_text()))?;
    serde_json::from_slice(&bytes).map_err(|e| RestError::InvalidJson(e.to_string()))
}

//=========================================================================================
// Response Writing
//=========================================================================================

const JSON_CONTENT_TYPE: &str = "application/json";

/// Serializes `body` with the given status. An encoding failure is logged and
/// answered with the generic 500 body, since the status is not committed yet.
pub fn send_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response()
        }
        Err(e) => {
            error!("Failed to encode response body: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                r#"{"error":"database query error"}"#,
            )
                .into_response()
        }
    }
}

pub fn send_error(status: StatusCode, message: &str) -> Response {
    send_json(
        status,
        &ErrorResponse {
            error: message.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[rstest]
    #[case("abc")]
    #[case("1.5")]
    #[case("")]
    #[case("12abc")]
    fn non_integer_ids_are_rejected(#[case] raw: &str) {
        assert!(matches!(parse_id(raw), Err(RestError::InvalidId(_))));
    }

    #[test]
    fn integer_ids_parse() {
        assert_eq!(parse_id("42").unwrap(), 42);
    }

    #[derive(serde::Deserialize, Debug)]
    struct Payload {
        #[allow(dead_code)]
        text: String,
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result: Result<Payload, _> = decode_json(Ok(Bytes::from_static(b"{\"text\":")));
        assert!(matches!(result, Err(RestError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn domain_failure_uses_its_own_status_and_message() {
        let failure: Result<(), Failure> =
            Err(DomainError::QuestionAlreadyExists).or_fail("Failed to create question");

        let response = failure.unwrap_err().into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_text(response).await, r#"{"error":"question already exists"}"#);
    }

    #[tokio::test]
    async fn bad_id_failure_hides_parse_details() {
        let failure = parse_id("abc").or_fail("Failed to get answer").unwrap_err();

        let response = failure.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"invalid id format"}"#);
    }

    #[tokio::test]
    async fn infrastructure_failure_is_generic() {
        let failure = Err::<(), _>(DomainError::DatabaseQuery)
            .or_fail("Failed to list questions")
            .unwrap_err();

        let response = failure.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, r#"{"error":"database query error"}"#);
    }
}
