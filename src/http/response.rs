//! Response helpers and the handler error type.
//!
//! Plain-text responses always carry `text/plain; charset=utf-8`. Error
//! bodies end with a newline. Collaborator failures expose only a generic
//! message; the cause is logged where the error is produced.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Build a plain-text response.
pub fn plain_text(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
    response
}

/// Errors a handler can return to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unreadable client input.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// A collaborator failed; the message shown to the client is generic.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        plain_text(self.status(), format!("{}\n", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_renders_as_text_line() {
        let response = ApiError::NotFound("Key 'x' not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN_UTF8);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Key 'x' not found\n");
    }
}
