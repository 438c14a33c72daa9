//! Seam between the workflow core and the ML backend.
//!
//! The workflow only ever sees [`BackendReply`]s and chunked [`ResponseBody`]s,
//! so it can be driven by the browser `fetch` client in production and by a
//! scripted transport in tests.

pub mod http_client;

use std::future::Future;

use thiserror::Error;

use crate::workflow::types::FileSelection;

pub use http_client::FetchClient;

pub const UPLOAD_PATH: &str = "upload";
pub const TRAIN_PATH: &str = "train";
pub const PREDICT_PATH: &str = "predict";
/// Multipart field name the backend reads the dataset from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (connection refused, CORS, DNS...).
    #[error("Request failed: {0}")]
    Unreachable(String),

    /// The response body could not be read to the end.
    #[error("Response stream interrupted: {0}")]
    Interrupted(String),

    #[error("No browser window available")]
    NoBrowser,
}

/// Status line and headers of a backend response, with its body still unread.
#[derive(Debug)]
pub struct BackendReply<B> {
    pub status: u16,
    /// Declared `content-length`, if present and parsable.
    pub content_length: Option<u64>,
    pub body: B,
}

impl<B> BackendReply<B> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Incrementally readable response body.
pub trait ResponseBody {
    /// Next chunk in arrival order, or `None` once the transport signals the end of data.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>>;

    /// Drain the remaining body into memory.
    fn read_all(self) -> impl Future<Output = Result<Vec<u8>, TransportError>>
    where
        Self: Sized,
    {
        async move {
            let mut body = self;
            let mut buf = Vec::new();
            while let Some(chunk) = body.next_chunk().await? {
                buf.extend_from_slice(&chunk);
            }
            Ok(buf)
        }
    }
}

/// HTTP operations the dashboard needs from the backend.
///
/// Paths are relative to the configured backend base URL.
pub trait Transport {
    type Body: ResponseBody;

    /// `POST` a multipart form carrying `selection` under `field`.
    fn post_file(
        &self,
        path: &str,
        field: &str,
        selection: &FileSelection,
    ) -> impl Future<Output = Result<BackendReply<Self::Body>, TransportError>>;

    /// `POST` a JSON document.
    fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> impl Future<Output = Result<BackendReply<Self::Body>, TransportError>>;

    fn get(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<BackendReply<Self::Body>, TransportError>>;
}

/// Pull a human-readable message out of a JSON error payload.
///
/// The backend is inconsistent about the key (`error` vs `message`), so both are accepted.
pub fn error_message(body: &[u8]) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorPayload {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    let payload: ErrorPayload = serde_json::from_slice(body).ok()?;
    payload
        .error
        .or(payload.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_error_key() {
        let body = br#"{"error":"File not found","message":"ignored"}"#;
        assert_eq!(error_message(body).as_deref(), Some("File not found"));
    }

    #[test]
    fn test_error_message_falls_back_to_message_key() {
        let body = br#"{"message":"Invalid or insufficient data"}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("Invalid or insufficient data")
        );
    }

    #[test]
    fn test_error_message_rejects_non_json_and_blank() {
        assert_eq!(error_message(b"<html>500</html>"), None);
        assert_eq!(error_message(br#"{"error":"  "}"#), None);
        assert_eq!(error_message(br#"{}"#), None);
    }

    #[test]
    fn test_reply_success_range() {
        let reply = BackendReply { status: 204, content_length: None, body: () };
        assert!(reply.is_success());
        let reply = BackendReply { status: 404, content_length: None, body: () };
        assert!(!reply.is_success());
    }
}
