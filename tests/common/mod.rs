//! Scripted backend used by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mldash::backend::{BackendReply, ResponseBody, Transport, TransportError};
use mldash::workflow::FileSelection;
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub json: Option<Value>,
    /// `(field, file name, byte length)` for multipart uploads.
    pub file: Option<(String, String, usize)>,
}

/// One canned response. Requests are answered in the order replies were queued.
pub struct ScriptedReply {
    outcome: Result<Script, TransportError>,
    gate: Option<Arc<Notify>>,
}

struct Script {
    status: u16,
    content_length: Option<u64>,
    chunks: Vec<Vec<u8>>,
    fail_after: Option<TransportError>,
}

impl ScriptedReply {
    pub fn json(status: u16, value: Value) -> Self {
        let body = serde_json::to_vec(&value).unwrap();
        Self::chunked(status, Some(body.len() as u64), vec![body])
    }

    pub fn chunked(status: u16, content_length: Option<u64>, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            outcome: Ok(Script {
                status,
                content_length,
                chunks,
                fail_after: None,
            }),
            gate: None,
        }
    }

    pub fn unreachable(detail: &str) -> Self {
        Self {
            outcome: Err(TransportError::Unreachable(detail.to_string())),
            gate: None,
        }
    }

    /// Break the body stream once the queued chunks are consumed.
    pub fn then_fail(mut self, detail: &str) -> Self {
        if let Ok(script) = &mut self.outcome {
            script.fail_after = Some(TransportError::Interrupted(detail.to_string()));
        }
        self
    }

    /// Hold the response until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: ScriptedReply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    async fn answer(&self, request: RecordedRequest) -> Result<BackendReply<ScriptedBody>, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {} {}", request.method, request.path));

        if let Some(gate) = reply.gate {
            gate.notified().await;
        }

        let script = reply.outcome?;
        Ok(BackendReply {
            status: script.status,
            content_length: script.content_length,
            body: ScriptedBody {
                chunks: script.chunks.into(),
                fail_after: script.fail_after,
            },
        })
    }
}

impl Transport for ScriptedTransport {
    type Body = ScriptedBody;

    async fn post_file(
        &self,
        path: &str,
        field: &str,
        selection: &FileSelection,
    ) -> Result<BackendReply<ScriptedBody>, TransportError> {
        self.answer(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            json: None,
            file: Some((field.to_string(), selection.display_name.clone(), selection.len())),
        })
        .await
    }

    async fn post_json(
        &self,
        path: &str,
        payload: &Value,
    ) -> Result<BackendReply<ScriptedBody>, TransportError> {
        self.answer(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            json: Some(payload.clone()),
            file: None,
        })
        .await
    }

    async fn get(&self, path: &str) -> Result<BackendReply<ScriptedBody>, TransportError> {
        self.answer(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            json: None,
            file: None,
        })
        .await
    }
}

pub struct ScriptedBody {
    chunks: VecDeque<Vec<u8>>,
    fail_after: Option<TransportError>,
}

impl ResponseBody for ScriptedBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        match self.fail_after.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

pub fn iris_selection() -> FileSelection {
    FileSelection::new("iris.csv", b"sepal_length,sepal_width,petal_length,petal_width,species\n".to_vec())
}

pub fn upload_ok(filename: &str) -> ScriptedReply {
    ScriptedReply::json(
        200,
        serde_json::json!({ "message": "File uploaded successfully", "filename": filename }),
    )
}
