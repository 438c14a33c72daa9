use std::sync::{PoisonError, RwLock};

use js_sys::{Array, Reflect, Uint8Array};
use tracing::{debug, info};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Headers, ReadableStreamDefaultReader, RequestInit, Response};

use super::{BackendReply, ResponseBody, Transport, TransportError};
use crate::workflow::types::FileSelection;

/// Browser `fetch` client for the ML backend.
///
/// No timeout is applied: a hung request keeps its operation pending until the
/// browser gives up on the connection.
pub struct FetchClient {
    base_url: RwLock<Url>,
}

impl FetchClient {
    /// `base_url` must end in `/` (see [`crate::config::parse_backend_url`]).
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: RwLock::new(base_url),
        }
    }

    pub fn base_url(&self) -> Url {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Repoint subsequent requests at another backend. In-flight requests are unaffected.
    pub fn set_base_url(&self, base_url: Url) {
        info!("Backend URL set to {}", base_url);
        *self.base_url.write().unwrap_or_else(PoisonError::into_inner) = base_url;
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url()
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Unreachable(format!("Bad endpoint '{}': {}", path, e)))
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        init: RequestInit,
    ) -> Result<BackendReply<FetchBody>, TransportError> {
        let window = web_sys::window().ok_or(TransportError::NoBrowser)?;
        let url = self.endpoint(path)?;
        debug!("Fetching {} {}", method, url);
        init.set_method(method);

        let response: Response = JsFuture::from(window.fetch_with_str_and_init(url.as_str(), &init))
            .await
            .map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?
            .dyn_into()
            .map_err(|_| TransportError::Unreachable("fetch did not resolve to a Response".to_string()))?;

        let content_length = response
            .headers()
            .get("content-length")
            .ok()
            .flatten()
            .and_then(|value| value.trim().parse::<u64>().ok());

        let reader = response
            .body()
            .map(|stream| stream.get_reader().unchecked_into::<ReadableStreamDefaultReader>());

        Ok(BackendReply {
            status: response.status(),
            content_length,
            body: FetchBody { reader },
        })
    }
}

impl Transport for FetchClient {
    type Body = FetchBody;

    async fn post_file(
        &self,
        path: &str,
        field: &str,
        selection: &FileSelection,
    ) -> Result<BackendReply<FetchBody>, TransportError> {
        let bytes = Uint8Array::from(&selection.bytes[..]);
        let blob = Blob::new_with_u8_array_sequence(&Array::of1(&bytes))
            .map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?;
        let form = FormData::new().map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?;
        form.append_with_blob_and_filename(field, &blob, &selection.display_name)
            .map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?;

        let init = RequestInit::new();
        init.set_body(&form);
        self.send("POST", path, init).await
    }

    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<BackendReply<FetchBody>, TransportError> {
        let headers = Headers::new().map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| TransportError::Unreachable(describe_js_error(&e)))?;

        let init = RequestInit::new();
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&payload.to_string()));
        self.send("POST", path, init).await
    }

    async fn get(&self, path: &str) -> Result<BackendReply<FetchBody>, TransportError> {
        self.send("GET", path, RequestInit::new()).await
    }
}

/// Response body read through the stream's default reader.
pub struct FetchBody {
    reader: Option<ReadableStreamDefaultReader>,
}

impl ResponseBody for FetchBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let Some(reader) = self.reader.as_ref() else {
            return Ok(None);
        };

        let result = JsFuture::from(reader.read())
            .await
            .map_err(|e| TransportError::Interrupted(describe_js_error(&e)))?;

        let done = Reflect::get(&result, &JsValue::from_str("done"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if done {
            self.reader = None;
            return Ok(None);
        }

        let value = Reflect::get(&result, &JsValue::from_str("value"))
            .map_err(|e| TransportError::Interrupted(describe_js_error(&e)))?;
        Ok(Some(Uint8Array::new(&value).to_vec()))
    }
}

fn describe_js_error(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{:?}", value))
}
