use serde_json::Value;
use tracing::{info, warn};

use crate::backend::{error_message, ResponseBody, Transport, UPLOAD_FIELD, UPLOAD_PATH};
use crate::error::UploadError;

use super::types::{DatasetHandle, FileSelection};

/// Send the selected dataset to the backend and return the handle it assigns.
///
/// Fails without touching the network when nothing is selected. Never retries.
pub async fn upload_dataset<T: Transport>(
    transport: &T,
    selection: Option<&FileSelection>,
) -> Result<DatasetHandle, UploadError> {
    let selection = selection.ok_or(UploadError::NoFileSelected)?;
    info!(
        "Uploading dataset '{}' ({} bytes)",
        selection.display_name,
        selection.len()
    );

    let reply = transport
        .post_file(UPLOAD_PATH, UPLOAD_FIELD, selection)
        .await
        .map_err(|e| {
            warn!("Upload of '{}' failed: {}", selection.display_name, e);
            UploadError::Transport { detail: e.to_string() }
        })?;

    if !reply.is_success() {
        let status = reply.status;
        let body = reply.body.read_all().await.unwrap_or_default();
        let detail = error_message(&body);
        warn!(
            "Backend rejected upload of '{}' with status {}: {}",
            selection.display_name,
            status,
            detail.as_deref().unwrap_or("no detail")
        );
        return Err(UploadError::Rejected { status, detail });
    }

    let body = reply.body.read_all().await.map_err(|e| {
        warn!("Failed to read upload response: {}", e);
        UploadError::Transport { detail: e.to_string() }
    })?;

    let handle = parse_handle(&body).ok_or_else(|| {
        warn!("Upload response carried no filename");
        UploadError::Transport {
            detail: "Upload response did not contain a filename".to_string(),
        }
    })?;
    info!("Dataset uploaded as '{}'", handle.filename);
    Ok(handle)
}

fn parse_handle(body: &[u8]) -> Option<DatasetHandle> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let filename = value.get("filename")?.as_str()?.trim();
    if filename.is_empty() {
        return None;
    }
    Some(DatasetHandle {
        filename: filename.to_string(),
    })
}
