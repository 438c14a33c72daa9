//! Dataset picker with drag-and-drop, plus the upload trigger.

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::app::WorkflowContext;
use crate::workflow::{FileSelection, UploadStatus};

/// File types the picker offers. The backend makes the final call.
pub const ACCEPTED_EXTENSIONS: &str = ".csv,.xlsx,.xls";

#[component]
pub fn DatasetUpload() -> impl IntoView {
    let ctx = WorkflowContext::expect();
    let state = ctx.state;
    let (is_over, set_is_over) = signal(false);
    let (is_reading, set_is_reading) = signal(false);
    let file_input_id = "dataset-file-input";

    let load_file = {
        let workflow = ctx.workflow.clone();
        move |file: web_sys::File| {
            let workflow = workflow.clone();
            set_is_reading.set(true);
            spawn_local(async move {
                match read_file_bytes(&file).await {
                    Ok(bytes) => workflow.select_file(FileSelection::new(file.name(), bytes)),
                    Err(e) => {
                        tracing::warn!("Could not read '{}': {}", file.name(), e);
                        workflow.report_error(format!("Failed to read file: {}", e));
                    }
                }
                set_is_reading.set(false);
            });
        }
    };

    let on_drop = {
        let load_file = load_file.clone();
        move |ev: web_sys::DragEvent| {
            ev.prevent_default();
            set_is_over.set(false);
            if let Some(file) = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0))
            {
                load_file(file);
            }
        }
    };

    let on_input_change = move |ev: web_sys::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            load_file(file);
        }
    };

    let upload = {
        let workflow = ctx.workflow.clone();
        move |_| {
            let workflow = workflow.clone();
            spawn_local(async move {
                // Outcome lands in the state snapshot and the notice bar.
                let _ = workflow.upload().await;
            });
        }
    };

    let upload_status = Memo::new(move |_| state.with(|s| s.upload));
    let selected_file = Memo::new(move |_| state.with(|s| s.selected_file.clone()));
    let dataset = Memo::new(move |_| state.with(|s| s.dataset.clone()));
    let uploading = move || upload_status.get() == UploadStatus::Uploading;

    view! {
        <section class="dashboard-section upload-section">
            <h3>"1. Upload Dataset"</h3>
            <div
                class="drop-zone"
                class:drop-zone-active=move || is_over.get()
                class:drop-zone-loading=move || is_reading.get()
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    set_is_over.set(true);
                }
                on:dragleave=move |_| set_is_over.set(false)
                on:drop=on_drop
            >
                <div class="drop-zone-content">
                    <p class="drop-main">"Drop a dataset file here"</p>
                    <p class="drop-hint">"or"</p>
                    <label for=file_input_id class="btn btn-secondary">
                        "Browse Files"
                    </label>
                    <input
                        type="file"
                        id=file_input_id
                        accept=ACCEPTED_EXTENSIONS
                        style="display: none"
                        on:change=on_input_change
                    />
                    <p class="drop-formats">"Supports CSV, XLSX, XLS"</p>
                </div>
            </div>

            <div class="input-row">
                <span class="selected-file">
                    {move || selected_file.get().unwrap_or_else(|| "No file selected".to_string())}
                </span>
                <button
                    class="btn btn-primary"
                    on:click=upload
                    disabled=move || uploading() || is_reading.get()
                >
                    {move || if uploading() { "Uploading..." } else { "Upload" }}
                </button>
            </div>

            <Show when=move || dataset.with(|d| d.is_some())>
                <p class="status-text status-success">
                    {move || {
                        dataset
                            .get()
                            .map(|d| format!("Uploaded dataset: {}", d.filename))
                            .unwrap_or_default()
                    }}
                </p>
            </Show>
        </section>
    }
}

async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    use js_sys::{ArrayBuffer, Uint8Array};
    use wasm_bindgen_futures::JsFuture;

    let array_buffer: ArrayBuffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{:?}", e))?
        .dyn_into()
        .map_err(|_| "Failed to convert to ArrayBuffer".to_string())?;

    Ok(Uint8Array::new(&array_buffer).to_vec())
}
