use leptos::prelude::*;

use crate::app::WorkflowContext;
use crate::config::{self, BACKEND_URL_KEY, DEFAULT_BACKEND_URL};

#[component]
pub fn SettingsPage() -> impl IntoView {
    let ctx = WorkflowContext::expect();
    let (backend_url, set_backend_url) =
        signal(ctx.workflow.transport().base_url().to_string());
    let (url_status, set_url_status) = signal::<Option<String>>(None);

    let save_backend_url = {
        let workflow = ctx.workflow.clone();
        move |_| {
            let raw = backend_url.get();
            match config::parse_backend_url(&raw) {
                Ok(url) => {
                    workflow.transport().set_base_url(url.clone());
                    set_backend_url.set(url.to_string());
                    match config::save_preference(BACKEND_URL_KEY, url.as_str()) {
                        Ok(()) => set_url_status.set(Some("Backend URL saved".to_string())),
                        Err(e) => set_url_status.set(Some(format!(
                            "Backend URL applied for this session only: {}",
                            e
                        ))),
                    }
                }
                Err(e) => set_url_status.set(Some(e.to_string())),
            }
        }
    };

    view! {
        <div class="page settings-page">
            <h2>"Settings"</h2>

            <section class="settings-section">
                <h3>"Backend"</h3>
                <p class="section-description">
                    "Address of the ML server that handles uploads, training and predictions."
                </p>

                <div class="form-group">
                    <label for="backend-url">"Backend URL"</label>
                    <div class="input-row">
                        <input
                            id="backend-url"
                            type="text"
                            placeholder=DEFAULT_BACKEND_URL
                            class="input"
                            prop:value=move || backend_url.get()
                            on:input=move |ev| {
                                set_backend_url.set(event_target_value(&ev));
                            }
                        />
                        <button class="btn btn-save" on:click=save_backend_url>"Save"</button>
                    </div>
                    <Show when=move || url_status.get().is_some()>
                        <span class="status-text">{move || url_status.get().unwrap_or_default()}</span>
                    </Show>
                </div>
            </section>
        </div>
    }
}
