use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::app::WorkflowContext;
use crate::components::backend_badge::BackendBadge;
use crate::workflow::{check_backend, BackendHealth};

#[component]
pub fn HealthPage() -> impl IntoView {
    let workflow = WorkflowContext::expect().workflow;
    let (checking, set_checking) = signal(false);
    let (report, set_report) = signal::<Option<BackendHealth>>(None);

    let do_health_check = {
        let workflow = workflow.clone();
        move || {
            let workflow = workflow.clone();
            set_checking.set(true);
            spawn_local(async move {
                let health = check_backend(workflow.transport()).await;
                set_report.set(Some(health));
                set_checking.set(false);
            });
        }
    };

    // Auto-run health check on mount
    let auto_check = do_health_check.clone();
    Effect::new(move |_| {
        auto_check();
    });

    let base_url = move || workflow.transport().base_url().to_string();

    view! {
        <div class="page health-page">
            <h2>"Backend Status"</h2>
            <p class="page-description">
                "Verify that the dashboard can reach the ML backend."
            </p>

            <button
                class="btn btn-primary"
                on:click=move |_| do_health_check()
                disabled=move || checking.get()
            >
                {move || if checking.get() { "Checking..." } else { "Run Health Check" }}
            </button>

            {move || {
                let url = base_url();
                report.get().map(|health| {
                    view! {
                        <div class="health-results">
                            <BackendBadge url=url health=health />
                        </div>
                    }
                })
            }}
        </div>
    }
}
