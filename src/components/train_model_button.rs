use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::app::WorkflowContext;
use crate::workflow::{Progress, TrainingStatus};

/// Training trigger and progress bar. Hidden until a dataset has been uploaded.
#[component]
pub fn TrainModelButton() -> impl IntoView {
    let ctx = WorkflowContext::expect();
    let state = ctx.state;

    let train = {
        let workflow = ctx.workflow.clone();
        move |_| {
            let workflow = workflow.clone();
            spawn_local(async move {
                let _ = workflow.train().await;
            });
        }
    };

    let training = Memo::new(move |_| state.with(|s| s.training.clone()));
    let available = Memo::new(move |_| state.with(|s| s.training_available()));

    let running = move || training.with(|t| t.is_running());
    let status = move || training.with(|t| t.status);
    // `None` drops the attribute, which renders an indeterminate bar.
    let progress_value = move || {
        training.with(|t| t.progress.percent().map(|pct| format!("{:.0}", pct)))
    };
    let progress_label = move || match training.with(|t| t.progress) {
        Progress::Percent(pct) => format!("{:.0}%", pct),
        Progress::Indeterminate => "Training...".to_string(),
    };

    view! {
        <Show when=move || available.get()>
            <section class="dashboard-section training-section">
                <h3>"2. Train Model"</h3>
                <button
                    class="btn btn-primary"
                    on:click=train.clone()
                    disabled=running
                >
                    {move || if running() { "Training..." } else { "Train Model" }}
                </button>

                <Show when=move || status() != TrainingStatus::Idle>
                    <div class="progress-row">
                        <progress max="100" value=progress_value></progress>
                        <span class="progress-label">{progress_label}</span>
                    </div>
                </Show>

                {move || {
                    let training = training.get();
                    match training.status {
                        TrainingStatus::Succeeded => {
                            let filename = training.filename.unwrap_or_default();
                            let evaluation = training
                                .summary
                                .as_ref()
                                .and_then(|s| s.evaluation_line());
                            view! {
                                <div class="training-result">
                                    <p class="status-text status-success">
                                        {format!("Model trained on {}", filename)}
                                    </p>
                                    {evaluation.map(|line| view! { <p class="training-metrics">{line}</p> })}
                                </div>
                            }
                            .into_any()
                        }
                        TrainingStatus::Failed => {
                            view! {
                                <p class="status-text status-error">
                                    {training.error.unwrap_or_default()}
                                </p>
                            }
                            .into_any()
                        }
                        TrainingStatus::Idle | TrainingStatus::Running => ().into_any(),
                    }
                }}
            </section>
        </Show>
    }
}
