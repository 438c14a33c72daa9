use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::app::WorkflowContext;
use crate::workflow::FeatureField;

#[component]
pub fn PredictionForm() -> impl IntoView {
    let ctx = WorkflowContext::expect();
    let state = ctx.state;
    let is_predicting = Memo::new(move |_| state.with(|s| s.is_predicting()));
    let predicting = move || is_predicting.get();

    let submit = {
        let workflow = ctx.workflow.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let workflow = workflow.clone();
            spawn_local(async move {
                let _ = workflow.predict().await;
            });
        }
    };

    let fields = FeatureField::ALL
        .into_iter()
        .map(|field| {
            let workflow = ctx.workflow.clone();
            let input_id = format!("feature-{}", field.key());
            let value = Memo::new(move |_| state.with(|s| s.input.get(field).to_string()));
            let error = Memo::new(move |_| state.with(|s| s.field_error(field)));
            view! {
                <div class="form-group">
                    <label for=input_id.clone()>{field.label()}</label>
                    <input
                        id=input_id
                        type="text"
                        class="input"
                        placeholder=field.label()
                        prop:value=move || value.get()
                        on:input=move |ev| workflow.set_field(field, event_target_value(&ev))
                    />
                    {move || {
                        error.get().map(|msg| view! { <span class="field-error">{msg}</span> })
                    }}
                </div>
            }
        })
        .collect_view();

    view! {
        <section class="dashboard-section prediction-section">
            <h3>"3. Make a Prediction"</h3>
            <form class="prediction-form" on:submit=submit>
                {fields}
                <button type="submit" class="btn btn-primary" disabled=predicting>
                    {move || if predicting() { "Predicting..." } else { "Predict" }}
                </button>
            </form>
            <Show when=predicting>
                <p class="status-text">"Making prediction..."</p>
            </Show>
        </section>
    }
}
