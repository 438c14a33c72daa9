use leptos::prelude::*;

use crate::app::WorkflowContext;

#[component]
pub fn PredictionResultPanel() -> impl IntoView {
    let state = WorkflowContext::expect().state;
    let rendered = Memo::new(move |_| state.with(|s| s.rendered_result()));

    view! {
        {move || {
            rendered.get().map(|text| {
                view! {
                    <div class="prediction-result">
                        <h3>"Prediction Result:"</h3>
                        <p>{text}</p>
                    </div>
                }
            })
        }}
    }
}
