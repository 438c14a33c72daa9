use leptos::prelude::*;

use crate::components::dataset_upload::DatasetUpload;
use crate::components::prediction_form::PredictionForm;
use crate::components::prediction_result::PredictionResultPanel;
use crate::components::train_model_button::TrainModelButton;

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <div class="page dashboard-page">
            <h2>"Model Workflow"</h2>
            <p class="page-description">
                "Upload a dataset, train a model on it, then classify new samples."
            </p>
            <DatasetUpload />
            <TrainModelButton />
            <PredictionForm />
            <PredictionResultPanel />
        </div>
    }
}
