pub mod backend_badge;
pub mod dataset_upload;
pub mod navigation;
pub mod notice_bar;
pub mod prediction_form;
pub mod prediction_result;
pub mod train_model_button;
