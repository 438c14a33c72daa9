use leptos::prelude::*;

use mldash::app::App;
use mldash::config::DashboardConfig;

fn main() {
    let config = DashboardConfig::load();
    if let Err(e) = mldash::logging::init(&config.log_level) {
        web_sys::console::error_1(&e.to_string().into());
    }
    tracing::info!("Starting dashboard against {}", config.backend_url);

    leptos::mount::mount_to_body(move || view! { <App config=config.clone() /> });
}
