use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::path;

use crate::backend::FetchClient;
use crate::components::navigation::Navigation;
use crate::components::notice_bar::NoticeBar;
use crate::config::DashboardConfig;
use crate::pages::dashboard::DashboardPage;
use crate::pages::health::HealthPage;
use crate::pages::settings::SettingsPage;
use crate::workflow::{Workflow, WorkflowState};

/// Shared handle to the workflow and its latest state snapshot.
///
/// Components read slices of `state` through `Memo`s so unrelated updates do not re-render them.
#[derive(Clone)]
pub struct WorkflowContext {
    pub workflow: Arc<Workflow<FetchClient>>,
    pub state: ReadSignal<WorkflowState>,
}

impl WorkflowContext {
    pub fn expect() -> Self {
        expect_context::<WorkflowContext>()
    }
}

#[component]
pub fn App(config: DashboardConfig) -> impl IntoView {
    let workflow = Arc::new(Workflow::new(FetchClient::new(config.backend_url.clone())));
    let (state, set_state) = signal(workflow.snapshot());
    workflow.subscribe(move |snapshot| set_state.set(snapshot.clone()));

    provide_context(WorkflowContext { workflow, state });

    view! {
        <Router>
            <div class="app-layout">
                <Navigation />
                <main class="content">
                    <NoticeBar />
                    <Routes fallback=|| view! { <p>"Page not found"</p> }>
                        <Route path=path!("/") view=DashboardPage />
                        <Route path=path!("/health") view=HealthPage />
                        <Route path=path!("/settings") view=SettingsPage />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}
