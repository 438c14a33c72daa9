use leptos::prelude::*;

use crate::app::WorkflowContext;
use crate::workflow::NoticeLevel;

/// Stack of dismissable notifications raised by the workflow.
#[component]
pub fn NoticeBar() -> impl IntoView {
    let ctx = WorkflowContext::expect();
    let state = ctx.state;
    let notices = Memo::new(move |_| state.with(|s| s.notices.clone()));

    view! {
        <div class="notice-bar">
            <For
                each=move || notices.get()
                key=|notice| notice.id
                children=move |notice| {
                    let workflow = ctx.workflow.clone();
                    let class = match notice.level {
                        NoticeLevel::Info => "notice notice-info",
                        NoticeLevel::Error => "notice notice-error",
                    };
                    let id = notice.id;
                    view! {
                        <div class=class role="alert">
                            <span class="notice-message">{notice.message}</span>
                            <button
                                class="btn btn-small notice-dismiss"
                                on:click=move |_| workflow.dismiss_notice(id)
                            >
                                "\u{00d7}"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
