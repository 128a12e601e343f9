//! Toast Component
//!
//! Stacked notifications that hide themselves after a few seconds.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::feedback::Toast;
use crate::store::{store_dismiss_toast, use_app_store, AppStateStoreFields};

#[component]
pub fn ToastHost() -> impl IntoView {
    let store = use_app_store();

    view! {
        <div class="toast-host">
            <For
                each=move || store.toasts().get()
                key=|toast| toast.id
                children=move |toast: Toast| {
                    let id = toast.id;
                    let lifetime = toast.level.lifetime_ms();
                    spawn_local(async move {
                        TimeoutFuture::new(lifetime).await;
                        store_dismiss_toast(&store, id);
                    });
                    view! {
                        <div class=toast.level.css_class() on:click=move |_| store_dismiss_toast(&store, id)>
                            {toast.text}
                        </div>
                    }
                }
            />
        </div>
    }
}
