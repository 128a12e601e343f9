//! Confirm Dialog Component
//!
//! Renders whatever confirm or prompt is pending in `AppContext`.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::feedback::Confirmation;

#[component]
pub fn ConfirmDialog() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let (input, set_input) = signal(String::new());

    // Seed the text field whenever a new prompt opens
    Effect::new(move |_| {
        if let Some(initial) = ctx.dialog.with(|d| d.as_ref().and_then(|d| d.input.clone())) {
            set_input.set(initial);
        }
    });

    let submit = move || {
        let is_prompt = ctx.dialog.with_untracked(|d| d.as_ref().is_some_and(|d| d.input.is_some()));
        if is_prompt {
            let value = input.get_untracked().trim().to_string();
            if value.is_empty() {
                return;
            }
            ctx.answer(Confirmation::Confirmed(value));
        } else {
            ctx.answer(Confirmation::Confirmed(String::new()));
        }
    };

    view! {
        {move || ctx.dialog.get().map(|dialog| {
            let ok_class = if dialog.danger { "btn btn-danger" } else { "btn btn-primary" };
            view! {
                <div class="modal-overlay" on:click=move |_| ctx.answer(Confirmation::Cancelled)>
                    <div class="modal confirm-modal" on:click=|ev| ev.stop_propagation()>
                        <h3>{dialog.title.clone()}</h3>
                        <p class="confirm-message">{dialog.message.clone()}</p>
                        {dialog.input.is_some().then(|| view! {
                            <input
                                type="text"
                                class="prompt-input"
                                prop:value=move || input.get()
                                on:input=move |ev| set_input.set(event_target_value(&ev))
                                on:keydown=move |ev: web_sys::KeyboardEvent| {
                                    if ev.key() == "Enter" {
                                        submit();
                                    }
                                }
                            />
                        })}
                        <div class="modal-actions">
                            <button class="btn" on:click=move |_| ctx.answer(Confirmation::Cancelled)>"取消"</button>
                            <button class=ok_class on:click=move |_| submit()>"确定"</button>
                        </div>
                    </div>
                </div>
            }
        })}
    }
}
