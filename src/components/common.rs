//! Shared form and list widgets

use leptos::prelude::*;

use crate::models::is_enabled;

#[component]
pub fn StatusBadge(status: Option<String>) -> impl IntoView {
    let enabled = is_enabled(&status);
    view! {
        <span class=if enabled { "status-badge enabled" } else { "status-badge disabled" }>
            {if enabled { "启用" } else { "禁用" }}
        </span>
    }
}

/// Labelled text input bound to a signal
#[component]
pub fn TextField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(optional)] disabled: bool,
    #[prop(default = "text")] input_type: &'static str,
) -> impl IntoView {
    view! {
        <label class="form-field">
            <span class="form-label">{label}</span>
            <input
                type=input_type
                disabled=disabled
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

/// Action text and target state for an enable/disable toggle
pub fn toggle_label(status: &Option<String>) -> (&'static str, bool) {
    if is_enabled(status) {
        ("禁用", false)
    } else {
        ("启用", true)
    }
}

/// Optional numeric input: blank or garbage reads as `None`
pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_status() {
        assert_eq!(toggle_label(&Some("ENABLED".into())), ("禁用", false));
        assert_eq!(toggle_label(&Some("DISABLED".into())), ("启用", true));
        assert_eq!(toggle_label(&None), ("启用", true));
    }

    #[test]
    fn test_parse_id_ignores_blank() {
        assert_eq!(parse_id(" 42 "), Some(42));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
    }
}
