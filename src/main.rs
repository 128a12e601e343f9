//! Car Model Console Frontend Entry Point

mod api;
mod app;
mod combination;
mod compare;
mod components;
mod config;
mod context;
mod editor;
mod error;
mod feedback;
mod freshness;
mod menu;
mod models;
mod store;
mod tree;

use app::App;
use leptos::prelude::*;
use rolling_logger::RollingLogger;
use tracing::level_filters::LevelFilter;

use crate::config::AppConfig;

fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_env();
    let level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let logs = RollingLogger::builder()
        .capacity(config.log_capacity)
        .level(level)
        .sink(|level, line| {
            let line = wasm_bindgen::JsValue::from_str(line);
            match level {
                tracing::Level::ERROR => web_sys::console::error_1(&line),
                tracing::Level::WARN => web_sys::console::warn_1(&line),
                _ => web_sys::console::log_1(&line),
            }
        })
        .init();

    tracing::info!(api_base = %config.api_base, "console starting");
    mount_to_body(move || view! { <App config=config.clone() logs=logs.clone() /> });
}
