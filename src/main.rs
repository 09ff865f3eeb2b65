//! Todo App Frontend Entry Point

mod app;
mod components;
mod context;
mod logging;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = logging::init(log::LevelFilter::Debug) {
        web_sys::console::warn_1(&format!("[APP] logger not installed: {}", err).into());
    }
    mount_to_body(App);
}
