//! Marketing Site Frontend Entry Point
//!
//! Fetches the page sections, injects them, then wires up interactions.

mod app;
mod assembler;
mod config;
mod contact;
mod error;
mod loader;
mod logging;
mod menu;
mod navigation;
mod reveal;
mod scroll_spy;
mod wiring;

use tracing_subscriber::filter::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    logging::init(level);
    app::start();
}
