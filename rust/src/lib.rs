pub mod clipboard;
pub mod config_store;
pub mod error;
pub mod generation;
pub mod logging;
pub mod main_ui_html;
pub mod path_utils;
pub mod prompt_builder;
pub mod render_surface;
pub mod request_state;
pub mod server;
pub mod session;
pub mod startup;
