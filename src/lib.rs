pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod html;
pub mod loader;
pub mod locale;
pub mod output;
pub mod render;
pub mod tui;
pub mod view;
