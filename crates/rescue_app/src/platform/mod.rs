pub mod app;
pub mod config;
pub mod effects;
pub mod host;
pub mod logging;
pub mod render;
