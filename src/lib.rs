pub mod app;
pub mod config;
pub mod core;
pub mod platform;
pub mod utils;
