pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod models;
pub mod render;
pub mod state;
