pub mod analytics;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod input;
pub mod logger;
pub mod models;
pub mod notes;
pub mod pagination;
pub mod quiz;
pub mod storage;
pub mod theme;
pub mod transcribe;
pub mod ui;
pub mod utils;
pub mod validation;
pub mod worker;

#[cfg(test)]
mod ui_tests;

pub use app::App;
pub use error::{AppError, Result};
pub use models::AppState;
