pub mod app;
pub mod autosave;
pub mod catalog;
pub mod challenge;
pub mod config;
pub mod constants;
pub mod db;
pub mod dto;
pub mod error;
pub mod hash;
pub mod models;
pub mod progress;
pub mod save;
pub mod selector;
pub mod settings;
#[cfg(test)]
mod test_utils;
pub mod validation;

pub use app::SkateSpin;
pub use config::AppConfig;
pub use error::AppError;
