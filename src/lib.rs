//! Labsite Research Laboratory Website Backend
//!
//! A Rust implementation of the Labsite backend server, providing a REST
//! JSON API for visit analytics, web-push notification delivery, and
//! scheduled dashboard snapshots.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
