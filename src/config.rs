// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Maximum number of scored submissions per (user, quiz) before passing.
pub const ATTEMPT_CAP: i64 = 3;

/// Minimum percentage of answered-correct required to mark an attempt passed.
pub const PASS_THRESHOLD_PERCENTAGE: f64 = 75.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            rust_log,
        }
    }
}
