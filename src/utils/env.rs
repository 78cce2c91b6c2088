// src/utils/env.rs

use log::{debug, info};

/// Loads variables from a `.env` file if one exists. Real environment
/// variables always win over file entries.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment only"),
    }
}
