//! HTTP server settings.

use crate::error_handler::AppError;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    /// Frontend origin allowed by CORS.
    pub cors_origin: String,
    /// Request body cap; bounds PDF uploads.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            cors_origin: DEFAULT_CORS_ORIGIN.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// `API_ADDRESS`, `CORS_ALLOWED_ORIGIN`, `MAX_UPLOAD_BYTES`.
    pub fn from_env() -> Result<Self, AppError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(v) = var("API_ADDRESS") {
            cfg.address = v;
        }
        if let Some(v) = var("CORS_ALLOWED_ORIGIN") {
            cfg.cors_origin = v;
        }
        if let Some(v) = var("MAX_UPLOAD_BYTES") {
            cfg.max_upload_bytes = v.trim().parse().map_err(|_| {
                AppError::Config(format!("MAX_UPLOAD_BYTES must be a positive integer, got `{v}`"))
            })?;
        }
        Ok(cfg)
    }
}
