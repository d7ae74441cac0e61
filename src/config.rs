use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Where uploaded trash can photos are written. Must live under `uploads_root`
    /// for the generated image URLs to resolve.
    pub upload_image_dir: String,
    pub uploads_root: String,
    pub static_dir: String,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "3000")?,
            database_url: try_load("DATABASE_URL", "sqlite://sqlite.db?mode=rwc")?,
            upload_image_dir: try_load("UPLOAD_IMAGE_DIR", "uploads/trashcans")?,
            uploads_root: try_load("UPLOADS_ROOT", "uploads")?,
            static_dir: try_load("STATIC_DIR", "dist")?,
            jwt_secret: load_secret("JWT_SECRET"),
            jwt_expire_hours: try_load("JWT_EXPIRE_HOURS", "72")?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

fn load_secret(key: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => {
            warn!("{key} not set, using an ephemeral secret; tokens reset on restart");
            Uuid::new_v4().simple().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_falls_back_to_default() {
        let port: u16 = try_load("TRASHCAN_MAP_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn unparsable_variable_is_rejected() {
        env::set_var("TRASHCAN_MAP_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, _> = try_load("TRASHCAN_MAP_TEST_BAD_PORT", "3000");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                key: "TRASHCAN_MAP_TEST_BAD_PORT",
                ..
            })
        ));
    }

    #[test]
    fn blank_secret_is_replaced() {
        env::set_var("TRASHCAN_MAP_TEST_BLANK_SECRET", "  ");
        let secret = load_secret("TRASHCAN_MAP_TEST_BLANK_SECRET");
        assert_eq!(secret.len(), 32);
    }
}
