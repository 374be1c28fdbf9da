use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Development-only signing secret. Tokens signed with it are worthless
/// outside a local checkout.
const DEV_SESSION_SECRET: &str = "vasitan-dev-session-secret-change-me";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub sqlite_path: String,
    pub session_secret: String,
    pub cors_origin: String,
    pub secure_cookies: bool,
    pub request_timeout: Duration,
    pub rate_limit: bool,
    /// Upper bound for one decoded inline image.
    pub max_image_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 4000,
            sqlite_path: "./data/vasitan.db".to_string(),
            session_secret: DEV_SESSION_SECRET.to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            secure_cookies: false,
            request_timeout: Duration::from_secs(30),
            rate_limit: true,
            max_image_bytes: 4 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(secret) => {
                return Err(ConfigError::Invalid {
                    name: "SESSION_SECRET",
                    expected: "at least 32 bytes long",
                    value: format!("<{} bytes>", secret.len()),
                })
            }
            Err(_) => {
                tracing::warn!("SESSION_SECRET not set, using the development secret");
                defaults.session_secret
            }
        };

        Ok(Self {
            server_port: parsed("SERVER_PORT", defaults.server_port, "a valid port number")?,
            sqlite_path: env::var("SQLITE_PATH").unwrap_or(defaults.sqlite_path),
            session_secret,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            secure_cookies: parsed("SECURE_COOKIES", defaults.secure_cookies, "true or false")?,
            request_timeout: Duration::from_secs(parsed(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
                "a number of seconds",
            )?),
            rate_limit: parsed("RATE_LIMIT", defaults.rate_limit, "true or false")?,
            max_image_bytes: parsed(
                "MAX_IMAGE_BYTES",
                defaults.max_image_bytes,
                "a byte count",
            )?,
        })
    }

    /// Request body cap for listing forms: eight base64 images, url-encoded.
    pub fn max_form_bytes(&self) -> usize {
        self.max_image_bytes * crate::services::images::MAX_IMAGES * 2 + 1024 * 1024
    }
}

fn parsed<T: FromStr>(name: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_friendly() {
        let config = Config::default();
        assert!(!config.secure_cookies);
        assert!(config.session_secret.len() >= MIN_SECRET_LEN);
        assert!(config.max_form_bytes() > config.max_image_bytes * 8);
    }
}
