//! Client configuration resolved once from arguments and the environment.
//!
//! # Design
//! `resolve` is a pure function over its three inputs so it can be tested
//! without touching the process environment; `from_env` is the thin wrapper
//! that reads `CPV_API_KEY` / `CPV_API_URL`.

use std::time::Duration;

use crate::error::{CpvError, MSG_API_KEY_MISSING};
use crate::validation::validate_api_key;

/// Production endpoint used when `CPV_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://api.cupomverde.com.br/api/v2";

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "CPV_API_KEY";

/// Environment variable overriding the base URL.
pub const API_URL_ENV: &str = "CPV_API_URL";

/// Fixed per-request timeout applied by the bundled transport.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Immutable configuration shared by every call of a client value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
}

impl ClientConfig {
    /// Resolve a configuration from an explicit key and environment values.
    ///
    /// The explicit key wins over `env_key`; empty strings count as absent.
    pub fn resolve(
        explicit_key: Option<&str>,
        env_key: Option<String>,
        env_url: Option<String>,
    ) -> Result<Self, CpvError> {
        let api_key = explicit_key
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| env_key.filter(|k| !k.is_empty()))
            .ok_or_else(|| CpvError::Unauthorized(Some(MSG_API_KEY_MISSING.to_string())))?;

        validate_api_key(&api_key)?;

        let base_url = env_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve using `CPV_API_KEY` and `CPV_API_URL` from the process environment.
    pub fn from_env(explicit_key: Option<&str>) -> Result<Self, CpvError> {
        Self::resolve(
            explicit_key,
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_URL_ENV).ok(),
        )
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const KEY: &str = "56c1f1b8-9b5c-41cd-b8f7-872be3500ad3";
    const OTHER_KEY: &str = "0b0e5a0e-7f4c-4a8e-9f57-3d2a51a0c111";

    #[test]
    fn explicit_key_round_trips() {
        let config = ClientConfig::resolve(Some(KEY), None, None).unwrap();
        assert_eq!(config.api_key(), KEY);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn request_timeout_is_five_seconds() {
        assert_eq!(REQUEST_TIMEOUT, Duration::from_millis(5000));
    }

    #[test]
    fn explicit_key_wins_over_env() {
        let config = ClientConfig::resolve(Some(KEY), Some(OTHER_KEY.to_string()), None).unwrap();
        assert_eq!(config.api_key(), KEY);
    }

    #[test]
    fn env_key_is_fallback() {
        let config = ClientConfig::resolve(None, Some(OTHER_KEY.to_string()), None).unwrap();
        assert_eq!(config.api_key(), OTHER_KEY);

        let config = ClientConfig::resolve(Some(""), Some(OTHER_KEY.to_string()), None).unwrap();
        assert_eq!(config.api_key(), OTHER_KEY);
    }

    #[test]
    fn missing_key_is_unauthorized() {
        let err = ClientConfig::resolve(None, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            err.message(),
            Some("API Key não foi informada por parâmetro ou por variavel de ambiente.")
        );
    }

    #[test]
    fn malformed_key_is_validation_error() {
        let err = ClientConfig::resolve(Some("not-a-uuid"), None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), Some("API Key não é válida, informe uma Api Key válida."));
    }

    #[test]
    fn env_url_overrides_default_and_is_trimmed() {
        let config =
            ClientConfig::resolve(Some(KEY), None, Some("http://localhost:3000/".to_string()))
                .unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
    }
}
