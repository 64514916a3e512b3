//! `Cpv::init` against the real process environment.
//!
//! Kept in a single test so the environment is never mutated concurrently.

use cpv_core::{config, Cpv, ErrorKind};

const KEY: &str = "56c1f1b8-9b5c-41cd-b8f7-872be3500ad3";
const ENV_KEY: &str = "9d3e2f4a-1b2c-4d5e-8f60-718293a4b5c6";

#[test]
fn init_resolves_key_from_environment() {
    std::env::remove_var(config::API_KEY_ENV);
    std::env::remove_var(config::API_URL_ENV);

    // No argument, no environment.
    let mut cpv = Cpv::new();
    let err = cpv.init(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(
        err.message(),
        Some("API Key não foi informada por parâmetro ou por variavel de ambiente.")
    );
    assert!(cpv.api_key().is_none());

    // Environment fallback.
    std::env::set_var(config::API_KEY_ENV, ENV_KEY);
    cpv.init(None).unwrap();
    assert_eq!(cpv.api_key(), Some(ENV_KEY));

    // Explicit argument wins.
    cpv.init(Some(KEY)).unwrap();
    assert_eq!(cpv.api_key(), Some(KEY));

    // Malformed environment key.
    std::env::set_var(config::API_KEY_ENV, "not-a-uuid");
    let err = Cpv::new().init(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), Some("API Key não é válida, informe uma Api Key válida."));

    // Base URL override.
    std::env::set_var(config::API_URL_ENV, "http://localhost:3000/");
    let resolved = cpv_core::ClientConfig::from_env(Some(KEY)).unwrap();
    assert_eq!(resolved.base_url(), "http://localhost:3000");

    std::env::remove_var(config::API_KEY_ENV);
    std::env::remove_var(config::API_URL_ENV);
}
