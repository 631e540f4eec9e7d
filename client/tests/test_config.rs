//! Tests for client configuration loading

use offer_billing_client::config::{ENV_API_URL, ENV_TIMEOUT_SECS};
use offer_billing_client::{ClientConfig, ConfigError, ReqwestTransport};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("client.toml");
    std::fs::write(
        &path,
        "api_url = \"https://billing.example.com/api/v1\"\ntimeout_secs = 15\n",
    )
    .unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    assert_eq!(config.api_url, "https://billing.example.com/api/v1");
    assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    assert_eq!(
        config.base_url().unwrap().as_str(),
        "https://billing.example.com/api/v1/"
    );
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { path: ref p, .. } if *p == path));
}

#[test]
fn test_unknown_field_rejected() {
    let err = ClientConfig::from_toml_str("api_url = \"https://x.test\"\nretries = 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_timeout_in_file_rejected() {
    let err = ClientConfig::from_toml_str("api_url = \"https://x.test\"\ntimeout_secs = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTimeout(_)));
}

#[test]
fn test_from_lookup() {
    let config = ClientConfig::from_lookup(lookup(&[
        (ENV_API_URL, "  http://localhost:3000/api  "),
        (ENV_TIMEOUT_SECS, "20"),
    ]))
    .unwrap();
    assert_eq!(config.api_url, "http://localhost:3000/api");
    assert_eq!(config.timeout_secs, Some(20));
}

#[test]
fn test_from_lookup_without_timeout() {
    let config = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "https://x.test")])).unwrap();
    assert_eq!(config.timeout(), None);
}

#[test]
fn test_missing_api_url() {
    let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiUrl));

    let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "   ")])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingApiUrl));
}

#[test]
fn test_bad_timeout() {
    for raw in ["0", "-5", "soon", ""] {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://x.test"),
            (ENV_TIMEOUT_SECS, raw),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(ref v) if v == raw), "{raw:?}");
    }
}

#[test]
fn test_invalid_urls() {
    let err = ClientConfig::new("not a url").validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));

    let err = ClientConfig::new("ftp://files.example.com").validate().unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedScheme(ref s) if s == "ftp"));
}

#[test]
fn test_reqwest_transport_from_config() {
    let config = ClientConfig::new("https://billing.example.com/api").with_timeout_secs(5);
    let transport = ReqwestTransport::new(&config).unwrap();
    assert_eq!(
        transport.base_url().as_str(),
        "https://billing.example.com/api/"
    );

    assert!(ReqwestTransport::new(&ClientConfig::new("mailto:ops@example.com")).is_err());
}
