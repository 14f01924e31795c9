//! Purpose: Config file loading from disk.
//! Exports: None (integration test module).
//! Role: Validate the JSON config format and its failure modes.
//! Invariants: Files live in per-test temp directories.

use sharpspring::api::{ApiVersion, ClientConfig, ErrorKind};
use std::time::Duration;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

#[test]
fn loads_credentials_version_and_base_url() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sharpspring.json");
    std::fs::write(
        &path,
        r#"{
            "account_id": "ACC",
            "secret_key": "SECRET",
            "api_version": "v1.2",
            "base_url": "https://sandbox.example.com/pubapi",
            "timeout_secs": 12
        }"#,
    )?;

    let config = ClientConfig::from_json_file(&path)?;

    assert_eq!(config.account_id(), "ACC");
    assert_eq!(config.api_version(), ApiVersion::V1_2);
    assert_eq!(config.timeout(), Duration::from_secs(12));
    assert_eq!(
        config.endpoint()?.as_str(),
        "https://sandbox.example.com/pubapi/v1.2/?accountID=ACC&secretKey=SECRET"
    );
    Ok(())
}

#[test]
fn unknown_version_in_file_falls_back_to_v1() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"account_id": "a", "secret_key": "b", "api_version": "v3"}"#,
    )?;

    let config = ClientConfig::from_json_file(&path)?;
    assert_eq!(config.api_version(), ApiVersion::V1);
    Ok(())
}

#[test]
fn missing_secret_is_usage_error() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"account_id": "a"}"#)?;

    let err = ClientConfig::from_json_file(&path).expect_err("missing secret");
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(err.hint().is_some());
    Ok(())
}

#[test]
fn missing_file_is_usage_error() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let err = ClientConfig::from_json_file(dir.path().join("absent.json"))
        .expect_err("absent file");
    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(std::error::Error::source(&err).is_some());
    Ok(())
}

#[test]
fn secret_is_redacted_from_debug_output() {
    let config = ClientConfig::new("ACC", "very-secret");
    let rendered = format!("{config:?}");
    assert!(rendered.contains("ACC"));
    assert!(!rendered.contains("very-secret"));
}
