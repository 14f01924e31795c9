//! Purpose: Client configuration: credentials, API version, endpoint templating.
//! Exports: `ApiVersion`, `ClientConfig`, `DEFAULT_BASE_URL`, env var names.
//! Role: Shared by the library client and the CLI composition root.
//! Invariants: Unknown API versions fall back to `v1` without failing.
//! Invariants: The endpoint is `base + version + "/?accountID=..&secretKey=.."`.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://api.sharpspring.com/pubapi/";
pub const ENV_ACCOUNT_ID: &str = "SHARPSPRING_ACCOUNT_ID";
pub const ENV_SECRET_KEY: &str = "SHARPSPRING_SECRET_KEY";
pub const ENV_API_VERSION: &str = "SHARPSPRING_API_VERSION";
pub const ENV_BASE_URL: &str = "SHARPSPRING_BASE_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ApiVersion {
    /// Timezone arguments follow the company profile setting.
    #[default]
    V1,
    /// Timezone arguments are UTC.
    V1_2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1_2 => "v1.2",
        }
    }

    /// Parses a version string, falling back to `v1` for anything unrecognized.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim() {
            "v1" => ApiVersion::V1,
            "v1.2" => ApiVersion::V1_2,
            other => {
                tracing::debug!(requested = other, "unknown api version, using v1");
                ApiVersion::V1
            }
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    account_id: String,
    secret_key: String,
    api_version: ApiVersion,
    base_url: Url,
    timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account_id", &self.account_id)
            .field("secret_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    account_id: String,
    secret_key: String,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(account_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            secret_key: secret_key.into(),
            api_version: ApiVersion::V1,
            base_url: default_base_url(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads credentials from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let account_id = lookup(ENV_ACCOUNT_ID)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| missing_setting(ENV_ACCOUNT_ID))?;
        let secret_key = lookup(ENV_SECRET_KEY)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| missing_setting(ENV_SECRET_KEY))?;
        let mut config = Self::new(account_id, secret_key);
        if let Some(version) = lookup(ENV_API_VERSION) {
            config = config.with_api_version_str(&version);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.is_empty()) {
            config = config.with_base_url(&base_url)?;
        }
        Ok(config)
    }

    /// Loads a JSON file of the form `{"account_id": .., "secret_key": .., "api_version": ..}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("failed to read config file {}", path.display()))
                .with_source(err)
        })?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid config file {}", path.display()))
                .with_hint("Expected a JSON object with account_id and secret_key.")
                .with_source(err)
        })?;
        let mut config = Self::new(file.account_id, file.secret_key);
        if let Some(version) = file.api_version {
            config = config.with_api_version_str(&version);
        }
        if let Some(base_url) = file.base_url {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(secs) = file.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn with_api_version_str(self, version: &str) -> Self {
        self.with_api_version(ApiVersion::parse_lenient(version))
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, Error> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fully templated endpoint for API calls.
    pub fn endpoint(&self) -> Result<Url, Error> {
        let mut url = self
            .base_url
            .join(&format!("{}/", self.api_version.as_str()))
            .map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message("failed to build endpoint url")
                    .with_source(err)
            })?;
        url.query_pairs_mut()
            .append_pair("accountID", &self.account_id)
            .append_pair("secretKey", &self.secret_key);
        Ok(url)
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url")
}

fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid api base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("api base url must use http or https scheme")
        );
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn missing_setting(name: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("{name} is not set"))
        .with_hint("Pass --account-id and --secret-key, a --config file, or the env vars.")
}
