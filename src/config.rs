use std::time::Duration;
use serde_derive::{Serialize, Deserialize};

use crate::error::FixtureError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Static access key, secret and session token handed to the backend.
///
/// Emulators accept anything here, the defaults are placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticCredentials {
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub session_token: String,
}

impl StaticCredentials {
    pub fn new(access_key: &str, secret_key: &str, session_token: &str) -> Self {
        StaticCredentials {
            access_key: access_key.to_owned(),
            secret_key: secret_key.to_owned(),
            session_token: session_token.to_owned(),
        }
    }

    /// Empty token means "no session token".
    pub(crate) fn token(&self) -> Option<String> {
        if self.session_token.is_empty() {
            None
        } else {
            Some(self.session_token.clone())
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        StaticCredentials::new("id", "secret", "")
    }
}

/// Everything a [`StreamTestFixture`](crate::StreamTestFixture) needs to reach
/// the backend and the streams it should provision on construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    pub endpoint: String,
    pub region: String,
    #[serde(default)]
    pub credentials: StaticCredentials,
    pub timeout: Duration,
    #[serde(default)]
    pub streams: Vec<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        FixtureConfig {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            region: DEFAULT_REGION.to_owned(),
            credentials: StaticCredentials::default(),
            timeout: DEFAULT_TIMEOUT,
            streams: Vec::new(),
        }
    }
}

impl FixtureConfig {
    pub fn new(endpoint: &str) -> Self {
        FixtureConfig {
            endpoint: endpoint.to_owned(),
            ..FixtureConfig::default()
        }
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = region.to_owned();
        self
    }

    pub fn credentials(mut self, credentials: StaticCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn stream(mut self, name: &str) -> Self {
        self.streams.push(name.to_owned());
        self
    }

    pub fn streams<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams.extend(names.into_iter().map(Into::into));
        self
    }

    /// Checks endpoint, region and stream names before anything touches the network.
    pub fn validate(&self) -> Result<(), FixtureError> {
        validate_endpoint(&self.endpoint)?;

        if self.region.trim().is_empty() {
            return Err(FixtureError::InvalidRegion(self.region.clone()));
        }

        for name in &self.streams {
            validate_stream_name(name)?;
        }

        Ok(())
    }
}

pub(crate) fn validate_stream_name(name: &str) -> Result<(), FixtureError> {
    if name.is_empty() {
        return Err(FixtureError::EmptyStreamName);
    }
    Ok(())
}

fn validate_endpoint(endpoint: &str) -> Result<(), FixtureError> {
    let rest = endpoint
        .strip_prefix("http://")
        .or_else(|| endpoint.strip_prefix("https://"))
        .ok_or_else(|| FixtureError::InvalidEndpoint(endpoint.to_owned()))?;

    let host = rest.split(|c: char| c == '/' || c == '?').next().unwrap_or("");
    if host.is_empty() || host.starts_with(':') || host.contains(char::is_whitespace) {
        return Err(FixtureError::InvalidEndpoint(endpoint.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_emulator() {
        let config = FixtureConfig::default();

        assert_eq!(config.endpoint, "http://localhost:4566");
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.credentials.token(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_collects_streams() {
        let config = FixtureConfig::new("https://kinesis:4566")
            .region("eu-west-1")
            .stream("orders")
            .streams(vec!["payments", "refunds"]);

        assert_eq!(config.streams, vec!["orders", "payments", "refunds"]);
        assert_eq!(config.region, "eu-west-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_endpoints() {
        let endpoints = [
            "",
            "localhost:4566",
            "ftp://kinesis",
            "http://",
            "http://:4566",
            "https:///path",
        ];
        for endpoint in &endpoints {
            match FixtureConfig::new(endpoint).validate() {
                Err(FixtureError::InvalidEndpoint(e)) => assert_eq!(e, *endpoint),
                other => panic!("{} should be rejected, got {:?}", endpoint, other),
            }
        }
    }

    #[test]
    fn rejects_empty_region_and_stream_names() {
        assert!(matches!(
            FixtureConfig::default().region(" ").validate(),
            Err(FixtureError::InvalidRegion(_))
        ));
        assert!(matches!(
            FixtureConfig::default().stream("orders").stream("").validate(),
            Err(FixtureError::EmptyStreamName)
        ));
    }

    #[test]
    fn session_token_is_optional() {
        let creds = StaticCredentials::new("id", "secret", "token");
        assert_eq!(creds.token(), Some("token".to_owned()));
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{
            "endpoint": "http://kinesis:4566",
            "region": "us-west-2",
            "timeout": {"secs": 5, "nanos": 0}
        }"#;
        let config: FixtureConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.credentials, StaticCredentials::default());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.streams.is_empty());
    }
}
