//! Environment-based configuration for the registration harness.

use anyhow::Result;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;
use crate::registration::endpoints::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, default_endpoint};
use crate::registration::schema::RegistrationDefaults;

/// Federation service the harness redirects to
pub const DEFAULT_FEDERATION_BASE: &str = "https://trua-headless.com/auth";

/// Client id sent along with federation redirects
pub const DEFAULT_FEDERATION_CLIENT_ID: &str = "test_harness";

/// HTTP server port configuration
#[derive(Clone, Debug)]
pub struct HttpPort(u16);

/// HTTP client timeout configuration
#[derive(Clone, Debug)]
pub struct HttpClientTimeout(Duration);

/// Lifetime added to `iat` when a registration leaves `exp` unset
#[derive(Clone, Debug)]
pub struct TokenLifetime(chrono::Duration);

/// Whether the session cookie carries the `Secure` attribute
#[derive(Clone, Debug)]
pub struct SessionCookieSecure(bool);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub http_port: HttpPort,
    pub http_static_path: String,
    pub http_templates_path: String,
    pub external_base: String,
    pub default_issuer: String,
    pub default_audience: String,
    pub token_lifetime: TokenLifetime,
    pub signup_api_url: Url,
    pub federation_base: Url,
    pub federation_client_id: String,
    pub http_client_timeout: HttpClientTimeout,
    pub user_agent: String,
    pub session_cookie_secure: SessionCookieSecure,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource(lookup);

        let version = version()?;
        let default_user_agent = format!("oidc-harness/{version}");

        let http_port: HttpPort = env.default_env("HTTP_PORT", "8080").try_into()?;
        let http_static_path = env
            .optional_env("HTTP_STATIC_PATH")
            .unwrap_or_else(|| format!("{}/static", env!("CARGO_MANIFEST_DIR")));
        let http_templates_path = env
            .optional_env("HTTP_TEMPLATE_PATH")
            .unwrap_or_else(|| format!("{}/templates", env!("CARGO_MANIFEST_DIR")));

        let external_base = parse_url(
            "EXTERNAL_BASE",
            env.default_env("EXTERNAL_BASE", "http://localhost:8080"),
        )?
        .as_str()
        .trim_end_matches('/')
        .to_string();

        let default_issuer = env.default_env("DEFAULT_ISSUER", DEFAULT_ISSUER);
        parse_url("DEFAULT_ISSUER", default_issuer.clone())?;
        let default_audience = env.default_env("DEFAULT_AUDIENCE", DEFAULT_AUDIENCE);
        let token_lifetime: TokenLifetime = env.default_env("TOKEN_LIFETIME", "1h").try_into()?;

        let signup_api_url = parse_url(
            "SIGNUP_API_URL",
            env.default_env("SIGNUP_API_URL", &format!("{external_base}/api/register")),
        )?;
        let federation_base = parse_url(
            "FEDERATION_BASE",
            env.default_env("FEDERATION_BASE", DEFAULT_FEDERATION_BASE),
        )?;
        let federation_client_id =
            env.default_env("FEDERATION_CLIENT_ID", DEFAULT_FEDERATION_CLIENT_ID);

        let http_client_timeout: HttpClientTimeout =
            env.default_env("HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let user_agent = env.default_env("USER_AGENT", &default_user_agent);
        let session_cookie_secure: SessionCookieSecure =
            env.default_env("SESSION_COOKIE_SECURE", "false").try_into()?;

        Ok(Self {
            version,
            http_port,
            http_static_path,
            http_templates_path,
            external_base,
            default_issuer,
            default_audience,
            token_lifetime,
            signup_api_url,
            federation_base,
            federation_client_id,
            http_client_timeout,
            user_agent,
            session_cookie_secure,
        })
    }

    /// Values the registration form falls back to for empty fields
    pub fn registration_defaults(&self) -> RegistrationDefaults {
        RegistrationDefaults {
            issuer: self.default_issuer.clone(),
            audience: self.default_audience.clone(),
            endpoint: default_endpoint().to_string(),
            token_lifetime: *self.token_lifetime.as_ref(),
        }
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

struct EnvSource<F>(F);

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional_env(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.is_empty())
    }

    fn default_env(&self, name: &str, default_value: &str) -> String {
        self.optional_env(name)
            .unwrap_or_else(|| default_value.to_string())
    }
}

fn parse_url(name: &str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|err| ConfigError::UrlParsingFailed(format!("{name}={value}"), err))
}

fn parse_duration(value: String) -> Result<Duration, ConfigError> {
    duration_str::parse(&value).map_err(|e| ConfigError::DurationParsingFailed(value, e.to_string()))
}

impl TryFrom<String> for HttpPort {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Ok(Self(8080))
        } else {
            value
                .parse::<u16>()
                .map(Self)
                .map_err(|err| ConfigError::PortParsingFailed(err).into())
        }
    }
}

impl AsRef<u16> for HttpPort {
    fn as_ref(&self) -> &u16 {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_duration(value).map(Self)
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl TryFrom<String> for TokenLifetime {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let duration = parse_duration(value)?;
        Ok(Self(chrono::Duration::from_std(duration)?))
    }
}

impl AsRef<chrono::Duration> for TokenLifetime {
    fn as_ref(&self) -> &chrono::Duration {
        &self.0
    }
}

impl TryFrom<String> for SessionCookieSecure {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" => Ok(Self(false)),
            _ => Err(ConfigError::BoolParsingFailed(value).into()),
        }
    }
}

impl AsRef<bool> for SessionCookieSecure {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(*config.http_port.as_ref(), 8080);
        assert_eq!(config.external_base, "http://localhost:8080");
        assert_eq!(config.default_issuer, "https://testharness.com");
        assert_eq!(config.default_audience, "trua_headless");
        assert_eq!(config.token_lifetime.as_ref().num_seconds(), 3600);
        assert_eq!(
            config.signup_api_url.as_str(),
            "http://localhost:8080/api/register"
        );
        assert_eq!(
            config.federation_base.as_str(),
            "https://trua-headless.com/auth"
        );
        assert_eq!(config.federation_client_id, "test_harness");
        assert_eq!(*config.http_client_timeout.as_ref(), Duration::from_secs(10));
        assert!(!*config.session_cookie_secure.as_ref());
        assert!(config.user_agent.starts_with("oidc-harness/"));
        assert!(config.http_templates_path.ends_with("/templates"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_PORT", "9090"),
            ("EXTERNAL_BASE", "https://harness.example.com/"),
            ("TOKEN_LIFETIME", "30m"),
            ("HTTP_CLIENT_TIMEOUT", "2s"),
            ("SESSION_COOKIE_SECURE", "yes"),
            ("FEDERATION_CLIENT_ID", "other_client"),
        ])
        .unwrap();

        assert_eq!(*config.http_port.as_ref(), 9090);
        assert_eq!(config.external_base, "https://harness.example.com");
        assert_eq!(
            config.signup_api_url.as_str(),
            "https://harness.example.com/api/register"
        );
        assert_eq!(config.token_lifetime.as_ref().num_seconds(), 1800);
        assert_eq!(*config.http_client_timeout.as_ref(), Duration::from_secs(2));
        assert!(*config.session_cookie_secure.as_ref());
        assert_eq!(config.federation_client_id, "other_client");
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config_from(&[("HTTP_PORT", ""), ("TOKEN_LIFETIME", "")]).unwrap();
        assert_eq!(*config.http_port.as_ref(), 8080);
        assert_eq!(config.token_lifetime.as_ref().num_seconds(), 3600);
    }

    #[test]
    fn test_invalid_values() {
        let err = config_from(&[("HTTP_PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().starts_with("error-harness-config-1"));

        let err = config_from(&[("TOKEN_LIFETIME", "forever")]).unwrap_err();
        assert!(err.to_string().starts_with("error-harness-config-3"));

        let err = config_from(&[("SESSION_COOKIE_SECURE", "maybe")]).unwrap_err();
        assert!(err.to_string().starts_with("error-harness-config-4"));

        let err = config_from(&[("FEDERATION_BASE", "/relative")]).unwrap_err();
        assert!(err.to_string().starts_with("error-harness-config-5"));
    }

    #[test]
    fn test_registration_defaults() {
        let config = config_from(&[
            ("DEFAULT_ISSUER", "https://issuer.example.com"),
            ("DEFAULT_AUDIENCE", "custom_audience"),
            ("TOKEN_LIFETIME", "2h"),
        ])
        .unwrap();
        let defaults = config.registration_defaults();

        assert_eq!(defaults.issuer, "https://issuer.example.com");
        assert_eq!(defaults.audience, "custom_audience");
        assert_eq!(defaults.endpoint, "http://localhost:5000/register");
        assert_eq!(defaults.token_lifetime.num_seconds(), 7200);
    }
}
