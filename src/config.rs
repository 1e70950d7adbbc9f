//! Runtime configuration read from the environment (and a `.env` file, which
//! `main` loads first).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_CONTACT: &str = "genxoverseasindia1@gmail.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EMAILJS_BASE_URL: &str = "https://api.emailjs.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Identifiers for the email-delivery service used by quote intake.
#[derive(Debug, Clone)]
pub struct EmailJsConfig {
    pub base_url: Url,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Advice credential. Absence is reported per request, not at startup.
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: Url,
    /// When set, chat goes through a deployed `/api/trade` proxy instead.
    pub proxy_url: Option<Url>,
    pub contact_email: String,
    pub request_timeout: Duration,
    pub email: EmailJsConfig,
    pub copy_overrides: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").or_else(|| get("API_KEY"));
        let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let gemini_base_url = parse_url(
            "GEMINI_BASE_URL",
            get("GEMINI_BASE_URL").as_deref().unwrap_or(DEFAULT_GEMINI_BASE_URL),
        )?;
        let proxy_url = get("TRADE_PROXY_URL")
            .map(|raw| parse_url("TRADE_PROXY_URL", &raw))
            .transpose()?;
        let contact_email = get("TRADE_DESK_CONTACT").unwrap_or_else(|| DEFAULT_CONTACT.to_string());

        let request_timeout = match get("ADVICE_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("ADVICE_TIMEOUT_SECS", &raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let email = EmailJsConfig {
            base_url: parse_url(
                "EMAILJS_BASE_URL",
                get("EMAILJS_BASE_URL").as_deref().unwrap_or(DEFAULT_EMAILJS_BASE_URL),
            )?,
            service_id: get("EMAILJS_SERVICE_ID").unwrap_or_else(|| "service_qa14vmm".to_string()),
            template_id: get("EMAILJS_TEMPLATE_ID")
                .unwrap_or_else(|| "template_an37l2o".to_string()),
            public_key: get("EMAILJS_PUBLIC_KEY").unwrap_or_else(|| "2CywtC_SZgoC5qxwD".to_string()),
        };

        Ok(Self {
            api_key,
            model,
            gemini_base_url,
            proxy_url,
            contact_email,
            request_timeout,
            email,
            copy_overrides: get("TRADE_DESK_COPY").map(PathBuf::from),
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.proxy_url.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.contact_email, DEFAULT_CONTACT);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.email.base_url.as_str(), "https://api.emailjs.com/");
    }

    #[test]
    fn test_api_key_falls_back_to_legacy_name() {
        let config = config_from(&[("API_KEY", "legacy-key-123")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("legacy-key-123"));

        let config = config_from(&[("API_KEY", "legacy"), ("GEMINI_API_KEY", "primary-key")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("primary-key"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("TRADE_PROXY_URL", "")]).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_invalid_url_is_reported_with_variable() {
        let err = config_from(&[("TRADE_PROXY_URL", "not a url")]).unwrap_err();
        assert!(err.to_string().starts_with("TRADE_PROXY_URL"));
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(config_from(&[("ADVICE_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("ADVICE_TIMEOUT_SECS", "soon")]).is_err());
        let config = config_from(&[("ADVICE_TIMEOUT_SECS", "15")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }
}
