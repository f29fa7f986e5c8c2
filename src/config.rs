use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::tmdb::{IMAGE_HOST, TMDB_BASE};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_CAPACITY: usize = 128;

/// How a screen presents a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorDisplay {
    /// Failures are only reported: the list shows an empty grid and the detail
    /// screen keeps its loading placeholder.
    #[default]
    Silent,
    /// Failures move the screen into a distinct error state.
    Explicit,
}

#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub image_host: String,
    pub request_timeout: Duration,
    pub error_display: ErrorDisplay,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            image_host: IMAGE_HOST.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            error_display: ErrorDisplay::Silent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base: String,
    /// Zero disables the response cache.
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub screen: ScreenConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("TMDB_API_KEY")
            .filter(|s| !s.trim().is_empty())
            .context("Missing required environment variable: TMDB_API_KEY")?;
        let api_base = lookup("TMDB_API_BASE").unwrap_or_else(|| TMDB_BASE.to_string());
        let image_host = lookup("TMDB_IMAGE_HOST").unwrap_or_else(|| IMAGE_HOST.to_string());
        let timeout_secs: u64 = parse_or(&lookup, "CINEGRID_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let cache_ttl_secs: u64 = parse_or(&lookup, "CINEGRID_CACHE_TTL_SECS", 0)?;
        let cache_capacity: usize =
            parse_or(&lookup, "CINEGRID_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let error_display = match lookup("CINEGRID_SHOW_ERRORS").as_deref().map(str::trim) {
            None | Some("") => ErrorDisplay::Silent,
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => ErrorDisplay::Explicit,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => ErrorDisplay::Silent,
            Some(v) => anyhow::bail!("CINEGRID_SHOW_ERRORS must be true/false, got '{}'", v),
        };
        if timeout_secs == 0 {
            anyhow::bail!("CINEGRID_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            api_key,
            api_base,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity: cache_capacity.max(1),
            screen: ScreenConfig {
                image_host,
                request_timeout: Duration::from_secs(timeout_secs),
                error_display,
            },
        })
    }

    pub fn cache_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_api_key() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
        let err = AppConfig::from_lookup(lookup_from(&[("TMDB_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("TMDB_API_KEY"));
    }

    #[test]
    fn applies_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[("TMDB_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_base, TMDB_BASE);
        assert_eq!(config.screen.image_host, IMAGE_HOST);
        assert_eq!(config.screen.request_timeout, Duration::from_secs(30));
        assert_eq!(config.screen.error_display, ErrorDisplay::Silent);
        assert!(!config.cache_enabled());
    }

    #[test]
    fn reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_KEY", "abc"),
            ("CINEGRID_REQUEST_TIMEOUT_SECS", "5"),
            ("CINEGRID_CACHE_TTL_SECS", "300"),
            ("CINEGRID_CACHE_CAPACITY", "16"),
            ("CINEGRID_SHOW_ERRORS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.screen.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cache_capacity, 16);
        assert_eq!(config.screen.error_display, ErrorDisplay::Explicit);
        assert!(config.cache_enabled());
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_KEY", "abc"),
            ("CINEGRID_CACHE_TTL_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CINEGRID_CACHE_TTL_SECS"));
    }
}
