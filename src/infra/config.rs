//! Centralized configuration (environment variables + defaults).

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ITEMS_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_USERS_BIND_ADDR: &str = "0.0.0.0:3001";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Which remote store implementation the binaries talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    /// In-process store, for local runs without a backend.
    Memory,
}

/// Remote endpoint and credentials (required for the `supabase` backend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: StoreBackend,
    pub supabase: Option<SupabaseSettings>,
    pub items_table: String,
    pub users_table: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
    pub log_level: String,
    pub json_logs: bool,
}

impl Settings {
    /// Reads settings from the process environment, loading `.env` first.
    pub fn from_env(default_bind_addr: &str) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok(), default_bind_addr)
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, default_bind_addr: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("supabase") => StoreBackend::Supabase,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected `supabase` or `memory`".to_string(),
                })
            }
        };

        let supabase = match backend {
            StoreBackend::Supabase => Some(SupabaseSettings {
                url: var("SUPABASE_URL")
                    .ok_or(ConfigError::Missing("SUPABASE_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                key: var("SUPABASE_KEY").ok_or(ConfigError::Missing("SUPABASE_KEY"))?,
            }),
            StoreBackend::Memory => None,
        };

        let bind = var("BIND_ADDR").unwrap_or_else(|| default_bind_addr.to_string());
        let bind_addr = bind.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind.clone(),
            reason: e.to_string(),
        })?;

        let timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => 10,
        };

        Ok(Self {
            backend,
            supabase,
            items_table: var("ITEMS_TABLE").unwrap_or_else(|| "items".to_string()),
            users_table: var("USERS_TABLE").unwrap_or_else(|| "users".to_string()),
            bind_addr,
            request_timeout: Duration::from_secs(timeout_secs.max(1)),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            json_logs: var("LOG_JSON").is_some_and(|v| v == "true" || v == "1"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn supabase_backend_requires_credentials() {
        let err = Settings::from_lookup(lookup(&[]), DEFAULT_ITEMS_BIND_ADDR).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_URL"));

        let err = Settings::from_lookup(
            lookup(&[("SUPABASE_URL", "https://x.supabase.co")]),
            DEFAULT_ITEMS_BIND_ADDR,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("SUPABASE_KEY"));
    }

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("SUPABASE_URL", "https://x.supabase.co/"),
                ("SUPABASE_KEY", "anon"),
            ]),
            DEFAULT_USERS_BIND_ADDR,
        )
        .unwrap();
        assert_eq!(settings.backend, StoreBackend::Supabase);
        assert_eq!(settings.supabase.unwrap().url, "https://x.supabase.co");
        assert_eq!(settings.items_table, "items");
        assert_eq!(settings.users_table, "users");
        assert_eq!(settings.bind_addr.port(), 3001);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert!(!settings.json_logs);
    }

    #[test]
    fn memory_backend_and_overrides() {
        let settings = Settings::from_lookup(
            lookup(&[
                ("STORE_BACKEND", "memory"),
                ("ITEMS_TABLE", "products"),
                ("BIND_ADDR", "127.0.0.1:8080"),
                ("REQUEST_TIMEOUT_SECS", "3"),
                ("LOG_JSON", "true"),
            ]),
            DEFAULT_ITEMS_BIND_ADDR,
        )
        .unwrap();
        assert_eq!(settings.backend, StoreBackend::Memory);
        assert!(settings.supabase.is_none());
        assert_eq!(settings.items_table, "products");
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(settings.request_timeout, Duration::from_secs(3));
        assert!(settings.json_logs);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = Settings::from_lookup(
            lookup(&[("STORE_BACKEND", "memory"), ("REQUEST_TIMEOUT_SECS", "soon")]),
            DEFAULT_ITEMS_BIND_ADDR,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "REQUEST_TIMEOUT_SECS", .. }));

        let err = Settings::from_lookup(lookup(&[("STORE_BACKEND", "mysql")]), DEFAULT_ITEMS_BIND_ADDR)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORE_BACKEND", .. }));
    }
}
