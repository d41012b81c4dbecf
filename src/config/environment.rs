// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Typed server config read once at startup with logged fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Environment-based configuration.
//!
//! The server is configured entirely through environment variables, read once
//! by [`ServerConfig::from_env`]. Absent detection or datastore credentials
//! do not abort startup — the affected endpoints fail fast per request with a
//! configuration error instead, since the process may legitimately serve only
//! part of its surface.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::providers::datastore::SupabaseConfig;
use crate::providers::detection::RoboflowConfig;

/// Strongly typed log level configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl HttpConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origin list, or `*` for any origin
    pub allowed_origins: String,
}

/// Complete server configuration, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listener
    pub http: HttpConfig,
    /// CORS policy
    pub cors: CorsConfig,
    /// Detection provider credentials and model selection
    pub detection: RoboflowConfig,
    /// Managed datastore credentials
    pub datastore: SupabaseConfig,
    /// Log level default when `RUST_LOG` is unset
    pub log_level: LogLevel,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let detection_defaults = RoboflowConfig::default();

        let config = Self {
            http: HttpConfig {
                host: env_var_or("HTTP_HOST", "0.0.0.0"),
                port: env_parse_or("HTTP_PORT", 8081),
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", "*"),
            },
            detection: RoboflowConfig {
                api_key: env_opt("ROBOFLOW_API_KEY"),
                model: env_var_or("ROBOFLOW_MODEL", &detection_defaults.model),
                base_url: env_var_or("ROBOFLOW_BASE_URL", &detection_defaults.base_url),
                ..detection_defaults
            },
            datastore: SupabaseConfig {
                url: env_opt("SUPABASE_URL"),
                anon_key: env_opt("SUPABASE_ANON_KEY"),
            },
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
        };

        if config.detection.api_key.is_none() {
            warn!("ROBOFLOW_API_KEY not set; detection requests will fail with a config error");
        }
        if config.datastore.url.is_none() || config.datastore.anon_key.is_none() {
            warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set; community endpoints will fail with a config error");
        }

        config
    }

    /// One-line configuration summary for boot logging, without secrets.
    pub fn summary(&self) -> String {
        format!(
            "Morsel API Configuration:\n\
             - Bind: {}\n\
             - Log Level: {}\n\
             - Detection Model: {}\n\
             - Detection Key: {}\n\
             - Datastore: {}\n\
             - CORS Origins: {}",
            self.http.bind_address(),
            self.log_level,
            self.detection.model,
            if self.detection.api_key.is_some() {
                "Configured"
            } else {
                "Missing"
            },
            if self.datastore.url.is_some() && self.datastore.anon_key.is_some() {
                "Configured"
            } else {
                "Missing"
            },
            self.cors.allowed_origins,
        )
    }
}

/// Get environment variable or default value.
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a trimmed, non-empty environment variable.
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, logging and falling back on bad values.
fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {key} value {raw:?}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_applies_defaults() {
        for key in [
            "HTTP_HOST",
            "HTTP_PORT",
            "CORS_ALLOWED_ORIGINS",
            "ROBOFLOW_API_KEY",
            "ROBOFLOW_MODEL",
            "ROBOFLOW_BASE_URL",
            "SUPABASE_URL",
            "SUPABASE_ANON_KEY",
            "LOG_LEVEL",
        ] {
            env::remove_var(key);
        }

        let config = ServerConfig::from_env();
        assert_eq!(config.http.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.cors.allowed_origins, "*");
        assert!(config.detection.api_key.is_none());
        assert_eq!(config.detection.model, "food-detection-ysgqf/2");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        env::set_var("HTTP_PORT", "9000");
        env::set_var("ROBOFLOW_API_KEY", "  test-key  ");
        env::set_var("LOG_LEVEL", "debug");

        let config = ServerConfig::from_env();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.detection.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.log_level, LogLevel::Debug);

        env::remove_var("HTTP_PORT");
        env::remove_var("ROBOFLOW_API_KEY");
        env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn invalid_port_falls_back() {
        env::set_var("HTTP_PORT", "not-a-port");
        let config = ServerConfig::from_env();
        assert_eq!(config.http.port, 8081);
        env::remove_var("HTTP_PORT");
    }

    #[test]
    fn log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("TRACE"), LogLevel::Trace);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }
}
