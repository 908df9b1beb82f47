// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `7277` |
//! | `DATA_DIR` | Root directory for node storage | `./data` |
//! | `SUBDOMAIN` | Allyabase subdomain for service URLs | `dev` |
//! | `LOCALHOST` | Use local service ports when set | unset |
//! | `FOUNT_URL` | Ledger service base URL | derived |
//! | `BDO_URL` | Document store base URL | derived |
//! | `ALLOWED_TIME_DIFFERENCE` | Request skew window (ms) | `300000` |
//! | `BOOTSTRAP_RETRY_MS` | Delay between bootstrap attempts | `2000` |
//! | `OUTBOUND_TIMEOUT_SECS` | Timeout for every outbound call | `15` |
//! | `STOP_NAME` | This node's stop name in spellbooks | `aretha` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::storage::paths::DATA_ROOT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the storage directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const SUBDOMAIN_ENV: &str = "SUBDOMAIN";
pub const LOCALHOST_ENV: &str = "LOCALHOST";
pub const FOUNT_URL_ENV: &str = "FOUNT_URL";
pub const BDO_URL_ENV: &str = "BDO_URL";
pub const ALLOWED_TIME_DIFFERENCE_ENV: &str = "ALLOWED_TIME_DIFFERENCE";
pub const BOOTSTRAP_RETRY_MS_ENV: &str = "BOOTSTRAP_RETRY_MS";
pub const OUTBOUND_TIMEOUT_SECS_ENV: &str = "OUTBOUND_TIMEOUT_SECS";
pub const STOP_NAME_ENV: &str = "STOP_NAME";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7277;
pub const DEFAULT_SUBDOMAIN: &str = "dev";
pub const DEFAULT_ALLOWED_TIME_DIFFERENCE_MS: i64 = 300_000;
pub const DEFAULT_BOOTSTRAP_RETRY_MS: u64 = 2_000;
pub const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_STOP_NAME: &str = "aretha";

const LOCAL_FOUNT_URL: &str = "http://localhost:3006/";
const LOCAL_BDO_URL: &str = "http://localhost:3003/";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Node configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub subdomain: String,
    pub fount_url: String,
    pub bdo_url: String,
    pub allowed_time_difference_ms: i64,
    pub bootstrap_retry: Duration,
    pub outbound_timeout: Duration,
    pub stop_name: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DATA_ROOT),
            subdomain: DEFAULT_SUBDOMAIN.to_string(),
            fount_url: remote_service_url(DEFAULT_SUBDOMAIN, "fount"),
            bdo_url: remote_service_url(DEFAULT_SUBDOMAIN, "bdo"),
            allowed_time_difference_ms: DEFAULT_ALLOWED_TIME_DIFFERENCE_MS,
            bootstrap_retry: Duration::from_millis(DEFAULT_BOOTSTRAP_RETRY_MS),
            outbound_timeout: Duration::from_secs(DEFAULT_OUTBOUND_TIMEOUT_SECS),
            stop_name: DEFAULT_STOP_NAME.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let subdomain = var(SUBDOMAIN_ENV).unwrap_or_else(|| DEFAULT_SUBDOMAIN.to_string());
        let localhost = var(LOCALHOST_ENV).is_some();
        let service_url = |explicit: &str, name: &str, local: &str| {
            var(explicit).unwrap_or_else(|| {
                if localhost {
                    local.to_string()
                } else {
                    remote_service_url(&subdomain, name)
                }
            })
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or_default(PORT_ENV, var(PORT_ENV), DEFAULT_PORT),
            data_dir: var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DATA_ROOT)),
            fount_url: service_url(FOUNT_URL_ENV, "fount", LOCAL_FOUNT_URL),
            bdo_url: service_url(BDO_URL_ENV, "bdo", LOCAL_BDO_URL),
            allowed_time_difference_ms: parse_or_default(
                ALLOWED_TIME_DIFFERENCE_ENV,
                var(ALLOWED_TIME_DIFFERENCE_ENV),
                DEFAULT_ALLOWED_TIME_DIFFERENCE_MS,
            ),
            bootstrap_retry: Duration::from_millis(parse_or_default(
                BOOTSTRAP_RETRY_MS_ENV,
                var(BOOTSTRAP_RETRY_MS_ENV),
                DEFAULT_BOOTSTRAP_RETRY_MS,
            )),
            outbound_timeout: Duration::from_secs(parse_or_default(
                OUTBOUND_TIMEOUT_SECS_ENV,
                var(OUTBOUND_TIMEOUT_SECS_ENV),
                DEFAULT_OUTBOUND_TIMEOUT_SECS,
            )),
            stop_name: var(STOP_NAME_ENV).unwrap_or_else(|| DEFAULT_STOP_NAME.to_string()),
            log_format,
            subdomain,
        }
    }

    /// Point the node at explicit ledger and document-store URLs.
    pub fn with_service_urls(
        mut self,
        fount_url: impl Into<String>,
        bdo_url: impl Into<String>,
    ) -> Self {
        self.fount_url = fount_url.into();
        self.bdo_url = bdo_url.into();
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn remote_service_url(subdomain: &str, service: &str) -> String {
    format!("https://{subdomain}.{service}.allyabase.com/")
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                variable = name,
                value = %raw,
                default = %default,
                "Invalid value, using default"
            );
            default
        }),
    }
}
