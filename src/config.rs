//! Process Settings
//!
//! Settings are read from the environment once, at process start, and passed down
//! explicitly. Missing required variables and unparsable values are reported as
//! `PercolatorError::Config`.

use crate::error::{PercolatorError, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const ENV_ELASTICSEARCH_HOSTS: &str = "ELASTICSEARCH_HOSTS";
pub const ENV_ELASTICSEARCH_TIMEOUT: &str = "ELASTICSEARCH_TIMEOUT";
pub const ENV_TIKA_URL: &str = "TIKA_URL";
pub const ENV_TIKA_TIMEOUT: &str = "TIKA_TIMEOUT";
pub const ENV_BIND: &str = "PERCOLATOR_BIND";
pub const ENV_DEBUG: &str = "DEBUG";

const DEFAULT_ELASTICSEARCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_TIKA_URL: &str = "http://localhost:9998";
const DEFAULT_TIKA_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct Settings {
    pub elasticsearch_hosts: Vec<String>,
    pub elasticsearch_timeout: Duration,
    pub tika_url: String,
    pub tika_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub debug: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hosts = lookup(ENV_ELASTICSEARCH_HOSTS).ok_or_else(|| {
            PercolatorError::Config(format!(
                "Set the {} environment variable",
                ENV_ELASTICSEARCH_HOSTS
            ))
        })?;
        let elasticsearch_hosts = split_list(&hosts);
        if elasticsearch_hosts.is_empty() {
            return Err(PercolatorError::Config(format!(
                "{} must list at least one host",
                ENV_ELASTICSEARCH_HOSTS
            )));
        }

        let elasticsearch_timeout = Duration::from_secs(int_var(
            &lookup,
            ENV_ELASTICSEARCH_TIMEOUT,
            DEFAULT_ELASTICSEARCH_TIMEOUT_SECS,
        )?);
        let tika_timeout =
            Duration::from_secs(int_var(&lookup, ENV_TIKA_TIMEOUT, DEFAULT_TIKA_TIMEOUT_SECS)?);

        let tika_url = lookup(ENV_TIKA_URL)
            .unwrap_or_else(|| DEFAULT_TIKA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let bind = lookup(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.parse().map_err(|e| {
            PercolatorError::Config(format!("{} is not a socket address: {}", ENV_BIND, e))
        })?;

        let debug = debug_flag(lookup(ENV_DEBUG).as_deref());

        Ok(Self {
            elasticsearch_hosts,
            elasticsearch_timeout,
            tika_url,
            tika_timeout,
            bind_addr,
            debug,
        })
    }
}

/// Whether `DEBUG` asks for verbose logging. Readable before the full settings are.
pub fn debug_from_env() -> bool {
    debug_flag(std::env::var(ENV_DEBUG).ok().as_deref())
}

fn debug_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("yes"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn int_var<F>(lookup: &F, name: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            PercolatorError::Config(format!(
                "Environment variable {} must be an integer or integer-convertible string",
                name
            ))
        }),
    }
}
