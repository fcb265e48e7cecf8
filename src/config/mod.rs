/*!
 * Configuration Module
 * Startup settings merged from defaults, environment and CLI flags
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown flag: {0}")]
    UnknownFlag(String),
}

/// Server configuration
///
/// Merge order is defaults, then `WEBDESK_*` environment variables, then
/// CLI flags; the last writer wins per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub hostname: String,
    pub port: u16,
    pub debug: bool,
    /// Log filter handed to the logger at startup (`error` .. `trace`)
    pub loglevel: String,
    /// Installed packages directory
    pub nodedir: PathBuf,
    /// Document root served to clients
    pub rootdir: PathBuf,
    /// Backend working directory (settings files, mounts)
    pub serverdir: PathBuf,
    /// Default timeout for proxied outbound requests
    pub curl_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8000,
            debug: false,
            loglevel: "info".to_string(),
            nodedir: PathBuf::from("packages"),
            rootdir: PathBuf::from("dist"),
            serverdir: PathBuf::from("server"),
            curl_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Defaults merged with the process environment and arguments
    pub fn load() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.merge_env(std::env::vars())?;
        config.merge_args(std::env::args().skip(1))?;
        Ok(config)
    }

    /// Apply `WEBDESK_*` environment overrides
    pub fn merge_env<I>(&mut self, vars: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "WEBDESK_HOSTNAME" => self.hostname = value,
                "WEBDESK_PORT" => self.port = parse(&key, &value)?,
                "WEBDESK_DEBUG" => self.debug = parse_bool(&key, &value)?,
                "WEBDESK_LOGLEVEL" => self.loglevel = value,
                "WEBDESK_NODEDIR" => self.nodedir = PathBuf::from(value),
                "WEBDESK_ROOTDIR" => self.rootdir = PathBuf::from(value),
                "WEBDESK_SERVERDIR" => self.serverdir = PathBuf::from(value),
                "WEBDESK_CURL_TIMEOUT" => self.curl_timeout_secs = parse(&key, &value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply CLI flag overrides; unknown flags fail fast
    pub fn merge_args<I>(&mut self, args: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        for arg in args {
            let (flag, value) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg.clone(), None),
            };
            match (flag.as_str(), value) {
                ("--debug", None) => self.debug = true,
                ("--hostname", Some(v)) => self.hostname = v,
                ("--port", Some(v)) => self.port = parse(&flag, &v)?,
                ("--loglevel", Some(v)) => self.loglevel = v,
                ("--nodedir", Some(v)) => self.nodedir = PathBuf::from(v),
                ("--rootdir", Some(v)) => self.rootdir = PathBuf::from(v),
                ("--serverdir", Some(v)) => self.serverdir = PathBuf::from(v),
                ("--curl-timeout", Some(v)) => self.curl_timeout_secs = parse(&flag, &v)?,
                _ => return Err(ConfigError::UnknownFlag(arg)),
            }
        }
        debug!("Configuration merged: {}:{}", self.hostname, self.port);
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
