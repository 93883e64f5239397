use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use tracing::debug;

use super::connection::{ConnectionConfig, DEFAULT_PORT, DEFAULT_TIMEOUT_MS};
use crate::helper::{get_file_path, CONFIG_FILE};

#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub port: Option<u16>,
    pub user: Option<String>,
    pub timeout_ms: Option<u64>,
    pub exec_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Server {
    pub name: String,
    pub ip: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub exec_timeout_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub servers: Vec<Server>,
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub exec_timeout_ms: Option<u64>,
}

impl Config {
    /// First server whose name matches.
    pub fn find(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|server| server.name == name)
    }

    /// Builds the connection settings for `overrides.host`.
    ///
    /// A host naming a configured server picks up that entry, anything else
    /// is used as the address. `prompt_password` is called with
    /// `(user, host)` only when no password was found.
    pub fn resolve<F>(&self, overrides: Overrides, prompt_password: F) -> Result<ConnectionConfig>
    where
        F: FnOnce(&str, &str) -> Result<String>,
    {
        let server = self.find(&overrides.host);
        if let Some(server) = server {
            debug!(name = %server.name, ip = %server.ip, "host matched a configured server");
        }

        let hostname = server.map_or_else(|| overrides.host.clone(), |s| s.ip.clone());
        let port = overrides
            .port
            .or_else(|| server.and_then(|s| s.port))
            .or(self.defaults.port)
            .unwrap_or(DEFAULT_PORT);
        let username = overrides
            .username
            .or_else(|| server.and_then(|s| s.user.clone()))
            .or_else(|| self.defaults.user.clone())
            .with_context(|| format!("No username given for host {}", overrides.host))?;
        let timeout_ms = overrides
            .timeout_ms
            .or_else(|| server.and_then(|s| s.timeout_ms))
            .or(self.defaults.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let exec_timeout_ms = overrides
            .exec_timeout_ms
            .or_else(|| server.and_then(|s| s.exec_timeout_ms))
            .or(self.defaults.exec_timeout_ms);

        let password = match overrides
            .password
            .or_else(|| server.and_then(|s| s.password.clone()))
        {
            Some(password) => password,
            None => prompt_password(&username, &hostname)?,
        };

        let mut config = ConnectionConfig::new(hostname, username, password)
            .with_port(port)
            .with_timeout(Duration::from_millis(timeout_ms));
        if let Some(ms) = exec_timeout_ms {
            config = config.with_exec_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

pub fn parse_config(config_str: &str) -> Result<Config> {
    // Check if the config file content is empty
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }

    toml::from_str(config_str).context("Failed to parse ssh-exec's config file.")
}

/**
    read toml format config, from `path` when given,
    otherwise from "~/.config/ssh-exec/config.toml"
*/
pub fn read_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = get_file_path(CONFIG_FILE)?;
            // the default file is optional
            if !default_path.exists() {
                debug!(path = ?default_path, "no config file, using built-in defaults");
                return Ok(Config::default());
            }
            default_path
        }
    };

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Unable to read ssh-exec's config file at {:?}", config_path))?;

    parse_config(&config_str)
}
