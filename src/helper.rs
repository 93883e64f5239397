use std::path::PathBuf;
use anyhow::{Context, Result};

pub static CONFIG_FILE: &str = "config.toml";

pub fn get_file_path(file_name: &str) -> Result<PathBuf> {
    let mut config_dir = dirs::home_dir().context("Unable to reach user's home directory.")?;

    config_dir.push(".config/ssh-exec");
    config_dir.push(file_name);
    Ok(config_dir)
}

/// Splits a `KEY=VALUE` pair, as given to `--header`.
pub fn parse_key_value(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got {:?}", pair))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Header name is empty in {:?}", pair);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Maps a remote exit status onto a local process exit code.
pub fn local_exit_code(exit_code: Option<u32>) -> u8 {
    match exit_code {
        Some(code) => u8::try_from(code).unwrap_or(u8::MAX),
        None => 1,
    }
}
