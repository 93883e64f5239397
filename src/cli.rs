use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Overrides;
use crate::executor::Headers;
use crate::helper::parse_key_value;

/// Run one command on a remote host over SSH.
#[derive(Parser, Debug)]
#[command(name = "ssh-exec", version, about)]
pub struct Cli {
    /// Server name from the config file, or an address
    #[arg(index = 1)]
    pub host: String,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long, short)]
    pub username: Option<String>,

    /// Prompted for when neither given here nor in the config file
    #[arg(long, short)]
    pub password: Option<String>,

    /// Bound for connect, authentication and channel open, each
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Bound for the command to finish; defaults to --timeout-ms
    #[arg(long)]
    pub exec_timeout_ms: Option<u64>,

    /// Config file, instead of ~/.config/ssh-exec/config.toml
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// KEY=VALUE metadata attached to the call's log span
    #[arg(long = "header", short = 'H', value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(index = 2, num_args = 1.., required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    pub fn headers(&self) -> Headers {
        self.headers.iter().cloned().collect()
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            timeout_ms: self.timeout_ms,
            exec_timeout_ms: self.exec_timeout_ms,
        }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
