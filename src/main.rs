use std::io::{self, Write};
use std::panic;
use std::process::ExitCode;

use anyhow::{Context, Result};
use backtrace::Backtrace;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ssh_exec_lib::cli::Cli;
use ssh_exec_lib::config::read_config;
use ssh_exec_lib::helper::local_exit_code;
use ssh_exec_lib::{CommandExecutor, RusshConnector};

/// Exit code for local failures, as ssh(1) does.
const EXIT_LOCAL_FAILURE: u8 = 255;

fn main() -> ExitCode {
    set_panic_handlers();
    let cli = Cli::parse();
    init_tracing(cli.log_filter());

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("ssh-exec: {:#}", e);
            ExitCode::from(EXIT_LOCAL_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = read_config(cli.config.as_deref())?;
    let connection = config.resolve(cli.overrides(), prompt_password)?;

    let executor = CommandExecutor::new(RusshConnector::default());
    let result = executor.execute_blocking(&cli.headers(), &cli.command_line(), &connection)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(result.stdout())?;
    stdout.flush()?;
    let mut stderr = io::stderr().lock();
    stderr.write_all(result.stderr())?;
    stderr.flush()?;

    Ok(local_exit_code(result.exit_code()))
}

fn prompt_password(user: &str, host: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}@{}'s password: ", user, host))
        .context("Unable to read password from the terminal")
}

// SSH_EXEC_LOG wins over -v
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env("SSH_EXEC_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

// handle all panic here
fn set_panic_handlers() {
    panic::set_hook(Box::new(|e| {
        let backtrace = Backtrace::new();
        eprintln!("\nssh-exec was closed due to an unexpected panic with the following info:\n\n{:?}\ntrace:\n{:?}", e, backtrace);
    }));
}
