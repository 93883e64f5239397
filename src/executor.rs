use std::collections::BTreeMap;

use tokio::time::timeout;
use tracing::{debug, info_span, warn, Instrument};

use crate::config::connection::{duration_ms, ConnectionConfig};
use crate::error::ExecError;
use crate::result::ExecResult;
use crate::ssh::common::close_quietly;
use crate::ssh::ssh_session::{ChannelEvent, ExecChannel, SshConnector, SshSession};

/// Caller metadata carried along with a call. It only shows up on the
/// call's tracing span.
pub type Headers = BTreeMap<String, String>;

/// Stdin handed to every remote command. Some remote shells hang unless
/// they can read at least one byte.
pub const STDIN_PAYLOAD: &[u8] = &[0];

/// Runs one command per call over a connection it opens and tears down
/// itself. Holds no state besides the injected connector, so one executor
/// can serve concurrent calls.
pub struct CommandExecutor<C> {
    connector: C,
}

impl<C: SshConnector> CommandExecutor<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connects, authenticates with the password, runs `command` and
    /// collects its output.
    ///
    /// Whatever happens after the connection is up, the channel (if one was
    /// opened) is force-closed and the session is disconnected before this
    /// returns.
    pub async fn execute(
        &self,
        headers: &Headers,
        command: &str,
        config: &ConnectionConfig,
    ) -> Result<ExecResult, ExecError> {
        config.validate()?;

        let span = info_span!(
            "ssh_exec",
            host = %config.hostname,
            port = config.port,
            user = %config.username,
            headers = ?headers
        );
        self.run(command, config).instrument(span).await
    }

    /// [`Self::execute`] for synchronous callers. Spins up a private
    /// current-thread runtime; called from inside a runtime it fails with
    /// [`ExecError::NestedRuntime`].
    pub fn execute_blocking(
        &self,
        headers: &Headers,
        command: &str,
        config: &ConnectionConfig,
    ) -> Result<ExecResult, ExecError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ExecError::NestedRuntime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.execute(headers, command, config))
    }

    async fn run(&self, command: &str, config: &ConnectionConfig) -> Result<ExecResult, ExecError> {
        let connect = self
            .connector
            .connect(&config.username, &config.hostname, config.port);
        let mut session = match timeout(config.timeout, connect).await {
            Ok(Ok(session)) => session,
            Ok(Err(source)) => {
                return Err(ExecError::Connect {
                    host: config.hostname.clone(),
                    port: config.port,
                    timeout_ms: config.timeout_ms(),
                    source,
                })
            }
            Err(_) => {
                return Err(ExecError::ConnectTimeout {
                    host: config.hostname.clone(),
                    port: config.port,
                    timeout_ms: config.timeout_ms(),
                })
            }
        };
        debug!("Connected to {}:{}", config.hostname, config.port);

        let mut channel = None;
        let outcome = exchange(&mut session, &mut channel, command, config).await;

        if let Some(mut channel) = channel {
            close_quietly("channel", config.timeout, channel.close()).await;
        }
        close_quietly("session", config.timeout, session.close()).await;

        outcome
    }
}

/// Everything between an established session and cleanup. The opened
/// channel is parked in `channel_slot` so the caller can close it on every
/// path.
async fn exchange<S: SshSession>(
    session: &mut S,
    channel_slot: &mut Option<S::Channel>,
    command: &str,
    config: &ConnectionConfig,
) -> Result<ExecResult, ExecError> {
    debug!(
        "Attempting to authenticate username '{}' using a password identity",
        config.username
    );
    let auth = session.authenticate_password(&config.username, config.password.expose());
    match timeout(config.timeout, auth).await {
        Ok(Ok(true)) => debug!("Authenticated"),
        Ok(Ok(false)) => {
            debug!("Failed to authenticate");
            return Err(ExecError::AuthRejected {
                username: config.username.clone(),
            });
        }
        Ok(Err(source)) => {
            return Err(ExecError::Auth {
                username: config.username.clone(),
                source,
            })
        }
        Err(_) => {
            return Err(ExecError::AuthTimeout {
                username: config.username.clone(),
                timeout_ms: config.timeout_ms(),
            })
        }
    }

    let channel = match timeout(config.timeout, session.open_exec(command)).await {
        Ok(Ok(channel)) => channel_slot.insert(channel),
        Ok(Err(source)) => {
            return Err(ExecError::ChannelOpen {
                command: command.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ExecError::ChannelOpenTimeout {
                command: command.to_string(),
                timeout_ms: config.timeout_ms(),
            })
        }
    };
    debug!("Exec channel open for `{}`", command);

    let exec_timeout = config.effective_exec_timeout();
    let finished = timeout(exec_timeout, async move {
        if let Err(err) = channel.send_stdin(STDIN_PAYLOAD).await {
            // the command may already have exited and closed its stdin
            warn!(error = %err, "Failed to feed stdin");
        }
        collect_output(channel).await
    })
    .await;

    match finished {
        Ok(output) => {
            debug!(
                exit_code = ?output.exit_code,
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "Channel closed"
            );
            Ok(ExecResult::new(
                command,
                output.exit_code,
                output.stdout,
                output.stderr,
            ))
        }
        Err(_) => Err(ExecError::ExecTimeout {
            command: command.to_string(),
            timeout_ms: duration_ms(exec_timeout),
        }),
    }
}

#[derive(Default)]
struct Output {
    exit_code: Option<u32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Drains the channel until it closes.
async fn collect_output<Ch: ExecChannel>(channel: &mut Ch) -> Output {
    let mut output = Output::default();
    while let Some(event) = channel.next_event().await {
        match event {
            ChannelEvent::Stdout(data) => output.stdout.extend_from_slice(&data),
            ChannelEvent::Stderr(data) => output.stderr.extend_from_slice(&data),
            ChannelEvent::ExitStatus(code) => output.exit_code = Some(code),
            ChannelEvent::Eof => {}
            ChannelEvent::Closed => break,
        }
    }
    output
}
