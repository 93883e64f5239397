use thiserror::Error;

/// Every way a single remote execution can fail.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Invalid connection configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to connect to {host}:{port} within timeout {timeout_ms}ms")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout_ms: u64,
    },

    #[error("Failed to connect to {host}:{port} within timeout {timeout_ms}ms: {source}")]
    Connect {
        host: String,
        port: u16,
        timeout_ms: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to authenticate username {username}: no answer within {timeout_ms}ms")]
    AuthTimeout { username: String, timeout_ms: u64 },

    #[error("Failed to authenticate username {username}: password rejected")]
    AuthRejected { username: String },

    #[error("Failed to authenticate username {username}: {source}")]
    Auth {
        username: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Exec channel for `{command}` did not open within {timeout_ms}ms")]
    ChannelOpenTimeout { command: String, timeout_ms: u64 },

    #[error("Failed to open exec channel for `{command}`: {source}")]
    ChannelOpen {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Command `{command}` did not finish within {timeout_ms}ms")]
    ExecTimeout { command: String, timeout_ms: u64 },

    #[error("Blocking execution was called from inside an async runtime; use `execute` instead")]
    NestedRuntime,

    #[error("Failed to start the blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl ExecError {
    /// True for the failures raised after the session was authenticated.
    pub fn is_channel_failure(&self) -> bool {
        matches!(
            self,
            ExecError::ChannelOpenTimeout { .. }
                | ExecError::ChannelOpen { .. }
                | ExecError::ExecTimeout { .. }
        )
    }
}
