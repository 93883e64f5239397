use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::ExecError;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Plaintext password, wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<String> for Password {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for Password {
    fn from(password: &str) -> Self {
        Self::new(password)
    }
}

/// Where and how to run one command.
///
/// `timeout` bounds connect, authentication and channel open separately.
/// `exec_timeout` bounds the wait for the command to finish and falls back
/// to `timeout` when unset.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: Password,
    pub timeout: Duration,
    pub exec_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<Password>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            exec_timeout: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_exec_timeout(mut self, exec_timeout: Duration) -> Self {
        self.exec_timeout = Some(exec_timeout);
        self
    }

    pub fn effective_exec_timeout(&self) -> Duration {
        self.exec_timeout.unwrap_or(self.timeout)
    }

    pub fn timeout_ms(&self) -> u64 {
        duration_ms(self.timeout)
    }

    pub fn validate(&self) -> Result<(), ExecError> {
        if self.hostname.trim().is_empty() {
            return Err(ExecError::InvalidConfig("hostname is empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(ExecError::InvalidConfig("username is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ExecError::InvalidConfig("timeout must be positive".to_string()));
        }
        if self.exec_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ExecError::InvalidConfig(
                "exec timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::new("example.com", "root", "secret");

        assert_eq!(config.port, 22);
        assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(config.effective_exec_timeout(), config.timeout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_exec_timeout_overrides() {
        let config = ConnectionConfig::new("example.com", "root", "secret")
            .with_timeout(Duration::from_secs(2))
            .with_exec_timeout(Duration::from_secs(60));

        assert_eq!(config.effective_exec_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_password_is_redacted() {
        let config = ConnectionConfig::new("example.com", "root", "hunter2");
        let printed = format!("{:?}", config);

        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("Password(***)"));
        assert_eq!(config.password.expose(), "hunter2");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let empty_host = ConnectionConfig::new(" ", "root", "x");
        assert!(matches!(empty_host.validate(), Err(ExecError::InvalidConfig(_))));

        let empty_user = ConnectionConfig::new("h", "", "x");
        assert!(matches!(empty_user.validate(), Err(ExecError::InvalidConfig(_))));

        let zero = ConnectionConfig::new("h", "root", "x").with_timeout(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(ExecError::InvalidConfig(_))));

        let zero_exec = ConnectionConfig::new("h", "root", "x").with_exec_timeout(Duration::ZERO);
        assert!(matches!(zero_exec.validate(), Err(ExecError::InvalidConfig(_))));
    }
}
