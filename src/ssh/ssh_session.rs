use anyhow::Result;
use async_trait::async_trait;

/// One event read off an exec channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    ExitStatus(u32),
    Eof,
    Closed,
}

/// The part of an SSH client the executor needs: something that can
/// open a transport session to a host.
///
/// Implementations are injected into [`crate::CommandExecutor`], so tests
/// can swap the real transport for a scripted one.
#[async_trait]
pub trait SshConnector: Send + Sync {
    type Session: SshSession;

    async fn connect(&self, user: &str, host: &str, port: u16) -> Result<Self::Session>;
}

#[async_trait]
impl<C: SshConnector + ?Sized> SshConnector for &C {
    type Session = C::Session;

    async fn connect(&self, user: &str, host: &str, port: u16) -> Result<Self::Session> {
        (**self).connect(user, host, port).await
    }
}

#[async_trait]
pub trait SshSession: Send {
    type Channel: ExecChannel;

    /// Returns `Ok(false)` when the server rejects the credential.
    async fn authenticate_password(&mut self, user: &str, password: &str) -> Result<bool>;

    /// Opens a channel and starts `command` on it. Resolves once the server
    /// has accepted the exec request.
    async fn open_exec(&mut self, command: &str) -> Result<Self::Channel>;

    /// Graceful disconnect.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait ExecChannel: Send {
    /// Writes `data` to the remote stdin, then signals EOF.
    async fn send_stdin(&mut self, data: &[u8]) -> Result<()>;

    /// Next event on the channel, `None` once the channel is gone.
    async fn next_event(&mut self) -> Option<ChannelEvent>;

    /// Closes the channel without waiting for the remote side.
    async fn close(&mut self) -> Result<()>;
}
