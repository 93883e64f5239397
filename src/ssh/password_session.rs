use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use russh::keys::*;
use russh::*;
use tracing::debug;

use super::common::{channel_event, close_quietly, default_ssh_config};
use super::ssh_session::{ChannelEvent, ExecChannel, SshConnector, SshSession};

/// Bound for closing a channel whose exec request the server refused.
const REFUSED_CHANNEL_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Client {}

// Only the host key callback is needed for exec channels.
#[async_trait]
impl client::Handler for Client {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// [`SshConnector`] backed by russh.
#[derive(Clone)]
pub struct RusshConnector {
    config: Arc<client::Config>,
}

impl RusshConnector {
    pub fn new(config: client::Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RusshConnector {
    fn default() -> Self {
        Self::new(default_ssh_config())
    }
}

#[async_trait]
impl SshConnector for RusshConnector {
    type Session = PasswordSession;

    async fn connect(&self, _user: &str, host: &str, port: u16) -> Result<PasswordSession> {
        let session = client::connect(self.config.clone(), (host, port), Client {}).await?;
        Ok(PasswordSession { session })
    }
}

pub struct PasswordSession {
    session: client::Handle<Client>,
}

#[async_trait]
impl SshSession for PasswordSession {
    type Channel = RusshChannel;

    async fn authenticate_password(&mut self, user: &str, password: &str) -> Result<bool> {
        Ok(self.session.authenticate_password(user, password).await?)
    }

    async fn open_exec(&mut self, command: &str) -> Result<RusshChannel> {
        let mut channel = self.session.channel_open_session().await?;
        channel.exec(true, command).await?;

        // Anything that shows up before the server answers the exec request
        // is kept for the reader.
        let mut pending = VecDeque::new();
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Success) => break,
                Some(ChannelMsg::Failure) => {
                    close_quietly("refused channel", REFUSED_CHANNEL_CLOSE_TIMEOUT, async {
                        channel.close().await.map_err(anyhow::Error::from)
                    })
                    .await;
                    bail!("server refused to execute the command");
                }
                Some(msg) => pending.extend(channel_event(msg)),
                None => bail!("channel closed before the exec request was answered"),
            }
        }
        debug!(buffered = pending.len(), "exec request accepted");

        Ok(RusshChannel { channel, pending })
    }

    async fn close(&mut self) -> Result<()> {
        self.session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}

pub struct RusshChannel {
    channel: Channel<client::Msg>,
    pending: VecDeque<ChannelEvent>,
}

#[async_trait]
impl ExecChannel for RusshChannel {
    async fn send_stdin(&mut self, data: &[u8]) -> Result<()> {
        self.channel.data(data).await?;
        self.channel.eof().await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        loop {
            let msg = self.channel.wait().await?;
            if let Some(event) = channel_event(msg) {
                return Some(event);
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.channel.close().await?;
        Ok(())
    }
}
