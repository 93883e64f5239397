use std::future::Future;
use std::time::Duration;

use russh::{client, ChannelMsg};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::ssh_session::ChannelEvent;

/// SSH extended-data type code for stderr (RFC 4254, section 5.2).
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

pub fn default_ssh_config() -> client::Config {
    client::Config {
        // every wait is bounded by the executor, the transport must not cut in first
        inactivity_timeout: None,
        ..<_>::default()
    }
}

/// Maps a russh channel message onto the events the executor cares about.
/// Returns `None` for messages it ignores (window adjusts, signals, ...).
pub fn channel_event(msg: ChannelMsg) -> Option<ChannelEvent> {
    match msg {
        ChannelMsg::Data { data } => Some(ChannelEvent::Stdout(data.to_vec())),
        ChannelMsg::ExtendedData { data, ext } if ext == SSH_EXTENDED_DATA_STDERR => {
            Some(ChannelEvent::Stderr(data.to_vec()))
        }
        ChannelMsg::ExitStatus { exit_status } => Some(ChannelEvent::ExitStatus(exit_status)),
        ChannelMsg::Eof => Some(ChannelEvent::Eof),
        ChannelMsg::Close => Some(ChannelEvent::Closed),
        _ => None,
    }
}

/// Best-effort release: failures and hangs are logged, never returned.
/// Returns whether the close went through.
pub async fn close_quietly<F>(what: &str, limit: Duration, close: F) -> bool
where
    F: Future<Output = anyhow::Result<()>>,
{
    match timeout(limit, close).await {
        Ok(Ok(())) => {
            debug!("Closed {}", what);
            true
        }
        Ok(Err(err)) => {
            warn!(error = %err, "Failed to close {}", what);
            false
        }
        Err(_) => {
            warn!("Timed out closing {}", what);
            false
        }
    }
}
