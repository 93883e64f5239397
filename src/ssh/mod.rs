pub mod common;
pub mod password_session;
pub mod ssh_session;

pub use password_session::RusshConnector;
pub use ssh_session::{ChannelEvent, ExecChannel, SshConnector, SshSession};
