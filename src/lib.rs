pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod helper;
pub mod result;
pub mod ssh;

pub use config::{ConnectionConfig, Password};
pub use error::ExecError;
pub use executor::{CommandExecutor, Headers};
pub use result::ExecResult;
pub use ssh::{ChannelEvent, ExecChannel, RusshConnector, SshConnector, SshSession};
