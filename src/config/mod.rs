pub mod app_config;
pub mod connection;

pub use app_config::{read_config, Config, Overrides};
pub use connection::{ConnectionConfig, Password};
