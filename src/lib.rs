pub mod config;

pub use config::{resolve, ConfigError, Configurable, Field, Kind, Loader, Resolution, Schema};
