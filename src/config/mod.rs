//! Configuration resolution from defaults, files, environment and arguments.

mod args;
mod builder;
mod convert;
mod env;
mod error;
mod field;
mod file;
mod source;
mod usage;
mod validate;

pub use args::{drop_args_after_target, ArgSource, ARG_PREFIX, DEFAULT_PASSTHROUGH};
pub use builder::{resolve, Loader, ReloadPolicy};
pub use convert::{ITEM_SEPARATOR, KEY_VALUE_SEPARATOR};
pub use env::EnvSource;
pub use error::ConfigError;
pub use field::{Configurable, Field, Kind, Schema};
pub use file::FileSource;
pub use source::{ConfigSource, DefaultSource, Pass};
pub use usage::{help_requested, render_usage};
pub use validate::{check_required_and_depends, Resolution};
