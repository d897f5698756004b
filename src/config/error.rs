use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The field declarations do not describe a usable record.
    #[error("invalid field declarations: {0}")]
    Shape(String),

    #[error("failed to read config file '{path}': {source}")]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to convert field '{field}' from {raw:?}: {reason}")]
    Conversion {
        field: String,
        raw: String,
        reason: String,
    },

    #[error("invalid map value for field '{field}': {token}")]
    MapFormat { field: String, token: String },

    #[error("field '{field}' has unsupported type {kind}")]
    UnsupportedType { field: String, kind: String },

    #[error("required parameter not set: {0}")]
    RequiredNotSet(String),

    /// Names the missing dependency; `field` is the field that declared it.
    #[error("dependent parameter not set: {dependency}")]
    DependsNotSet { dependency: String, field: String },

    /// Help was requested on the command line. Carries the rendered usage text.
    #[error("help requested")]
    HelpRequested(String),
}

/// A conversion failure before the field it belongs to is known.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConvertError {
    Invalid { raw: String, reason: String },
    MapFormat(String),
    Unsupported(String),
}

impl ConvertError {
    pub(crate) fn invalid(raw: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            raw: raw.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn for_field(self, field: &str) -> ConfigError {
        let field = field.to_string();
        match self {
            Self::Invalid { raw, reason } => ConfigError::Conversion { field, raw, reason },
            Self::MapFormat(token) => ConfigError::MapFormat { field, token },
            Self::Unsupported(kind) => ConfigError::UnsupportedType { field, kind },
        }
    }
}
