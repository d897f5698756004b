use std::fmt;

use super::field::Field;
use super::ConfigError;

/// One of the ordered value-sourcing stages. Later passes override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {
    Default,
    File,
    Env,
    Args,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Default => "default",
            Pass::File => "file",
            Pass::Env => "env",
            Pass::Args => "args",
        })
    }
}

/// A source of raw field values for a single pass.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn pass(&self) -> Pass;

    /// Returns the raw text this source supplies for `field`, if any.
    fn lookup(&self, field: &Field) -> Result<Option<String>, ConfigError>;
}

/// Supplies each field's declared default literal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
    fn pass(&self) -> Pass {
        Pass::Default
    }

    fn lookup(&self, field: &Field) -> Result<Option<String>, ConfigError> {
        Ok(field.default_literal().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::field::Kind;

    #[test]
    fn test_default_source() {
        let field = Field::new("count", Kind::Int).default("3");
        assert_eq!(DefaultSource.lookup(&field).unwrap(), Some("3".into()));

        let field = Field::new("count", Kind::Int).default("");
        assert_eq!(DefaultSource.lookup(&field).unwrap(), None);
    }

    #[test]
    fn test_pass_order() {
        assert!(Pass::Default < Pass::File);
        assert!(Pass::File < Pass::Env);
        assert!(Pass::Env < Pass::Args);
    }
}
