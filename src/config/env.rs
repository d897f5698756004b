use std::collections::HashMap;

use super::field::Field;
use super::source::{ConfigSource, Pass};
use super::ConfigError;

/// Looks up each field's declared environment variable by exact name.
///
/// A variable that is present counts as set, even when empty. Without an
/// override map the process environment is read.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    /// Reads from the process environment.
    pub fn process() -> Self {
        Self { vars: None }
    }

    /// Reads from the given variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn var(&self, field: &Field, name: &str) -> Result<Option<String>, ConfigError> {
        if let Some(vars) = &self.vars {
            return Ok(vars.get(name).cloned());
        }

        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(raw)) => Err(ConfigError::Conversion {
                field: field.name().to_string(),
                raw: raw.to_string_lossy().into_owned(),
                reason: format!("environment variable {name} is not valid unicode"),
            }),
        }
    }
}

impl ConfigSource for EnvSource {
    fn pass(&self) -> Pass {
        Pass::Env
    }

    fn lookup(&self, field: &Field) -> Result<Option<String>, ConfigError> {
        match field.env_name() {
            Some(name) => self.var(field, name),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::field::Kind;
    use serial_test::serial;

    #[test]
    fn test_override_map() {
        let source = EnvSource::from_vars([("DB_URL", "postgres://db"), ("EMPTY", "")]);

        let field = Field::new("db_url", Kind::Text).env("DB_URL");
        assert_eq!(source.lookup(&field).unwrap(), Some("postgres://db".into()));

        let field = Field::new("empty", Kind::Text).env("EMPTY");
        assert_eq!(source.lookup(&field).unwrap(), Some(String::new()));

        let field = Field::new("missing", Kind::Text).env("MISSING");
        assert_eq!(source.lookup(&field).unwrap(), None);
    }

    #[test]
    fn test_field_without_env_name() {
        let source = EnvSource::from_vars([("plain", "value")]);
        let field = Field::new("plain", Kind::Text);
        assert_eq!(source.lookup(&field).unwrap(), None);
    }

    #[test]
    #[serial]
    fn test_process_environment() {
        std::env::set_var("DRAGON_CFG_ENV_TEST", "from-process");
        let field = Field::new("value", Kind::Text).env("DRAGON_CFG_ENV_TEST");

        let found = EnvSource::process().lookup(&field).unwrap();
        std::env::remove_var("DRAGON_CFG_ENV_TEST");

        assert_eq!(found, Some("from-process".into()));
        assert_eq!(EnvSource::process().lookup(&field).unwrap(), None);
    }
}
