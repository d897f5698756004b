//! Command-line argument source.

use super::field::{Field, Kind};
use super::source::{ConfigSource, Pass};
use super::ConfigError;

/// Prefix marking a token as a flag. One or more may lead a token.
pub const ARG_PREFIX: char = '-';

/// Options a hosting build tool consumes itself, kept by
/// [`drop_args_after_target`] by default.
pub const DEFAULT_PASSTHROUGH: &[&str] = &["-h", "-t", "-v"];

/// Scans an argument list for `-name=value`, `--name value` and bare
/// boolean flags.
///
/// The first element is the program name and is never matched.
#[derive(Debug, Clone, Default)]
pub struct ArgSource {
    args: Vec<String>,
}

impl ArgSource {
    /// Reads the arguments of the current process.
    pub fn process() -> Self {
        Self::new(
            std::env::args_os()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect::<Vec<_>>(),
        )
    }

    /// Uses `args`, program name included.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the value for the first token matching `name`.
    ///
    /// A standalone flag takes the following token as its value unless that
    /// token is itself a flag. For booleans a standalone flag without a value
    /// means `"true"`; otherwise such a flag is ignored and scanning goes on.
    fn find_value(&self, name: &str, is_bool: bool) -> Option<String> {
        let args = self.args.get(1..).unwrap_or_default();

        for (i, token) in args.iter().enumerate() {
            let Some(stripped) = strip_prefix(token) else {
                continue;
            };

            match stripped.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    if key == name {
                        return Some(value.to_string());
                    }
                }
                _ if stripped == name => match args.get(i + 1) {
                    Some(next) if !next.starts_with(ARG_PREFIX) => return Some(next.clone()),
                    _ if is_bool => return Some("true".to_string()),
                    _ => {}
                },
                _ => {}
            }
        }

        None
    }
}

impl ConfigSource for ArgSource {
    fn pass(&self) -> Pass {
        Pass::Args
    }

    fn lookup(&self, field: &Field) -> Result<Option<String>, ConfigError> {
        Ok(self.find_value(&field.arg_name(), *field.kind() == Kind::Bool))
    }
}

fn strip_prefix(token: &str) -> Option<&str> {
    token
        .starts_with(ARG_PREFIX)
        .then(|| token.trim_start_matches(ARG_PREFIX))
}

/// Truncates `args` at the first flag that is not in `passthrough`.
///
/// Used by build-tool hosts so that configuration flags following a target
/// name are not read as further targets. The program name and any leading
/// non-flag tokens are kept.
pub fn drop_args_after_target(args: &[String], passthrough: &[&str]) -> Vec<String> {
    let end = args
        .iter()
        .position(|arg| arg.starts_with(ARG_PREFIX) && !passthrough.contains(&arg.as_str()))
        .unwrap_or(args.len());
    args[..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(args: &[&str]) -> ArgSource {
        ArgSource::new(std::iter::once("cmd").chain(args.iter().copied()))
    }

    #[test]
    fn test_equals_form() {
        let args = source(&["-field1=arg1", "--field2=3"]);
        assert_eq!(args.find_value("field1", false), Some("arg1".into()));
        assert_eq!(args.find_value("field2", false), Some("3".into()));
    }

    #[test]
    fn test_equals_splits_once() {
        let args = source(&["--tags=a=1,b=2"]);
        assert_eq!(args.find_value("tags", false), Some("a=1,b=2".into()));
    }

    #[test]
    fn test_space_form() {
        let args = source(&["-field2", "3", "--field1", "arg1"]);
        assert_eq!(args.find_value("field2", false), Some("3".into()));
        assert_eq!(args.find_value("field1", false), Some("arg1".into()));
    }

    #[test]
    fn test_bare_bool_flag() {
        let args = source(&["--verbose"]);
        assert_eq!(args.find_value("verbose", true), Some("true".into()));
        assert_eq!(args.find_value("verbose", false), None);

        let args = source(&["--verbose", "--other=1"]);
        assert_eq!(args.find_value("verbose", true), Some("true".into()));
    }

    #[test]
    fn test_bool_flag_takes_following_value() {
        let args = source(&["--verbose", "false"]);
        assert_eq!(args.find_value("verbose", true), Some("false".into()));
    }

    #[test]
    fn test_first_match_wins() {
        let args = source(&["--name=first", "--name", "second"]);
        assert_eq!(args.find_value("name", false), Some("first".into()));
    }

    #[test]
    fn test_standalone_without_value_keeps_scanning() {
        let args = source(&["--name", "--name=later"]);
        assert_eq!(args.find_value("name", false), Some("later".into()));
    }

    #[test]
    fn test_program_name_and_plain_tokens_ignored() {
        let args = ArgSource::new(["--name=prog", "name=plain", "target"]);
        assert_eq!(args.find_value("name", false), None);
    }

    #[test]
    fn test_lookup_uses_effective_arg_name() {
        let args = source(&["--maxretries", "4", "--db-url=x"]);
        let field = Field::new("MaxRetries", Kind::Int);
        assert_eq!(args.lookup(&field).unwrap(), Some("4".into()));

        let field = Field::new("database_url", Kind::Text).arg("db-url");
        assert_eq!(args.lookup(&field).unwrap(), Some("x".into()));
    }

    #[test]
    fn test_drop_args_after_target() {
        let args: Vec<String> = ["tool", "-v", "build", "--db-url=x", "-h"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            drop_args_after_target(&args, DEFAULT_PASSTHROUGH),
            vec!["tool", "-v", "build"]
        );

        let args: Vec<String> = vec!["tool".into(), "build".into()];
        assert_eq!(drop_args_after_target(&args, DEFAULT_PASSTHROUGH), args);
    }
}
