//! Key-value file source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::convert::KEY_VALUE_SEPARATOR;
use super::field::Field;
use super::source::{ConfigSource, Pass};
use super::ConfigError;

/// Values read from a flat `key: value` file.
///
/// Each line is split on its first colon. Keys and values are trimmed and one
/// layer of matching single or double quotes is stripped from the value.
/// Lines without a colon are skipped; a repeated key keeps its last value.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    path: PathBuf,
    content: HashMap<String, String>,
}

impl FileSource {
    /// Reads the file at `path`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist. Any other I/O failure is
    /// an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(Self::parse(path, &contents))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, skipping");
                Ok(None)
            }
            Err(e) => Err(ConfigError::FileAccess {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Builds a source from already-loaded file contents.
    pub fn parse(path: impl AsRef<Path>, contents: &str) -> Self {
        let mut content = HashMap::new();
        for (number, line) in contents.lines().enumerate() {
            let Some((key, value)) = line.split_once(KEY_VALUE_SEPARATOR) else {
                tracing::trace!(line = number + 1, "skipping line without separator");
                continue;
            };
            content.insert(key.trim().to_string(), strip_quotes(value.trim()).to_string());
        }

        Self {
            path: path.as_ref().to_path_buf(),
            content,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.content.get(key).map(String::as_str)
    }
}

impl ConfigSource for FileSource {
    fn pass(&self) -> Pass {
        Pass::File
    }

    fn lookup(&self, field: &Field) -> Result<Option<String>, ConfigError> {
        Ok(field
            .file_key()
            .and_then(|key| self.get(key))
            .map(str::to_string))
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
