use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::args::ArgSource;
use super::convert::convert_value;
use super::env::EnvSource;
use super::field::{Configurable, Schema};
use super::file::FileSource;
use super::source::{ConfigSource, DefaultSource};
use super::usage::{help_requested, render_usage};
use super::validate::{check_required_and_depends, Resolution};
use super::ConfigError;

/// What [`Loader::load`] does once a load has already succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Reset set-tracking and run every pass again.
    #[default]
    Always,
    /// Return the first successful [`Resolution`] without touching the record.
    Once,
}

/// Populates a record from defaults, a key-value file, environment variables
/// and command-line arguments, in that order of increasing precedence.
///
/// Each pass converts the raw text it finds to the field's declared
/// [`Kind`](super::Kind) and overwrites whatever an earlier pass assigned.
/// Once all passes ran, required fields and declared dependencies are checked.
///
/// ## Example
///
/// ```no_run
/// use dragon_cfg::{Configurable, Field, Kind, Loader, Schema};
///
/// #[derive(Default)]
/// struct AppConfig {
///     database_url: String,
///     max_retries: i64,
/// }
///
/// impl Configurable for AppConfig {
///     fn schema() -> Schema<Self> {
///         Schema::<Self>::new()
///             .field(
///                 Field::new("database_url", Kind::Text)
///                     .file("dbURL")
///                     .env("DB_URL")
///                     .arg("db-url")
///                     .required(),
///                 |c| &mut c.database_url,
///             )
///             .field(Field::new("max_retries", Kind::Int).default("3"), |c| {
///                 &mut c.max_retries
///             })
///     }
/// }
///
/// let mut config = AppConfig::default();
/// Loader::builder()
///     .with_file("app.config")
///     .load(&mut config)?;
/// # Ok::<(), dragon_cfg::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "a loader does nothing until .load() is called"]
pub struct Loader {
    file: Option<PathBuf>,
    args: Option<Vec<String>>,
    env: Option<HashMap<String, String>>,
    policy: ReloadPolicy,
    ignore_help: bool,
    loaded: Option<Resolution>,
}

impl Loader {
    /// Creates a loader reading the process arguments and environment.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the key-value file read by the file pass.
    ///
    /// A missing file is skipped. An empty path disables the file pass.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Uses `args` (program name first) instead of the process arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Uses `vars` instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn reload_policy(mut self, policy: ReloadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve even when `-help`/`--help` is among the arguments, instead of
    /// returning [`ConfigError::HelpRequested`].
    pub fn ignore_help(mut self) -> Self {
        self.ignore_help = true;
        self
    }

    /// Whether a load has succeeded on this loader.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Resolves `record` in place.
    ///
    /// Only fields some pass supplied are assigned; every other member keeps
    /// its value. On a conversion or I/O failure the record is left untouched.
    /// A failed required/dependency check happens after the resolved values
    /// were written back.
    pub fn load<T: Configurable>(&mut self, record: &mut T) -> Result<Resolution, ConfigError> {
        if self.policy == ReloadPolicy::Once {
            if let Some(resolution) = &self.loaded {
                return Ok(resolution.clone());
            }
        }

        let args = match &self.args {
            Some(args) => ArgSource::new(args.iter().cloned()),
            None => ArgSource::process(),
        };
        let env = match &self.env {
            Some(vars) => EnvSource::from_vars(vars.clone()),
            None => EnvSource::process(),
        };
        let schema = T::schema();

        if !self.ignore_help && help_requested(args.args()) {
            let program = args.args().first().map(String::as_str).unwrap_or_default();
            return Err(ConfigError::HelpRequested(render_usage(program, &schema)));
        }

        let resolution = resolve_with(record, &schema, self.file.as_deref(), &env, &args)?;
        self.loaded = Some(resolution.clone());
        Ok(resolution)
    }
}

/// Resolves `record` from defaults, `file`, the process environment and the
/// process arguments.
pub fn resolve<T: Configurable>(
    record: &mut T,
    file: Option<&Path>,
) -> Result<Resolution, ConfigError> {
    let mut loader = Loader::builder();
    if let Some(path) = file {
        loader = loader.with_file(path);
    }
    loader.load(record)
}

fn resolve_with<T>(
    record: &mut T,
    schema: &Schema<T>,
    file: Option<&Path>,
    env: &EnvSource,
    args: &ArgSource,
) -> Result<Resolution, ConfigError> {
    if let Some(name) = schema.duplicate_name() {
        return Err(ConfigError::Shape(format!(
            "field '{name}' is declared more than once"
        )));
    }

    let mut staged = Staged::new(schema);
    let mut resolution = Resolution::new(schema);

    staged.apply(&DefaultSource, schema, &mut resolution)?;
    if let Some(path) = file.filter(|p| !p.as_os_str().is_empty()) {
        if let Some(source) = FileSource::open(path)? {
            staged.apply(&source, schema, &mut resolution)?;
        }
    }
    staged.apply(env, schema, &mut resolution)?;
    staged.apply(args, schema, &mut resolution)?;

    staged.write_back(record, schema)?;

    check_required_and_depends(schema, &resolution)?;
    Ok(resolution)
}

/// Converted values per declared field, with the raw text they came from.
/// Fields no pass supplied stay `None` and are never written.
struct Staged {
    values: Vec<Option<(String, Value)>>,
}

impl Staged {
    fn new<T>(schema: &Schema<T>) -> Self {
        Self {
            values: vec![None; schema.bindings().len()],
        }
    }

    fn apply<T>(
        &mut self,
        source: &dyn ConfigSource,
        schema: &Schema<T>,
        resolution: &mut Resolution,
    ) -> Result<(), ConfigError> {
        for (slot, field) in self.values.iter_mut().zip(schema.fields()) {
            let Some(raw) = source.lookup(field)? else {
                continue;
            };
            let value = convert_value(&raw, field.kind()).map_err(|e| e.for_field(field.name()))?;
            *slot = Some((raw, value));
            resolution.mark(field.name(), source.pass());
            tracing::debug!(field = field.name(), pass = %source.pass(), "field set");
        }
        Ok(())
    }

    /// Checks every staged value fits its member, then assigns them in
    /// declaration order.
    ///
    /// A value that does not fit (a `u16` member given `70000`) fails before
    /// any member is written.
    fn write_back<T>(self, record: &mut T, schema: &Schema<T>) -> Result<(), ConfigError> {
        let ready: Vec<_> = schema
            .bindings()
            .iter()
            .zip(self.values)
            .filter_map(|(binding, staged)| staged.map(|(raw, value)| (binding, raw, value)))
            .collect();

        for (binding, raw, value) in &ready {
            binding
                .check(value)
                .map_err(|e| misfit(binding.field().name(), raw, e))?;
        }
        for (binding, raw, value) in ready {
            binding
                .assign(record, value)
                .map_err(|e| misfit(binding.field().name(), &raw, e))?;
        }
        Ok(())
    }
}

fn misfit(field: &str, raw: &str, err: serde_json::Error) -> ConfigError {
    ConfigError::Conversion {
        field: field.to_string(),
        raw: raw.to_string(),
        reason: err.to_string(),
    }
}
