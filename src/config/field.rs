//! Per-field declarations for a destination record.

use std::collections::HashSet;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Semantic type of a configuration field.
///
/// Scalars parse at 64-bit width; narrower record fields are range-checked
/// when the resolved value is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    /// `std::time::Duration`, written as e.g. `1h30m` or `250ms`.
    Duration,
    /// RFC 3339 date-time with offset, for `chrono::DateTime` fields.
    Timestamp,
    /// Raw byte sequences. Declarable, but no text form converts into it.
    Bytes,
    /// Comma-separated list of a scalar kind.
    Seq(Box<Kind>),
    /// Comma-separated `key:value` pairs with text keys.
    Map(Box<Kind>),
}

impl Kind {
    pub fn seq(inner: Kind) -> Self {
        Kind::Seq(Box::new(inner))
    }

    pub fn map(inner: Kind) -> Self {
        Kind::Map(Box::new(inner))
    }

    /// Human-readable type label used in usage text.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Bool => "True or False",
            Kind::Int => "Integer",
            Kind::Uint => "Unsigned Integer",
            Kind::Float => "Float",
            Kind::Text => "String",
            Kind::Duration => "Duration",
            Kind::Timestamp => "Timestamp",
            Kind::Bytes => "Bytes",
            Kind::Seq(_) => "List",
            Kind::Map(_) => "Map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Uint => f.write_str("uint"),
            Kind::Float => f.write_str("float"),
            Kind::Text => f.write_str("text"),
            Kind::Duration => f.write_str("duration"),
            Kind::Timestamp => f.write_str("timestamp"),
            Kind::Bytes => f.write_str("bytes"),
            Kind::Seq(inner) => write!(f, "list<{inner}>"),
            Kind::Map(inner) => write!(f, "map<text, {inner}>"),
        }
    }
}

/// Declaration of a single field: where its value may come from and which
/// constraints apply once all sources have been read.
///
/// `name` identifies the field in set-tracking, dependency lists and errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: Kind,
    file: Option<String>,
    env: Option<String>,
    arg: Option<String>,
    default: Option<String>,
    desc: Option<String>,
    required: bool,
    depends: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            file: None,
            env: None,
            arg: None,
            default: None,
            desc: None,
            required: false,
            depends: None,
        }
    }

    /// Key of this field in the key-value config file.
    pub fn file(mut self, key: impl Into<String>) -> Self {
        self.file = Some(key.into());
        self
    }

    /// Name of the environment variable that sets this field.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    /// Command-line argument name, without leading dashes.
    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.arg = Some(name.into());
        self
    }

    /// Default literal, converted like any other source value.
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    pub fn desc(mut self, text: impl Into<String>) -> Self {
        self.desc = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Comma-separated names of fields that must be set for this one to be valid.
    pub fn depends(mut self, names: impl Into<String>) -> Self {
        self.depends = Some(names.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn file_key(&self) -> Option<&str> {
        non_empty(&self.file)
    }

    pub fn env_name(&self) -> Option<&str> {
        non_empty(&self.env)
    }

    /// The argument name, falling back to the lower-cased field name.
    pub fn arg_name(&self) -> String {
        match non_empty(&self.arg) {
            Some(arg) => arg.to_string(),
            None => self.name.to_lowercase(),
        }
    }

    pub fn default_literal(&self) -> Option<&str> {
        non_empty(&self.default)
    }

    pub fn description(&self) -> &str {
        self.desc.as_deref().unwrap_or("")
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn dependencies(&self) -> Vec<&str> {
        self.depends
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

type Check = Box<dyn Fn(&Value) -> Result<(), serde_json::Error>>;
type Assign<T> = Box<dyn Fn(&mut T, Value) -> Result<(), serde_json::Error>>;

/// A field declaration bound to the record member it populates.
pub(crate) struct Binding<T> {
    field: Field,
    check: Check,
    assign: Assign<T>,
}

impl<T> Binding<T> {
    pub(crate) fn field(&self) -> &Field {
        &self.field
    }

    /// Whether `value` deserializes into the bound member's type.
    pub(crate) fn check(&self, value: &Value) -> Result<(), serde_json::Error> {
        (self.check)(value)
    }

    /// Deserializes `value` into the bound member, leaving the rest of the
    /// record alone.
    pub(crate) fn assign(&self, record: &mut T, value: Value) -> Result<(), serde_json::Error> {
        (self.assign)(record, value)
    }
}

/// Ordered field declarations for one record type.
pub struct Schema<T> {
    bindings: Vec<Binding<T>>,
}

impl<T> Schema<T> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Declares `field`, populated through `access`.
    ///
    /// The member type decides how the resolved value lands: `Option<V>`
    /// members receive `Some`, narrower integers are range-checked.
    #[must_use]
    pub fn field<V, F>(mut self, field: Field, access: F) -> Self
    where
        V: DeserializeOwned,
        F: Fn(&mut T) -> &mut V + 'static,
    {
        let check = |value: &Value| V::deserialize(value).map(drop);
        let assign = move |record: &mut T, value: Value| {
            *access(record) = serde_json::from_value(value)?;
            Ok(())
        };
        self.bindings.push(Binding {
            field,
            check: Box::new(check),
            assign: Box::new(assign),
        });
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.bindings.iter().map(Binding::field)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }

    pub(crate) fn bindings(&self) -> &[Binding<T>] {
        &self.bindings
    }

    /// Returns the first field name declared more than once.
    pub(crate) fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.fields().map(Field::name).find(|name| !seen.insert(*name))
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields()).finish()
    }
}

/// A record that can be populated by the resolution engine.
///
/// ```
/// use dragon_cfg::{Configurable, Field, Kind, Schema};
///
/// #[derive(Default)]
/// struct AppConfig {
///     name: String,
///     count: i64,
///     label: Option<String>,
/// }
///
/// impl Configurable for AppConfig {
///     fn schema() -> Schema<Self> {
///         Schema::<Self>::new()
///             .field(Field::new("name", Kind::Text).required(), |c| &mut c.name)
///             .field(Field::new("count", Kind::Int).default("3"), |c| &mut c.count)
///             .field(Field::new("label", Kind::Text), |c| &mut c.label)
///     }
/// }
/// ```
pub trait Configurable: Sized {
    fn schema() -> Schema<Self>;
}
