//! Set-tracking and the required/dependency checks run after all passes.

use std::collections::HashMap;

use super::field::Schema;
use super::source::Pass;
use super::ConfigError;

/// Which fields received a value during one resolution, and from which pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    set: HashMap<String, Option<Pass>>,
}

impl Resolution {
    /// Starts with every declared field unset.
    pub(crate) fn new<T>(schema: &Schema<T>) -> Self {
        Self {
            set: schema
                .fields()
                .map(|f| (f.name().to_string(), None))
                .collect(),
        }
    }

    pub(crate) fn mark(&mut self, field: &str, pass: Pass) {
        self.set.insert(field.to_string(), Some(pass));
    }

    /// Whether any pass supplied a value for `field`. Unknown names are unset.
    pub fn is_set(&self, field: &str) -> bool {
        matches!(self.set.get(field), Some(Some(_)))
    }

    /// The last pass that supplied `field`, which is the one whose value stuck.
    pub fn source_of(&self, field: &str) -> Option<Pass> {
        self.set.get(field).copied().flatten()
    }
}

/// Fails on the first required field left unset, or the first dependency of a
/// field that was left unset, scanning fields in declaration order.
///
/// A dependency failure names the missing dependency rather than the field
/// that declared it.
pub fn check_required_and_depends<T>(
    schema: &Schema<T>,
    resolution: &Resolution,
) -> Result<(), ConfigError> {
    for field in schema.fields() {
        if field.is_required() && !resolution.is_set(field.name()) {
            return Err(ConfigError::RequiredNotSet(field.name().to_string()));
        }

        for dependency in field.dependencies() {
            if !resolution.is_set(dependency) {
                return Err(ConfigError::DependsNotSet {
                    dependency: dependency.to_string(),
                    field: field.name().to_string(),
                });
            }
        }
    }

    Ok(())
}
