//! Request validation: the field-grouped violation map and shared rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Self-validation hook implemented by commands and queries. Handlers call
/// it before touching any backend, so a rejected request has no side
/// effects.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Violations grouped per field, collected in one pass so the caller sees
/// every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &BTreeMap<String, Vec<String>> {
        &self.violations
    }

    /// Messages recorded for one field, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.violations.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.violations {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

pub(crate) fn require_non_empty(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("{field} must not be empty."));
    }
}

pub(crate) fn require_max_chars(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max: usize,
) {
    if value.chars().count() > max {
        errors.push(field, format!("{field} must be {max} characters or fewer."));
    }
}
