//! Declarative validation rule sets for record inputs.
//!
//! # Responsibility
//! - Let each input type declare its rules as an ordered list of checks.
//! - Collect every failing rule instead of stopping at the first one.

use serde::Serialize;
use thiserror::Error;

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failed rules for one input, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_messages(.0))]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns whether any rule on `field` failed.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Inputs that carry a rule set.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Accumulates rule outcomes for one input value.
///
/// ```ignore
/// RuleSet::new(dto)
///     .rule("name", |d| not_blank(&d.name), "Name is required")
///     .finish()
/// ```
pub struct RuleSet<'a, T> {
    target: &'a T,
    errors: Vec<FieldError>,
}

impl<'a, T> RuleSet<'a, T> {
    pub fn new(target: &'a T) -> Self {
        Self {
            target,
            errors: Vec::new(),
        }
    }

    /// Records `message` against `field` when `check` returns false.
    pub fn rule(
        mut self,
        field: &'static str,
        check: impl FnOnce(&T) -> bool,
        message: impl Into<String>,
    ) -> Self {
        if !check(self.target) {
            self.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn max_chars(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

pub fn optional_max_chars(value: Option<&str>, max: usize) -> bool {
    value.map_or(true, |value| max_chars(value, max))
}
