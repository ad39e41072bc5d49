//! Department record and its input rule sets.

use crate::model::entity::{Entity, EntityMeta};
use crate::model::validation::{max_chars, not_blank, RuleSet, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

pub const DEPARTMENT_NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub name: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
        }
    }
}

impl Entity for Department {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// Input for creating a department.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartment {
    pub name: String,
}

/// Input for renaming a department.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartment {
    pub name: String,
}

fn name_rules<T>(rules: RuleSet<'_, T>, name: impl Fn(&T) -> &str) -> RuleSet<'_, T> {
    rules
        .rule("name", |d| not_blank(name(d)), "Name is required")
        .rule(
            "name",
            |d| max_chars(name(d), DEPARTMENT_NAME_MAX_CHARS),
            format!("Name must have at most {DEPARTMENT_NAME_MAX_CHARS} characters."),
        )
}

impl Validate for CreateDepartment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        name_rules(RuleSet::new(self), |d| d.name.as_str()).finish()
    }
}

impl Validate for UpdateDepartment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        name_rules(RuleSet::new(self), |d| d.name.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_name_rules() {
        let ok = CreateDepartment {
            name: "Engineering".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = UpdateDepartment {
            name: "   ".to_string(),
        };
        assert!(blank.validate().unwrap_err().has_field("name"));

        let long = CreateDepartment {
            name: "x".repeat(DEPARTMENT_NAME_MAX_CHARS + 1),
        };
        let err = long.validate().unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.errors()[0].message.contains("at most 100"));
    }
}
