//! Employee record and its input rule sets.
//!
//! # Invariants
//! - `hire_date` is a calendar date and is never after the day it was
//!   validated on.
//! - `department_id` is never nil for a validated input.

use crate::model::entity::{Entity, EntityId, EntityMeta};
use crate::model::validation::{
    max_chars, not_blank, optional_max_chars, RuleSet, Validate, ValidationErrors,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const EMPLOYEE_NAME_MAX_CHARS: usize = 50;
pub const EMPLOYEE_PHONE_MAX_CHARS: usize = 20;
pub const EMPLOYEE_ADDRESS_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: EntityId,
}

impl Employee {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        hire_date: NaiveDate,
        department_id: EntityId,
    ) -> Self {
        Self {
            meta: EntityMeta::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            hire_date,
            phone: None,
            address: None,
            department_id,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Employee {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// Input for hiring an employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: EntityId,
}

/// Input for replacing an employee's editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: EntityId,
}

/// Field accessors shared by both employee inputs so they share one rule set.
trait EmployeeFields {
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
    fn hire_date(&self) -> NaiveDate;
    fn phone(&self) -> Option<&str>;
    fn address(&self) -> Option<&str>;
    fn department_id(&self) -> EntityId;
}

macro_rules! impl_employee_fields {
    ($ty:ty) => {
        impl EmployeeFields for $ty {
            fn first_name(&self) -> &str {
                &self.first_name
            }
            fn last_name(&self) -> &str {
                &self.last_name
            }
            fn hire_date(&self) -> NaiveDate {
                self.hire_date
            }
            fn phone(&self) -> Option<&str> {
                self.phone.as_deref()
            }
            fn address(&self) -> Option<&str> {
                self.address.as_deref()
            }
            fn department_id(&self) -> EntityId {
                self.department_id
            }
        }
    };
}

impl_employee_fields!(CreateEmployee);
impl_employee_fields!(UpdateEmployee);

fn employee_rules<T: EmployeeFields>(rules: RuleSet<'_, T>, today: NaiveDate) -> RuleSet<'_, T> {
    rules
        .rule(
            "firstName",
            |e| not_blank(e.first_name()),
            "First name is required.",
        )
        .rule(
            "firstName",
            |e| max_chars(e.first_name(), EMPLOYEE_NAME_MAX_CHARS),
            format!("First name must have at most {EMPLOYEE_NAME_MAX_CHARS} characters."),
        )
        .rule(
            "lastName",
            |e| not_blank(e.last_name()),
            "Last name is required.",
        )
        .rule(
            "lastName",
            |e| max_chars(e.last_name(), EMPLOYEE_NAME_MAX_CHARS),
            format!("Last name must have at most {EMPLOYEE_NAME_MAX_CHARS} characters."),
        )
        .rule(
            "hireDate",
            |e| e.hire_date() <= today,
            "Hire date cannot be in the future.",
        )
        .rule(
            "phone",
            |e| optional_max_chars(e.phone(), EMPLOYEE_PHONE_MAX_CHARS),
            format!("Phone must have at most {EMPLOYEE_PHONE_MAX_CHARS} characters."),
        )
        .rule(
            "address",
            |e| optional_max_chars(e.address(), EMPLOYEE_ADDRESS_MAX_CHARS),
            format!("Address must have at most {EMPLOYEE_ADDRESS_MAX_CHARS} characters."),
        )
        .rule(
            "departmentId",
            |e| !e.department_id().is_nil(),
            "Department is required.",
        )
}

impl CreateEmployee {
    /// Validates against an explicit "today".
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        employee_rules(RuleSet::new(self), today).finish()
    }
}

impl UpdateEmployee {
    /// Validates against an explicit "today".
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        employee_rules(RuleSet::new(self), today)
            .rule("id", |e| !e.id.is_nil(), "Employee ID is required.")
            .finish()
    }
}

impl Validate for CreateEmployee {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}

impl Validate for UpdateEmployee {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_on(Utc::now().date_naive())
    }
}
