//! Employee use-case service.
//!
//! # Invariants
//! - Created or updated employees always reference a live department.
//! - Views resolve department names through live departments only; a
//!   missing or deleted department yields an empty name.

use crate::model::department::Department;
use crate::model::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::model::entity::{Entity, EntityId};
use crate::repo::error::RepoResult;
use crate::repo::page::{PagedQuery, PaginatedResult};
use crate::repo::query::{LiveQuery, Predicate};
use crate::repo::repository::Repository;
use crate::service::department_service::ensure_valid;
use crate::service::error::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const ENTITY: &str = "Employee";
const DEPARTMENT_ENTITY: &str = "Department";

/// Paged employee listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilter {
    /// Case-insensitive substring of `"{first_name} {last_name}"`.
    pub name: Option<String>,
    pub department_id: Option<EntityId>,
}

pub type EmployeePagedQuery = PagedQuery<EmployeeFilter>;

/// Employee as presented to callers, with its department name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub department_id: EntityId,
    pub department_name: String,
}

impl EmployeeView {
    fn from_employee(employee: Employee, department_name: String) -> Self {
        Self {
            id: employee.id(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            hire_date: employee.hire_date,
            phone: employee.phone,
            address: employee.address,
            department_id: employee.department_id,
            department_name,
        }
    }
}

pub struct EmployeeService<E, D>
where
    E: Repository<Employee>,
    D: Repository<Department>,
{
    employees: E,
    departments: D,
}

impl<E, D> EmployeeService<E, D>
where
    E: Repository<Employee>,
    D: Repository<Department>,
{
    pub fn new(employees: E, departments: D) -> Self {
        Self {
            employees,
            departments,
        }
    }

    pub fn create(&mut self, input: &CreateEmployee) -> ServiceResult<EmployeeView> {
        info!("event=employee_create module=service status=start");
        ensure_valid("employee_create", input)?;
        let department = self.require_department(input.department_id)?;

        let mut employee = Employee::new(
            input.first_name.clone(),
            input.last_name.clone(),
            input.hire_date,
            input.department_id,
        );
        employee.phone = input.phone.clone();
        employee.address = input.address.clone();

        let employee = self.employees.create_and_save(employee)?;

        info!(
            "event=employee_create module=service status=ok id={} department_id={}",
            employee.id(),
            department.id()
        );
        Ok(EmployeeView::from_employee(employee, department.name))
    }

    /// Rewrites every mutable field of employee `id`. The payload's own id
    /// is validated but the target is always `id`.
    pub fn update(&mut self, id: EntityId, input: &UpdateEmployee) -> ServiceResult<EmployeeView> {
        info!("event=employee_update module=service status=start id={id}");
        let mut employee = self.require(id)?;
        ensure_valid("employee_update", input)?;
        let department = self.require_department(input.department_id)?;

        employee.first_name = input.first_name.clone();
        employee.last_name = input.last_name.clone();
        employee.hire_date = input.hire_date;
        employee.phone = input.phone.clone();
        employee.address = input.address.clone();
        employee.department_id = input.department_id;
        self.employees.update(&mut employee)?;

        info!("event=employee_update module=service status=ok id={id}");
        Ok(EmployeeView::from_employee(employee, department.name))
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<EmployeeView> {
        let employee = self.require(id)?;
        let mut views = self.views_for(vec![employee])?;
        views.pop().ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    pub fn get_all(&self) -> ServiceResult<Vec<EmployeeView>> {
        let employees = self.employees.get_all().fetch()?;
        info!(
            "event=employee_list module=service status=ok count={}",
            employees.len()
        );
        self.views_for(employees)
    }

    pub fn get_paged(&self, query: EmployeePagedQuery) -> ServiceResult<PaginatedResult<EmployeeView>> {
        let page = self
            .employees
            .get_all_paged_with(query, apply_employee_filter)?;
        info!(
            "event=employee_page module=service status=ok page={} page_size={} total_items={}",
            page.page, page.page_size, page.total_items
        );

        let names = self.department_names(&page.items)?;
        Ok(page.map(|employee| {
            let name = names
                .get(&employee.department_id)
                .cloned()
                .unwrap_or_default();
            EmployeeView::from_employee(employee, name)
        }))
    }

    pub fn delete(&mut self, id: EntityId) -> ServiceResult<()> {
        info!("event=employee_delete module=service status=start id={id}");
        let mut employee = self.require(id)?;
        self.employees.delete(&mut employee)?;
        info!("event=employee_delete module=service status=ok id={id}");
        Ok(())
    }

    fn require(&self, id: EntityId) -> ServiceResult<Employee> {
        self.employees
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    fn require_department(&self, id: EntityId) -> ServiceResult<Department> {
        self.departments
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(DEPARTMENT_ENTITY, id))
    }

    fn views_for(&self, employees: Vec<Employee>) -> ServiceResult<Vec<EmployeeView>> {
        let names = self.department_names(&employees)?;
        Ok(employees
            .into_iter()
            .map(|employee| {
                let name = names
                    .get(&employee.department_id)
                    .cloned()
                    .unwrap_or_default();
                EmployeeView::from_employee(employee, name)
            })
            .collect())
    }

    /// Names of the live departments referenced by `employees`, in one read.
    fn department_names(&self, employees: &[Employee]) -> RepoResult<HashMap<EntityId, String>> {
        let ids: BTreeSet<EntityId> = employees
            .iter()
            .map(|employee| employee.department_id)
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let departments = self
            .departments
            .get_all_where(Predicate::is_in("id", ids))
            .fetch()?;
        Ok(departments
            .into_iter()
            .map(|department| (department.id(), department.name))
            .collect())
    }
}

/// Narrows a live employee query by the request filter.
pub fn apply_employee_filter<'q>(
    live: LiveQuery<'q, Employee>,
    filter: Option<&EmployeeFilter>,
) -> RepoResult<LiveQuery<'q, Employee>> {
    let Some(filter) = filter else {
        return Ok(live);
    };

    let mut live = live;
    if let Some(name) = filter.name.as_deref().filter(|name| !name.trim().is_empty()) {
        live = live.filter(Predicate::contains_any_of(
            &["first_name", "last_name"],
            name,
        ));
    }
    if let Some(department_id) = filter.department_id {
        live = live.filter(Predicate::eq("department_id", department_id));
    }
    Ok(live)
}
