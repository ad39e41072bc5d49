//! Department use-case service.

use crate::model::department::{CreateDepartment, Department, UpdateDepartment};
use crate::model::entity::{Entity, EntityId};
use crate::model::validation::Validate;
use crate::repo::error::RepoResult;
use crate::repo::page::{PagedQuery, PaginatedResult};
use crate::repo::query::{LiveQuery, Predicate};
use crate::repo::repository::Repository;
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "Department";

/// Paged department listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentFilter {
    /// Case-insensitive substring of the department name.
    pub name: Option<String>,
}

pub type DepartmentPagedQuery = PagedQuery<DepartmentFilter>;

pub struct DepartmentService<R: Repository<Department>> {
    repo: R,
}

impl<R: Repository<Department>> DepartmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn create(&mut self, input: &CreateDepartment) -> ServiceResult<Department> {
        info!("event=department_create module=service status=start");
        ensure_valid("department_create", input)?;

        let department = self
            .repo
            .create_and_save(Department::new(input.name.clone()))?;

        info!(
            "event=department_create module=service status=ok id={}",
            department.id()
        );
        Ok(department)
    }

    pub fn update(&mut self, id: EntityId, input: &UpdateDepartment) -> ServiceResult<Department> {
        info!("event=department_update module=service status=start id={id}");
        let mut department = self.require(id)?;
        ensure_valid("department_update", input)?;

        department.name = input.name.clone();
        self.repo.update(&mut department)?;

        info!("event=department_update module=service status=ok id={id}");
        Ok(department)
    }

    pub fn get_by_id(&self, id: EntityId) -> ServiceResult<Department> {
        self.require(id)
    }

    pub fn get_all(&self) -> ServiceResult<Vec<Department>> {
        let departments = self.repo.get_all().fetch()?;
        info!(
            "event=department_list module=service status=ok count={}",
            departments.len()
        );
        Ok(departments)
    }

    pub fn get_paged(
        &self,
        query: DepartmentPagedQuery,
    ) -> ServiceResult<PaginatedResult<Department>> {
        let page = self
            .repo
            .get_all_paged_with(query, apply_department_filter)?;
        info!(
            "event=department_page module=service status=ok page={} page_size={} total_items={}",
            page.page, page.page_size, page.total_items
        );
        Ok(page)
    }

    pub fn delete(&mut self, id: EntityId) -> ServiceResult<()> {
        info!("event=department_delete module=service status=start id={id}");
        let mut department = self.require(id)?;
        self.repo.delete(&mut department)?;
        info!("event=department_delete module=service status=ok id={id}");
        Ok(())
    }

    fn require(&self, id: EntityId) -> ServiceResult<Department> {
        self.repo
            .get_by_id(id)?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }
}

/// Narrows a live department query by the request filter.
pub fn apply_department_filter<'q>(
    live: LiveQuery<'q, Department>,
    filter: Option<&DepartmentFilter>,
) -> RepoResult<LiveQuery<'q, Department>> {
    match filter.and_then(|filter| filter.name.as_deref()) {
        Some(name) if !name.trim().is_empty() => Ok(live.filter(Predicate::contains("name", name))),
        _ => Ok(live),
    }
}

pub(crate) fn ensure_valid<T: Validate>(event: &str, input: &T) -> ServiceResult<()> {
    input.validate().map_err(|errors| {
        warn!(
            "event={event} module=service status=invalid failures={}",
            errors.errors().len()
        );
        ServiceError::from(errors)
    })
}
