//! Stock department seeding.

use crate::model::department::Department;
use crate::repo::error::RepoResult;
use crate::repo::repository::Repository;
use log::info;

pub const STOCK_DEPARTMENTS: [&str; 3] = ["HR", "IT", "Finance"];

/// Inserts the stock departments when no live department exists.
///
/// Returns how many departments were inserted. On failure nothing is
/// inserted and nothing stays staged.
pub fn seed_departments<R: Repository<Department>>(repo: &mut R) -> RepoResult<usize> {
    if repo.get_all().count()? > 0 {
        return Ok(0);
    }

    for name in STOCK_DEPARTMENTS {
        repo.create(Department::new(name));
    }
    if let Err(err) = repo.save_changes() {
        repo.discard_staged();
        return Err(err);
    }

    info!(
        "event=seed_departments module=service status=ok inserted={}",
        STOCK_DEPARTMENTS.len()
    );
    Ok(STOCK_DEPARTMENTS.len())
}
