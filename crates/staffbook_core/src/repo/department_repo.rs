//! Department table mapping.

use crate::model::department::Department;
use crate::model::entity::EntityMeta;
use crate::repo::error::RepoResult;
use crate::repo::record::Record;
use crate::repo::repository::SqliteRepository;
use rusqlite::types::Value;
use rusqlite::Row;

pub type SqliteDepartmentRepository<'conn> = SqliteRepository<'conn, Department>;

impl Record for Department {
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            meta,
            name: row.get("name")?,
        })
    }
}
