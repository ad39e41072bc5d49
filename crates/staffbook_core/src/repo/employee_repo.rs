//! Employee table mapping.

use crate::model::employee::Employee;
use crate::model::entity::EntityMeta;
use crate::repo::error::RepoResult;
use crate::repo::record::{date_to_db, id_to_db, optional_text_to_db, parse_date, parse_id, Record};
use crate::repo::repository::SqliteRepository;
use rusqlite::types::Value;
use rusqlite::Row;

pub type SqliteEmployeeRepository<'conn> = SqliteRepository<'conn, Employee>;

impl Record for Employee {
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "hire_date",
        "phone",
        "address",
        "department_id",
    ];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.first_name.clone()),
            Value::Text(self.last_name.clone()),
            date_to_db(self.hire_date),
            optional_text_to_db(self.phone.as_deref()),
            optional_text_to_db(self.address.as_deref()),
            id_to_db(self.department_id),
        ]
    }

    fn from_row(meta: EntityMeta, row: &Row<'_>) -> RepoResult<Self> {
        let hire_date: String = row.get("hire_date")?;
        let department_id: String = row.get("department_id")?;
        Ok(Self {
            meta,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            hire_date: parse_date(Self::TABLE, "hire_date", &hire_date)?,
            phone: row.get("phone")?,
            address: row.get("address")?,
            department_id: parse_id(Self::TABLE, "department_id", &department_id)?,
        })
    }
}
