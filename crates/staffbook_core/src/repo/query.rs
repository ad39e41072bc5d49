//! Live-set query builder.
//!
//! # Responsibility
//! - Describe caller predicates as data so they can be rendered to SQL.
//! - Compose them behind the mandatory `deleted_at IS NULL` gate.
//! - Execute count, windowed fetch and streaming reads against one table.
//!
//! # Invariants
//! - The soft-delete gate is always the first condition of the WHERE clause.
//! - Predicates may only name columns of the queried record type.
//! - Results are ordered by caller sort keys, then by stored order (`rowid`).

use crate::model::entity::EntityId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::record::{
    date_to_db, has_column, id_to_db, meta_from_row, select_columns, timestamp_to_db, Record,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::marker::PhantomData;

/// Conversion into a bindable SQL value using the store's encodings.
pub trait IntoSqlValue {
    fn into_sql_value(self) -> Value;
}

impl IntoSqlValue for Value {
    fn into_sql_value(self) -> Value {
        self
    }
}

impl IntoSqlValue for &str {
    fn into_sql_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoSqlValue for String {
    fn into_sql_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoSqlValue for i64 {
    fn into_sql_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoSqlValue for bool {
    fn into_sql_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoSqlValue for EntityId {
    fn into_sql_value(self) -> Value {
        id_to_db(self)
    }
}

impl IntoSqlValue for NaiveDate {
    fn into_sql_value(self) -> Value {
        date_to_db(self)
    }
}

impl IntoSqlValue for DateTime<Utc> {
    fn into_sql_value(self) -> Value {
        timestamp_to_db(self)
    }
}

impl<T: IntoSqlValue> IntoSqlValue for Option<T> {
    fn into_sql_value(self) -> Value {
        self.map_or(Value::Null, IntoSqlValue::into_sql_value)
    }
}

/// Filter condition over the columns of one record table.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(&'static str, Value),
    NotEq(&'static str, Value),
    Gt(&'static str, Value),
    Gte(&'static str, Value),
    Lt(&'static str, Value),
    Lte(&'static str, Value),
    /// Empty lists match nothing.
    In(&'static str, Vec<Value>),
    IsNull(&'static str),
    IsNotNull(&'static str),
    /// Case-insensitive substring match over the listed columns joined with
    /// single spaces. NULL columns contribute an empty string.
    Contains {
        columns: Vec<&'static str>,
        needle: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::Eq(column, value.into_sql_value())
    }

    pub fn not_eq(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::NotEq(column, value.into_sql_value())
    }

    pub fn gt(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::Gt(column, value.into_sql_value())
    }

    pub fn gte(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::Gte(column, value.into_sql_value())
    }

    pub fn lt(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::Lt(column, value.into_sql_value())
    }

    pub fn lte(column: &'static str, value: impl IntoSqlValue) -> Self {
        Self::Lte(column, value.into_sql_value())
    }

    pub fn is_in<V: IntoSqlValue>(column: &'static str, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(
            column,
            values.into_iter().map(IntoSqlValue::into_sql_value).collect(),
        )
    }

    pub fn contains(column: &'static str, needle: impl Into<String>) -> Self {
        Self::Contains {
            columns: vec![column],
            needle: needle.into(),
        }
    }

    pub fn contains_any_of(columns: &[&'static str], needle: impl Into<String>) -> Self {
        Self::Contains {
            columns: columns.to_vec(),
            needle: needle.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Appends this predicate as SQL to `sql`, pushing bind values in
    /// placeholder order. Fails when a column is not known to `T`.
    pub fn render<T: Record>(&self, sql: &mut String, binds: &mut Vec<Value>) -> RepoResult<()> {
        match self {
            Self::Eq(column, value) => render_compare::<T>(sql, binds, *column, "=", value),
            Self::NotEq(column, value) => render_compare::<T>(sql, binds, *column, "!=", value),
            Self::Gt(column, value) => render_compare::<T>(sql, binds, *column, ">", value),
            Self::Gte(column, value) => render_compare::<T>(sql, binds, *column, ">=", value),
            Self::Lt(column, value) => render_compare::<T>(sql, binds, *column, "<", value),
            Self::Lte(column, value) => render_compare::<T>(sql, binds, *column, "<=", value),
            Self::In(column, values) => {
                let column = checked_column::<T>(*column)?;
                if values.is_empty() {
                    sql.push_str("0 = 1");
                    return Ok(());
                }
                let placeholders = vec!["?"; values.len()].join(", ");
                sql.push_str(&format!("{column} IN ({placeholders})"));
                binds.extend(values.iter().cloned());
                Ok(())
            }
            Self::IsNull(column) => {
                let column = checked_column::<T>(*column)?;
                sql.push_str(&format!("{column} IS NULL"));
                Ok(())
            }
            Self::IsNotNull(column) => {
                let column = checked_column::<T>(*column)?;
                sql.push_str(&format!("{column} IS NOT NULL"));
                Ok(())
            }
            Self::Contains { columns, needle } => {
                if columns.is_empty() {
                    return Err(RepoError::invalid_filter(
                        T::TABLE,
                        "substring match needs at least one column",
                    ));
                }
                let mut parts = Vec::with_capacity(columns.len());
                for column in columns {
                    parts.push(format!("COALESCE({}, '')", checked_column::<T>(*column)?));
                }
                sql.push_str(&format!(
                    "instr(lower({}), lower(?)) > 0",
                    parts.join(" || ' ' || ")
                ));
                binds.push(Value::Text(needle.clone()));
                Ok(())
            }
            Self::And(parts) => render_group::<T>(sql, binds, parts, " AND ", "1 = 1"),
            Self::Or(parts) => render_group::<T>(sql, binds, parts, " OR ", "0 = 1"),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render::<T>(sql, binds)?;
                sql.push(')');
                Ok(())
            }
        }
    }
}

fn checked_column<T: Record>(column: &'static str) -> RepoResult<&'static str> {
    if has_column::<T>(column) {
        Ok(column)
    } else {
        Err(RepoError::invalid_filter(
            T::TABLE,
            format!("unknown column `{column}`"),
        ))
    }
}

fn render_compare<T: Record>(
    sql: &mut String,
    binds: &mut Vec<Value>,
    column: &'static str,
    operator: &str,
    value: &Value,
) -> RepoResult<()> {
    let column = checked_column::<T>(column)?;
    sql.push_str(&format!("{column} {operator} ?"));
    binds.push(value.clone());
    Ok(())
}

fn render_group<T: Record>(
    sql: &mut String,
    binds: &mut Vec<Value>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) -> RepoResult<()> {
    if parts.is_empty() {
        sql.push_str(empty);
        return Ok(());
    }
    sql.push('(');
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            sql.push_str(separator);
        }
        part.render::<T>(sql, binds)?;
    }
    sql.push(')');
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Lazy, re-executable query over the live rows of `T`'s table.
///
/// Nothing touches the store until a terminal method (`count`, `fetch`,
/// `fetch_window`, `first`, `try_for_each`) runs, and every run reads the
/// current table state.
pub struct LiveQuery<'conn, T: Record> {
    conn: &'conn Connection,
    predicates: Vec<Predicate>,
    order: Vec<(&'static str, SortDirection)>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for LiveQuery<'_, T> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn,
            predicates: self.predicates.clone(),
            order: self.order.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> std::fmt::Debug for LiveQuery<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("table", &T::TABLE)
            .field("predicates", &self.predicates)
            .field("order", &self.order)
            .finish()
    }
}

impl<'conn, T: Record> LiveQuery<'conn, T> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            predicates: Vec::new(),
            order: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Adds a predicate; all predicates are combined with AND.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: SortDirection) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Number of live rows matching every predicate.
    pub fn count(&self) -> RepoResult<u64> {
        let (where_sql, binds) = self.where_clause()?;
        let sql = format!("SELECT COUNT(*) FROM {}{where_sql};", T::TABLE);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Materializes every matching row.
    pub fn fetch(&self) -> RepoResult<Vec<T>> {
        let mut records = Vec::new();
        self.run(None, |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    /// Materializes at most `take` rows after skipping `skip`.
    pub fn fetch_window(&self, skip: u64, take: u64) -> RepoResult<Vec<T>> {
        let mut records = Vec::new();
        self.run(Some((skip, take)), |record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    /// First matching row in query order, if any.
    pub fn first(&self) -> RepoResult<Option<T>> {
        Ok(self.fetch_window(0, 1)?.into_iter().next())
    }

    /// Streams matching rows to `visit` without collecting them.
    pub fn try_for_each(&self, visit: impl FnMut(T) -> RepoResult<()>) -> RepoResult<()> {
        self.run(None, visit)
    }

    fn run(
        &self,
        window: Option<(u64, u64)>,
        mut visit: impl FnMut(T) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let (mut sql, mut binds) = self.select_sql()?;
        if let Some((skip, take)) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Value::Integer(to_sql_int(take)));
            binds.push(Value::Integer(to_sql_int(skip)));
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        while let Some(row) = rows.next()? {
            let meta = meta_from_row(T::TABLE, row)?;
            visit(T::from_row(meta, row)?)?;
        }
        Ok(())
    }

    /// Full SELECT statement (without window or terminator) and its binds.
    pub fn select_sql(&self) -> RepoResult<(String, Vec<Value>)> {
        let (where_sql, binds) = self.where_clause()?;
        let mut sql = format!(
            "SELECT {} FROM {}{where_sql}",
            select_columns::<T>(),
            T::TABLE
        );
        sql.push_str(" ORDER BY ");
        for (column, direction) in &self.order {
            let column = checked_column::<T>(*column)?;
            let direction = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            sql.push_str(&format!("{column} {direction}, "));
        }
        sql.push_str("rowid ASC");
        Ok((sql, binds))
    }

    fn where_clause(&self) -> RepoResult<(String, Vec<Value>)> {
        let mut sql = String::from(" WHERE deleted_at IS NULL");
        let mut binds = Vec::new();
        for predicate in &self.predicates {
            sql.push_str(" AND (");
            predicate.render::<T>(&mut sql, &mut binds)?;
            sql.push(')');
        }
        Ok((sql, binds))
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
