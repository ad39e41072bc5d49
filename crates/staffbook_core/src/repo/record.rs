//! Table mapping for records and shared column codecs.
//!
//! # Responsibility
//! - Describe how a record type maps onto its table (`Record`).
//! - Encode/decode the shared metadata columns in one place.
//!
//! # Invariants
//! - Timestamps are stored as RFC 3339 UTC text with millisecond precision.
//! - Dates are stored as `YYYY-MM-DD` text.
//! - Ids are stored as hyphenated UUID text.

use crate::model::entity::{Entity, EntityId, EntityMeta};
use crate::repo::error::{RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

/// Columns every record table carries, in select order.
pub const META_COLUMNS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record type persisted in its own table.
pub trait Record: Entity + Clone {
    const TABLE: &'static str;
    /// Record-specific columns, excluding `META_COLUMNS`.
    const COLUMNS: &'static [&'static str];

    /// Values for `COLUMNS`, in the same order.
    fn column_values(&self) -> Vec<Value>;

    /// Rebuilds a record from a row selected with `select_columns::<Self>()`.
    fn from_row(meta: EntityMeta, row: &Row<'_>) -> RepoResult<Self>;
}

/// Returns whether `column` is a meta column or one of `T::COLUMNS`.
pub fn has_column<T: Record>(column: &str) -> bool {
    META_COLUMNS.contains(&column) || T::COLUMNS.contains(&column)
}

/// Comma-separated meta + record columns.
pub fn select_columns<T: Record>() -> String {
    META_COLUMNS
        .iter()
        .chain(T::COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn meta_from_row(table: &'static str, row: &Row<'_>) -> RepoResult<EntityMeta> {
    let id_text: String = row.get("id")?;
    let created_text: String = row.get("created_at")?;
    let updated_text: Option<String> = row.get("updated_at")?;
    let deleted_text: Option<String> = row.get("deleted_at")?;

    Ok(EntityMeta::from_parts(
        parse_id(table, "id", &id_text)?,
        parse_timestamp(table, "created_at", &created_text)?,
        updated_text
            .map(|value| parse_timestamp(table, "updated_at", &value))
            .transpose()?,
        deleted_text
            .map(|value| parse_timestamp(table, "deleted_at", &value))
            .transpose()?,
    ))
}

pub(crate) fn meta_values(meta: &EntityMeta) -> [Value; 4] {
    [
        id_to_db(meta.id()),
        timestamp_to_db(meta.created_at()),
        optional_timestamp_to_db(meta.updated_at()),
        optional_timestamp_to_db(meta.deleted_at()),
    ]
}

pub fn id_to_db(id: EntityId) -> Value {
    Value::Text(id.to_string())
}

pub fn timestamp_to_db(value: DateTime<Utc>) -> Value {
    Value::Text(value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn optional_timestamp_to_db(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, timestamp_to_db)
}

pub fn date_to_db(value: NaiveDate) -> Value {
    Value::Text(value.format(DATE_FORMAT).to_string())
}

pub fn optional_text_to_db(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

pub fn parse_id(table: &'static str, column: &str, value: &str) -> RepoResult<EntityId> {
    Uuid::parse_str(value).map_err(|_| RepoError::InvalidData {
        table,
        message: format!("invalid uuid value `{value}` in {table}.{column}"),
    })
}

pub fn parse_timestamp(
    table: &'static str,
    column: &str,
    value: &str,
) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RepoError::InvalidData {
            table,
            message: format!("invalid timestamp `{value}` in {table}.{column}"),
        })
}

pub fn parse_date(table: &'static str, column: &str, value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RepoError::InvalidData {
        table,
        message: format!("invalid date `{value}` in {table}.{column}"),
    })
}
