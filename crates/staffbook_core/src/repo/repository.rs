//! Generic soft-delete repository contract and its SQLite unit of work.
//!
//! # Responsibility
//! - Expose create/read/update/soft-delete/paging over any `Record` type.
//! - Stage inserts and flush them together in one transaction.
//!
//! # Invariants
//! - Reads never return rows with `deleted_at` set.
//! - `delete` only tombstones; rows are never physically removed.
//! - A failed flush rolls back and leaves the staged set untouched, except
//!   for `create_and_save`, which drops the entity it staged.
//! - Count and page fetch in `get_all_paged*` run as two statements and may
//!   observe different states under concurrent writers.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::entity::EntityId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::page::{PagedQuery, PaginatedResult};
use crate::repo::query::{LiveQuery, Predicate};
use crate::repo::record::{
    id_to_db, meta_values, optional_timestamp_to_db, Record, META_COLUMNS,
};
use log::{debug, error, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::time::Instant;

/// Persistence contract shared by every record type.
pub trait Repository<T: Record> {
    /// Stages a snapshot of `entity` for the next flush and hands the value
    /// back.
    ///
    /// The staged snapshot is what gets inserted. Later changes to the
    /// returned value are not tracked; persist them with `update`, which
    /// flushes the snapshot first and then writes the current values.
    fn create(&mut self, entity: T) -> T;

    /// Stages `entity` and flushes immediately.
    fn create_and_save(&mut self, entity: T) -> RepoResult<T>;

    /// `None` when the row is missing or soft-deleted.
    fn get_by_id(&self, id: EntityId) -> RepoResult<Option<T>>;

    /// Some live row matching `predicate`. Which one is unspecified when
    /// several match.
    fn get_one(&self, predicate: Predicate) -> RepoResult<Option<T>>;

    /// All live rows.
    fn get_all(&self) -> LiveQuery<'_, T>;

    /// Live rows matching `predicate`.
    fn get_all_where(&self, predicate: Predicate) -> LiveQuery<'_, T> {
        self.get_all().filter(predicate)
    }

    /// One normalized page over all live rows.
    fn get_all_paged<F>(&self, query: PagedQuery<F>) -> RepoResult<PaginatedResult<T>> {
        self.get_all_paged_with(query, |live, _| Ok(live))
    }

    /// One normalized page over live rows narrowed by `filter_logic`, which
    /// receives the live query and the request's filter payload.
    fn get_all_paged_with<'s, F, L>(
        &'s self,
        query: PagedQuery<F>,
        filter_logic: L,
    ) -> RepoResult<PaginatedResult<T>>
    where
        L: FnOnce(LiveQuery<'s, T>, Option<&F>) -> RepoResult<LiveQuery<'s, T>>;

    /// Tombstones `entity` (sets `deleted_at` and `updated_at`) and flushes.
    fn delete(&mut self, entity: &mut T) -> RepoResult<()>;

    /// Stamps `updated_at`, writes `entity` and flushes.
    fn update(&mut self, entity: &mut T) -> RepoResult<()>;

    /// Flushes every staged change in one transaction.
    fn save_changes(&mut self) -> RepoResult<()>;

    /// Drops staged inserts without touching the store.
    fn discard_staged(&mut self);
}

/// SQLite-backed repository for one record table.
///
/// One instance is one unit of work: staged inserts live only inside it and
/// are dropped with it.
pub struct SqliteRepository<'conn, T: Record> {
    conn: &'conn Connection,
    staged: Vec<T>,
}

impl<'conn, T: Record> SqliteRepository<'conn, T> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<T>(conn)?;
        Ok(Self {
            conn,
            staged: Vec::new(),
        })
    }

    /// Number of staged, not yet flushed inserts.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn flush(
        &mut self,
        operation: &'static str,
        write: impl FnOnce(&Transaction<'_>) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let staged = self.staged.len();

        let result = (|| -> RepoResult<()> {
            let tx = self.conn.unchecked_transaction()?;
            for entity in &self.staged {
                insert_row(&tx, entity)?;
            }
            write(&tx)?;
            tx.commit()?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.staged.clear();
                info!(
                    "event=repo_flush module=repo status=ok op={operation} table={} staged={staged} duration_ms={}",
                    T::TABLE,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=repo_flush module=repo status=error op={operation} table={} staged={staged} duration_ms={} error={}",
                    T::TABLE,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl<'conn, T: Record> Repository<T> for SqliteRepository<'conn, T> {
    fn create(&mut self, entity: T) -> T {
        debug!(
            "event=repo_stage module=repo table={} id={}",
            T::TABLE,
            entity.id()
        );
        self.staged.push(entity.clone());
        entity
    }

    fn create_and_save(&mut self, entity: T) -> RepoResult<T> {
        let entity = self.create(entity);
        if let Err(err) = self.flush("create_and_save", |_| Ok(())) {
            let id = entity.id();
            if let Some(index) = self.staged.iter().rposition(|staged| staged.id() == id) {
                self.staged.remove(index);
            }
            return Err(err);
        }
        Ok(entity)
    }

    fn get_by_id(&self, id: EntityId) -> RepoResult<Option<T>> {
        self.get_all().filter(Predicate::eq("id", id)).first()
    }

    fn get_one(&self, predicate: Predicate) -> RepoResult<Option<T>> {
        self.get_all_where(predicate).first()
    }

    fn get_all(&self) -> LiveQuery<'_, T> {
        LiveQuery::new(self.conn)
    }

    fn get_all_paged_with<'s, F, L>(
        &'s self,
        query: PagedQuery<F>,
        filter_logic: L,
    ) -> RepoResult<PaginatedResult<T>>
    where
        L: FnOnce(LiveQuery<'s, T>, Option<&F>) -> RepoResult<LiveQuery<'s, T>>,
    {
        let query = query.normalized();
        let live = filter_logic(self.get_all(), query.filter.as_ref())?;

        let total_items = live.count()?;
        let items = live.fetch_window(query.offset(), query.limit())?;

        debug!(
            "event=repo_page module=repo table={} page={} page_size={} total_items={total_items} returned={}",
            T::TABLE,
            query.page,
            query.page_size,
            items.len()
        );
        Ok(PaginatedResult::new(items, total_items, &query))
    }

    fn delete(&mut self, entity: &mut T) -> RepoResult<()> {
        let previous = entity.meta().clone();
        entity.meta_mut().mark_deleted();

        let snapshot = entity.clone();
        let result = self.flush("delete", |tx| {
            let changed = tx.execute(
                &format!(
                    "UPDATE {} SET updated_at = ?1, deleted_at = ?2 WHERE id = ?3;",
                    T::TABLE
                ),
                params_from_iter([
                    optional_timestamp_to_db(snapshot.meta().updated_at()),
                    optional_timestamp_to_db(snapshot.meta().deleted_at()),
                    id_to_db(snapshot.id()),
                ]),
            )?;
            expect_one_row::<T>(changed, snapshot.id())
        });

        if result.is_err() {
            *entity.meta_mut() = previous;
        }
        result
    }

    fn update(&mut self, entity: &mut T) -> RepoResult<()> {
        let previous = entity.meta().clone();
        entity.meta_mut().mark_updated();

        let snapshot = entity.clone();
        let result = self.flush("update", |tx| update_row(tx, &snapshot));

        if result.is_err() {
            *entity.meta_mut() = previous;
        }
        result
    }

    fn save_changes(&mut self) -> RepoResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }
        self.flush("save_changes", |_| Ok(()))
    }

    fn discard_staged(&mut self) {
        if !self.staged.is_empty() {
            debug!(
                "event=repo_discard module=repo table={} staged={}",
                T::TABLE,
                self.staged.len()
            );
        }
        self.staged.clear();
    }
}

fn insert_row<T: Record>(tx: &Transaction<'_>, entity: &T) -> RepoResult<()> {
    let columns: Vec<&str> = META_COLUMNS
        .iter()
        .chain(T::COLUMNS.iter())
        .copied()
        .collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        T::TABLE,
        columns.join(", ")
    );

    let mut values: Vec<Value> = meta_values(entity.meta()).into();
    values.extend(entity.column_values());
    tx.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Writes `updated_at` and the record columns. `created_at` and
/// `deleted_at` are owned by insert and delete respectively.
fn update_row<T: Record>(tx: &Transaction<'_>, entity: &T) -> RepoResult<()> {
    let assignments = std::iter::once("updated_at")
        .chain(T::COLUMNS.iter().copied())
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {} SET {assignments} WHERE id = ?;", T::TABLE);

    let mut values = vec![optional_timestamp_to_db(entity.meta().updated_at())];
    values.extend(entity.column_values());
    values.push(id_to_db(entity.id()));

    let changed = tx.execute(&sql, params_from_iter(values))?;
    expect_one_row::<T>(changed, entity.id())
}

fn expect_one_row<T: Record>(changed: usize, id: EntityId) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::StaleWrite {
            table: T::TABLE,
            id,
        });
    }
    Ok(())
}

fn ensure_connection_ready<T: Record>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [T::TABLE],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(T::TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", T::TABLE))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in META_COLUMNS.iter().chain(T::COLUMNS.iter()) {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: T::TABLE,
                column: *column,
            });
        }
    }

    Ok(())
}
