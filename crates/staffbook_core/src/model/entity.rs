//! Shared entity metadata and the `Entity` capability trait.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `deleted_at` is the only source of truth for tombstone state.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier shared by every record type.
pub type EntityId = Uuid;

/// Current time at the precision the store persists (milliseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Identity and lifecycle timestamps carried by every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMeta {
    id: EntityId,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl EntityMeta {
    /// Fresh metadata: generated id, `created_at = now`, live.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Fresh metadata with a caller-provided id.
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            created_at: now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Rebuilds metadata from persisted columns.
    pub fn from_parts(
        id: EntityId,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_updated(&mut self) {
        self.updated_at = Some(now());
    }

    /// Tombstones the record. Calling it again moves both timestamps forward
    /// and keeps the record deleted.
    pub fn mark_deleted(&mut self) {
        let at = now();
        self.deleted_at = Some(at);
        self.updated_at = Some(at);
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Any record that carries `EntityMeta`.
pub trait Entity {
    fn meta(&self) -> &EntityMeta;
    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> EntityId {
        self.meta().id()
    }

    fn is_deleted(&self) -> bool {
        self.meta().is_deleted()
    }
}
