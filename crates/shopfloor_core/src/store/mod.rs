//! Store contracts for the order catalog and process completions.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the two shared,
//!   externally-serialized resources: the catalog snapshot and the durable
//!   completion record.
//! - Isolate SQLite details from matching/registration orchestration.
//!
//! # Invariants
//! - The catalog is read-only to resolution and registration; only the
//!   host sync path replaces it, wholesale.
//! - The completion store is the sole source of truth for "already
//!   completed"; registering a completed process again is a no-op success.

use crate::db::DbError;
use crate::model::order::{ItemId, Order, OrderId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod sqlite;

pub use sqlite::SqliteProgressStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic store error for catalog and completion operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read-only snapshot access to the externally-owned order catalog.
pub trait CatalogStore {
    /// Returns every order with items, process routes and completion state
    /// folded in.
    fn orders(&self) -> StoreResult<Vec<Order>>;
}

/// Durable, atomic process-completion record.
pub trait ProcessStore {
    /// Marks the named process complete for the resolved item.
    ///
    /// Returns `Ok(false)` when the order/item is unknown to the store and
    /// `Ok(true)` on success, including the case where the process was
    /// already completed, which must remain a no-op at-most-once write.
    fn register_completion(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
        process_name: &str,
        worker: &str,
    ) -> StoreResult<bool>;

    /// Returns completed process names for one item, in registration order.
    fn completed_processes(&self, order_id: OrderId, item_id: ItemId) -> StoreResult<Vec<String>>;
}

/// One row of the capped registration history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub uuid: Uuid,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub bom_name: String,
    pub process_name: String,
    pub worker: String,
    /// Unix epoch milliseconds.
    pub recorded_at: i64,
}
