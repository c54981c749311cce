//! Schema migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Process completions carry no foreign key to catalog rows: the catalog
//!   is re-synced wholesale from the host and completion history must
//!   survive the swap.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATION_0001_INIT: &str = "
CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    project_name TEXT NOT NULL,
    product_name TEXT NOT NULL,
    due_date TEXT
);

CREATE TABLE items (
    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    id INTEGER NOT NULL,
    bom_name TEXT NOT NULL,
    part_code TEXT,
    position INTEGER NOT NULL,
    PRIMARY KEY (order_id, id)
);

CREATE TABLE item_processes (
    order_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    process_name TEXT NOT NULL,
    PRIMARY KEY (order_id, item_id, position),
    FOREIGN KEY (order_id, item_id) REFERENCES items(order_id, id) ON DELETE CASCADE
);

CREATE TABLE process_completions (
    order_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    process_name TEXT NOT NULL,
    worker TEXT NOT NULL,
    recorded_at INTEGER NOT NULL,
    PRIMARY KEY (order_id, item_id, process_name)
);

CREATE TABLE progress_history (
    uuid TEXT PRIMARY KEY,
    order_id INTEGER NOT NULL,
    item_id INTEGER NOT NULL,
    bom_name TEXT NOT NULL,
    process_name TEXT NOT NULL,
    worker TEXT NOT NULL,
    recorded_at INTEGER NOT NULL
);

CREATE INDEX idx_progress_history_recorded_at
    ON progress_history(recorded_at DESC);
";

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: MIGRATION_0001_INIT,
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
