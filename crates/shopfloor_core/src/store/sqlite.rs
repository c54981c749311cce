//! SQLite-backed catalog snapshot and completion store.
//!
//! # Responsibility
//! - Persist the catalog snapshot synced from the host.
//! - Record process completions at most once per (order, item, process)
//!   and keep the capped registration history.
//!
//! # Invariants
//! - At-most-once completion is enforced by the primary key with
//!   conflict-ignore inserts, not by caller-side checks.
//! - No API removes a completion row; completion is monotonic.
//! - Catalog replacement never touches completion or history rows.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::order::{Item, ItemId, Order, OrderId};
use crate::store::{CatalogStore, HistoryRecord, ProcessStore, StoreError, StoreResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Most recent registrations kept in the history view.
const HISTORY_CAP: u32 = 100;

/// SQLite implementation of [`CatalogStore`] and [`ProcessStore`].
pub struct SqliteProgressStore {
    conn: Connection,
}

impl SqliteProgressStore {
    /// Wraps an already-bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a file-backed store with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens an in-memory store, mainly for tests and smoke probes.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Replaces the whole catalog snapshot in one transaction.
    ///
    /// This is the host sync path; completion and history rows are kept so
    /// that re-syncing the catalog never forgets registered work.
    pub fn replace_catalog(&mut self, orders: &[Order]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM orders;", [])?;
        for order in orders {
            tx.execute(
                "INSERT INTO orders (id, project_name, product_name, due_date)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    order.id,
                    order.project_name.as_str(),
                    order.product_name.as_str(),
                    order.due_date.as_deref(),
                ],
            )?;

            for (item_position, item) in order.items.iter().enumerate() {
                tx.execute(
                    "INSERT INTO items (order_id, id, bom_name, part_code, position)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        order.id,
                        item.id,
                        item.bom_name.as_str(),
                        item.part_code.as_deref(),
                        item_position as u32,
                    ],
                )?;

                for (process_position, process_name) in item.processes.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO item_processes (order_id, item_id, position, process_name)
                         VALUES (?1, ?2, ?3, ?4);",
                        params![
                            order.id,
                            item.id,
                            process_position as u32,
                            process_name.as_str(),
                        ],
                    )?;
                }
            }
        }

        tx.commit()?;
        info!(
            "event=catalog_replace module=store status=ok orders={}",
            orders.len()
        );
        Ok(())
    }

    /// Returns the most recent registrations, newest first.
    pub fn history(&self, limit: u32) -> StoreResult<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, order_id, item_id, bom_name, process_name, worker, recorded_at
             FROM progress_history
             ORDER BY recorded_at DESC, rowid DESC
             LIMIT ?1;",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, OrderId>(1)?,
                row.get::<_, ItemId>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (uuid, order_id, item_id, bom_name, process_name, worker, recorded_at) = row?;
            let uuid = Uuid::parse_str(&uuid).map_err(|err| {
                StoreError::InvalidData(format!("history uuid `{uuid}` is invalid: {err}"))
            })?;
            records.push(HistoryRecord {
                uuid,
                order_id,
                item_id,
                bom_name,
                process_name,
                worker,
                recorded_at,
            });
        }
        Ok(records)
    }

    fn item_bom_name(&self, order_id: OrderId, item_id: ItemId) -> StoreResult<Option<String>> {
        let bom_name = self
            .conn
            .query_row(
                "SELECT bom_name FROM items WHERE order_id = ?1 AND id = ?2;",
                params![order_id, item_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(bom_name)
    }
}

impl CatalogStore for SqliteProgressStore {
    fn orders(&self) -> StoreResult<Vec<Order>> {
        let mut orders: Vec<Order> = Vec::new();
        let mut index_by_id: BTreeMap<OrderId, usize> = BTreeMap::new();

        let mut stmt = self.conn.prepare(
            "SELECT id, project_name, product_name, due_date FROM orders ORDER BY id;",
        )?;
        let order_rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, OrderId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;
        for row in order_rows {
            let (id, project_name, product_name, due_date) = row?;
            let mut order = Order::new(id, project_name, product_name);
            order.due_date = due_date;
            index_by_id.insert(id, orders.len());
            orders.push(order);
        }

        let mut stmt = self.conn.prepare(
            "SELECT order_id, id, bom_name, part_code FROM items ORDER BY order_id, position;",
        )?;
        let item_rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, OrderId>(0)?,
                row.get::<_, ItemId>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;
        for row in item_rows {
            let (order_id, id, bom_name, part_code) = row?;
            let Some(&order_index) = index_by_id.get(&order_id) else {
                continue;
            };
            let mut item = Item::new(id, bom_name);
            item.part_code = part_code;
            orders[order_index].items.push(item);
        }

        let mut stmt = self.conn.prepare(
            "SELECT order_id, item_id, process_name FROM item_processes
             ORDER BY order_id, item_id, position;",
        )?;
        let process_rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, OrderId>(0)?,
                row.get::<_, ItemId>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in process_rows {
            let (order_id, item_id, process_name) = row?;
            if let Some(item) = item_mut(&mut orders, &index_by_id, order_id, item_id) {
                item.processes.push(process_name);
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT order_id, item_id, process_name FROM process_completions ORDER BY rowid;",
        )?;
        let completion_rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, OrderId>(0)?,
                row.get::<_, ItemId>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in completion_rows {
            let (order_id, item_id, process_name) = row?;
            if let Some(item) = item_mut(&mut orders, &index_by_id, order_id, item_id) {
                item.mark_completed(process_name);
            }
        }

        Ok(orders)
    }
}

impl ProcessStore for SqliteProgressStore {
    fn register_completion(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
        process_name: &str,
        worker: &str,
    ) -> StoreResult<bool> {
        let Some(bom_name) = self.item_bom_name(order_id, item_id)? else {
            return Ok(false);
        };

        let recorded_at = epoch_millis();
        let tx = self.conn.transaction()?;

        // The primary key makes repeats a no-op; monotonic by construction.
        tx.execute(
            "INSERT OR IGNORE INTO process_completions
                 (order_id, item_id, process_name, worker, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![order_id, item_id, process_name, worker, recorded_at],
        )?;

        tx.execute(
            "INSERT INTO progress_history
                 (uuid, order_id, item_id, bom_name, process_name, worker, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                Uuid::new_v4().to_string(),
                order_id,
                item_id,
                bom_name.as_str(),
                process_name,
                worker,
                recorded_at,
            ],
        )?;
        tx.execute(
            "DELETE FROM progress_history WHERE uuid NOT IN (
                 SELECT uuid FROM progress_history
                 ORDER BY recorded_at DESC, rowid DESC
                 LIMIT ?1
             );",
            params![HISTORY_CAP],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn completed_processes(&self, order_id: OrderId, item_id: ItemId) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT process_name FROM process_completions
             WHERE order_id = ?1 AND item_id = ?2
             ORDER BY rowid;",
        )?;
        let rows = stmt.query_map(params![order_id, item_id], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}

fn item_mut<'a>(
    orders: &'a mut [Order],
    index_by_id: &BTreeMap<OrderId, usize>,
    order_id: OrderId,
    item_id: ItemId,
) -> Option<&'a mut Item> {
    let &order_index = index_by_id.get(&order_id)?;
    orders[order_index]
        .items
        .iter_mut()
        .find(|item| item.id == item_id)
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
