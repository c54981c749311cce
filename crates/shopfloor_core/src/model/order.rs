//! Production order and item catalog records.
//!
//! # Responsibility
//! - Mirror the external catalog schema consumed by resolution and
//!   registration.
//! - Provide derived process-status views without mutating raw match keys.
//!
//! # Invariants
//! - `completed` only ever grows; completion is monotonic.
//! - Wire field names match the external catalog schema (camelCase).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier of a production order, owned by the external catalog.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type OrderId = u32;

/// Identifier of an item, unique within its owning order.
pub type ItemId = u32;

/// One constituent item (cut part / component) of a production order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Bill-of-materials name, primary match key.
    pub bom_name: String,
    /// Optional part code, secondary match key.
    #[serde(default)]
    pub part_code: Option<String>,
    /// Ordered manufacturing process route for this item.
    #[serde(default)]
    pub processes: Vec<String>,
    /// Process names already registered as completed.
    #[serde(default)]
    pub completed: Vec<String>,
}

impl Item {
    /// Creates an item with an empty process route.
    pub fn new(id: ItemId, bom_name: impl Into<String>) -> Self {
        Self {
            id,
            bom_name: bom_name.into(),
            part_code: None,
            processes: Vec::new(),
            completed: Vec::new(),
        }
    }

    /// Returns whether the named process is registered as completed.
    pub fn is_completed(&self, process_name: &str) -> bool {
        self.completed.iter().any(|name| name == process_name)
    }

    /// Marks the named process as completed.
    ///
    /// Monotonic: re-marking an already completed process is a no-op, and
    /// no API on this type ever removes a completion.
    pub fn mark_completed(&mut self, process_name: impl Into<String>) {
        let process_name = process_name.into();
        if !self.is_completed(&process_name) {
            self.completed.push(process_name);
        }
    }

    /// Returns the per-process completion map for this item.
    pub fn process_status(&self) -> BTreeMap<String, bool> {
        self.processes
            .iter()
            .map(|name| (name.clone(), self.is_completed(name)))
            .collect()
    }

    /// Returns route processes not yet registered as completed, in route
    /// order. Used to populate the process selection control.
    pub fn uncompleted_processes(&self) -> Vec<&str> {
        self.processes
            .iter()
            .filter(|name| !self.is_completed(name))
            .map(String::as_str)
            .collect()
    }
}

/// One production order with its constituent items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Site/project name, display and match key.
    pub project_name: String,
    /// Product name, display and match key.
    pub product_name: String,
    /// ISO date string; display and sorting only, never matched on.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Order {
    /// Creates an order with no items.
    pub fn new(
        id: OrderId,
        project_name: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            project_name: project_name.into(),
            product_name: product_name.into(),
            due_date: None,
            items: Vec::new(),
        }
    }

    /// Returns one item by identifier.
    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Overall completion of this order as a rounded integer percentage.
    ///
    /// Counts completed registrations against the total route length across
    /// all items; an order with no route processes is 0%.
    pub fn progress_percent(&self) -> u8 {
        let total: usize = self.items.iter().map(|item| item.processes.len()).sum();
        if total == 0 {
            return 0;
        }
        let completed: usize = self.items.iter().map(|item| item.completed.len()).sum();
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }
}
