//! Ephemeral scan-side types: decoded payload, UI selection, result.
//!
//! # Responsibility
//! - Parse already-decoded QR text into the three match keys.
//! - Carry the transient order/item selection between resolution and
//!   registration.
//!
//! # Invariants
//! - A payload is created once per scan event and never persisted.
//! - `Selection::item_id` is only meaningful while `order_id` is set; the
//!   orchestrator owns that pairing.

use crate::model::order::{ItemId, OrderId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Label payloads separate fields with a pipe, comma or tab.
static FIELD_DELIMITER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[|,\t]").expect("valid delimiter regex"));

/// Minimum fields a scannable label carries: project, product, component.
const REQUIRED_FIELDS: usize = 3;

/// Free-text fields decoded from one scanned QR label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPayload {
    pub project_name_raw: String,
    pub product_name_raw: String,
    pub bom_name_raw: String,
}

/// Decoded text did not carry the expected field layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFormatError {
    /// How many delimiter-separated fields were present.
    pub fields: usize,
}

impl Display for PayloadFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scanned text has {} field(s); expected at least {REQUIRED_FIELDS}",
            self.fields
        )
    }
}

impl Error for PayloadFormatError {}

impl ScanPayload {
    /// Parses decoded label text of the form
    /// `project | product | component` (pipe, comma or tab separated).
    ///
    /// The first three fields are trimmed and taken as match keys; any
    /// trailing fields are ignored.
    pub fn parse(decoded_text: &str) -> Result<Self, PayloadFormatError> {
        let parts: Vec<&str> = FIELD_DELIMITER_RE.split(decoded_text).collect();
        if parts.len() < REQUIRED_FIELDS {
            return Err(PayloadFormatError {
                fields: parts.len(),
            });
        }

        Ok(Self {
            project_name_raw: parts[0].trim().to_string(),
            product_name_raw: parts[1].trim().to_string(),
            bom_name_raw: parts[2].trim().to_string(),
        })
    }
}

/// Transient UI-bound selection state, overwritten on each new scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub order_id: Option<OrderId>,
    pub item_id: Option<ItemId>,
}

impl Selection {
    /// Clears both fields ahead of a fresh scan cycle.
    pub fn clear(&mut self) {
        self.order_id = None;
        self.item_id = None;
    }

    /// Returns whether both an order and an item are selected.
    pub fn is_complete(&self) -> bool {
        self.order_id.is_some() && self.item_id.is_some()
    }
}

/// Outcome of one registration attempt against the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationResult {
    pub success: bool,
}
