//! Core domain logic for the shopfloor progress scanner.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod host;
pub mod logging;
pub mod matching;
pub mod model;
pub mod service;
pub mod store;
pub mod text;

pub use host::{
    HapticDevice, HapticUnavailable, Materialization, NoticeLevel, NotificationSink, NullHaptic,
    ProcessButtonUi, SelectionUi,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use matching::{match_item, match_order, ItemMatch, MatchTier, OrderMatch, OrderMatchFailure};
pub use model::order::{Item, ItemId, Order, OrderId};
pub use model::scan::{PayloadFormatError, RegistrationResult, ScanPayload, Selection};
pub use service::registration::{ButtonState, RegistrationError, RegistrationService};
pub use service::scan::{CyclePhase, ScanError, ScanOutcome, ScanService};
pub use store::{
    CatalogStore, HistoryRecord, ProcessStore, SqliteProgressStore, StoreError, StoreResult,
};
pub use text::normalize;

/// Minimal health-check API for early host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
