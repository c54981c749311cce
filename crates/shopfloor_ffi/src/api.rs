//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core host-collaborator effects into returned UI commands
//!   the Dart side replays against its widgets.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The item control is materialized synchronously from the same catalog
//!   snapshot, so the ready signal path is always taken here.

use log::warn;
use shopfloor_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CatalogStore, HapticDevice, HapticUnavailable, ItemId, Materialization, NoticeLevel,
    NotificationSink, Order, OrderId, ProcessButtonUi, ProcessStore, RegistrationService,
    ScanPayload, ScanService, Selection, SelectionUi, SqliteProgressStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const STORE_DB_FILE_NAME: &str = "shopfloor_progress.sqlite3";
const HISTORY_VIEW_LIMIT: u32 = 100;
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for repeated calls with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(&level, &log_dir) {
        Ok(()) => String::new(),
        Err(message) => message,
    }
}

/// Pins the progress-store directory for this process.
///
/// # FFI contract
/// - Sync call; opens the database once to apply migrations.
/// - Idempotent for the same directory; a different directory is rejected.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(store_dir: String) -> String {
    let db_path = PathBuf::from(store_dir.trim()).join(STORE_DB_FILE_NAME);

    if let Some(pinned) = STORE_DB_PATH.get() {
        if *pinned != db_path {
            return format!(
                "store already initialized at `{}`; refusing to switch to `{}`",
                pinned.display(),
                db_path.display()
            );
        }
        return String::new();
    }

    // Open once up front so a bad directory is not pinned for the process.
    match SqliteProgressStore::open(&db_path) {
        Ok(_) => {
            let _ = STORE_DB_PATH.set(db_path);
            String::new()
        }
        Err(err) => format!("failed to open store: {err}"),
    }
}

fn open_store() -> Result<SqliteProgressStore, String> {
    let Some(db_path) = STORE_DB_PATH.get() else {
        return Err("store not initialized; call init_store first".to_string());
    };
    SqliteProgressStore::open(db_path).map_err(|err| format!("failed to open store: {err}"))
}

/// One user-facing notification the host should toast.
pub struct UiNotice {
    pub message: String,
    /// `info | success | warning | error`.
    pub level: String,
}

/// One selection-control mutation the host should replay.
pub struct UiCommand {
    /// `set_order_control | set_item_control`.
    pub kind: String,
    pub id: u32,
}

/// One process-button affordance mutation the host should replay.
pub struct UiButtonCommand {
    /// `mark_busy | mark_registered | reset`.
    pub kind: String,
    pub process_name: String,
}

/// Outcome of one scan-resolution call.
pub struct ScanFeedback {
    /// Whether both order and item were resolved.
    pub matched: bool,
    pub order_id: Option<u32>,
    pub item_id: Option<u32>,
    pub notices: Vec<UiNotice>,
    pub commands: Vec<UiCommand>,
    /// Transport-level failure, when the store could not be read.
    pub error: Option<String>,
}

/// Outcome of one registration call.
pub struct RegistrationFeedback {
    pub success: bool,
    pub notices: Vec<UiNotice>,
    pub buttons: Vec<UiButtonCommand>,
    /// Requested vibration pulse; the host owns the actual hardware call.
    pub haptic_ms: Option<u32>,
    pub error: Option<String>,
}

/// One row of the registration history view.
pub struct HistoryEntry {
    pub uuid: String,
    pub order_id: u32,
    pub item_id: u32,
    pub bom_name: String,
    pub process_name: String,
    pub worker: String,
    pub recorded_at: i64,
}

#[derive(Default)]
struct RecordingUi {
    commands: Vec<UiCommand>,
}

impl SelectionUi for &mut RecordingUi {
    fn set_order_control(&mut self, order_id: OrderId) {
        self.commands.push(UiCommand {
            kind: "set_order_control".to_string(),
            id: order_id,
        });
    }

    fn materialize_item_control(&mut self, _order_id: OrderId) -> Materialization {
        // Item options come from the same snapshot the scan used.
        Materialization::Ready
    }

    fn set_item_control(&mut self, item_id: ItemId) {
        self.commands.push(UiCommand {
            kind: "set_item_control".to_string(),
            id: item_id,
        });
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Vec<UiNotice>,
}

impl RecordingNotifier {
    fn push(&mut self, message: &str, level: NoticeLevel) {
        self.notices.push(UiNotice {
            message: message.to_string(),
            level: level.as_str().to_string(),
        });
    }
}

impl NotificationSink for &mut RecordingNotifier {
    fn notify(&mut self, message: &str, level: NoticeLevel) {
        self.push(message, level);
    }
}

#[derive(Default)]
struct RecordingButtons {
    commands: Vec<UiButtonCommand>,
}

impl ProcessButtonUi for RecordingButtons {
    fn mark_busy(&mut self, process_name: &str) {
        self.commands.push(UiButtonCommand {
            kind: "mark_busy".to_string(),
            process_name: process_name.to_string(),
        });
    }

    fn mark_registered(&mut self, process_name: &str) {
        self.commands.push(UiButtonCommand {
            kind: "mark_registered".to_string(),
            process_name: process_name.to_string(),
        });
    }

    fn reset(&mut self, process_name: &str) {
        self.commands.push(UiButtonCommand {
            kind: "reset".to_string(),
            process_name: process_name.to_string(),
        });
    }
}

#[derive(Default)]
struct RecordingHaptic {
    requested_ms: Option<u32>,
}

impl HapticDevice for &mut RecordingHaptic {
    fn pulse(&mut self, duration_ms: u32) -> Result<(), HapticUnavailable> {
        self.requested_ms = Some(duration_ms);
        Ok(())
    }
}

/// Replaces the catalog snapshot from host-provided JSON.
///
/// # FFI contract
/// - Sync call; runs one write transaction.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn import_catalog(catalog_json: String) -> String {
    let orders: Vec<Order> = match serde_json::from_str(&catalog_json) {
        Ok(orders) => orders,
        Err(err) => return format!("invalid catalog payload: {err}"),
    };

    let mut store = match open_store() {
        Ok(store) => store,
        Err(message) => return message,
    };

    match store.replace_catalog(&orders) {
        Ok(()) => String::new(),
        Err(err) => format!("failed to replace catalog: {err}"),
    }
}

/// Returns the catalog snapshot as JSON for host-side rendering.
///
/// # FFI contract
/// - Sync call; read-only.
/// - Never panics; returns a JSON array on success, and on failure an empty
///   array plus a warning log event.
#[flutter_rust_bridge::frb(sync)]
pub fn catalog_json() -> String {
    let fallback = "[]".to_string();
    let Ok(store) = open_store() else {
        return fallback;
    };
    match store.orders() {
        Ok(orders) => serde_json::to_string(&orders).unwrap_or(fallback),
        Err(err) => {
            warn!("event=catalog_read module=ffi status=error error={err}");
            fallback
        }
    }
}

/// Resolves decoded QR text to an order/item selection.
///
/// # FFI contract
/// - Sync call; one read of the catalog snapshot.
/// - Never panics; transport failures land in `error`, user-facing
///   feedback in `notices`/`commands`.
#[flutter_rust_bridge::frb(sync)]
pub fn scan_decoded(decoded_text: String) -> ScanFeedback {
    let mut notifier = RecordingNotifier::default();
    let mut ui = RecordingUi::default();

    let payload = match ScanPayload::parse(&decoded_text) {
        Ok(payload) => payload,
        Err(_) => {
            notifier.push(
                "scanned code does not match the expected format",
                NoticeLevel::Warning,
            );
            return ScanFeedback {
                matched: false,
                order_id: None,
                item_id: None,
                notices: notifier.notices,
                commands: ui.commands,
                error: None,
            };
        }
    };

    let orders = match open_store().and_then(|store| {
        store
            .orders()
            .map_err(|err| format!("failed to read catalog: {err}"))
    }) {
        Ok(orders) => orders,
        Err(message) => {
            return ScanFeedback {
                matched: false,
                order_id: None,
                item_id: None,
                notices: notifier.notices,
                commands: ui.commands,
                error: Some(message),
            }
        }
    };

    let selection = {
        let mut scan = ScanService::new(&mut ui, &mut notifier);
        scan.handle_scan(&orders, &payload);
        scan.selection()
    };

    ScanFeedback {
        matched: selection.is_complete(),
        order_id: selection.order_id,
        item_id: selection.item_id,
        notices: notifier.notices,
        commands: ui.commands,
        error: None,
    }
}

/// Registers the named process as completed for an explicit selection.
///
/// # FFI contract
/// - Sync call; one write transaction on success.
/// - Never panics; validation and store rejections surface as
///   `success=false` with their notices, transport failures in `error`.
#[flutter_rust_bridge::frb(sync)]
pub fn register_process(
    order_id: Option<u32>,
    item_id: Option<u32>,
    process_name: String,
    worker: String,
) -> RegistrationFeedback {
    let mut notifier = RecordingNotifier::default();
    let mut haptic = RecordingHaptic::default();
    let mut buttons = RecordingButtons::default();

    let store = match open_store() {
        Ok(store) => store,
        Err(message) => {
            return RegistrationFeedback {
                success: false,
                notices: notifier.notices,
                buttons: buttons.commands,
                haptic_ms: None,
                error: Some(message),
            }
        }
    };

    let selection = Selection { order_id, item_id };
    let outcome = {
        let mut service = RegistrationService::new(store, &mut notifier, &mut haptic);
        service.register(selection, &process_name, &worker, &mut buttons)
    };

    match outcome {
        Ok(result) => RegistrationFeedback {
            success: result.success,
            notices: notifier.notices,
            buttons: buttons.commands,
            haptic_ms: haptic.requested_ms,
            error: None,
        },
        Err(err) => RegistrationFeedback {
            success: false,
            notices: notifier.notices,
            buttons: buttons.commands,
            haptic_ms: None,
            error: Some(err.to_string()),
        },
    }
}

/// Returns completed process names for one item, for button reconciliation
/// on each render.
///
/// # FFI contract
/// - Sync call; read-only.
/// - Never panics; unknown items or read failures yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn completed_processes(order_id: u32, item_id: u32) -> Vec<String> {
    let Ok(store) = open_store() else {
        return Vec::new();
    };
    match store.completed_processes(order_id, item_id) {
        Ok(names) => names,
        Err(err) => {
            warn!("event=completed_read module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Returns the newest registration history rows for the history view.
///
/// # FFI contract
/// - Sync call; read-only.
/// - Never panics; read failures yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn progress_history() -> Vec<HistoryEntry> {
    let Ok(store) = open_store() else {
        return Vec::new();
    };
    match store.history(HISTORY_VIEW_LIMIT) {
        Ok(records) => records
            .into_iter()
            .map(|record| HistoryEntry {
                uuid: record.uuid.to_string(),
                order_id: record.order_id,
                item_id: record.item_id,
                bom_name: record.bom_name,
                process_name: record.process_name,
                worker: record.worker,
                recorded_at: record.recorded_at,
            })
            .collect(),
        Err(err) => {
            warn!("event=history_read module=ffi status=error error={err}");
            Vec::new()
        }
    }
}
