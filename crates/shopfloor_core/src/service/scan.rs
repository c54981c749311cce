//! Scan-cycle resolution orchestrator.
//!
//! # Responsibility
//! - Sequence order resolution, dependent item-control materialization and
//!   item resolution for one scan cycle.
//! - Own the transient `Selection` and report each outcome to the user.
//!
//! # Invariants
//! - Item resolution never runs before the item control has been
//!   materialized for the cycle's order.
//! - `Selection::item_id`, when set, references an item of the order in
//!   `Selection::order_id`.
//! - Concurrent scans are last-write-wins: a superseded cycle's resumption
//!   is discarded silently.

use crate::host::{Materialization, NoticeLevel, NotificationSink, SelectionUi};
use crate::matching::{match_item, match_order, MatchTier, OrderMatchFailure};
use crate::model::order::Order;
use crate::model::scan::{ScanPayload, Selection};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Observable state of the orchestrator between calls.
///
/// The resolving states of the cycle state machine collapse into the
/// synchronous calls; what remains visible is the parked deferral point and
/// the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// No scan handled yet, or ready for the next one.
    Idle,
    /// Order resolved; waiting for the host to materialize item options.
    AwaitingItemControl,
    /// Order and item both resolved.
    Complete,
    /// Cycle ended without a full selection.
    Failed,
}

/// Terminal (or parked) outcome of one `handle_scan`/resume step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No order matched; the classification shaped the user message.
    OrderNotFound(OrderMatchFailure),
    /// Order resolved; item resolution parked until the host signals
    /// readiness via [`ScanService::item_control_ready`].
    AwaitingItemControl { cycle: u64 },
    /// Order and item resolved and reflected in the selection controls.
    Complete {
        order_tier: MatchTier,
        item_tier: MatchTier,
    },
    /// Order resolved but the component text matched no item; the order
    /// selection is preserved for manual completion.
    ItemNotFound { order_tier: MatchTier },
}

/// Errors surfaced by the resume path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A superseded or already-consumed cycle tried to resume; discarded
    /// without user-facing feedback.
    StaleResolution { cycle: u64 },
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleResolution { cycle } => {
                write!(f, "scan cycle {cycle} was superseded")
            }
        }
    }
}

impl Error for ScanError {}

struct PendingItemResolution {
    cycle: u64,
    order: Order,
    bom_name_raw: String,
    order_tier: MatchTier,
}

/// Orchestrates scan cycles over injected host collaborators.
pub struct ScanService<U: SelectionUi, N: NotificationSink> {
    ui: U,
    notifier: N,
    selection: Selection,
    phase: CyclePhase,
    cycle: u64,
    pending: Option<PendingItemResolution>,
}

impl<U: SelectionUi, N: NotificationSink> ScanService<U, N> {
    /// Creates an idle orchestrator with an empty selection.
    pub fn new(ui: U, notifier: N) -> Self {
        Self {
            ui,
            notifier,
            selection: Selection::default(),
            phase: CyclePhase::Idle,
            cycle: 0,
            pending: None,
        }
    }

    /// Current transient selection, read by process registration.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Observable phase of the current cycle.
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Sequence number of the current cycle.
    pub fn current_cycle(&self) -> u64 {
        self.cycle
    }

    /// Runs one scan cycle up to a terminal state or the deferral point.
    ///
    /// A new scan always supersedes any in-flight cycle: the sequence
    /// number advances, the selection is cleared and a parked resolution is
    /// dropped before matching starts.
    pub fn handle_scan(&mut self, orders: &[Order], payload: &ScanPayload) -> ScanOutcome {
        self.cycle += 1;
        self.pending = None;
        self.selection.clear();

        match match_order(
            orders,
            &payload.project_name_raw,
            &payload.product_name_raw,
        ) {
            Err(failure) => {
                warn!(
                    "event=scan_order_unmatched module=scan cycle={} class={}",
                    self.cycle,
                    failure_token(failure)
                );
                self.notifier
                    .notify(&order_failure_message(failure, payload), NoticeLevel::Warning);
                self.phase = CyclePhase::Failed;
                ScanOutcome::OrderNotFound(failure)
            }
            Ok(hit) => {
                info!(
                    "event=scan_order_resolved module=scan cycle={} order_id={} tier={}",
                    self.cycle,
                    hit.order.id,
                    hit.tier.as_str()
                );
                self.selection.order_id = Some(hit.order.id);
                self.ui.set_order_control(hit.order.id);

                match self.ui.materialize_item_control(hit.order.id) {
                    Materialization::Ready => {
                        self.resolve_item(hit.order.clone(), &payload.bom_name_raw, hit.tier)
                    }
                    Materialization::Deferred => {
                        self.pending = Some(PendingItemResolution {
                            cycle: self.cycle,
                            order: hit.order.clone(),
                            bom_name_raw: payload.bom_name_raw.clone(),
                            order_tier: hit.tier,
                        });
                        self.phase = CyclePhase::AwaitingItemControl;
                        ScanOutcome::AwaitingItemControl { cycle: self.cycle }
                    }
                }
            }
        }
    }

    /// Resumes a parked cycle once the host reports the item control ready.
    ///
    /// A stale sequence number (superseded cycle, or one already consumed)
    /// is discarded without notifying the user.
    pub fn item_control_ready(&mut self, cycle: u64) -> Result<ScanOutcome, ScanError> {
        let current_cycle = self.cycle;
        let parked = self
            .pending
            .take_if(|pending| pending.cycle == cycle && cycle == current_cycle);
        let Some(pending) = parked else {
            debug!(
                "event=scan_resume_stale module=scan cycle={cycle} current={}",
                self.cycle
            );
            return Err(ScanError::StaleResolution { cycle });
        };

        Ok(self.resolve_item(pending.order, &pending.bom_name_raw, pending.order_tier))
    }

    fn resolve_item(
        &mut self,
        order: Order,
        bom_name_raw: &str,
        order_tier: MatchTier,
    ) -> ScanOutcome {
        match match_item(&order.items, bom_name_raw) {
            Some(hit) => {
                info!(
                    "event=scan_item_resolved module=scan cycle={} order_id={} item_id={} tier={}",
                    self.cycle,
                    order.id,
                    hit.item.id,
                    hit.tier.as_str()
                );
                self.selection.item_id = Some(hit.item.id);
                let item_tier = hit.tier;
                self.ui.set_item_control(hit.item.id);
                self.notifier.notify(
                    "order and item selected; press a process button to register",
                    NoticeLevel::Success,
                );
                self.phase = CyclePhase::Complete;
                ScanOutcome::Complete {
                    order_tier,
                    item_tier,
                }
            }
            None => {
                warn!(
                    "event=scan_item_unmatched module=scan cycle={} order_id={}",
                    self.cycle, order.id
                );
                self.notifier.notify(
                    &format!("order found but no matching item: {bom_name_raw}"),
                    NoticeLevel::Warning,
                );
                self.phase = CyclePhase::Failed;
                ScanOutcome::ItemNotFound { order_tier }
            }
        }
    }
}

fn order_failure_message(failure: OrderMatchFailure, payload: &ScanPayload) -> String {
    match failure {
        OrderMatchFailure::ProjectMatchedOnly => format!(
            "project name matched but product name did not: {}",
            payload.product_name_raw
        ),
        OrderMatchFailure::ProductMatchedOnly => format!(
            "product name matched but project name did not: {}",
            payload.project_name_raw
        ),
        OrderMatchFailure::NeitherMatched => format!(
            "no matching order (project: {}, product: {})",
            payload.project_name_raw, payload.product_name_raw
        ),
    }
}

fn failure_token(failure: OrderMatchFailure) -> &'static str {
    match failure {
        OrderMatchFailure::ProjectMatchedOnly => "project_only",
        OrderMatchFailure::ProductMatchedOnly => "product_only",
        OrderMatchFailure::NeitherMatched => "neither",
    }
}
