//! Host-side collaborator contracts.
//!
//! # Responsibility
//! - Define the injected interfaces through which core services drive the
//!   hosting UI, user notifications and haptic hardware.
//! - Keep every service testable without a live rendering environment.
//!
//! # Invariants
//! - Core never reaches into ambient host state; all effects flow through
//!   these traits.
//! - Haptic failures are advisory and must never affect a use-case result.

use crate::model::order::{ItemId, OrderId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Stable token used in log events and host bridges.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Toast/banner sink rendered by the host.
pub trait NotificationSink {
    fn notify(&mut self, message: &str, level: NoticeLevel);
}

/// Whether the item selection control is usable immediately after a
/// materialization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    /// Options for the new order are available now; resolution may proceed
    /// inline.
    Ready,
    /// The host repopulates the control asynchronously and will signal
    /// completion via `ScanService::item_control_ready`.
    Deferred,
}

/// Selection controls rendered by the host from the catalog.
pub trait SelectionUi {
    /// Reflects the resolved order in the order selection control.
    fn set_order_control(&mut self, order_id: OrderId);

    /// Requests (re)population of the dependent item control for the given
    /// order. Item resolution must not proceed until the control is ready.
    fn materialize_item_control(&mut self, order_id: OrderId) -> Materialization;

    /// Reflects the resolved item in the item selection control.
    fn set_item_control(&mut self, item_id: ItemId);
}

/// Haptic hardware was unavailable or rejected the pulse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapticUnavailable;

impl Display for HapticUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "haptic device unavailable")
    }
}

impl Error for HapticUnavailable {}

/// Best-effort vibration device. Callers swallow failures.
pub trait HapticDevice {
    fn pulse(&mut self, duration_ms: u32) -> Result<(), HapticUnavailable>;
}

/// No-op haptic device for hosts without vibration hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHaptic;

impl HapticDevice for NullHaptic {
    fn pulse(&mut self, _duration_ms: u32) -> Result<(), HapticUnavailable> {
        Ok(())
    }
}

/// Per-process registration button affordances rendered by the host.
///
/// The store remains the source of truth for completion; these calls are a
/// derived reflection of the registration state machine.
pub trait ProcessButtonUi {
    /// Busy affordance while a registration is in flight (dimmed, label
    /// replaced by an in-progress indicator).
    fn mark_busy(&mut self, process_name: &str);

    /// Terminal affordance after a successful registration (check-marked
    /// label, control disabled).
    fn mark_registered(&mut self, process_name: &str);

    /// Restores the idle affordance after a validation or store failure.
    fn reset(&mut self, process_name: &str);
}
