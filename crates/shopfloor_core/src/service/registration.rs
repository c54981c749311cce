//! Process registration state machine.
//!
//! # Responsibility
//! - Validate the current selection, drive the per-button affordance
//!   lifecycle and call the completion store exactly once per attempt.
//! - Reconcile button affordances from the store on render.
//!
//! # Invariants
//! - No store call happens without a complete selection.
//! - At-most-once completion is owned by the store; repeated attempts must
//!   tolerate its no-op success.
//! - Haptic failures are swallowed and never affect the result.
//! - Every failure path returns the button to `Pending`; retry is allowed.

use crate::host::{HapticDevice, NoticeLevel, NotificationSink, ProcessButtonUi};
use crate::model::order::{ItemId, OrderId};
use crate::model::scan::{RegistrationResult, Selection};
use crate::store::{ProcessStore, StoreError};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const HAPTIC_PULSE_MS: u32 = 50;

/// Lifecycle of one process button within the current page lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonState {
    /// Idle; registration may be attempted.
    #[default]
    Pending,
    /// A store call is in flight for this button.
    Registering,
    /// Registration succeeded; terminal for this (item, process) pair.
    Registered,
}

/// Registration use-case errors.
#[derive(Debug)]
pub enum RegistrationError {
    /// Order or item selection missing; no registration was attempted.
    MissingSelection,
    /// The store failed at the transport level.
    Store(StoreError),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSelection => write!(f, "order and item are not selected"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::MissingSelection => None,
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Drives process registration over the injected store and host devices.
pub struct RegistrationService<S: ProcessStore, N: NotificationSink, H: HapticDevice> {
    store: S,
    notifier: N,
    haptic: H,
    buttons: BTreeMap<(OrderId, ItemId, String), ButtonState>,
}

impl<S: ProcessStore, N: NotificationSink, H: HapticDevice> RegistrationService<S, N, H> {
    /// Creates a service with all buttons in `Pending`.
    pub fn new(store: S, notifier: N, haptic: H) -> Self {
        Self {
            store,
            notifier,
            haptic,
            buttons: BTreeMap::new(),
        }
    }

    /// Current state of one process button; `Pending` when never touched.
    pub fn button_state(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        process_name: &str,
    ) -> ButtonState {
        self.buttons
            .get(&(order_id, item_id, process_name.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Registers the named process as completed for the current selection.
    ///
    /// Validation failure and store transport failure surface as errors;
    /// a store-reported rejection surfaces as `success: false`. All three
    /// leave the button in `Pending` with its idle affordance restored.
    pub fn register(
        &mut self,
        selection: Selection,
        process_name: &str,
        worker: &str,
        buttons: &mut impl ProcessButtonUi,
    ) -> Result<RegistrationResult, RegistrationError> {
        let (Some(order_id), Some(item_id)) = (selection.order_id, selection.item_id) else {
            buttons.reset(process_name);
            self.notifier
                .notify("order and item are not selected", NoticeLevel::Error);
            return Err(RegistrationError::MissingSelection);
        };

        let key = (order_id, item_id, process_name.to_string());
        self.buttons.insert(key.clone(), ButtonState::Registering);
        buttons.mark_busy(process_name);

        match self
            .store
            .register_completion(order_id, item_id, process_name, worker)
        {
            Ok(true) => {
                self.buttons.insert(key, ButtonState::Registered);
                buttons.mark_registered(process_name);
                self.notifier.notify(
                    &format!("{process_name} registered as completed"),
                    NoticeLevel::Success,
                );
                if self.haptic.pulse(HAPTIC_PULSE_MS).is_err() {
                    debug!("event=haptic_skipped module=registration");
                }
                info!(
                    "event=registration module=registration status=ok order_id={order_id} \
                     item_id={item_id} process={process_name}"
                );
                Ok(RegistrationResult { success: true })
            }
            Ok(false) => {
                self.buttons.insert(key, ButtonState::Pending);
                buttons.reset(process_name);
                self.notifier
                    .notify("registration failed", NoticeLevel::Error);
                warn!(
                    "event=registration module=registration status=rejected order_id={order_id} \
                     item_id={item_id} process={process_name}"
                );
                Ok(RegistrationResult { success: false })
            }
            Err(err) => {
                self.buttons.insert(key, ButtonState::Pending);
                buttons.reset(process_name);
                self.notifier
                    .notify("registration failed", NoticeLevel::Error);
                warn!(
                    "event=registration module=registration status=error order_id={order_id} \
                     item_id={item_id} process={process_name} error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Re-derives `Registered` affordances from the store for one item.
    ///
    /// Called on each render so a reloaded page never re-enables a process
    /// the store already recorded as completed.
    pub fn reconcile_item(
        &mut self,
        order_id: OrderId,
        item_id: ItemId,
        buttons: &mut impl ProcessButtonUi,
    ) -> Result<(), RegistrationError> {
        for process_name in self.store.completed_processes(order_id, item_id)? {
            buttons.mark_registered(&process_name);
            self.buttons
                .insert((order_id, item_id, process_name), ButtonState::Registered);
        }
        Ok(())
    }
}
