use shopfloor_core::{
    CyclePhase, Item, ItemId, MatchTier, Materialization, NoticeLevel, NotificationSink, Order,
    OrderId, OrderMatchFailure, ScanOutcome, ScanPayload, ScanService, Selection, SelectionUi,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum UiCall {
    SetOrder(OrderId),
    Materialize(OrderId),
    SetItem(ItemId),
}

/// Recording selection UI with a configurable materialization signal.
#[derive(Clone)]
struct FakeSelectionUi {
    materialization: Materialization,
    calls: Rc<RefCell<Vec<UiCall>>>,
}

impl FakeSelectionUi {
    fn new(materialization: Materialization) -> Self {
        Self {
            materialization,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<UiCall> {
        self.calls.borrow().clone()
    }
}

impl SelectionUi for FakeSelectionUi {
    fn set_order_control(&mut self, order_id: OrderId) {
        self.calls.borrow_mut().push(UiCall::SetOrder(order_id));
    }

    fn materialize_item_control(&mut self, order_id: OrderId) -> Materialization {
        self.calls.borrow_mut().push(UiCall::Materialize(order_id));
        self.materialization
    }

    fn set_item_control(&mut self, item_id: ItemId) {
        self.calls.borrow_mut().push(UiCall::SetItem(item_id));
    }
}

#[derive(Clone, Default)]
struct FakeNotifier {
    notices: Rc<RefCell<Vec<(String, NoticeLevel)>>>,
}

impl FakeNotifier {
    fn notices(&self) -> Vec<(String, NoticeLevel)> {
        self.notices.borrow().clone()
    }
}

impl NotificationSink for FakeNotifier {
    fn notify(&mut self, message: &str, level: NoticeLevel) {
        self.notices.borrow_mut().push((message.to_string(), level));
    }
}

fn catalog() -> Vec<Order> {
    let mut first = Order::new(1, "Building A", "Door Unit 1");
    let mut panel = Item::new(10, "Door Panel (front)");
    panel.part_code = Some("DP-01".to_string());
    panel.processes = vec!["Cutting".to_string(), "Assembly".to_string()];
    let mut frame = Item::new(11, "Door Frame");
    frame.part_code = Some("DF-02".to_string());
    first.items.push(panel);
    first.items.push(frame);

    let mut second = Order::new(2, "Building B", "Window Unit 3");
    second.items.push(Item::new(20, "Window Sash"));

    vec![first, second]
}

fn payload(project: &str, product: &str, bom: &str) -> ScanPayload {
    ScanPayload {
        project_name_raw: project.to_string(),
        product_name_raw: product.to_string(),
        bom_name_raw: bom.to_string(),
    }
}

fn service(
    materialization: Materialization,
) -> (
    ScanService<FakeSelectionUi, FakeNotifier>,
    FakeSelectionUi,
    FakeNotifier,
) {
    let ui = FakeSelectionUi::new(materialization);
    let notifier = FakeNotifier::default();
    (
        ScanService::new(ui.clone(), notifier.clone()),
        ui,
        notifier,
    )
}

/// Selection must always pair an item with its owning order.
fn assert_selection_invariant(selection: Selection, orders: &[Order]) {
    if let Some(item_id) = selection.item_id {
        let order_id = selection.order_id.expect("item selected without an order");
        let order = orders
            .iter()
            .find(|order| order.id == order_id)
            .expect("selected order exists in catalog");
        assert!(order.item(item_id).is_some());
    }
}

#[test]
fn ready_materialization_resolves_order_and_item_inline() {
    let orders = catalog();
    let (mut scan, ui, notifier) = service(Materialization::Ready);

    let outcome = scan.handle_scan(&orders, &payload("Building A", "Door Unit 1", "DP-01"));

    assert!(matches!(outcome, ScanOutcome::Complete { .. }));
    assert_eq!(scan.phase(), CyclePhase::Complete);
    assert_eq!(scan.selection().order_id, Some(1));
    assert_eq!(scan.selection().item_id, Some(10));
    assert_selection_invariant(scan.selection(), &orders);

    assert_eq!(
        ui.calls(),
        vec![
            UiCall::SetOrder(1),
            UiCall::Materialize(1),
            UiCall::SetItem(10),
        ]
    );
    assert_eq!(
        notifier.notices(),
        vec![(
            "order and item selected; press a process button to register".to_string(),
            NoticeLevel::Success
        )]
    );
}

#[test]
fn deferred_materialization_parks_until_host_signal() {
    let orders = catalog();
    let (mut scan, ui, notifier) = service(Materialization::Deferred);

    let outcome = scan.handle_scan(&orders, &payload("Building A", "Door Unit 1", "Door Frame"));
    let ScanOutcome::AwaitingItemControl { cycle } = outcome else {
        panic!("expected a parked cycle, got {outcome:?}");
    };

    // Parked: order selected, no item yet, no user feedback yet.
    assert_eq!(scan.phase(), CyclePhase::AwaitingItemControl);
    assert_eq!(scan.selection().order_id, Some(1));
    assert_eq!(scan.selection().item_id, None);
    assert!(notifier.notices().is_empty());
    assert!(!ui
        .calls()
        .iter()
        .any(|call| matches!(call, UiCall::SetItem(_))));

    let resumed = scan.item_control_ready(cycle).unwrap();
    assert!(matches!(resumed, ScanOutcome::Complete { .. }));
    assert_eq!(scan.selection().item_id, Some(11));
    assert_selection_invariant(scan.selection(), &orders);
}

#[test]
fn superseding_scan_discards_stale_resumption() {
    let orders = catalog();
    let (mut scan, _ui, _notifier) = service(Materialization::Deferred);

    let first = scan.handle_scan(&orders, &payload("Building A", "Door Unit 1", "DP-01"));
    let ScanOutcome::AwaitingItemControl { cycle: first_cycle } = first else {
        panic!("expected a parked cycle");
    };

    // Second scan arrives before the first cycle's deferred step resumes.
    let second = scan.handle_scan(&orders, &payload("Building B", "Window Unit 3", "Sash"));
    let ScanOutcome::AwaitingItemControl {
        cycle: second_cycle,
    } = second
    else {
        panic!("expected a parked cycle");
    };
    assert!(second_cycle > first_cycle);

    // The stale resumption is discarded without touching the selection.
    assert!(scan.item_control_ready(first_cycle).is_err());
    assert_eq!(scan.selection().order_id, Some(2));
    assert_eq!(scan.selection().item_id, None);

    let resumed = scan.item_control_ready(second_cycle).unwrap();
    assert!(matches!(resumed, ScanOutcome::Complete { .. }));
    assert_eq!(scan.selection().order_id, Some(2));
    assert_eq!(scan.selection().item_id, Some(20));
    assert_selection_invariant(scan.selection(), &orders);

    // A consumed signal cannot fire twice.
    assert!(scan.item_control_ready(second_cycle).is_err());
}

#[test]
fn unmatched_order_reports_classified_diagnostics() {
    let orders = catalog();
    let (mut scan, ui, notifier) = service(Materialization::Ready);

    let outcome = scan.handle_scan(&orders, &payload("Building A", "Window Unit 9", "x"));
    assert_eq!(
        outcome,
        ScanOutcome::OrderNotFound(OrderMatchFailure::ProjectMatchedOnly)
    );
    assert_eq!(scan.phase(), CyclePhase::Failed);
    assert_eq!(scan.selection(), Selection::default());

    let outcome = scan.handle_scan(&orders, &payload("Building Z", "Door Unit 1", "x"));
    assert_eq!(
        outcome,
        ScanOutcome::OrderNotFound(OrderMatchFailure::ProductMatchedOnly)
    );

    let outcome = scan.handle_scan(&orders, &payload("Building Z", "Gate Unit 9", "x"));
    assert_eq!(
        outcome,
        ScanOutcome::OrderNotFound(OrderMatchFailure::NeitherMatched)
    );

    let notices = notifier.notices();
    let messages: Vec<&str> = notices.iter().map(|(message, _)| message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "project name matched but product name did not: Window Unit 9",
            "product name matched but project name did not: Building Z",
            "no matching order (project: Building Z, product: Gate Unit 9)",
        ]
    );
    assert!(notices
        .iter()
        .all(|(_, level)| *level == NoticeLevel::Warning));

    // No selection control was touched on any failed cycle.
    assert!(ui.calls().is_empty());
}

#[test]
fn unmatched_item_preserves_order_selection() {
    let orders = catalog();
    let (mut scan, _ui, notifier) = service(Materialization::Ready);

    let outcome = scan.handle_scan(
        &orders,
        &payload("Building A", "Door Unit 1", "Garage Shutter"),
    );

    assert!(matches!(outcome, ScanOutcome::ItemNotFound { .. }));
    assert_eq!(scan.phase(), CyclePhase::Failed);
    // Partial success stays visible so the user can pick the item manually.
    assert_eq!(scan.selection().order_id, Some(1));
    assert_eq!(scan.selection().item_id, None);
    assert_eq!(
        notifier.notices(),
        vec![(
            "order found but no matching item: Garage Shutter".to_string(),
            NoticeLevel::Warning
        )]
    );
}

#[test]
fn fuzzy_scan_text_resolves_through_normalization() {
    let orders = catalog();
    let (mut scan, _ui, _notifier) = service(Materialization::Ready);

    // Full-width spacing and case noise on every field.
    let outcome = scan.handle_scan(
        &orders,
        &payload("building\u{3000}a", "door unit\u{3000}1", "ｄｐ－０１"),
    );

    let ScanOutcome::Complete {
        order_tier,
        item_tier,
    } = outcome
    else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(order_tier, MatchTier::Fuzzy);
    assert_eq!(item_tier, MatchTier::Fuzzy);
    assert_eq!(scan.selection().item_id, Some(10));
}

#[test]
fn each_scan_overwrites_prior_selection() {
    let orders = catalog();
    let (mut scan, _ui, _notifier) = service(Materialization::Ready);

    scan.handle_scan(&orders, &payload("Building A", "Door Unit 1", "DP-01"));
    assert_eq!(scan.selection().item_id, Some(10));

    // A failed order match on the next scan clears the whole selection.
    scan.handle_scan(&orders, &payload("Building Z", "Gate Unit 9", "x"));
    assert_eq!(scan.selection(), Selection::default());
}
