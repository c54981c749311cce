use shopfloor_core::{CatalogStore, Item, Order, ProcessStore, SqliteProgressStore};

fn sample_catalog() -> Vec<Order> {
    let mut first = Order::new(1, "Building A", "Door Unit 1");
    first.due_date = Some("2026-09-01".to_string());
    let mut panel = Item::new(10, "Door Panel (front)");
    panel.part_code = Some("DP-01".to_string());
    panel.processes = vec![
        "Cutting".to_string(),
        "Pressing".to_string(),
        "Assembly".to_string(),
    ];
    let mut frame = Item::new(11, "Door Frame");
    frame.processes = vec!["Cutting".to_string(), "Assembly".to_string()];
    first.items.push(panel);
    first.items.push(frame);

    let mut second = Order::new(2, "Building B", "Window Unit 3");
    second.items.push(Item::new(20, "Window Sash"));

    vec![first, second]
}

#[test]
fn catalog_snapshot_round_trips_with_positions_preserved() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    let catalog = sample_catalog();

    store.replace_catalog(&catalog).unwrap();
    let loaded = store.orders().unwrap();

    assert_eq!(loaded, catalog);
}

#[test]
fn registration_folds_into_the_next_snapshot() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    store.replace_catalog(&sample_catalog()).unwrap();

    assert!(store.register_completion(1, 10, "Cutting", "worker-a").unwrap());

    let loaded = store.orders().unwrap();
    let item = loaded[0].item(10).unwrap();
    assert!(item.is_completed("Cutting"));
    assert_eq!(item.uncompleted_processes(), vec!["Pressing", "Assembly"]);
    assert_eq!(loaded[0].progress_percent(), 20); // 1 of 5 route steps
}

#[test]
fn unknown_order_or_item_is_rejected_without_side_effects() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    store.replace_catalog(&sample_catalog()).unwrap();

    assert!(!store.register_completion(1, 99, "Cutting", "worker-a").unwrap());
    assert!(!store.register_completion(99, 10, "Cutting", "worker-a").unwrap());

    assert!(store.history(10).unwrap().is_empty());
    assert!(store.completed_processes(1, 99).unwrap().is_empty());
}

#[test]
fn duplicate_registration_keeps_one_completion_but_full_history() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    store.replace_catalog(&sample_catalog()).unwrap();

    assert!(store.register_completion(1, 10, "Cutting", "worker-a").unwrap());
    assert!(store.register_completion(1, 10, "Cutting", "worker-b").unwrap());

    // At-most-once completion; every successful attempt is journaled.
    assert_eq!(
        store.completed_processes(1, 10).unwrap(),
        vec!["Cutting".to_string()]
    );
    let history = store.history(10).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|record| record.process_name == "Cutting"
        && record.bom_name == "Door Panel (front)"));
}

#[test]
fn completed_processes_keep_registration_order() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    store.replace_catalog(&sample_catalog()).unwrap();

    store.register_completion(1, 10, "Pressing", "worker-a").unwrap();
    store.register_completion(1, 10, "Cutting", "worker-a").unwrap();

    assert_eq!(
        store.completed_processes(1, 10).unwrap(),
        vec!["Pressing".to_string(), "Cutting".to_string()]
    );
}

#[test]
fn history_is_capped_to_the_newest_hundred() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    let mut order = Order::new(1, "Building A", "Door Unit 1");
    let mut item = Item::new(10, "Door Panel");
    item.processes = (0..120).map(|n| format!("step-{n:03}")).collect();
    order.items.push(item);
    store.replace_catalog(&[order]).unwrap();

    for n in 0..120 {
        let process = format!("step-{n:03}");
        assert!(store.register_completion(1, 10, &process, "worker-a").unwrap());
    }

    let history = store.history(200).unwrap();
    assert_eq!(history.len(), 100);
    // Newest first; the oldest twenty rows were trimmed.
    assert_eq!(history.first().unwrap().process_name, "step-119");
    assert_eq!(history.last().unwrap().process_name, "step-020");
}

#[test]
fn catalog_resync_preserves_registered_completions() {
    let mut store = SqliteProgressStore::open_in_memory().unwrap();
    store.replace_catalog(&sample_catalog()).unwrap();
    store.register_completion(1, 10, "Cutting", "worker-a").unwrap();

    // Host re-syncs the same catalog (e.g. after reconnecting).
    store.replace_catalog(&sample_catalog()).unwrap();

    assert_eq!(
        store.completed_processes(1, 10).unwrap(),
        vec!["Cutting".to_string()]
    );
    let loaded = store.orders().unwrap();
    assert!(loaded[0].item(10).unwrap().is_completed("Cutting"));
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shopfloor.sqlite3");

    {
        let mut store = SqliteProgressStore::open(&db_path).unwrap();
        store.replace_catalog(&sample_catalog()).unwrap();
        store.register_completion(1, 10, "Cutting", "worker-a").unwrap();
    }

    let store = SqliteProgressStore::open(&db_path).unwrap();
    assert_eq!(
        store.completed_processes(1, 10).unwrap(),
        vec!["Cutting".to_string()]
    );
    assert_eq!(store.history(10).unwrap().len(), 1);
}
