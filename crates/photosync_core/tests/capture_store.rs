use photosync_core::{CaptureKey, CaptureStore, TransferItem};
use pretty_assertions::assert_eq;

fn item(url: &str, album: &str) -> TransferItem {
    TransferItem::new(url, "a.jpg", album, "Expo")
}

#[test]
fn duplicate_add_is_a_noop() {
    let mut store = CaptureStore::new();

    assert!(store.add(item("https://x/a.jpg", "A1")));
    assert!(store.add(item("https://x/b.jpg", "A1")));
    assert!(!store.add(item("https://x/a.jpg", "A1")));

    assert_eq!(store.seen_count(), 2);
    assert_eq!(store.pending_count(), 2);
}

#[test]
fn same_url_in_two_albums_is_two_items() {
    let mut store = CaptureStore::new();

    assert!(store.add(item("https://x/a.jpg", "A1")));
    assert!(store.add(item("https://x/a.jpg", "A2")));

    assert_eq!(store.seen_count(), 2);
    assert!(store.contains(&CaptureKey::new("https://x/a.jpg", "A2")));
}

#[test]
fn commit_leaves_late_arrivals_pending() {
    let mut store = CaptureStore::new();
    let a = item("https://x/a.jpg", "A1");
    let b = item("https://x/b.jpg", "A1");
    let c = item("https://x/c.jpg", "A1");
    let d = item("https://x/d.jpg", "A1");
    store.extend([a.clone(), b.clone(), c.clone()]);

    let snapshot = store.drain();
    assert_eq!(snapshot, vec![a, b, c]);
    assert_eq!(store.pending_count(), 3);

    store.add(d.clone());
    let removed = store.commit(&snapshot);

    assert_eq!(removed, 3);
    assert_eq!(store.drain(), vec![d]);
    assert_eq!(store.seen_count(), 4);
}

#[test]
fn committed_items_are_not_captured_again() {
    let mut store = CaptureStore::new();
    let a = TransferItem::new("https://x/a.jpg", "a.jpg", "A1", "Expo");
    store.add(a.clone());

    let snapshot = store.drain();
    store.commit(&snapshot);
    assert_eq!(store.pending_count(), 0);

    assert!(!store.add(a.clone()));
    assert_eq!(store.pending_count(), 0);
    assert!(store.contains(&a.key()));
}

#[test]
fn commit_ignores_items_no_longer_pending() {
    let mut store = CaptureStore::new();
    let a = item("https://x/a.jpg", "A1");
    store.add(a.clone());
    store.commit(&[a.clone()]);

    assert_eq!(store.commit(&[a]), 0);
    assert_eq!(store.seen_count(), 1);
}

#[test]
fn drain_keeps_first_seen_order_across_batches() {
    let mut store = CaptureStore::new();
    let first = [item("https://x/3.jpg", "A"), item("https://x/1.jpg", "A")];
    let second = [
        item("https://x/1.jpg", "A"),
        item("https://x/2.jpg", "A"),
        item("https://x/3.jpg", "B"),
    ];

    assert_eq!(store.extend(first), 2);
    assert_eq!(store.extend(second), 2);

    let urls: Vec<_> = store
        .drain()
        .iter()
        .map(|i| format!("{}@{}", i.url(), i.album()))
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://x/3.jpg@A",
            "https://x/1.jpg@A",
            "https://x/2.jpg@A",
            "https://x/3.jpg@B",
        ]
    );
}

#[test]
fn transfer_item_serializes_to_agent_shape() {
    let value = serde_json::to_value(TransferItem::new(
        "https://x/a.jpg",
        "a.jpg",
        "A1",
        "Expo",
    ))
    .unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "url": "https://x/a.jpg",
            "name": "a.jpg",
            "album": "A1",
            "activity": "Expo",
        })
    );
}
