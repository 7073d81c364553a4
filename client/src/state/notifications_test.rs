use super::*;
use crate::util::scheduler::ManualScheduler;

fn store_with_clock() -> (NotificationStore, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::new());
    (NotificationStore::new(scheduler.clone()), scheduler)
}

/// Records every snapshot an observer receives.
fn record(store: &NotificationStore) -> (Arc<Mutex<Vec<Vec<NotificationId>>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let sub = store.subscribe(move |items| {
        sink.lock()
            .unwrap()
            .push(items.iter().map(|n| n.id).collect());
    });
    (seen, sub)
}

fn ids(store: &NotificationStore) -> Vec<NotificationId> {
    store.snapshot().iter().map(|n| n.id).collect()
}

// =============================================================
// NotificationKind
// =============================================================

#[test]
fn default_lifetimes_per_kind() {
    assert_eq!(NotificationKind::Success.default_lifetime(), Duration::from_millis(4000));
    assert_eq!(NotificationKind::Error.default_lifetime(), Duration::from_millis(6000));
    assert_eq!(NotificationKind::Warning.default_lifetime(), Duration::from_millis(5000));
    assert_eq!(NotificationKind::Info.default_lifetime(), Duration::from_millis(4000));
}

#[test]
fn kind_parses_known_names() {
    for kind in NotificationKind::ALL {
        assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        assert_eq!(kind.to_string(), kind.as_str());
    }
}

#[test]
fn kind_rejects_unknown_names() {
    assert_eq!(
        "fatal".parse::<NotificationKind>(),
        Err(NotificationError::UnknownKind("fatal".to_owned()))
    );
    assert!("Success".parse::<NotificationKind>().is_err());
}

// =============================================================
// post
// =============================================================

#[test]
fn post_assigns_strictly_increasing_ids() {
    let (store, _clock) = store_with_clock();
    let a = store.info("one").unwrap();
    let b = store.success("two").unwrap();
    store.dismiss(b);
    let c = store.error("three").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn post_notifies_with_new_id_exactly_once() {
    let (store, _clock) = store_with_clock();
    let (seen, _sub) = record(&store);

    let id = store.warning("careful").unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].iter().filter(|n| **n == id).count(), 1);
}

#[test]
fn post_keeps_insertion_order() {
    let (store, _clock) = store_with_clock();
    let first = store.info("first").unwrap();
    let second = store.info("second").unwrap();
    let third = store.info("third").unwrap();
    assert_eq!(ids(&store), vec![first, second, third]);
}

#[test]
fn post_records_kind_lifetime_and_clock() {
    let (store, clock) = store_with_clock();
    clock.advance(Duration::from_millis(1234));
    store.error("boom").unwrap();
    store
        .post("sticky", NotificationKind::Info, Some(Duration::ZERO))
        .unwrap();

    let items = store.snapshot();
    assert_eq!(items[0].kind, NotificationKind::Error);
    assert_eq!(items[0].lifetime_ms, 6000);
    assert_eq!(items[0].created_at_ms, 1234);
    assert_eq!(items[1].lifetime_ms, 0);
}

#[test]
fn post_rejects_empty_message() {
    let (store, clock) = store_with_clock();
    let (seen, _sub) = record(&store);
    assert_eq!(store.info(""), Err(NotificationError::EmptyMessage));
    assert_eq!(store.info("   "), Err(NotificationError::EmptyMessage));
    assert!(store.is_empty());
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(clock.pending(), 0);
}

#[test]
fn announce_posts_like_post() {
    let (store, clock) = store_with_clock();
    let id = store.announce("Saved", NotificationKind::Success, Some(Duration::from_millis(50)));
    assert_eq!(id, ids(&store).first().copied());
    assert_eq!(clock.pending(), 1);
}

#[test]
fn announce_reports_empty_message_as_none() {
    let (store, clock) = store_with_clock();
    let (seen, _sub) = record(&store);
    assert_eq!(store.announce(" ", NotificationKind::Error, None), None);
    assert!(store.is_empty());
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(clock.pending(), 0);
}

#[test]
fn post_str_rejects_unknown_kind() {
    let (store, _clock) = store_with_clock();
    assert!(matches!(
        store.post_str("hello", "critical", None),
        Err(NotificationError::UnknownKind(_))
    ));
    assert!(store.is_empty());
    assert!(store.post_str("hello", "success", None).is_ok());
}

#[test]
fn zero_lifetime_persists() {
    let (store, clock) = store_with_clock();
    let id = store
        .post("stay", NotificationKind::Warning, Some(Duration::ZERO))
        .unwrap();
    assert_eq!(clock.pending(), 0);
    clock.advance(Duration::from_secs(3600));
    assert_eq!(ids(&store), vec![id]);
}

// =============================================================
// Expiry and dismiss
// =============================================================

#[test]
fn expires_after_lifetime() {
    let (store, clock) = store_with_clock();
    store
        .post("short", NotificationKind::Info, Some(Duration::from_millis(50)))
        .unwrap();

    clock.advance(Duration::from_millis(49));
    assert_eq!(store.len(), 1);
    clock.advance(Duration::from_millis(1));
    assert!(store.is_empty());
}

#[test]
fn default_lifetime_expires() {
    let (store, clock) = store_with_clock();
    store.error("boom").unwrap();
    clock.advance(Duration::from_millis(5999));
    assert_eq!(store.len(), 1);
    clock.advance(Duration::from_millis(1));
    assert!(store.is_empty());
}

#[test]
fn explicit_dismiss_beats_expiry_without_duplicate_notification() {
    let (store, clock) = store_with_clock();
    let id = store
        .post("short", NotificationKind::Info, Some(Duration::from_millis(50)))
        .unwrap();
    let (seen, _sub) = record(&store);

    clock.advance(Duration::from_millis(10));
    store.dismiss(id);
    assert!(store.is_empty());
    assert_eq!(seen.lock().unwrap().len(), 1);

    clock.advance(Duration::from_millis(40));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn dismiss_cancels_retained_timer() {
    let (store, clock) = store_with_clock();
    let id = store.info("bye").unwrap();
    assert_eq!(clock.pending(), 1);
    store.dismiss(id);
    assert_eq!(clock.pending(), 0);
}

#[test]
fn dismiss_twice_is_silent() {
    let (store, _clock) = store_with_clock();
    let id = store.info("bye").unwrap();
    let (seen, _sub) = record(&store);

    store.dismiss(id);
    store.dismiss(id);
    store.dismiss(9999);

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn dismiss_after_expiry_is_silent() {
    let (store, clock) = store_with_clock();
    let id = store
        .post("short", NotificationKind::Info, Some(Duration::from_millis(50)))
        .unwrap();
    let (seen, _sub) = record(&store);

    clock.advance(Duration::from_millis(50));
    store.dismiss(id);

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn dismiss_keeps_other_entries_and_their_timers() {
    let (store, clock) = store_with_clock();
    let a = store
        .post("a", NotificationKind::Info, Some(Duration::from_millis(100)))
        .unwrap();
    let b = store
        .post("b", NotificationKind::Info, Some(Duration::from_millis(200)))
        .unwrap();
    store.dismiss(a);
    assert_eq!(ids(&store), vec![b]);

    clock.advance(Duration::from_millis(200));
    assert!(store.is_empty());
}

// =============================================================
// clear
// =============================================================

#[test]
fn clear_empties_and_cancels_pending_expiry() {
    let (store, clock) = store_with_clock();
    store
        .post("soon", NotificationKind::Success, Some(Duration::from_millis(100)))
        .unwrap();
    store
        .post("later", NotificationKind::Error, Some(Duration::ZERO))
        .unwrap();
    let (seen, _sub) = record(&store);

    store.clear();
    assert!(store.is_empty());
    assert_eq!(clock.pending(), 0);
    assert_eq!(seen.lock().unwrap().as_slice(), &[Vec::<NotificationId>::new()]);

    clock.advance(Duration::from_millis(200));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn clear_on_empty_store_is_silent() {
    let (store, _clock) = store_with_clock();
    let (seen, _sub) = record(&store);
    store.clear();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn ids_are_not_reused_after_clear() {
    let (store, _clock) = store_with_clock();
    let before = store.info("a").unwrap();
    store.clear();
    let after = store.info("b").unwrap();
    assert!(after > before);
}

// =============================================================
// subscribe
// =============================================================

#[test]
fn multiple_observers_each_receive_snapshots() {
    let (store, _clock) = store_with_clock();
    let (first, _a) = record(&store);
    let (second, _b) = record(&store);

    let id = store.info("hi").unwrap();

    assert_eq!(first.lock().unwrap().as_slice(), &[vec![id]]);
    assert_eq!(second.lock().unwrap().as_slice(), &[vec![id]]);
}

#[test]
fn unsubscribe_stops_delivery_and_is_idempotent() {
    let (store, _clock) = store_with_clock();
    let (kept, _keep) = record(&store);
    let (dropped, sub) = record(&store);

    sub.unsubscribe();
    sub.unsubscribe();
    store.info("hi").unwrap();

    assert!(dropped.lock().unwrap().is_empty());
    assert_eq!(kept.lock().unwrap().len(), 1);
}

#[test]
fn observer_can_reenter_store() {
    let (store, _clock) = store_with_clock();
    let reentrant = store.clone();
    let _sub = store.subscribe(move |items| {
        if items.len() > 2 {
            reentrant.dismiss(items[0].id);
        }
    });

    store.info("a").unwrap();
    store.info("b").unwrap();
    let c = store.info("c").unwrap();

    assert_eq!(store.len(), 2);
    assert_eq!(ids(&store).last(), Some(&c));
}

#[test]
fn expiry_after_store_dropped_is_harmless() {
    let scheduler = Arc::new(ManualScheduler::new());
    {
        let store = NotificationStore::new(scheduler.clone());
        store.info("orphan").unwrap();
    }
    scheduler.advance(Duration::from_secs(10));
    assert_eq!(scheduler.pending(), 0);
}
