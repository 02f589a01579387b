//! Error handling and edge case tests.
//!
//! Nothing in the demultiplexer is fatal: the worst outcome of any single
//! bad record or bad subscriber is a dropped event surfaced through the
//! error hook.

use feedmux::{Demux, FeedError, SubscriptionHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

fn hooked_demux() -> (Demux, Arc<Mutex<Vec<String>>>) {
    let demux = Demux::new();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_clone = Arc::clone(&errors);
    demux.set_error_hook(move |err| {
        errors_clone.lock().unwrap().push(err.to_string());
    });
    (demux, errors)
}

// --- Conversion Failures ---

#[test]
fn test_malformed_record_dropped_stream_continues() {
    let (demux, errors) = hooked_demux();

    let texts = Arc::new(Mutex::new(Vec::new()));
    let texts_clone = Arc::clone(&texts);
    let _handle = demux.on_status(move |status| {
        texts_clone.lock().unwrap().push(status.text.clone());
    });

    demux.on_record(r#"{"text":"good"}"#);
    // Sniffs as a status, fails the structured parse.
    demux.on_record(r#"{"text":  broken}"#);
    demux.on_record(r#"{"text":"still good"}"#);

    // Zero delivered events for the bad record, normal delivery around it.
    assert_eq!(
        *texts.lock().unwrap(),
        vec!["good".to_string(), "still good".to_string()]
    );
    assert_eq!(demux.stats().conversion_failures, 1);
    assert_eq!(errors.lock().unwrap().len(), 1);
}

#[test]
fn test_malformed_friends_record_does_not_affect_status_kind() {
    let (demux, errors) = hooked_demux();

    let status_count = Arc::new(AtomicU64::new(0));
    let count_clone = Arc::clone(&status_count);
    let _s = demux.on_status(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    let _f = demux.on_friends_list(|_| panic!("must not receive a malformed record"));

    demux.on_record(r#"{"friends":"not an array"}"#);
    demux.on_record(r#"{"text":"unaffected"}"#);

    assert_eq!(status_count.load(Ordering::SeqCst), 1);
    assert_eq!(errors.lock().unwrap().len(), 1);
}

#[test]
fn test_classification_miss_is_not_an_error() {
    let (demux, errors) = hooked_demux();

    demux.on_record("garbage that matches nothing");
    demux.on_record(r#"{"limit":{"track":12}}"#);

    // Silently dropped: counted but never surfaced through the hook.
    assert_eq!(demux.stats().unrecognized, 2);
    assert!(errors.lock().unwrap().is_empty());
}

// --- Subscriber Failures ---

#[test]
fn test_panicking_subscriber_does_not_stop_dispatch() {
    let (demux, errors) = hooked_demux();

    let _bad = demux.on_status(|_| panic!("subscriber bug"));
    let delivered = Arc::new(AtomicU64::new(0));
    let delivered_clone = Arc::clone(&delivered);
    let _good = demux.on_status(move |_| {
        delivered_clone.fetch_add(1, Ordering::SeqCst);
    });

    demux.on_record(r#"{"text":"one"}"#);
    demux.on_record(r#"{"text":"two"}"#);

    // The later subscriber received every event.
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
    // One surfaced failure per dispatch; the offender stays registered.
    assert_eq!(errors.lock().unwrap().len(), 2);
    assert_eq!(demux.stats().hub.active_subscriptions, 2);
}

#[test]
fn test_subscriber_failure_is_typed() {
    let demux = Demux::new();
    let saw_subscriber_error = Arc::new(AtomicU64::new(0));

    let saw_clone = Arc::clone(&saw_subscriber_error);
    demux.set_error_hook(move |err| {
        if matches!(err, FeedError::Subscriber { .. }) {
            saw_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    let _bad = demux.on_status(|_| panic!("boom"));
    demux.on_record(r#"{"text":"x"}"#);

    assert_eq!(saw_subscriber_error.load(Ordering::SeqCst), 1);
}

// --- Subscription Lifecycle Edge Cases ---

#[test]
fn test_release_during_dispatch_spares_in_flight_snapshot() {
    let demux = Demux::new();

    // First subscriber releases the second from inside its callback.
    let victim: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));
    let victim_clone = Arc::clone(&victim);
    let _releaser = demux.on_status(move |_| {
        if let Some(handle) = victim_clone.lock().unwrap().as_ref() {
            handle.release();
        }
    });

    let count = Arc::new(AtomicU64::new(0));
    let count_clone = Arc::clone(&count);
    let handle = demux.on_status(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    *victim.lock().unwrap() = Some(handle);

    demux.on_record(r#"{"text":"one"}"#);
    demux.on_record(r#"{"text":"two"}"#);

    // The in-flight snapshot still delivered the first event; the second
    // dispatch no longer includes the released subscriber.
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(demux.stats().hub.active_subscriptions, 1);
}

#[test]
fn test_subscriber_registering_from_callback_does_not_deadlock() {
    let demux = Demux::new();
    let late_count = Arc::new(AtomicU64::new(0));
    let handles = Arc::new(Mutex::new(Vec::new()));

    // Register through the hub from inside a callback; the registry lock
    // is not held during callback invocation.
    let hub = demux.hub().clone();
    let late_clone = Arc::clone(&late_count);
    let handles_clone = Arc::clone(&handles);
    let _outer = demux.on_status(move |_| {
        let late = Arc::clone(&late_clone);
        let handle = hub.register(feedmux::EventKind::Status, move |_| {
            late.fetch_add(1, Ordering::SeqCst);
        });
        handles_clone.lock().unwrap().push(handle);
    });

    demux.on_record(r#"{"text":"one"}"#);
    // The subscriber added during the first dispatch missed that
    // snapshot but receives the next event.
    demux.on_record(r#"{"text":"two"}"#);

    assert_eq!(late_count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handle_outlives_demux() {
    let handle = {
        let demux = Demux::new();
        demux.on_status(|_| {})
    };
    // Demux (and hub) are gone; release is a safe no-op.
    handle.release();
    handle.release();
}
