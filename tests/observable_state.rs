mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use common::{product_list, rows, DELIVERY_TIMEOUT};
use parking_lot::Mutex;
use sectioned::model::{CollectionDataSource, CollectionIntent, Section};
use sectioned::state::{
    EventHandlers, Handler, ObservableState, ScreenSession, ScreenState, Snapshot, StateError,
    Subscription,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn recv(rx: &mut mpsc::UnboundedReceiver<u64>) -> u64 {
    timeout(DELIVERY_TIMEOUT, rx.recv())
        .await
        .expect("delivery timed out")
        .expect("subscriber channel closed")
}

/// Poll `condition` until it holds or the delivery timeout elapses.
async fn wait_until(condition: impl Fn() -> bool) {
    timeout(DELIVERY_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_late_subscriber_receives_current_value_first() {
    let state = ObservableState::new(CollectionDataSource::new());
    let published = product_list();
    let version = state.publish(published.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = state
        .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
            let _ = tx.send(snapshot);
        })
        .unwrap();

    let first = timeout(DELIVERY_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.version(), version);
    assert_eq!(first.value(), &published);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_subscriber_converges_on_last_value() {
    let state = ObservableState::new(CollectionDataSource::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let sink = Arc::clone(&seen);
    let _subscription = state
        .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
            std::thread::sleep(Duration::from_millis(30));
            sink.lock().push((snapshot.version(), snapshot.len()));
            let _ = tx.send(snapshot.version());
        })
        .unwrap();

    let v1 = state.publish(CollectionDataSource::new().add_section(Section::new()));
    let v2 = state.publish(state.current().add_section(Section::new()));
    let v3 = state.publish(state.current().add_section(Section::new()));
    assert!(v1 < v2 && v2 < v3);

    while recv(&mut rx).await < v3 {}

    let seen = seen.lock().clone();
    assert_eq!(seen.last(), Some(&(v3, 3)));
    assert!(
        seen.windows(2).all(|w| w[0].0 < w[1].0),
        "versions must strictly increase: {:?}",
        seen
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_publish_does_not_wait_for_subscribers() {
    let state = ObservableState::new(CollectionDataSource::new());
    let (gate_tx, gate_rx) = std::sync::mpsc::channel::<()>();
    let gate_rx = Mutex::new(gate_rx);
    let _subscription = state
        .subscribe(move |_snapshot: Snapshot<CollectionDataSource>| {
            let _ = gate_rx.lock().recv_timeout(Duration::from_millis(200));
        })
        .unwrap();

    // Publishing completes while the subscriber is still blocked.
    for _ in 0..10 {
        state.update(|ds| ds.add_section(Section::new()));
    }
    assert_eq!(state.version(), 10);
    drop(gate_tx);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsubscribe_stops_delivery_and_is_idempotent() {
    let state = ObservableState::new(CollectionDataSource::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let counter = Arc::clone(&calls);
    let subscription = state
        .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(snapshot.version());
        })
        .unwrap();
    assert_eq!(recv(&mut rx).await, 0);

    subscription.unsubscribe();
    subscription.unsubscribe();
    assert!(!subscription.is_active());

    let after = calls.load(Ordering::SeqCst);
    state.publish(product_list());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsubscribe_from_inside_callback() {
    let state = ObservableState::new(CollectionDataSource::new());
    let handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let own_handle = Arc::clone(&handle);
    let counter = Arc::clone(&calls);
    let subscription = state
        .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
            counter.fetch_add(1, Ordering::SeqCst);
            if snapshot.version() >= 1 {
                if let Some(subscription) = own_handle.lock().clone() {
                    subscription.unsubscribe();
                }
            }
            let _ = tx.send(snapshot.version());
        })
        .unwrap();
    *handle.lock() = Some(subscription.clone());

    assert_eq!(recv(&mut rx).await, 0);
    state.publish(product_list());
    assert_eq!(recv(&mut rx).await, 1);
    assert!(!subscription.is_active());

    state.publish(CollectionDataSource::new());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unsubscribe_waits_for_running_callback() {
    let state = ObservableState::new(CollectionDataSource::new());
    let entered = Arc::new(AtomicBool::new(false));
    let left = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicUsize::new(0));

    let entered_flag = Arc::clone(&entered);
    let left_flag = Arc::clone(&left);
    let counter = Arc::clone(&calls);
    let subscription = state
        .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
            counter.fetch_add(1, Ordering::SeqCst);
            if snapshot.version() >= 1 {
                entered_flag.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
                left_flag.store(true, Ordering::SeqCst);
            }
        })
        .unwrap();

    state.publish(product_list());
    wait_until(|| entered.load(Ordering::SeqCst)).await;

    subscription.unsubscribe();
    assert!(left.load(Ordering::SeqCst), "unsubscribe returned mid-callback");

    let after = calls.load(Ordering::SeqCst);
    state.publish(CollectionDataSource::new());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn test_subscribers_cancelling_each_other_do_not_deadlock() {
    let state = ObservableState::new(CollectionDataSource::new());
    let meet = Arc::new(Barrier::new(2));
    let first_handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let second_handle: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let subscribe_cancelling = |other: Arc<Mutex<Option<Subscription>>>| {
        let meet = Arc::clone(&meet);
        let done_tx = done_tx.clone();
        state
            .subscribe(move |snapshot: Snapshot<CollectionDataSource>| {
                if snapshot.version() == 1 {
                    // Both callbacks are in flight before either cancels.
                    meet.wait();
                    if let Some(other) = other.lock().clone() {
                        other.unsubscribe();
                    }
                    let _ = done_tx.send(snapshot.version());
                }
            })
            .unwrap()
    };

    let first = subscribe_cancelling(Arc::clone(&second_handle));
    let second = subscribe_cancelling(Arc::clone(&first_handle));
    *first_handle.lock() = Some(first.clone());
    *second_handle.lock() = Some(second.clone());

    state.publish(product_list());
    assert_eq!(recv(&mut done_rx).await, 1);
    assert_eq!(recv(&mut done_rx).await, 1);

    assert!(!first.is_active());
    assert!(!second.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_callback_deactivates_subscription() {
    let state = ObservableState::new(CollectionDataSource::new());
    let subscription = state
        .subscribe(|snapshot: Snapshot<CollectionDataSource>| {
            if snapshot.version() == 1 {
                panic!("renderer failed");
            }
        })
        .unwrap();
    assert!(subscription.is_active());

    state.publish(product_list());
    wait_until(|| !subscription.is_active()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_multiple_subscribers_all_reach_latest() {
    let state = ObservableState::new(CollectionDataSource::new());
    let (renderer_tx, mut renderer_rx) = mpsc::unbounded_channel();
    let (analytics_tx, mut analytics_rx) = mpsc::unbounded_channel();

    let _renderer = state
        .subscribe(move |s: Snapshot<CollectionDataSource>| {
            let _ = renderer_tx.send(s.version());
        })
        .unwrap();
    let _analytics = state
        .subscribe(move |s: Snapshot<CollectionDataSource>| {
            let _ = analytics_tx.send(s.version());
        })
        .unwrap();

    let last = state.publish(product_list());
    while recv(&mut renderer_rx).await < last {}
    while recv(&mut analytics_rx).await < last {}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropping_state_detaches_subscribers() {
    let state = ObservableState::new(CollectionDataSource::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = state
        .subscribe(move |s: Snapshot<CollectionDataSource>| {
            let _ = tx.send(s.version());
        })
        .unwrap();
    assert_eq!(recv(&mut rx).await, 0);

    let mut receiver = state.watch();
    drop(state);

    // Delivery task ended, so the callback (and its sender) is gone.
    let closed = timeout(DELIVERY_TIMEOUT, rx.recv()).await.unwrap();
    assert!(closed.is_none());
    assert!(!subscription.is_active());
    assert_eq!(receiver.changed().await.unwrap_err(), StateError::Closed);
}

#[tokio::test]
async fn test_watch_receiver_sees_latest() {
    let state = ObservableState::new(CollectionDataSource::new());
    let mut receiver = state.watch();
    assert_eq!(receiver.latest().version(), 0);

    state.publish(CollectionDataSource::new().add_section(Section::new()));
    state.publish(product_list());

    let latest = timeout(DELIVERY_TIMEOUT, receiver.changed()).await.unwrap().unwrap();
    assert_eq!(latest.version(), 2);
    assert_eq!(latest.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_session_paginates_and_keeps_handlers() {
    let loads = Arc::new(AtomicUsize::new(0));
    let load_counter = Arc::clone(&loads);

    let session = ScreenSession::new(ScreenState::new(), move |weak| {
        EventHandlers::new().with(
            "onLoadMore",
            Handler::action(move || {
                let Some(session) = weak.upgrade() else { return };
                load_counter.fetch_add(1, Ordering::SeqCst);
                let _ = session.state().dispatch_collection(CollectionIntent::AppendCells {
                    section: 1,
                    rows: rows(vec![
                        json!({"name": "Product 4", "price": 400}),
                        json!({"name": "Product 5", "price": 500}),
                    ]),
                });
            }),
        )
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _renderer = session
        .state()
        .subscribe(move |s: Snapshot<ScreenState>| {
            let _ = tx.send(s.version());
        })
        .unwrap();

    session.state().publish_collection(product_list());
    let snapshot = session.state().current();
    assert!(snapshot.handlers.invoke_action("onLoadMore"));

    let last = session.state().version();
    while recv(&mut rx).await < last {}

    let current = session.state().current();
    let collection = current.collection.as_ref().unwrap();
    assert_eq!(collection.section(1).unwrap().row_count(), 5);
    assert!(current.handlers.get("onLoadMore").is_some());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}
