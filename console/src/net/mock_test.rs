use super::*;
use frames::{EventKind, ModuleTag};

const PERIOD: Duration = Duration::from_millis(3000);

#[tokio::test(start_paused = true)]
async fn connected_immediately_without_event() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(1);
    assert!(!channel.is_connected());

    channel.connect().await.expect("mock connect never fails");

    assert!(channel.is_connected());
    assert!(channel.last_event().is_none());
}

#[tokio::test(start_paused = true)]
async fn first_event_after_one_interval() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(2);
    channel.connect().await.expect("connect");

    tokio::time::sleep(PERIOD - Duration::from_millis(10)).await;
    assert!(channel.last_event().is_none());

    tokio::time::sleep(Duration::from_millis(20)).await;
    let event = channel.last_event().expect("event after one interval");
    assert_eq!(event.kind, EventKind::Progress);
    assert_eq!(event.module, ModuleTag::Unwrap);
    assert_eq!(event.task_id(), "demo-task");
    assert_eq!(event.message(), "Processing...");
    assert!((0.0..100.0).contains(&event.data.progress));

    channel.close().await;
}

#[tokio::test(start_paused = true)]
async fn subscriber_sees_each_tick() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(3);
    let mut rx = channel.subscribe();
    channel.connect().await.expect("connect");

    for _ in 0..3 {
        rx.changed().await.expect("sender alive");
        let event = rx.borrow_and_update().clone().expect("slot filled");
        assert!((0.0..100.0).contains(&event.data.progress));
    }

    channel.close().await;
}

#[tokio::test(start_paused = true)]
async fn no_event_after_close() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(4);
    channel.connect().await.expect("connect");
    tokio::time::sleep(PERIOD + Duration::from_millis(1)).await;

    channel.close().await;
    assert!(!channel.is_connected());
    let snapshot = channel.last_event();

    tokio::time::sleep(PERIOD * 5).await;
    assert_eq!(channel.last_event(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn reconnect_restarts_sequence() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(5);
    channel.connect().await.expect("connect");
    tokio::time::sleep(PERIOD + Duration::from_millis(1)).await;
    let first = channel.last_event().expect("first event");
    channel.close().await;

    channel.connect().await.expect("reconnect");
    assert!(channel.is_connected());
    tokio::time::sleep(PERIOD + Duration::from_millis(1)).await;
    let replayed = channel.last_event().expect("event after reconnect");

    assert_eq!(first, replayed);
    channel.close().await;
}

#[tokio::test(start_paused = true)]
async fn connect_twice_keeps_single_ticker() {
    let mut channel = MockStatusChannel::new(PERIOD).with_seed(6);
    let mut rx = channel.subscribe();
    channel.connect().await.expect("connect");
    channel.connect().await.expect("second connect is a no-op");

    tokio::time::sleep(PERIOD + Duration::from_millis(1)).await;
    assert!(rx.has_changed().expect("sender alive"));
    let _ = rx.borrow_and_update();

    tokio::time::sleep(PERIOD / 2).await;
    assert!(!rx.has_changed().expect("sender alive"));
    channel.close().await;
}

#[tokio::test]
async fn send_never_fails() {
    let channel = MockStatusChannel::default();
    assert!(channel.send(&serde_json::json!({"cmd": "start", "files": ["a.las"]})));
    assert!(channel.send(&Value::Null));
    assert_eq!(channel.interval(), DEFAULT_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_still_ticks() {
    let mut channel = MockStatusChannel::new(Duration::ZERO).with_seed(4);
    assert_eq!(channel.interval(), crate::runner::MIN_TICK_PERIOD);
    channel.connect().await.expect("connect");

    let mut events = channel.subscribe();
    events.changed().await.expect("ticker alive");
    assert!(channel.last_event().is_some());
    assert!(channel.is_connected());

    channel.close().await;
}
