#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use busline::{BusConfig, BusError, Event, EventBus, FailureKind, HandlerError, Listener};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

const MOCK_EVENT: &str = "call:event";
const WAIT: Duration = Duration::from_secs(2);

/// Listener that forwards `(listener tag, payload)` for string payloads.
fn recording(
    event: &str,
    tag: usize,
    tx: &mpsc::UnboundedSender<(usize, String)>,
) -> Listener {
    let tx = tx.clone();
    Listener::from_fn(event.to_owned(), move |ev: &Event| {
        let payload = ev.payload::<&str>().copied().unwrap_or("<other>");
        let _ = tx.send((tag, payload.to_owned()));
    })
}

async fn recv_n(
    rx: &mut mpsc::UnboundedReceiver<(usize, String)>,
    n: usize,
) -> Vec<(usize, String)> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let item = timeout(WAIT, rx.recv())
            .await
            .expect("handler was not invoked in time")
            .expect("channel closed");
        out.push(item);
    }
    out.sort();
    out
}

#[tokio::test]
async fn test_register_round_trip() {
    let bus = EventBus::new();
    let listener = Listener::from_fn("e", |_ev: &Event| {});

    let id = bus.register(&listener);

    assert_eq!(id, listener.id());
    assert_eq!(bus.listener_count("e"), 1);
    assert!(bus.event_names().contains(&"e".to_string()));
}

#[tokio::test]
async fn test_removal_cleans_up_event_name() {
    let bus = EventBus::new();
    let l1 = Listener::from_fn("e", |_ev: &Event| {});
    let l2 = Listener::from_fn("e", |_ev: &Event| {});
    bus.register(&l1);
    bus.register(&l2);

    assert_eq!(bus.unregister(&l1), 1);
    assert_eq!(bus.unregister(&l2), 1);

    assert_eq!(bus.listener_count("e"), 0);
    assert!(!bus.event_names().contains(&"e".to_string()));
    assert!(bus.is_empty());
}

#[tokio::test]
async fn test_identity_based_removal() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let first = recording("e", 1, &tx);
    let twin = recording("e", 2, &tx);
    bus.register(&first);
    bus.register(&twin);

    bus.unregister(&first);
    assert_eq!(bus.listener_count("e"), 1);

    bus.emit("e", "only-twin").unwrap();
    assert_eq!(recv_n(&mut rx, 1).await, vec![(2, "only-twin".to_string())]);
}

#[tokio::test]
async fn test_fan_out_delivers_once_to_each() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    for tag in 0..3 {
        bus.register(&recording("ping", tag, &tx));
    }

    assert_eq!(bus.emit("ping", "p").unwrap(), 3);

    let got = recv_n(&mut rx, 3).await;
    assert_eq!(
        got,
        vec![
            (0, "p".to_string()),
            (1, "p".to_string()),
            (2, "p".to_string())
        ]
    );
    bus.shutdown().await.unwrap();
    assert!(rx.try_recv().is_err(), "no handler may run twice");
}

#[tokio::test]
async fn test_no_cross_talk() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.register(&recording("a", 1, &tx));

    assert_eq!(bus.emit("b", "for-b").unwrap(), 0);
    bus.shutdown().await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let bus = EventBus::new();
    bus.register(&Listener::from_fn("kept", |_ev: &Event| {}));

    assert_eq!(bus.clear("nonexistent"), 0);
    assert_eq!(bus.clear("nonexistent"), 0);

    assert_eq!(bus.event_names(), vec!["kept".to_string()]);
    assert_eq!(bus.listener_count("kept"), 1);
}

#[tokio::test]
async fn test_clear_drops_every_listener() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.register(&recording("e", 1, &tx));
    bus.register(&recording("e", 2, &tx));

    assert_eq!(bus.clear("e"), 2);
    assert_eq!(bus.emit("e", "late").unwrap(), 0);
    bus.shutdown().await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_emitted_payload_reaches_handler() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = recording(MOCK_EVENT, 0, &tx);
    bus.register(&listener);

    bus.emit(MOCK_EVENT, "payload-X").unwrap();

    assert_eq!(recv_n(&mut rx, 1).await, vec![(0, "payload-X".to_string())]);
    bus.shutdown().await.unwrap();
    assert!(rx.try_recv().is_err(), "handler must run exactly once");
}

#[tokio::test]
async fn test_duplicate_registration_runs_twice_and_unregisters_together() {
    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = recording("dup", 7, &tx);
    bus.register(&listener);
    bus.register(&listener);

    assert_eq!(bus.emit("dup", "x").unwrap(), 2);
    assert_eq!(recv_n(&mut rx, 2).await.len(), 2);

    assert_eq!(bus.unregister(&listener), 2);
    assert_eq!(bus.listener_count("dup"), 0);
}

#[tokio::test]
async fn test_unregister_unknown_listener_is_noop() {
    let bus = EventBus::new();
    let stranger = Listener::from_fn("nobody", |_ev: &Event| {});
    assert_eq!(bus.unregister(&stranger), 0);
    assert!(bus.is_empty());
}

#[tokio::test]
async fn test_failing_handlers_are_isolated() {
    let bus = EventBus::new();
    let mut failures = bus.failures();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let panicking = Listener::from_fn("job", |_ev: &Event| panic!("handler exploded"));
    let failing = Listener::from_async("job", |_ev: Event| async {
        Err::<(), _>(HandlerError::failed("db down"))
    });
    bus.register(&panicking);
    bus.register(&failing);
    bus.register(&recording("job", 1, &tx));

    assert_eq!(bus.emit("job", "work").unwrap(), 3);
    assert_eq!(recv_n(&mut rx, 1).await, vec![(1, "work".to_string())]);

    let mut seen = Vec::new();
    for _ in 0..2 {
        seen.push(timeout(WAIT, failures.recv()).await.unwrap().unwrap());
    }
    seen.sort_by_key(|f| f.listener);

    assert_eq!(seen[0].listener, panicking.id());
    assert_eq!(seen[0].kind, FailureKind::Panic);
    assert_eq!(seen[0].reason.as_ref(), "handler exploded");
    assert_eq!(seen[1].listener, failing.id());
    assert_eq!(seen[1].kind, FailureKind::Error);
    assert_eq!(seen[1].event.as_ref(), "job");

    // The bus keeps working after failures.
    assert_eq!(bus.emit("job", "again").unwrap(), 3);
}

#[tokio::test]
async fn test_emit_does_not_wait_for_handlers() {
    let bus = EventBus::new();
    let (release_tx, release_rx) = mpsc::unbounded_channel::<()>();
    let release_rx = Arc::new(tokio::sync::Mutex::new(release_rx));
    let done = Arc::new(AtomicUsize::new(0));

    let listener = {
        let done = Arc::clone(&done);
        Listener::from_async("slow", move |_ev: Event| {
            let release_rx = Arc::clone(&release_rx);
            let done = Arc::clone(&done);
            async move {
                release_rx.lock().await.recv().await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
    };
    bus.register(&listener);

    assert_eq!(bus.emit("slow", ()).unwrap(), 1);
    assert_eq!(done.load(Ordering::SeqCst), 0);
    assert_eq!(bus.in_flight(), 1);

    // Registry stays usable while the handler is blocked.
    bus.unregister(&listener);
    assert!(bus.is_empty());

    release_tx.send(()).unwrap();
    bus.shutdown().await.unwrap();
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(bus.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_max_in_flight_caps_concurrency() {
    let cfg = BusConfig {
        max_in_flight: 1,
        ..BusConfig::default()
    };
    let bus = EventBus::builder(cfg).build();
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let running = Arc::clone(&running);
        let peak = Arc::clone(&peak);
        bus.register(&Listener::from_async("capped", move |_ev: Event| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        }));
    }

    assert_eq!(bus.emit("capped", ()).unwrap(), 4);
    bus.shutdown().await.unwrap();
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_rejects_later_emits() {
    let bus = EventBus::new();
    bus.register(&Listener::from_fn("e", |_ev: &Event| {}));

    bus.shutdown().await.unwrap();

    assert!(bus.is_closed());
    assert_eq!(
        bus.emit("e", ()),
        Err(BusError::Closed {
            event: "e".to_string()
        })
    );
    // Registry operations keep working.
    assert_eq!(bus.clear("e"), 1);
}

#[tokio::test]
async fn test_shutdown_reports_grace_exceeded() {
    let cfg = BusConfig {
        grace: Duration::from_millis(20),
        ..BusConfig::default()
    };
    let bus = EventBus::builder(cfg).build();
    bus.register(&Listener::from_async("stuck", |_ev: Event| async {
        sleep(Duration::from_secs(30)).await;
        Ok::<_, HandlerError>(())
    }));

    bus.emit("stuck", ()).unwrap();

    assert_eq!(
        bus.shutdown().await,
        Err(BusError::GraceExceeded {
            grace: Duration::from_millis(20),
            in_flight: 1
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_handler_starts_after_shutdown_returns() {
    let bus = EventBus::new();
    let started = Arc::new(AtomicUsize::new(0));
    {
        let started = Arc::clone(&started);
        bus.register(&Listener::from_fn("race", move |_ev: &Event| {
            started.fetch_add(1, Ordering::SeqCst);
        }));
    }

    let emitters: Vec<_> = (0..4)
        .map(|_| {
            let bus = bus.clone();
            tokio::spawn(async move {
                while bus.emit("race", ()).is_ok() {
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    sleep(Duration::from_millis(20)).await;
    bus.shutdown().await.unwrap();
    let at_shutdown = started.load(Ordering::SeqCst);
    assert_eq!(bus.in_flight(), 0);

    for emitter in emitters {
        timeout(WAIT, emitter).await.unwrap().unwrap();
    }
    sleep(Duration::from_millis(20)).await;
    assert_eq!(started.load(Ordering::SeqCst), at_shutdown);
}

#[tokio::test]
async fn test_oversized_in_flight_cap_builds() {
    let cfg = BusConfig {
        max_in_flight: usize::MAX,
        ..BusConfig::default()
    };
    let bus = EventBus::builder(cfg).build();
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.register(&recording("big", 0, &tx));

    assert_eq!(bus.emit("big", "capped"), Ok(1));
    assert_eq!(recv_n(&mut rx, 1).await, vec![(0, "capped".to_string())]);
}

#[test]
fn test_emit_outside_runtime_reports_no_runtime() {
    let bus = EventBus::new();
    bus.register(&Listener::from_fn("e", |_ev: &Event| {}));

    assert_eq!(
        bus.emit("e", ()),
        Err(BusError::NoRuntime {
            event: "e".to_string()
        })
    );
}

#[test]
fn test_pinned_runtime_dispatches_from_plain_threads() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let bus = EventBus::builder(BusConfig::default())
        .with_runtime(rt.handle().clone())
        .build();
    let (tx, mut rx) = mpsc::unbounded_channel();
    bus.register(&recording("e", 0, &tx));

    let emitter = {
        let bus = bus.clone();
        std::thread::spawn(move || bus.emit("e", "from-thread"))
    };
    assert_eq!(emitter.join().unwrap(), Ok(1));

    let got = rt.block_on(recv_n(&mut rx, 1));
    assert_eq!(got, vec![(0, "from-thread".to_string())]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_and_emission() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let mut workers = Vec::new();
    for _ in 0..8 {
        let bus = bus.clone();
        let hits = Arc::clone(&hits);
        workers.push(tokio::spawn(async move {
            for _ in 0..50 {
                let hits = Arc::clone(&hits);
                let l = Listener::from_fn("churn", move |_ev: &Event| {
                    hits.fetch_add(1, Ordering::SeqCst);
                });
                bus.register(&l);
                bus.emit("churn", ()).unwrap();
                bus.unregister(&l);
            }
        }));
    }
    for w in workers {
        w.await.unwrap();
    }

    bus.shutdown().await.unwrap();
    assert!(bus.is_empty());
    // Each emit saw at least its own listener.
    assert!(hits.load(Ordering::SeqCst) >= 8 * 50);
}
