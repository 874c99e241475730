//! # Example: ping
//!
//! Demonstrates fan-out, failure isolation, and graceful shutdown.
//!
//! Shows how to:
//! - Register several [`Listener`]s for one event name.
//! - Implement the [`Handler`] trait for a stateful handler.
//! - Watch handler failures through [`EventBus::failures`].
//! - Drain running handlers with [`EventBus::shutdown`].
//!
//! ## Flow
//! ```text
//! emit("ping", Ping{n}) ──► EventBus
//!     ├─► Counter.handle()        (async trait impl)
//!     ├─► closure listener        (prints the payload)
//!     └─► flaky listener          (fails on odd pings) ──► failure feed ──► watcher
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=busline=debug cargo run --example ping
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use busline::{BusConfig, Event, EventBus, Handler, HandlerError, Listener};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Ping {
    n: u64,
}

/// Sums every ping number it sees.
#[derive(Default)]
struct Counter {
    total: AtomicU64,
}

#[async_trait]
impl Handler for Counter {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let ping = event
            .payload::<Ping>()
            .ok_or_else(|| HandlerError::rejected("expected Ping payload"))?;
        self.total.fetch_add(ping.n, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "counter"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = BusConfig {
        grace: Duration::from_secs(5),
        ..BusConfig::default()
    };
    let bus = EventBus::builder(cfg).build();

    let counter = Arc::new(Counter::default());
    bus.register(&Listener::new("ping", counter.clone()));

    let printer = Listener::from_fn("ping", |ev: &Event| {
        if let Some(ping) = ev.payload::<Ping>() {
            println!("[printer] seq={} ping={}", ev.seq(), ping.n);
        }
    });
    bus.register(&printer);

    bus.register(&Listener::from_async("ping", |ev: Event| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        match ev.payload::<Ping>() {
            Some(ping) if ping.n % 2 == 1 => {
                Err(HandlerError::failed(format!("odd ping {}", ping.n)))
            }
            _ => Ok(()),
        }
    }));

    let mut failures = bus.failures();
    let watcher = tokio::spawn(async move {
        while let Ok(failure) = failures.recv().await {
            println!(
                "[watcher] {} on {}#{}: {}",
                failure.kind.as_label(),
                failure.event,
                failure.seq,
                failure.reason
            );
        }
    });

    for n in 1..=4 {
        let started = bus.emit("ping", Ping { n })?;
        println!("[main] ping {n} fanned out to {started} listeners");
    }

    bus.unregister(&printer);
    println!("[main] listeners on ping: {}", bus.listener_count("ping"));

    bus.shutdown().await?;
    println!("[main] total = {}", counter.total.load(Ordering::Relaxed));

    drop(bus);
    watcher.abort();
    Ok(())
}
