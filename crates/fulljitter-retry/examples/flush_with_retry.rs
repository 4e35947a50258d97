//! Example: a stats publisher retrying a flush with full-jitter backoff
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run -p fulljitter-retry --example flush_with_retry
//! ```

use anyhow::Context;
use fulljitter_core::{ExponentialStrategyConfig, ExponentialTimer};
use fulljitter_retry::Retrier;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A collector endpoint that is overloaded for the first few flushes
struct Collector {
    overloaded_for: u32,
    flushes: AtomicU32,
}

impl Collector {
    async fn flush(&self, payload: &[u64]) -> io::Result<usize> {
        let attempt = self.flushes.fetch_add(1, Ordering::SeqCst);
        if attempt < self.overloaded_for {
            return Err(io::Error::other("503 service unavailable"));
        }
        Ok(payload.len())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ExponentialStrategyConfig::builder()
        .base(Duration::from_millis(50))
        .max_duration(Duration::from_secs(1))
        .build()
        .context("invalid backoff config")?;

    let mut retrier = Retrier::new(ExponentialTimer::with_config(config))
        .max_retries(6)
        .retry_if(|err, _retries| err.to_string().starts_with("503"));

    let collector = Collector {
        overloaded_for: 3,
        flushes: AtomicU32::new(0),
    };
    let payload = [3, 1, 4, 1, 5, 9, 2, 6];

    let sent = retrier
        .run(|| collector.flush(&payload))
        .await
        .context("flush failed")?;

    println!(
        "flushed {} counters in {} attempts",
        sent,
        collector.flushes.load(Ordering::SeqCst)
    );
    Ok(())
}
