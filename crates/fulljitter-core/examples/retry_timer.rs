//! Example: driving a blocking reconnect loop with an exponential timer
//!
//! This example demonstrates:
//! 1. Full-jitter delays growing with each failure
//! 2. Resetting the timer after a success
//! 3. A custom strategy that waits longer when throttled
//!
//! Run with:
//! ```bash
//! cargo run -p fulljitter-core --example retry_timer
//! ```

use fulljitter_core::prelude::*;
use std::error::Error;
use std::io;
use std::time::Duration;

/// A simulated peer that refuses the first few connections
struct FlakyPeer {
    refusals_left: u32,
}

impl FlakyPeer {
    fn connect(&mut self) -> io::Result<&'static str> {
        if self.refusals_left > 0 {
            self.refusals_left -= 1;
            Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        } else {
            Ok("connected")
        }
    }
}

fn example_reconnect() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Reconnect with full jitter ===\n");

    let config = ExponentialStrategyConfig::builder()
        .base(Duration::from_millis(20))
        .max_duration(Duration::from_millis(200))
        .seed(42)
        .build()?;
    let mut timer = ExponentialTimer::with_config(config);
    let mut peer = FlakyPeer { refusals_left: 4 };

    loop {
        match peer.connect() {
            Ok(status) => {
                println!("  {} after {} retries", status, timer.attempt());
                timer.reset();
                break;
            }
            Err(err) => {
                let ceiling = timer.next_ceiling();
                let wait = timer.next_interval(Some(&err));
                println!("  {err}: waiting {wait:?} (ceiling {ceiling:?})");
                std::thread::sleep(wait);
            }
        }
    }

    assert!(timer.is_fresh());
    Ok(())
}

fn example_throttle_aware() {
    println!("\n=== Example 2: Error-sensitive strategy ===\n");

    let jittered = ExponentialDelayStrategy::new(ExponentialStrategyConfig::default());
    let mut timer = RetryTimer::from_fn(move |attempt, err| {
        let delay = jittered.compute_delay(attempt, err);
        match err {
            Some(e) if e.to_string().contains("throttled") => delay * 4,
            _ => delay,
        }
    });

    let throttled = io::Error::other("throttled");
    let reset = io::Error::from(io::ErrorKind::ConnectionReset);

    println!("  throttled: {:?}", timer.next_interval(Some(&throttled)));
    println!("  reset:     {:?}", timer.next_interval(Some(&reset)));
}

fn main() -> Result<(), Box<dyn Error>> {
    example_reconnect()?;
    example_throttle_aware();
    Ok(())
}
