//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use harvest::effects::{FixedClock, StubHttpClient, TokioScheduler};
use harvest::gallery::World;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Route tracing output through the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic dependencies, with handles kept for assertions.
pub struct Fixture {
    pub clock: Arc<FixedClock>,
    pub http: Arc<StubHttpClient>,
    pub world: World,
}

pub fn fixture() -> Fixture {
    fixture_with(StubHttpClient::new())
}

pub fn fixture_with(http: StubHttpClient) -> Fixture {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let http = Arc::new(http);
    let world = World {
        clock: clock.clone(),
        scheduler: Arc::new(TokioScheduler),
        http: http.clone(),
    };
    Fixture { clock, http, world }
}

/// Let the paused clock run for `duration`, then give woken tasks a turn.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}
