//! Dependencies of the gallery machines.

use super::github::GitHubWorld;
use super::stopwatch::StopwatchWorld;
use crate::effects::{Clock, HttpClient, Scheduler, Scheduling, SystemClock, TokioScheduler};
use std::sync::Arc;

/// Everything the gallery's effects may touch.
///
/// Each screen only sees the slice it needs, derived with
/// [`Mapping::contramap_world`](crate::core::Mapping::contramap_world).
#[derive(Clone)]
pub struct World {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
    pub http: Arc<dyn HttpClient>,
}

impl World {
    /// Wall clock and tokio timers around the given HTTP transport.
    pub fn live(http: Arc<dyn HttpClient>) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            scheduler: Arc::new(TokioScheduler),
            http,
        }
    }

    pub fn stopwatch(&self) -> StopwatchWorld {
        StopwatchWorld {
            clock: Arc::clone(&self.clock),
            scheduler: Arc::clone(&self.scheduler),
        }
    }

    pub fn github(&self) -> GitHubWorld {
        GitHubWorld {
            http: Arc::clone(&self.http),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl Scheduling for World {
    fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(&self.scheduler)
    }
}
