//! Stopwatch with laps.
//!
//! The start date comes from the world's clock through an effect, so the
//! mapping itself never reads the time.

use super::CommonEffectQueue;
use crate::core::Mapping;
use crate::effects::{Clock, Effect, Scheduler};
use chrono::{DateTime, Utc};
use futures::stream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stillwater::prelude::*;

/// Interval between timer updates.
pub const TICK: Duration = Duration::from_millis(10);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StopwatchInput {
    Start,
    DidStart(DateTime<Utc>),
    Update {
        start: DateTime<Utc>,
        current: DateTime<Utc>,
    },
    Lap,
    Stop,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopwatchEffectId {
    GetStartDate,
    Timer,
}

#[derive(Clone)]
pub struct StopwatchWorld {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
}

/// Times are in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Idle,
    Preparing {
        time: f64,
    },
    Running {
        /// Accumulated time until the last pause.
        time: f64,
        start: DateTime<Utc>,
        current: DateTime<Utc>,
    },
    Paused {
        time: f64,
    },
}

impl Status {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle | Self::Preparing { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    pub fn elapsed(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Preparing { time } | Self::Paused { time } => *time,
            Self::Running {
                time,
                start,
                current,
            } => time + seconds_between(*start, *current),
        }
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub id: u32,
    pub time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopwatchState {
    pub status: Status,
    pub laps: Vec<Lap>,
    current_lap_id: u32,
    previous_elapsed: f64,
    fastest_lap_id: Option<u32>,
    slowest_lap_id: Option<u32>,
}

impl Default for StopwatchState {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            laps: Vec::new(),
            current_lap_id: 1,
            previous_elapsed: 0.0,
            fastest_lap_id: None,
            slowest_lap_id: None,
        }
    }
}

impl StopwatchState {
    /// Only known once two laps exist.
    pub fn fastest_lap_id(&self) -> Option<u32> {
        self.fastest_lap_id
    }

    pub fn slowest_lap_id(&self) -> Option<u32> {
        self.slowest_lap_id
    }

    fn record_lap(&mut self) {
        let elapsed = self.status.elapsed();
        self.laps.push(Lap {
            id: self.current_lap_id,
            time: elapsed - self.previous_elapsed,
        });

        if self.laps.len() >= 2 {
            let by_time = |a: &&Lap, b: &&Lap| a.time.total_cmp(&b.time);
            self.fastest_lap_id = self.laps.iter().min_by(by_time).map(|lap| lap.id);
            self.slowest_lap_id = self.laps.iter().max_by(by_time).map(|lap| lap.id);
        }

        self.current_lap_id += 1;
        self.previous_elapsed = elapsed;
    }
}

type StopwatchEffect = Effect<StopwatchInput, CommonEffectQueue, StopwatchEffectId, StopwatchWorld>;

fn get_start_date() -> StopwatchEffect {
    Effect::attempt(|| {
        from_fn(|world: &StopwatchWorld| {
            Ok::<_, StopwatchInput>(StopwatchInput::DidStart(world.clock.now()))
        })
        .boxed()
    })
    .with_id(StopwatchEffectId::GetStartDate)
}

fn timer(start: DateTime<Utc>) -> StopwatchEffect {
    Effect::stream(move |world: StopwatchWorld| {
        stream::unfold(world, move |world| async move {
            world.scheduler.sleep(TICK).await;
            let current = world.clock.now();
            Some((StopwatchInput::Update { start, current }, world))
        })
    })
    .with_id(StopwatchEffectId::Timer)
}

pub fn mapping() -> Mapping<StopwatchInput, StopwatchState, CommonEffectQueue, StopwatchEffectId, StopwatchWorld> {
    Mapping::inout(|input, state: &mut StopwatchState| match (input, state.status.clone()) {
        (StopwatchInput::Start, Status::Idle) => {
            state.status = Status::Preparing { time: 0.0 };
            Some(get_start_date())
        }
        (StopwatchInput::Start, Status::Paused { time }) => {
            state.status = Status::Preparing { time };
            Some(get_start_date())
        }
        (StopwatchInput::DidStart(date), Status::Preparing { time }) => {
            state.status = Status::Running {
                time,
                start: *date,
                current: *date,
            };
            Some(timer(*date))
        }
        (StopwatchInput::Update { start, current }, Status::Running { time, .. }) => {
            state.status = Status::Running {
                time,
                start: *start,
                current: *current,
            };
            Some(Effect::empty())
        }
        (StopwatchInput::Lap, Status::Running { .. }) => {
            state.record_lap();
            Some(Effect::empty())
        }
        (StopwatchInput::Stop, status @ Status::Running { .. }) => {
            state.status = Status::Paused {
                time: status.elapsed(),
            };
            Some(Effect::cancel(StopwatchEffectId::Timer))
        }
        (StopwatchInput::Reset, Status::Paused { .. }) => {
            *state = StopwatchState::default();
            Some(Effect::cancel(StopwatchEffectId::Timer))
        }
        _ => None,
    })
}
