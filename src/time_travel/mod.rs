//! Time travel over any mapping.
//!
//! [`mapping`] wraps an inner mapping so every committed inner state is
//! recorded in a [`History`]. Scrubbing replaces the inner state with a past
//! snapshot; while a scrub settles, new inner states are applied but not
//! recorded, so replay-triggered inputs cannot corrupt the timeline.

mod history;

pub use history::History;

use crate::core::Mapping;
use crate::effects::{Effect, EffectQueue, Scheduling};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Inputs of a time travelling machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TimeTravelInput<I> {
    /// Move the cursor by `diff` entries.
    Stepper { diff: i64 },

    /// Move the cursor to the entry under a slider position.
    Slider { value: f64 },

    /// Move the cursor to an absolute index.
    ScrubTo(usize),

    /// Sent by the runtime once the scrub with this generation has settled.
    /// Settles of superseded scrubs are unhandled.
    DidScrub(u64),

    /// Drop every entry but the current inner state.
    ResetHistories,

    /// Forwarded to the inner mapping.
    Inner(I),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeTravelState<S> {
    pub inner: S,
    history: History<S>,
    is_scrubbing: bool,
    #[serde(default)]
    scrub_generation: u64,
}

impl<S: Clone> TimeTravelState<S> {
    pub fn new(inner: S) -> Self {
        Self {
            history: History::new(inner.clone()),
            inner,
            is_scrubbing: false,
            scrub_generation: 0,
        }
    }
}

impl<S> TimeTravelState<S> {
    pub fn histories(&self) -> &[S] {
        self.history.entries()
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.is_scrubbing
    }

    /// Generation of the latest scrub; its settle input carries the same value.
    pub fn scrub_generation(&self) -> u64 {
        self.scrub_generation
    }

    /// Whether there is anywhere to travel to.
    pub fn can_time_travel(&self) -> bool {
        self.history.len() > 1
    }

    /// Range for a slider control, `-1..=0` when there is nothing to scrub.
    pub fn slider_range(&self) -> RangeInclusive<f64> {
        if self.can_time_travel() {
            0.0..=(self.history.len() - 1) as f64
        } else {
            -1.0..=0.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeTravelConfig {
    /// Delay before [`TimeTravelInput::DidScrub`] arrives after a scrub.
    pub settle_delay: Duration,
}

impl Default for TimeTravelConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
        }
    }
}

/// Wrap `inner` with history recording and scrubbing.
///
/// Inner inputs the inner mapping does not handle are unhandled here too and
/// leave the history untouched.
pub fn mapping<I, S, Q, Id, W>(
    inner: Mapping<I, S, Q, Id, W>,
    config: TimeTravelConfig,
) -> Mapping<TimeTravelInput<I>, TimeTravelState<S>, Q, Id, W>
where
    I: Send + 'static,
    S: Clone + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Scheduling + Send + 'static,
{
    Mapping::new(move |input, state: &TimeTravelState<S>| match input {
        TimeTravelInput::Inner(input) => {
            let (next, effect) = inner.run(input, &state.inner)?;
            let mut state = state.clone();
            if !state.is_scrubbing {
                state.history.record(next.clone());
            }
            state.inner = next;
            Some((state, effect.map_input(TimeTravelInput::Inner)))
        }
        TimeTravelInput::ScrubTo(index) => scrub(state, *index, &config),
        TimeTravelInput::Stepper { diff } => {
            if *diff == 0 {
                return None;
            }
            let index = i64::try_from(state.cursor()).ok()?.checked_add(*diff)?;
            scrub(state, usize::try_from(index).ok()?, &config)
        }
        TimeTravelInput::Slider { value } => {
            if !value.is_finite() || *value < 0.0 {
                return None;
            }
            scrub(state, value.trunc() as usize, &config)
        }
        TimeTravelInput::DidScrub(generation) => {
            if !state.is_scrubbing || *generation != state.scrub_generation {
                return None;
            }
            let mut state = state.clone();
            state.is_scrubbing = false;
            Some((state, Effect::empty()))
        }
        TimeTravelInput::ResetHistories => {
            let mut state = state.clone();
            state.history.reset(state.inner.clone());
            Some((state, Effect::empty()))
        }
    })
}

fn scrub<I, S, Q, Id, W>(
    state: &TimeTravelState<S>,
    index: usize,
    config: &TimeTravelConfig,
) -> Option<(TimeTravelState<S>, Effect<TimeTravelInput<I>, Q, Id, W>)>
where
    I: Send + 'static,
    S: Clone,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Scheduling + Send + 'static,
{
    let mut state = state.clone();
    state.inner = state.history.seek(index)?.clone();
    state.is_scrubbing = true;
    state.scrub_generation = state.scrub_generation.wrapping_add(1);
    let generation = state.scrub_generation;
    Some((
        state,
        Effect::delayed(config.settle_delay, TimeTravelInput::DidScrub(generation)),
    ))
}
