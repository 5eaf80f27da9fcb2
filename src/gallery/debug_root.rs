//! Root navigation under time travel, plus a state dump switch.

use super::github::GitHubConfig;
use super::root::{self, RootEffectId, RootInput, RootState};
use super::{CommonEffectQueue, World};
use crate::core::{Mapping, MatchPolicy};
use crate::effects::Effect;
use crate::harvester::Harvester;
use crate::time_travel::{self, TimeTravelConfig, TimeTravelInput, TimeTravelState};
use crate::{lens, prism};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DebugRootInput {
    TimeTravel(TimeTravelInput<RootInput>),
    SetDebug(bool),
}

impl DebugRootInput {
    /// Wrap a root input so it reaches the root mapping.
    pub fn root(input: RootInput) -> Self {
        Self::TimeTravel(TimeTravelInput::Inner(input))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugRootState {
    pub time_travel: TimeTravelState<RootState>,
    pub is_debug: bool,
}

impl DebugRootState {
    pub fn new(root: RootState) -> Self {
        Self {
            time_travel: TimeTravelState::new(root),
            is_debug: false,
        }
    }

    pub fn root(&self) -> &RootState {
        &self.time_travel.inner
    }

    /// Pretty JSON rendering of the root state.
    pub fn dump(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.root())
    }
}

impl Default for DebugRootState {
    fn default() -> Self {
        Self::new(RootState::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugRootConfig {
    pub github: GitHubConfig,
    pub time_travel: TimeTravelConfig,
}

pub type DebugRootMapping =
    Mapping<DebugRootInput, DebugRootState, CommonEffectQueue, RootEffectId, World>;

pub type DebugRootHarvester =
    Harvester<DebugRootInput, DebugRootState, CommonEffectQueue, RootEffectId, World>;

pub fn mapping(config: DebugRootConfig) -> DebugRootMapping {
    let toggle = Mapping::inout(|input, state: &mut DebugRootState| match input {
        DebugRootInput::SetDebug(flag) => {
            state.is_debug = *flag;
            Some(Effect::empty())
        }
        DebugRootInput::TimeTravel(_) => None,
    });

    Mapping::reduce(
        MatchPolicy::First,
        [
            time_travel::mapping(root::mapping(config.github), config.time_travel).transform(
                prism!(DebugRootInput::TimeTravel),
                lens!(DebugRootState, time_travel),
            ),
            toggle,
        ],
    )
}

/// Log the root state after every transition while debugging is on.
pub fn log_dumps(harvester: &DebugRootHarvester) {
    let machine = harvester.id();
    harvester.observe(move |state: &DebugRootState| {
        if !state.is_debug {
            return;
        }
        match state.dump() {
            Ok(dump) => info!(%machine, %dump, "root state"),
            Err(error) => warn!(%machine, %error, "failed to render root state"),
        }
    });
}
