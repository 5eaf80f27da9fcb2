//! Navigation between the gallery screens.

use super::counter::{self, CounterInput, CounterState};
use super::github::{self, GitHubConfig, GitHubInput, GitHubState};
use super::image_loader::ImageLoaderEffectId;
use super::state_diagram::{self, StateDiagramInput, StateDiagramState};
use super::stopwatch::{self, StopwatchEffectId, StopwatchInput, StopwatchState};
use super::todo::{self, TodoInput, TodoState};
use super::{CommonEffectQueue, World};
use crate::core::{Mapping, MatchPolicy};
use crate::effects::Effect;
use crate::optics::{AffineTraversal, Prism};
use crate::{lens, prism};
use serde::{Deserialize, Serialize};

/// The screen on display and its state. Only one screen is live at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Current {
    Intro,
    Counter(CounterState),
    Stopwatch(StopwatchState),
    StateDiagram(StateDiagramState),
    Todo(TodoState),
    GitHub(GitHubState),
}

impl Current {
    /// Every screen in its initial state, in menu order.
    pub fn all() -> Vec<Current> {
        vec![
            Current::Intro,
            Current::Counter(CounterState::default()),
            Current::Stopwatch(StopwatchState::default()),
            Current::StateDiagram(StateDiagramState::default()),
            Current::Todo(TodoState::default()),
            Current::GitHub(GitHubState::default()),
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Current::Intro => "Intro",
            Current::Counter(_) => "Counter",
            Current::Stopwatch(_) => "Stopwatch",
            Current::StateDiagram(_) => "State Diagram",
            Current::Todo(_) => "Todo",
            Current::GitHub(_) => "GitHub",
        }
    }

    /// Whether `id` belongs to an effect this screen may start.
    pub fn owns_effect(&self, id: &RootEffectId) -> bool {
        matches!(
            (self, id),
            (Current::Stopwatch(_), RootEffectId::Stopwatch(_))
                | (Current::GitHub(_), RootEffectId::GitHub(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RootInput {
    ChangeCurrent(Option<Current>),
    Counter(CounterInput),
    Stopwatch(StopwatchInput),
    StateDiagram(StateDiagramInput),
    Todo(TodoInput),
    GitHub(GitHubInput),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootState {
    pub current: Option<Current>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootEffectId {
    Stopwatch(StopwatchEffectId),
    GitHub(ImageLoaderEffectId),
}

pub type RootMapping = Mapping<RootInput, RootState, CommonEffectQueue, RootEffectId, World>;

fn screen<P: Clone + 'static>(case: Prism<Current, P>) -> AffineTraversal<RootState, P> {
    lens!(RootState, current)
        .then_prism(Prism::some())
        .then_prism(case)
}

/// Navigation stops every effect owned by the screen being left and by the
/// screen being entered, so neither inherits stale work.
fn cancel_on_navigate() -> RootMapping {
    Mapping::new(|input, state: &RootState| match input {
        RootInput::ChangeCurrent(next) => {
            let leaving = state.current.clone();
            let entering = next.clone();
            let effect = Effect::cancel_where(move |id: &RootEffectId| {
                [&leaving, &entering]
                    .into_iter()
                    .flatten()
                    .any(|screen| screen.owns_effect(id))
            });
            Some((
                RootState {
                    current: next.clone(),
                },
                effect,
            ))
        }
        _ => None,
    })
}

/// Navigation runs first, so the screens below only ever see the new
/// selection.
pub fn mapping(github: GitHubConfig) -> RootMapping {
    Mapping::reduce(
        MatchPolicy::All,
        [
            cancel_on_navigate(),
            counter::mapping().transform(prism!(RootInput::Counter), screen(prism!(Current::Counter))),
            todo::mapping().transform(prism!(RootInput::Todo), screen(prism!(Current::Todo))),
            state_diagram::mapping()
                .contramap_world(|world: &World| world.scheduler.clone())
                .transform(
                    prism!(RootInput::StateDiagram),
                    screen(prism!(Current::StateDiagram)),
                )
                .transform_id(Prism::never()),
            stopwatch::mapping()
                .contramap_world(World::stopwatch)
                .transform(prism!(RootInput::Stopwatch), screen(prism!(Current::Stopwatch)))
                .transform_id(prism!(RootEffectId::Stopwatch)),
            github::mapping(github)
                .contramap_world(World::github)
                .transform(prism!(RootInput::GitHub), screen(prism!(Current::GitHub)))
                .transform_id(prism!(RootEffectId::GitHub)),
        ],
    )
}
