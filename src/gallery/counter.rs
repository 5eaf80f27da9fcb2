use crate::core::Mapping;
use crate::effects::EffectQueue;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterInput {
    Increment,
    Decrement,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub count: i64,
}

/// Effect-free counter, usable under any queue, identity and world.
pub fn mapping<Q, Id, W>() -> Mapping<CounterInput, CounterState, Q, Id, W>
where
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    Mapping::pure(|input, state: &CounterState| {
        let count = match input {
            CounterInput::Increment => state.count + 1,
            CounterInput::Decrement => state.count - 1,
        };
        Some(CounterState { count })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::BasicEffectQueue;

    #[test]
    fn counts_up_and_down() {
        let mapping = mapping::<BasicEffectQueue, (), ()>();
        let state = [
            CounterInput::Increment,
            CounterInput::Increment,
            CounterInput::Decrement,
        ]
        .iter()
        .fold(CounterState::default(), |state, input| {
            mapping.run(input, &state).map(|(s, _)| s).unwrap_or(state)
        });

        assert_eq!(state.count, 1);
    }
}
