//! Pure core: transition functions and how they compose.
//!
//! Nothing in this module performs I/O or touches a runtime. A [`Mapping`]
//! only describes the next state and the [`Effect`](crate::effects::Effect)
//! to run; the [`Harvester`](crate::harvester::Harvester) does the rest.

mod guard;
mod mapping;
mod rule;

pub use guard::Guard;
pub use mapping::{Mapping, MatchPolicy};
pub use rule::{EffectFactory, Rule};
