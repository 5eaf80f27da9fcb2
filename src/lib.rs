//! Harvest: a unidirectional state machine runtime
//!
//! A machine owns one state value. Every input runs through a pure
//! [`Mapping`] producing the next state and an [`Effect`] describing async
//! work. The [`Harvester`] commits the state, then runs the effect's
//! producers on named queues whose outputs come back as inputs.
//!
//! # Core Concepts
//!
//! - **Optics**: `Lens`, `Prism` and `AffineTraversal` embed child inputs and
//!   states into their parents
//! - **Mappings**: pure transition functions, composed with `reduce` and the
//!   `transform_*` combinators
//! - **Effects**: cancellable, identifiable producers on queues that merge,
//!   keep the latest, or run serially
//! - **Time travel**: history recording and scrubbing over any mapping
//!
//! # Example
//!
//! ```rust
//! use harvest::core::{Mapping, Rule};
//! use harvest::effects::BasicEffectQueue;
//! use harvest::harvester::Harvester;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Input { Coin, Push }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Turnstile { Locked, Unlocked }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mapping: Mapping<Input, Turnstile, BasicEffectQueue, (), ()> = Mapping::rules([
//!     Rule::new(Input::Coin, Turnstile::Locked, Turnstile::Unlocked),
//!     Rule::new(Input::Push, Turnstile::Unlocked, Turnstile::Locked),
//! ]);
//!
//! let machine = Harvester::new(Turnstile::Locked, mapping, ()).unwrap();
//! machine.send(Input::Push);
//! assert_eq!(machine.state(), Turnstile::Locked);
//! machine.send(Input::Coin);
//! assert_eq!(machine.state(), Turnstile::Unlocked);
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod gallery;
pub mod harvester;
pub mod optics;
pub mod time_travel;

// Re-export commonly used types
pub use builder::{BuildError, HarvesterBuilder, RuleBuilder};
pub use core::{Guard, Mapping, MatchPolicy, Rule};
pub use effects::{Effect, EffectQueue, FlattenStrategy};
pub use harvester::Harvester;
pub use optics::{AffineTraversal, Lens, Prism};
pub use time_travel::{TimeTravelConfig, TimeTravelInput, TimeTravelState};
