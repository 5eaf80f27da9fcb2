//! Effects, the queues they run on, and the world their producers see.
//!
//! # Key Concepts
//!
//! - **Effect**: a batch of "run this producer" and "cancel these ids"
//!   commands returned by a mapping
//! - **EffectQueue**: a closed set of named lanes, each with a
//!   [`FlattenStrategy`]
//! - **World**: dependencies (clock, scheduler, HTTP) passed to producers,
//!   never touched by the machine itself

mod effect;
mod queue;
pub mod world;

pub(crate) use effect::{Command, Task};
pub use effect::{CancelPredicate, Effect, Producer};
pub use queue::{BasicEffectQueue, EffectQueue, FlattenStrategy};
pub use world::{
    Clock, FixedClock, HttpClient, HttpError, HttpRequest, HttpResponse, Scheduler, Scheduling,
    StubHttpClient, SystemClock, TokioScheduler,
};
