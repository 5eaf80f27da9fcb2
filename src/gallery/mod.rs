//! Reference machines built on the runtime.
//!
//! Each screen is a self-contained mapping over its own input, state,
//! identity and world. [`root`] composes them behind an exclusive "current
//! screen" slot and [`debug_root`] adds time travel on top.

pub mod common_queue;
pub mod counter;
pub mod debug_root;
pub mod github;
pub mod image_loader;
pub mod root;
pub mod state_diagram;
pub mod stopwatch;
pub mod todo;
pub mod world;

pub use common_queue::CommonEffectQueue;
pub use world::World;
