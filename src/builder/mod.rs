//! Builder API for starting machines and writing rule tables.
//!
//! This module provides fluent builders and the [`prism!`](crate::prism) and
//! [`lens!`](crate::lens) macros for wiring compositions with little
//! boilerplate.

pub mod error;
pub mod harvester;
pub mod macros;
pub mod rule;

pub use error::BuildError;
pub use harvester::HarvesterBuilder;
pub use rule::RuleBuilder;
