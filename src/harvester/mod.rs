//! Imperative shell: runs a [`Mapping`](crate::core::Mapping) against live
//! state and executes the effects it returns.
//!
//! Effects are started on a tokio runtime, grouped by queue:
//! - merge queues run everything concurrently
//! - latest queues cancel whatever is running before starting new work
//! - concat queues run one effect at a time, in submission order
//!
//! Cancellation stops a producer and discards any of its outputs that have
//! not been processed yet.

mod lanes;
mod machine;

pub use machine::Harvester;
