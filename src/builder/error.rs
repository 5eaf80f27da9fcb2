//! Build errors for harvester and rule builders.

use thiserror::Error;

/// Errors that can occur when building machines and rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Mapping not specified. Call .mapping(mapping) before .build()")]
    MissingMapping,

    #[error("World not specified. Call .world(world) before .build()")]
    MissingWorld,

    #[error("No tokio runtime available. Call .runtime(handle) or build inside a runtime")]
    NoRuntime,

    #[error("Rule input not specified. Call .on(input)")]
    MissingInput,

    #[error("Rule source not specified. Call .from(state) or .when(predicate)")]
    MissingSource,

    #[error("Rule target state not specified. Call .to(state)")]
    MissingTarget,
}
