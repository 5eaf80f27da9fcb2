use crate::effects::{EffectQueue, FlattenStrategy};
use serde::{Deserialize, Serialize};

/// Queues shared by every gallery machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommonEffectQueue {
    /// Fire and forget.
    Default,

    /// One in-flight request at a time; a new request supersedes the old.
    Request,

    /// Downloads, at most `max_concurrent` in flight; the rest wait their turn.
    Download { max_concurrent: usize },
}

impl EffectQueue for CommonEffectQueue {
    fn flatten_strategy(&self) -> FlattenStrategy {
        match self {
            Self::Default => FlattenStrategy::Merge,
            Self::Request => FlattenStrategy::Latest,
            Self::Download { max_concurrent } => FlattenStrategy::Bounded(*max_concurrent),
        }
    }

    fn default_queue() -> Self {
        Self::Default
    }
}
