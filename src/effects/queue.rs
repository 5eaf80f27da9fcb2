//! Named effect queues and their flattening strategies.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// How concurrently submitted effects on one queue interleave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlattenStrategy {
    /// Run every effect concurrently, delivering outputs as they arrive.
    Merge,

    /// Starting an effect cancels everything still running on the queue.
    Latest,

    /// Run effects one at a time in submission order.
    Concat,

    /// Run up to this many effects at once; the rest wait in submission
    /// order. A bound of zero behaves like one.
    Bounded(usize),
}

impl FlattenStrategy {
    /// Most effects allowed to run at once, `None` when unlimited.
    pub fn concurrency_limit(&self) -> Option<usize> {
        match self {
            Self::Merge | Self::Latest => None,
            Self::Concat => Some(1),
            Self::Bounded(limit) => Some((*limit).max(1)),
        }
    }
}

/// A closed set of named queues.
///
/// Implemented by a small enum per machine composition. Queues are never
/// created dynamically.
///
/// # Example
///
/// ```rust
/// use harvest::effects::{EffectQueue, FlattenStrategy};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Queue {
///     Default,
///     Search,
/// }
///
/// impl EffectQueue for Queue {
///     fn flatten_strategy(&self) -> FlattenStrategy {
///         match self {
///             Self::Default => FlattenStrategy::Merge,
///             Self::Search => FlattenStrategy::Latest,
///         }
///     }
///
///     fn default_queue() -> Self {
///         Self::Default
///     }
/// }
///
/// assert_eq!(Queue::default_queue().flatten_strategy(), FlattenStrategy::Merge);
/// ```
pub trait EffectQueue: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    fn flatten_strategy(&self) -> FlattenStrategy;

    /// Queue used by effects that do not name one.
    ///
    /// Should use [`FlattenStrategy::Merge`].
    fn default_queue() -> Self;
}

/// Queue set with a single merging queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicEffectQueue {
    #[default]
    Default,
}

impl EffectQueue for BasicEffectQueue {
    fn flatten_strategy(&self) -> FlattenStrategy {
        FlattenStrategy::Merge
    }

    fn default_queue() -> Self {
        Self::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_is_a_bound_of_one() {
        assert_eq!(FlattenStrategy::Merge.concurrency_limit(), None);
        assert_eq!(FlattenStrategy::Latest.concurrency_limit(), None);
        assert_eq!(FlattenStrategy::Concat.concurrency_limit(), Some(1));
        assert_eq!(FlattenStrategy::Bounded(4).concurrency_limit(), Some(4));
        assert_eq!(FlattenStrategy::Bounded(0).concurrency_limit(), Some(1));
    }

    #[test]
    fn basic_queue_merges() {
        assert_eq!(
            BasicEffectQueue::default_queue().flatten_strategy(),
            FlattenStrategy::Merge
        );
    }
}
