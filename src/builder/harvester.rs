//! Builder for starting machines.

use crate::builder::error::BuildError;
use crate::core::Mapping;
use crate::effects::EffectQueue;
use crate::harvester::Harvester;
use std::fmt::Debug;
use tokio::runtime::Handle;

/// Builder for [`Harvester`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use harvest::builder::HarvesterBuilder;
/// use harvest::core::Mapping;
/// use harvest::effects::BasicEffectQueue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), harvest::builder::BuildError> {
/// let mapping: Mapping<u32, u32, BasicEffectQueue, (), ()> =
///     Mapping::pure(|n, total| Some(total + n));
///
/// let machine = HarvesterBuilder::new()
///     .initial(0)
///     .mapping(mapping)
///     .world(())
///     .build()?;
///
/// machine.send(2);
/// machine.send(3);
/// assert_eq!(machine.state(), 5);
/// # Ok(())
/// # }
/// ```
pub struct HarvesterBuilder<I, S, Q, Id, W> {
    initial: Option<S>,
    mapping: Option<Mapping<I, S, Q, Id, W>>,
    world: Option<W>,
    runtime: Option<Handle>,
}

impl<I, S, Q, Id, W> HarvesterBuilder<I, S, Q, Id, W>
where
    I: Debug + Send + 'static,
    S: Clone + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Clone + Debug + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            mapping: None,
            world: None,
            runtime: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the transition function (required).
    pub fn mapping(mut self, mapping: Mapping<I, S, Q, Id, W>) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Set the world handed to effect producers (required).
    pub fn world(mut self, world: W) -> Self {
        self.world = Some(world);
        self
    }

    /// Run effects on `handle` instead of the ambient runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Start the machine.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<Harvester<I, S, Q, Id, W>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let mapping = self.mapping.ok_or(BuildError::MissingMapping)?;
        let world = self.world.ok_or(BuildError::MissingWorld)?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };

        Ok(Harvester::start(initial, mapping, world, runtime))
    }
}

impl<I, S, Q, Id, W> Default for HarvesterBuilder<I, S, Q, Id, W>
where
    I: Debug + Send + 'static,
    S: Clone + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Clone + Debug + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
