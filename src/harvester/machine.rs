//! The machine runtime: serialized transitions, queued effects.

use super::lanes::{Lanes, TaskKey};
use crate::builder::{BuildError, HarvesterBuilder};
use crate::core::Mapping;
use crate::effects::{Command, Effect, EffectQueue, Task};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, trace};
use uuid::Uuid;

type Observer<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct Envelope<I, Id> {
    input: I,
    /// Task that produced the input, `None` for external sends.
    origin: Option<TaskKey>,
    id: Option<Id>,
}

struct Core<I, S, Q, Id, W> {
    state: S,
    pending: VecDeque<Envelope<I, Id>>,
    draining: bool,
    lanes: Lanes<I, Q, Id, W>,
}

struct Shared<I, S, Q, Id, W> {
    id: Uuid,
    mapping: Mapping<I, S, Q, Id, W>,
    world: W,
    runtime: Handle,
    core: Mutex<Core<I, S, Q, Id, W>>,
    observers: Mutex<Vec<Observer<S>>>,
    watch: watch::Sender<S>,
}

impl<I, S, Q, Id, W> Drop for Shared<I, S, Q, Id, W> {
    fn drop(&mut self) {
        self.core.get_mut().lanes.shutdown();
    }
}

/// A running state machine.
///
/// Inputs are processed one at a time in the order they were received. For
/// each input the mapping runs against the current state; if it handles the
/// input, the new state is committed, observers are notified and only then
/// is the effect handed to its queue. Inputs produced by effects go through
/// the same path.
///
/// `Harvester` is a cheap handle: clones share one machine. In-flight
/// effects are aborted when the last handle is dropped.
///
/// # Example
///
/// ```rust
/// use harvest::core::Mapping;
/// use harvest::effects::BasicEffectQueue;
/// use harvest::harvester::Harvester;
///
/// #[derive(Debug)]
/// enum Input { Increment }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mapping: Mapping<Input, i32, BasicEffectQueue, (), ()> =
///     Mapping::pure(|Input::Increment, count| Some(count + 1));
///
/// let machine = Harvester::new(0, mapping, ()).unwrap();
/// machine.send(Input::Increment);
/// assert_eq!(machine.state(), 1);
/// # }
/// ```
pub struct Harvester<I, S, Q, Id, W> {
    shared: Arc<Shared<I, S, Q, Id, W>>,
}

impl<I, S, Q, Id, W> Clone for Harvester<I, S, Q, Id, W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I, S, Q, Id, W> Harvester<I, S, Q, Id, W>
where
    I: Debug + Send + 'static,
    S: Clone + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Clone + Debug + Send + Sync + 'static,
    W: Clone + Send + Sync + 'static,
{
    pub fn builder() -> HarvesterBuilder<I, S, Q, Id, W> {
        HarvesterBuilder::new()
    }

    /// Start a machine on the ambient tokio runtime.
    pub fn new(initial: S, mapping: Mapping<I, S, Q, Id, W>, world: W) -> Result<Self, BuildError> {
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        Ok(Self::start(initial, mapping, world, runtime))
    }

    pub(crate) fn start(
        initial: S,
        mapping: Mapping<I, S, Q, Id, W>,
        world: W,
        runtime: Handle,
    ) -> Self {
        let id = Uuid::new_v4();
        let (watch, _) = watch::channel(initial.clone());
        debug!(machine = %id, "harvester started");
        Self {
            shared: Arc::new(Shared {
                id,
                mapping,
                world,
                runtime,
                core: Mutex::new(Core {
                    state: initial,
                    pending: VecDeque::new(),
                    draining: false,
                    lanes: Lanes::new(),
                }),
                observers: Mutex::new(Vec::new()),
                watch,
            }),
        }
    }

    /// Identifier used in log records.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> S {
        self.shared.core.lock().state.clone()
    }

    /// Call `observer` after every committed transition.
    ///
    /// Observers run outside the machine's lock and may send inputs; those
    /// are processed after the current one.
    pub fn observe<F>(&self, observer: F)
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.shared.observers.lock().push(Arc::new(observer));
    }

    /// Receiver tracking the latest committed state.
    pub fn watch(&self) -> watch::Receiver<S> {
        self.shared.watch.subscribe()
    }

    /// Number of effects currently running.
    pub fn running_effects(&self) -> usize {
        self.shared.core.lock().lanes.running_count()
    }

    /// Number of effects waiting behind a serial or bounded queue.
    pub fn waiting_effects(&self) -> usize {
        self.shared.core.lock().lanes.waiting_count()
    }

    /// Submit an input.
    ///
    /// If another call is already processing inputs, the input is queued
    /// and processed by that call before it returns.
    pub fn send(&self, input: I) {
        self.enqueue(Envelope {
            input,
            origin: None,
            id: None,
        });
    }

    fn deliver(&self, key: TaskKey, id: Option<Id>, input: I) {
        self.enqueue(Envelope {
            input,
            origin: Some(key),
            id,
        });
    }

    fn enqueue(&self, envelope: Envelope<I, Id>) {
        {
            let mut core = self.shared.core.lock();
            if let Some(key) = envelope.origin.filter(|key| !core.lanes.is_live(*key)) {
                trace!(machine = %self.shared.id, task = key, input = ?envelope.input, "discarded output of cancelled effect");
                return;
            }
            core.pending.push_back(envelope);
            if core.draining {
                return;
            }
            core.draining = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let (state, effect) = {
                let mut core = self.shared.core.lock();
                let Some(envelope) = core.pending.pop_front() else {
                    core.draining = false;
                    return;
                };
                let handled = self.shared.mapping.run(&envelope.input, &core.state);
                match handled {
                    Some((next, effect)) => {
                        debug!(machine = %self.shared.id, input = ?envelope.input, "transition committed");
                        core.state = next.clone();
                        (next, effect)
                    }
                    None => {
                        trace!(machine = %self.shared.id, input = ?envelope.input, "input not handled");
                        continue;
                    }
                }
            };
            self.notify(&state);
            self.submit(effect);
        }
    }

    fn notify(&self, state: &S) {
        let observers = self.shared.observers.lock().clone();
        for observer in &observers {
            observer(state);
        }
        self.shared.watch.send_replace(state.clone());
    }

    fn submit(&self, effect: Effect<I, Q, Id, W>) {
        if effect.is_empty() {
            return;
        }
        let mut core = self.shared.core.lock();
        for command in effect.into_commands() {
            match command {
                Command::Cancel(predicate) => {
                    let cancellation = core.lanes.cancel(|id| predicate(id));
                    if !cancellation.stopped.is_empty() || cancellation.dropped > 0 {
                        debug!(
                            machine = %self.shared.id,
                            stopped = cancellation.stopped.len(),
                            dropped = cancellation.dropped,
                            "effects cancelled"
                        );
                    }
                    // Outputs already queued by matching effects must not
                    // reach the mapping either, even if their task finished.
                    core.pending.retain(|envelope| {
                        !envelope.id.as_ref().is_some_and(|id| predicate(id))
                    });
                    for (key, task) in cancellation.promoted {
                        let handle = self.spawn(key, task);
                        core.lanes.attach(key, handle);
                    }
                }
                Command::Run(task) => {
                    let queue = task.queue.clone();
                    let admission = core.lanes.submit(task);
                    if !admission.superseded.is_empty() {
                        debug!(
                            machine = %self.shared.id,
                            ?queue,
                            superseded = admission.superseded.len(),
                            "effects replaced by newer effect"
                        );
                    }
                    purge(&mut core.pending, &admission.superseded);
                    match admission.start {
                        Some((key, task)) => {
                            let handle = self.spawn(key, task);
                            core.lanes.attach(key, handle);
                        }
                        None => trace!(machine = %self.shared.id, ?queue, "effect queued"),
                    }
                }
            }
        }
    }

    /// Spawn a task's producer. Must be called with the core locked so the
    /// handle can be attached before the task reports back.
    fn spawn(&self, key: TaskKey, task: Task<I, Q, Id, W>) -> tokio::task::JoinHandle<()> {
        debug!(machine = %self.shared.id, task = key, queue = ?task.queue, id = ?task.id, "effect started");
        let machine = Arc::downgrade(&self.shared);
        let world = self.shared.world.clone();
        let id = task.id.clone();
        let producer = task.producer;
        self.shared.runtime.spawn(async move {
            let mut outputs = producer(world);
            while let Some(input) = outputs.next().await {
                match upgrade(&machine) {
                    Some(harvester) => harvester.deliver(key, id.clone(), input),
                    None => return,
                }
            }
            if let Some(harvester) = upgrade(&machine) {
                harvester.finish(key);
            }
        })
    }

    fn finish(&self, key: TaskKey) {
        let mut core = self.shared.core.lock();
        if let Some((next, task)) = core.lanes.finish(key) {
            let handle = self.spawn(next, task);
            core.lanes.attach(next, handle);
        }
        debug!(machine = %self.shared.id, task = key, "effect finished");
    }
}

fn upgrade<I, S, Q, Id, W>(machine: &Weak<Shared<I, S, Q, Id, W>>) -> Option<Harvester<I, S, Q, Id, W>> {
    machine.upgrade().map(|shared| Harvester { shared })
}

fn purge<I, Id>(pending: &mut VecDeque<Envelope<I, Id>>, stopped: &[TaskKey]) {
    if stopped.is_empty() {
        return;
    }
    pending.retain(|envelope| envelope.origin.map_or(true, |key| !stopped.contains(&key)));
}
