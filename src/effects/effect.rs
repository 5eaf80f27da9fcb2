//! Descriptions of asynchronous work returned by mappings.

use super::queue::EffectQueue;
use super::world::Scheduling;
use crate::optics::Prism;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stillwater::effect::{BoxedEffect, Effect as _};

/// Starts an effect's work given the world, yielding inputs over time.
pub type Producer<I, W> = Box<dyn FnOnce(W) -> BoxStream<'static, I> + Send>;

/// Selects in-flight effects by identity.
pub type CancelPredicate<Id> = Arc<dyn Fn(&Id) -> bool + Send + Sync>;

/// One unit of asynchronous work bound to a queue.
pub(crate) struct Task<I, Q, Id, W> {
    pub(crate) queue: Q,
    pub(crate) id: Option<Id>,
    pub(crate) producer: Producer<I, W>,
}

pub(crate) enum Command<I, Q, Id, W> {
    Run(Task<I, Q, Id, W>),
    Cancel(CancelPredicate<Id>),
}

/// Asynchronous work requested by a transition.
///
/// An effect is a batch of commands, applied in order once the transition
/// has been committed:
/// - run a producer on a queue, optionally tagged with an identity
/// - cancel every in-flight producer whose identity matches a predicate
///
/// [`Effect::empty`] is the "no work" value. It is distinct from a mapping
/// returning `None`, which means the input was not handled at all.
///
/// Producers never report errors to the machine. Any failure must already
/// be an input by the time it leaves the producer.
///
/// # Example
///
/// ```rust
/// use harvest::effects::{BasicEffectQueue, Effect};
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Input { Loaded(u32) }
///
/// let effect: Effect<Input, BasicEffectQueue, &'static str, ()> =
///     Effect::future(|_world: ()| async { Input::Loaded(1) }).with_id("load");
///
/// assert_eq!(effect.task_count(), 1);
/// assert_eq!(effect.ids(), vec![&"load"]);
/// ```
pub struct Effect<I, Q, Id, W> {
    commands: Vec<Command<I, Q, Id, W>>,
}

impl<I, Q, Id, W> Default for Effect<I, Q, Id, W> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<I, Q: fmt::Debug, Id: fmt::Debug, W> fmt::Debug for Effect<I, Q, Id, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for command in &self.commands {
            match command {
                Command::Run(task) => {
                    list.entry(&format_args!("Run({:?}, {:?})", task.queue, task.id));
                }
                Command::Cancel(_) => {
                    list.entry(&format_args!("Cancel(..)"));
                }
            }
        }
        list.finish()
    }
}

impl<I, Q, Id, W> Effect<I, Q, Id, W>
where
    I: Send + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    /// No work.
    pub fn empty() -> Self {
        Self::default()
    }

    fn task(producer: Producer<I, W>) -> Self {
        Self {
            commands: vec![Command::Run(Task {
                queue: Q::default_queue(),
                id: None,
                producer,
            })],
        }
    }

    /// Run a stream of inputs built from the world.
    pub fn stream<F, St>(f: F) -> Self
    where
        F: FnOnce(W) -> St + Send + 'static,
        St: Stream<Item = I> + Send + 'static,
    {
        Self::task(Box::new(move |world| f(world).boxed()))
    }

    /// Run a future yielding a single input.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: FnOnce(W) -> Fut + Send + 'static,
        Fut: Future<Output = I> + Send + 'static,
    {
        Self::stream(move |world| stream::once(f(world)))
    }

    /// Deliver `input` as soon as the effect starts.
    pub fn just(input: I) -> Self {
        Self::stream(move |_| stream::iter([input]))
    }

    /// Deliver every input of `inputs`, in order.
    pub fn sequence<It>(inputs: It) -> Self
    where
        It: IntoIterator<Item = I>,
    {
        let inputs: Vec<I> = inputs.into_iter().collect();
        Self::stream(move |_| stream::iter(inputs))
    }

    /// Deliver `input` after `delay`, measured by the world's scheduler.
    pub fn delayed(delay: Duration, input: I) -> Self
    where
        W: Scheduling,
    {
        Self::future(move |world: W| {
            let sleep = world.scheduler().sleep(delay);
            async move {
                sleep.await;
                input
            }
        })
    }

    /// Run a one-shot Stillwater effect against the world.
    ///
    /// Both outcomes are inputs, so a failure reaches the machine as the
    /// input the action chose to fail with. The factory is called when the
    /// effect starts, so every run gets a fresh action.
    pub fn attempt<F>(factory: F) -> Self
    where
        F: FnOnce() -> BoxedEffect<I, I, W> + Send + 'static,
        W: Clone + Sync,
    {
        Self::future(move |world: W| async move {
            match factory().run(&world).await {
                Ok(input) | Err(input) => input,
            }
        })
    }

    /// Cancel in-flight effects tagged with `id`.
    pub fn cancel(id: Id) -> Self
    where
        Id: PartialEq,
    {
        Self::cancel_where(move |other: &Id| *other == id)
    }

    /// Cancel in-flight effects whose identity satisfies `predicate`.
    pub fn cancel_where<F>(predicate: F) -> Self
    where
        F: Fn(&Id) -> bool + Send + Sync + 'static,
    {
        Self {
            commands: vec![Command::Cancel(Arc::new(predicate))],
        }
    }

    /// Move every task of this effect onto `queue`.
    pub fn on(mut self, queue: Q) -> Self {
        for command in &mut self.commands {
            if let Command::Run(task) = command {
                task.queue = queue.clone();
            }
        }
        self
    }

    /// Tag every task of this effect with `id`.
    pub fn with_id(mut self, id: Id) -> Self
    where
        Id: Clone,
    {
        for command in &mut self.commands {
            if let Command::Run(task) = command {
                task.id = Some(id.clone());
            }
        }
        self
    }

    /// Append `other`'s commands after this effect's.
    pub fn and(mut self, other: Self) -> Self {
        self.commands.extend(other.commands);
        self
    }

    /// Convert every produced input with `f`.
    pub fn map_input<I2, F>(self, f: F) -> Effect<I2, Q, Id, W>
    where
        I2: Send + 'static,
        F: Fn(I) -> I2 + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let commands = self
            .commands
            .into_iter()
            .map(|command| match command {
                Command::Run(task) => {
                    let f = Arc::clone(&f);
                    let producer = task.producer;
                    Command::Run(Task {
                        queue: task.queue,
                        id: task.id,
                        producer: Box::new(move |world| {
                            producer(world).map(move |input| (*f)(input)).boxed()
                        }),
                    })
                }
                Command::Cancel(predicate) => Command::Cancel(predicate),
            })
            .collect();
        Effect { commands }
    }

    /// Lift identities into an aggregate identity type.
    ///
    /// Task identities are injected through `prism`. Cancellations only
    /// match aggregate identities that `prism` can extract.
    pub fn map_id<Id2>(self, prism: Prism<Id2, Id>) -> Effect<I, Q, Id2, W>
    where
        Id2: Send + Sync + 'static,
    {
        let commands = self
            .commands
            .into_iter()
            .map(|command| match command {
                Command::Run(task) => Command::Run(Task {
                    queue: task.queue,
                    id: task.id.map(|id| prism.inject(id)),
                    producer: task.producer,
                }),
                Command::Cancel(predicate) => {
                    let prism = prism.clone();
                    Command::Cancel(Arc::new(move |outer: &Id2| {
                        prism.try_get(outer).is_some_and(|inner| predicate(&inner))
                    }))
                }
            })
            .collect();
        Effect { commands }
    }

    pub fn map_queue<Q2, F>(self, f: F) -> Effect<I, Q2, Id, W>
    where
        Q2: EffectQueue,
        F: Fn(Q) -> Q2,
    {
        let commands = self
            .commands
            .into_iter()
            .map(|command| match command {
                Command::Run(task) => Command::Run(Task {
                    queue: f(task.queue),
                    id: task.id,
                    producer: task.producer,
                }),
                Command::Cancel(predicate) => Command::Cancel(predicate),
            })
            .collect();
        Effect { commands }
    }

    /// Run producers against a world derived from a parent's world.
    pub fn contramap_world<W2>(self, f: Arc<dyn Fn(&W2) -> W + Send + Sync>) -> Effect<I, Q, Id, W2>
    where
        W2: Send + 'static,
    {
        let commands = self
            .commands
            .into_iter()
            .map(|command| match command {
                Command::Run(task) => {
                    let f = Arc::clone(&f);
                    let producer = task.producer;
                    Command::Run(Task {
                        queue: task.queue,
                        id: task.id,
                        producer: Box::new(move |world: W2| producer(f(&world))),
                    })
                }
                Command::Cancel(predicate) => Command::Cancel(predicate),
            })
            .collect();
        Effect { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of producers this effect would start.
    pub fn task_count(&self) -> usize {
        self.tasks().count()
    }

    pub fn queues(&self) -> Vec<&Q> {
        self.tasks().map(|task| &task.queue).collect()
    }

    pub fn ids(&self) -> Vec<&Id> {
        self.tasks().filter_map(|task| task.id.as_ref()).collect()
    }

    /// Whether any cancellation in this effect selects `id`.
    pub fn cancels(&self, id: &Id) -> bool {
        self.commands.iter().any(|command| match command {
            Command::Cancel(predicate) => predicate(id),
            Command::Run(_) => false,
        })
    }

    fn tasks(&self) -> impl Iterator<Item = &Task<I, Q, Id, W>> {
        self.commands.iter().filter_map(|command| match command {
            Command::Run(task) => Some(task),
            Command::Cancel(_) => None,
        })
    }

    pub(crate) fn into_commands(self) -> Vec<Command<I, Q, Id, W>> {
        self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Effect;
    use crate::effects::world::Scheduler;
    use crate::effects::{FlattenStrategy, TokioScheduler};
    use stillwater::prelude::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Queue {
        Default,
        Request,
    }

    impl EffectQueue for Queue {
        fn flatten_strategy(&self) -> FlattenStrategy {
            match self {
                Self::Default => FlattenStrategy::Merge,
                Self::Request => FlattenStrategy::Latest,
            }
        }

        fn default_queue() -> Self {
            Self::Default
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Id {
        Timer,
        Fetch,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum OuterId {
        Child(Id),
        Other,
    }

    type TestEffect = Effect<u32, Queue, Id, ()>;

    async fn drain<I, Q, Id2, W>(effect: Effect<I, Q, Id2, W>, world: W) -> Vec<I>
    where
        I: Send + 'static,
        Q: EffectQueue,
        Id2: Send + Sync + 'static,
        W: Clone + Send + 'static,
    {
        let mut out = Vec::new();
        for command in effect.into_commands() {
            if let Command::Run(task) = command {
                out.extend((task.producer)(world.clone()).collect::<Vec<_>>().await);
            }
        }
        out
    }

    #[test]
    fn empty_has_no_commands() {
        let effect = TestEffect::empty();
        assert!(effect.is_empty());
        assert_eq!(effect.task_count(), 0);
    }

    #[test]
    fn tasks_default_to_default_queue() {
        let effect = TestEffect::just(1);
        assert_eq!(effect.queues(), vec![&Queue::Default]);
        assert_eq!(effect.on(Queue::Request).queues(), vec![&Queue::Request]);
    }

    #[test]
    fn cancel_matches_identity() {
        let effect = TestEffect::cancel(Id::Timer);
        assert!(!effect.is_empty());
        assert_eq!(effect.task_count(), 0);
        assert!(effect.cancels(&Id::Timer));
        assert!(!effect.cancels(&Id::Fetch));
    }

    #[test]
    fn and_keeps_order_of_commands() {
        let effect = TestEffect::just(1)
            .with_id(Id::Fetch)
            .and(TestEffect::cancel(Id::Timer));
        assert_eq!(effect.task_count(), 1);
        assert_eq!(effect.ids(), vec![&Id::Fetch]);
        assert!(effect.cancels(&Id::Timer));
    }

    #[test]
    fn map_id_wraps_tasks_and_narrows_cancels() {
        let prism = Prism::new(
            |outer: &OuterId| match outer {
                OuterId::Child(id) => Some(id.clone()),
                OuterId::Other => None,
            },
            OuterId::Child,
        );
        let effect = TestEffect::just(1)
            .with_id(Id::Fetch)
            .and(TestEffect::cancel_where(|_| true))
            .map_id(prism);

        assert_eq!(effect.ids(), vec![&OuterId::Child(Id::Fetch)]);
        assert!(effect.cancels(&OuterId::Child(Id::Timer)));
        assert!(!effect.cancels(&OuterId::Other));
    }

    #[tokio::test]
    async fn sequence_and_map_input_preserve_order() {
        let effect = TestEffect::sequence([1, 2, 3]).map_input(|n| n * 10);
        assert_eq!(drain(effect, ()).await, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn contramap_world_derives_child_world() {
        let effect: Effect<u32, Queue, Id, u32> = Effect::future(|w: u32| async move { w + 1 });
        let lifted = effect.contramap_world(Arc::new(|parent: &(u32, &'static str)| parent.0));
        assert_eq!(drain(lifted, (41, "ignored")).await, vec![42]);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_waits_for_scheduler() {
        let world: Arc<dyn Scheduler> = Arc::new(TokioScheduler);
        let effect: Effect<u32, Queue, Id, Arc<dyn Scheduler>> =
            Effect::delayed(Duration::from_millis(100), 7);

        let start = tokio::time::Instant::now();
        assert_eq!(drain(effect, world).await, vec![7]);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn attempt_turns_both_outcomes_into_inputs() {
        #[derive(Clone)]
        struct Env {
            healthy: bool,
        }

        let effect: Effect<u32, Queue, Id, Env> = Effect::attempt(|| {
            from_fn(|env: &Env| if env.healthy { Ok(1) } else { Err(0) }).boxed()
        });
        assert_eq!(drain(effect, Env { healthy: true }).await, vec![1]);

        let effect: Effect<u32, Queue, Id, Env> = Effect::attempt(|| {
            from_fn(|env: &Env| if env.healthy { Ok(1) } else { Err(0) }).boxed()
        });
        assert_eq!(drain(effect, Env { healthy: false }).await, vec![0]);
    }
}
