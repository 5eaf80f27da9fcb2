//! Bookkeeping for in-flight effects, grouped by queue.
//!
//! This module decides *when* a task may start. Spawning and delivery live
//! in the runtime; lanes only hand tasks back once they are admitted.

use crate::effects::{EffectQueue, FlattenStrategy, Task};
use std::collections::{HashMap, VecDeque};
use tokio::task::JoinHandle;

/// Identifies one admitted task for its whole life.
pub(crate) type TaskKey = u64;

struct Running<Q, Id> {
    queue: Q,
    id: Option<Id>,
    handle: Option<JoinHandle<()>>,
}

/// Outcome of submitting a task.
pub(crate) struct Admission<I, Q, Id, W> {
    /// Task to spawn now, already registered under its key.
    pub(crate) start: Option<(TaskKey, Task<I, Q, Id, W>)>,

    /// Tasks stopped to make room on a latest queue.
    pub(crate) superseded: Vec<TaskKey>,
}

pub(crate) struct Lanes<I, Q, Id, W> {
    next_key: TaskKey,
    running: HashMap<TaskKey, Running<Q, Id>>,
    backlog: HashMap<Q, VecDeque<(TaskKey, Task<I, Q, Id, W>)>>,
}

impl<I, Q: EffectQueue, Id, W> Lanes<I, Q, Id, W> {
    pub(crate) fn new() -> Self {
        Self {
            next_key: 0,
            running: HashMap::new(),
            backlog: HashMap::new(),
        }
    }

    fn allocate(&mut self) -> TaskKey {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    fn register(&mut self, key: TaskKey, task: &Task<I, Q, Id, W>)
    where
        Id: Clone,
    {
        self.running.insert(
            key,
            Running {
                queue: task.queue.clone(),
                id: task.id.clone(),
                handle: None,
            },
        );
    }

    /// Whether `queue` is at its concurrency limit.
    fn busy(&self, queue: &Q) -> bool {
        let Some(limit) = queue.flatten_strategy().concurrency_limit() else {
            return false;
        };
        self.running
            .values()
            .filter(|running| running.queue == *queue)
            .count()
            >= limit
    }

    /// Admit a task according to its queue's flatten strategy.
    pub(crate) fn submit(&mut self, task: Task<I, Q, Id, W>) -> Admission<I, Q, Id, W>
    where
        Id: Clone,
    {
        let key = self.allocate();
        match task.queue.flatten_strategy() {
            FlattenStrategy::Merge => {
                self.register(key, &task);
                Admission {
                    start: Some((key, task)),
                    superseded: Vec::new(),
                }
            }
            FlattenStrategy::Latest => {
                let queue = task.queue.clone();
                let superseded = self.stop_where(|running| running.queue == queue);
                self.register(key, &task);
                Admission {
                    start: Some((key, task)),
                    superseded,
                }
            }
            FlattenStrategy::Concat | FlattenStrategy::Bounded(_) => {
                if self.busy(&task.queue) {
                    self.backlog
                        .entry(task.queue.clone())
                        .or_default()
                        .push_back((key, task));
                    Admission {
                        start: None,
                        superseded: Vec::new(),
                    }
                } else {
                    self.register(key, &task);
                    Admission {
                        start: Some((key, task)),
                        superseded: Vec::new(),
                    }
                }
            }
        }
    }

    /// Remember the join handle of a spawned task.
    ///
    /// If the task was stopped in the meantime, it is aborted right away.
    pub(crate) fn attach(&mut self, key: TaskKey, handle: JoinHandle<()>) {
        match self.running.get_mut(&key) {
            Some(running) => running.handle = Some(handle),
            None => handle.abort(),
        }
    }

    pub(crate) fn is_live(&self, key: TaskKey) -> bool {
        self.running.contains_key(&key)
    }

    pub(crate) fn running_count(&self) -> usize {
        self.running.len()
    }

    pub(crate) fn waiting_count(&self) -> usize {
        self.backlog.values().map(VecDeque::len).sum()
    }

    /// Mark a task as completed. Returns the next backlogged task of the
    /// same queue, if any, already registered.
    pub(crate) fn finish(&mut self, key: TaskKey) -> Option<(TaskKey, Task<I, Q, Id, W>)>
    where
        Id: Clone,
    {
        let finished = self.running.remove(&key)?;
        self.promote(&finished.queue)
    }

    fn promote(&mut self, queue: &Q) -> Option<(TaskKey, Task<I, Q, Id, W>)>
    where
        Id: Clone,
    {
        if queue.flatten_strategy().concurrency_limit().is_none() || self.busy(queue) {
            return None;
        }
        let waiting = self.backlog.get_mut(queue)?;
        let (key, task) = waiting.pop_front()?;
        if waiting.is_empty() {
            self.backlog.remove(queue);
        }
        self.register(key, &task);
        Some((key, task))
    }

    /// Cancel running and backlogged tasks whose identity matches.
    ///
    /// Returns the keys of stopped running tasks, plus whatever backlogged
    /// tasks got promoted in their place.
    pub(crate) fn cancel<F>(&mut self, matches: F) -> Cancellation<I, Q, Id, W>
    where
        F: Fn(&Id) -> bool,
        Id: Clone,
    {
        let hit = |id: &Option<Id>| id.as_ref().is_some_and(&matches);

        let mut dropped = 0;
        for waiting in self.backlog.values_mut() {
            let before = waiting.len();
            waiting.retain(|(_, task)| !hit(&task.id));
            dropped += before - waiting.len();
        }
        self.backlog.retain(|_, waiting| !waiting.is_empty());

        let mut queues = Vec::new();
        let stopped = self.stop_where(|running| {
            let stop = hit(&running.id);
            if stop && !queues.contains(&running.queue) {
                queues.push(running.queue.clone());
            }
            stop
        });

        let promoted = queues
            .iter()
            .filter_map(|queue| self.promote(queue))
            .collect();

        Cancellation {
            stopped,
            dropped,
            promoted,
        }
    }

    fn stop_where<F>(&mut self, mut predicate: F) -> Vec<TaskKey>
    where
        F: FnMut(&Running<Q, Id>) -> bool,
    {
        let keys: Vec<TaskKey> = self
            .running
            .iter()
            .filter(|(_, running)| predicate(running))
            .map(|(key, _)| *key)
            .collect();

        for key in &keys {
            if let Some(handle) = self.running.remove(key).and_then(|r| r.handle) {
                handle.abort();
            }
        }
        keys
    }
}

impl<I, Q, Id, W> Lanes<I, Q, Id, W> {
    /// Abort everything. Used when the machine goes away.
    pub(crate) fn shutdown(&mut self) {
        for (_, running) in self.running.drain() {
            if let Some(handle) = running.handle {
                handle.abort();
            }
        }
        self.backlog.clear();
    }
}

pub(crate) struct Cancellation<I, Q, Id, W> {
    pub(crate) stopped: Vec<TaskKey>,
    pub(crate) dropped: usize,
    pub(crate) promoted: Vec<(TaskKey, Task<I, Q, Id, W>)>,
}
