//! Table-driven mappings.
//!
//! A [`Rule`] reads "on `input`, from any state accepted by `guard`, go to
//! `target` and run `effect`". [`Mapping::rules`] turns a list of rules into
//! a mapping where the first rule that fires wins.

use super::{Guard, Mapping};
use crate::effects::{Effect, EffectQueue};
use std::fmt;
use std::sync::Arc;

/// Builds a fresh effect each time a rule fires.
pub type EffectFactory<I, Q, Id, W> = Arc<dyn Fn() -> Effect<I, Q, Id, W> + Send + Sync>;

pub struct Rule<I, S, Q, Id, W> {
    pub(crate) input: I,
    pub(crate) guard: Guard<S>,
    pub(crate) target: S,
    pub(crate) effect: EffectFactory<I, Q, Id, W>,
}

impl<I: Clone, S: Clone, Q, Id, W> Clone for Rule<I, S, Q, Id, W> {
    fn clone(&self) -> Self {
        Self {
            input: self.input.clone(),
            guard: self.guard.clone(),
            target: self.target.clone(),
            effect: Arc::clone(&self.effect),
        }
    }
}

impl<I: fmt::Debug, S: fmt::Debug, Q, Id, W> fmt::Debug for Rule<I, S, Q, Id, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("input", &self.input)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<I, S, Q, Id, W> Rule<I, S, Q, Id, W>
where
    I: PartialEq + Send + 'static,
    S: PartialEq + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    /// `input | from => to`, without effects.
    pub fn new(input: I, from: S, to: S) -> Self {
        Self::guarded(input, Guard::is(from), to)
    }

    /// `input | guard => to`, without effects.
    pub fn guarded(input: I, guard: Guard<S>, to: S) -> Self {
        Self {
            input,
            guard,
            target: to,
            effect: Arc::new(|| Effect::empty()),
        }
    }

    /// Run `factory`'s effect whenever this rule fires.
    pub fn with_effect<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Effect<I, Q, Id, W> + Send + Sync + 'static,
    {
        self.effect = Arc::new(factory);
        self
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn target(&self) -> &S {
        &self.target
    }

    /// Whether this rule fires for `input` in `state`.
    pub fn can_fire(&self, input: &I, state: &S) -> bool {
        self.input == *input && self.guard.check(state)
    }
}

impl<I, S, Q, Id, W> Mapping<I, S, Q, Id, W>
where
    I: PartialEq + Send + Sync + 'static,
    S: Clone + PartialEq + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    /// Mapping from a rule table. The first rule that fires wins.
    ///
    /// # Example
    ///
    /// ```rust
    /// use harvest::core::{Guard, Mapping, Rule};
    /// use harvest::effects::BasicEffectQueue;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// enum Door { Open, Closed, Locked }
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// enum Action { Close, Lock, Open }
    ///
    /// let mapping: Mapping<Action, Door, BasicEffectQueue, (), ()> = Mapping::rules([
    ///     Rule::new(Action::Close, Door::Open, Door::Closed),
    ///     Rule::new(Action::Lock, Door::Closed, Door::Locked),
    ///     Rule::guarded(Action::Open, Guard::is(Door::Closed), Door::Open),
    /// ]);
    ///
    /// assert_eq!(mapping.run(&Action::Lock, &Door::Closed).map(|(s, _)| s), Some(Door::Locked));
    /// assert!(mapping.run(&Action::Open, &Door::Locked).is_none());
    /// ```
    pub fn rules<It>(rules: It) -> Self
    where
        It: IntoIterator<Item = Rule<I, S, Q, Id, W>>,
    {
        let rules: Vec<Rule<I, S, Q, Id, W>> = rules.into_iter().collect();
        Self::new(move |input, state| {
            rules
                .iter()
                .find(|rule| rule.can_fire(input, state))
                .map(|rule| (rule.target.clone(), (rule.effect)()))
        })
    }
}
