//! Builder for constructing rules.

use crate::builder::error::BuildError;
use crate::core::{EffectFactory, Guard, Rule};
use crate::effects::{Effect, EffectQueue};
use std::sync::Arc;

/// Builder for [`Rule`]s with a fluent API.
pub struct RuleBuilder<I, S, Q, Id, W> {
    input: Option<I>,
    guard: Option<Guard<S>>,
    target: Option<S>,
    effect: Option<EffectFactory<I, Q, Id, W>>,
}

impl<I, S, Q, Id, W> RuleBuilder<I, S, Q, Id, W>
where
    I: PartialEq + Send + 'static,
    S: PartialEq + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    /// Create a new rule builder.
    pub fn new() -> Self {
        Self {
            input: None,
            guard: None,
            target: None,
            effect: None,
        }
    }

    /// Set the triggering input (required).
    pub fn on(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    /// Fire only from `state`.
    pub fn from(mut self, state: S) -> Self {
        self.guard = Some(Guard::is(state));
        self
    }

    /// Fire from any of `states`.
    pub fn from_any<It>(mut self, states: It) -> Self
    where
        It: IntoIterator<Item = S>,
    {
        self.guard = Some(Guard::any_of(states));
        self
    }

    /// Fire from states accepted by `predicate`.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: S) -> Self {
        self.target = Some(state);
        self
    }

    /// Run a fresh effect from `factory` whenever the rule fires (optional).
    pub fn effect<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Effect<I, Q, Id, W> + Send + Sync + 'static,
    {
        self.effect = Some(Arc::new(factory));
        self
    }

    /// Build the rule.
    pub fn build(self) -> Result<Rule<I, S, Q, Id, W>, BuildError> {
        let input = self.input.ok_or(BuildError::MissingInput)?;
        let guard = self.guard.ok_or(BuildError::MissingSource)?;
        let target = self.target.ok_or(BuildError::MissingTarget)?;

        let rule = Rule::guarded(input, guard, target);
        Ok(match self.effect {
            Some(factory) => rule.with_effect(move || factory()),
            None => rule,
        })
    }
}

impl<I, S, Q, Id, W> Default for RuleBuilder<I, S, Q, Id, W>
where
    I: PartialEq + Send + 'static,
    S: PartialEq + Send + Sync + 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
