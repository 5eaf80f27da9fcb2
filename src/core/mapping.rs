//! Transition functions and their composition.

use crate::effects::{Effect, EffectQueue};
use crate::optics::{AffineTraversal, Prism};
use std::fmt;
use std::sync::Arc;

type MappingFn<I, S, Q, Id, W> =
    Arc<dyn Fn(&I, &S) -> Option<(S, Effect<I, Q, Id, W>)> + Send + Sync>;

/// How [`Mapping::reduce`] combines several mappings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The first mapping that handles the input owns it.
    First,

    /// Every mapping that handles the input runs, in order, each seeing
    /// the state left by the previous one. Effects are concatenated.
    All,
}

/// Pure transition function `(input, state) -> Option<(state, effect)>`.
///
/// `None` means "not handled": the state is left untouched and composition
/// falls through to the next mapping. A handled input with no work returns
/// [`Effect::empty`].
///
/// Mappings are values. Parents build theirs out of children's mappings
/// with [`reduce`](Mapping::reduce) and the `transform_*` combinators, so a
/// child never refers to its parent.
///
/// # Example
///
/// ```rust
/// use harvest::core::Mapping;
/// use harvest::effects::BasicEffectQueue;
///
/// #[derive(Debug)]
/// enum Input { Increment, Decrement }
///
/// let mapping: Mapping<Input, i32, BasicEffectQueue, (), ()> =
///     Mapping::pure(|input, count| match input {
///         Input::Increment => Some(count + 1),
///         Input::Decrement => Some(count - 1),
///     });
///
/// let (count, effect) = mapping.run(&Input::Increment, &0).unwrap();
/// assert_eq!(count, 1);
/// assert!(effect.is_empty());
/// ```
pub struct Mapping<I, S, Q, Id, W> {
    run: MappingFn<I, S, Q, Id, W>,
}

impl<I, S, Q, Id, W> Clone for Mapping<I, S, Q, Id, W> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<I, S, Q, Id, W> fmt::Debug for Mapping<I, S, Q, Id, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapping(..)")
    }
}

impl<I, S, Q, Id, W> Mapping<I, S, Q, Id, W>
where
    I: Send + 'static,
    S: 'static,
    Q: EffectQueue,
    Id: Send + Sync + 'static,
    W: Send + 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&I, &S) -> Option<(S, Effect<I, Q, Id, W>)> + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Mapping that edits a copy of the state in place.
    ///
    /// Returning `None` reports the input as unhandled and discards the
    /// edits.
    pub fn inout<F>(f: F) -> Self
    where
        S: Clone,
        F: Fn(&I, &mut S) -> Option<Effect<I, Q, Id, W>> + Send + Sync + 'static,
    {
        Self::new(move |input, state| {
            let mut next = state.clone();
            f(input, &mut next).map(|effect| (next, effect))
        })
    }

    /// Mapping that never produces effects.
    pub fn pure<F>(f: F) -> Self
    where
        F: Fn(&I, &S) -> Option<S> + Send + Sync + 'static,
    {
        Self::new(move |input, state| f(input, state).map(|next| (next, Effect::empty())))
    }

    /// Apply the mapping.
    pub fn run(&self, input: &I, state: &S) -> Option<(S, Effect<I, Q, Id, W>)> {
        (self.run)(input, state)
    }

    /// Combine mappings into one, see [`MatchPolicy`].
    ///
    /// With [`MatchPolicy::All`], ordering matters: a mapping that clears
    /// a selection and cancels its effects must come before the mappings
    /// that inspect the selection.
    pub fn reduce<M>(policy: MatchPolicy, mappings: M) -> Self
    where
        M: IntoIterator<Item = Self>,
    {
        let mappings: Vec<Self> = mappings.into_iter().collect();
        match policy {
            MatchPolicy::First => Self::new(move |input, state| {
                mappings.iter().find_map(|mapping| mapping.run(input, state))
            }),
            MatchPolicy::All => Self::new(move |input, state| {
                let mut handled: Option<(S, Effect<I, Q, Id, W>)> = None;
                for mapping in &mappings {
                    let current = handled.as_ref().map_or(state, |(next, _)| next);
                    if let Some((next, effect)) = mapping.run(input, current) {
                        handled = Some(match handled {
                            Some((_, previous)) => (next, previous.and(effect)),
                            None => (next, effect),
                        });
                    }
                }
                handled
            }),
        }
    }

    /// Lift onto a parent input that embeds this mapping's input.
    ///
    /// Parent inputs outside the prism's case are unhandled. Inputs produced
    /// by effects are injected back into the parent input type.
    pub fn transform_input<PI>(self, prism: Prism<PI, I>) -> Mapping<PI, S, Q, Id, W>
    where
        PI: Send + 'static,
    {
        Mapping::new(move |input: &PI, state: &S| {
            let child = prism.try_get(input)?;
            let (next, effect) = self.run(&child, state)?;
            let inject = prism.clone();
            Some((next, effect.map_input(move |output| inject.inject(output))))
        })
    }

    /// Lift onto a parent state holding this mapping's state.
    ///
    /// When `focus` misses (e.g. another screen is current), the input is
    /// unhandled.
    pub fn transform_state<PS, F>(self, focus: F) -> Mapping<I, PS, Q, Id, W>
    where
        PS: Clone + 'static,
        F: Into<AffineTraversal<PS, S>>,
    {
        let focus = focus.into();
        Mapping::new(move |input: &I, state: &PS| {
            let child = focus.try_get(state)?;
            let (next, effect) = self.run(input, &child)?;
            Some((focus.set(state.clone(), next), effect))
        })
    }

    /// [`transform_input`](Self::transform_input) followed by
    /// [`transform_state`](Self::transform_state).
    pub fn transform<PI, PS, F>(self, input: Prism<PI, I>, state: F) -> Mapping<PI, PS, Q, Id, W>
    where
        PI: Send + 'static,
        PS: Clone + 'static,
        F: Into<AffineTraversal<PS, S>>,
    {
        self.transform_input(input).transform_state(state)
    }

    /// Lift effect identities into an aggregate identity type.
    pub fn transform_id<Id2>(self, prism: Prism<Id2, Id>) -> Mapping<I, S, Q, Id2, W>
    where
        Id2: Send + Sync + 'static,
    {
        Mapping::new(move |input: &I, state: &S| {
            let (next, effect) = self.run(input, state)?;
            Some((next, effect.map_id(prism.clone())))
        })
    }

    /// Run this mapping's producers against a world derived from the
    /// parent's.
    pub fn contramap_world<W2, F>(self, f: F) -> Mapping<I, S, Q, Id, W2>
    where
        W2: Send + 'static,
        F: Fn(&W2) -> W + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(&W2) -> W + Send + Sync> = Arc::new(f);
        Mapping::new(move |input: &I, state: &S| {
            let (next, effect) = self.run(input, state)?;
            Some((next, effect.contramap_world(Arc::clone(&f))))
        })
    }

    /// Re-target every effect onto other queues.
    pub fn map_queue<Q2, F>(self, f: F) -> Mapping<I, S, Q2, Id, W>
    where
        Q2: EffectQueue,
        F: Fn(Q) -> Q2 + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Mapping::new(move |input: &I, state: &S| {
            let (next, effect) = self.run(input, state)?;
            let f = Arc::clone(&f);
            Some((next, effect.map_queue(move |queue| (*f)(queue))))
        })
    }
}
