//! Focus on zero or one part.

use super::{Lens, Prism};
use std::fmt;
use std::sync::Arc;

type TryGetter<W, P> = Arc<dyn Fn(&W) -> Option<P> + Send + Sync>;
type Setter<W, P> = Arc<dyn Fn(W, P) -> W + Send + Sync>;

/// A lens composed with a prism.
///
/// Typical use is "parent state -> optional current screen -> one screen's
/// state": `try_get` is `None` unless that screen is current, and `set` is a
/// no-op in that case.
pub struct AffineTraversal<W, P> {
    try_get: TryGetter<W, P>,
    set: Setter<W, P>,
}

impl<W, P> Clone for AffineTraversal<W, P> {
    fn clone(&self) -> Self {
        Self {
            try_get: Arc::clone(&self.try_get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<W, P> fmt::Debug for AffineTraversal<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AffineTraversal(..)")
    }
}

impl<W: 'static, P: 'static> AffineTraversal<W, P> {
    /// Create a traversal from a partial getter and a setter.
    ///
    /// The setter must leave `whole` untouched when `try_get` misses.
    pub fn new<G, S>(try_get: G, set: S) -> Self
    where
        G: Fn(&W) -> Option<P> + Send + Sync + 'static,
        S: Fn(W, P) -> W + Send + Sync + 'static,
    {
        Self {
            try_get: Arc::new(try_get),
            set: Arc::new(set),
        }
    }

    pub fn try_get(&self, whole: &W) -> Option<P> {
        (self.try_get)(whole)
    }

    pub fn set(&self, whole: W, part: P) -> W {
        (self.set)(whole, part)
    }

    /// Apply `f` to the part if present.
    pub fn modify<F>(&self, whole: W, f: F) -> W
    where
        F: FnOnce(P) -> P,
    {
        match self.try_get(&whole) {
            Some(part) => self.set(whole, f(part)),
            None => whole,
        }
    }

    pub fn then_prism<Q: 'static>(self, prism: Prism<P, Q>) -> AffineTraversal<W, Q> {
        let (outer_get, outer_set) = (self.clone(), self);
        let (prism_get, prism_set) = (prism.clone(), prism);
        AffineTraversal::new(
            move |whole: &W| outer_get.try_get(whole).and_then(|p| prism_get.try_get(&p)),
            move |whole: W, q: Q| match outer_set.try_get(&whole) {
                Some(part) if prism_set.matches(&part) => {
                    outer_set.set(whole, prism_set.inject(q))
                }
                _ => whole,
            },
        )
    }

    pub fn then_lens<Q: 'static>(self, lens: Lens<P, Q>) -> AffineTraversal<W, Q> {
        let (outer_get, outer_set) = (self.clone(), self);
        let (lens_get, lens_set) = (lens.clone(), lens);
        AffineTraversal::new(
            move |whole: &W| outer_get.try_get(whole).map(|p| lens_get.get(&p)),
            move |whole: W, q: Q| match outer_set.try_get(&whole) {
                Some(part) => {
                    let part = lens_set.set(part, q);
                    outer_set.set(whole, part)
                }
                None => whole,
            },
        )
    }
}

impl<W: 'static, P: 'static> From<Lens<W, P>> for AffineTraversal<W, P> {
    fn from(lens: Lens<W, P>) -> Self {
        let (get, set) = (lens.clone(), lens);
        AffineTraversal::new(
            move |whole: &W| Some(get.get(whole)),
            move |whole: W, part: P| set.set(whole, part),
        )
    }
}

impl<W: 'static, P: 'static> From<Prism<W, P>> for AffineTraversal<W, P> {
    fn from(prism: Prism<W, P>) -> Self {
        let (get, set) = (prism.clone(), prism);
        AffineTraversal::new(
            move |whole: &W| get.try_get(whole),
            move |whole: W, part: P| {
                if set.matches(&whole) {
                    set.inject(part)
                } else {
                    whole
                }
            },
        )
    }
}
