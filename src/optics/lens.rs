//! Total bidirectional focus.

use super::{AffineTraversal, Prism};
use std::fmt;
use std::sync::Arc;

type Getter<W, P> = Arc<dyn Fn(&W) -> P + Send + Sync>;
type Setter<W, P> = Arc<dyn Fn(W, P) -> W + Send + Sync>;

/// Focus from a whole onto an always-present part.
///
/// Lawful lenses satisfy:
/// - `set(w, get(w)) == w`
/// - `get(set(w, p)) == p`
///
/// # Example
///
/// ```rust
/// use harvest::optics::Lens;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let x = Lens::new(|p: &Point| p.x, |p: Point, x| Point { x, ..p });
///
/// let origin = Point { x: 0, y: 0 };
/// assert_eq!(x.get(&origin), 0);
/// assert_eq!(x.set(origin, 3), Point { x: 3, y: 0 });
/// ```
pub struct Lens<W, P> {
    get: Getter<W, P>,
    set: Setter<W, P>,
}

impl<W, P> Clone for Lens<W, P> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<W, P> fmt::Debug for Lens<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lens(..)")
    }
}

impl<W: 'static, P: 'static> Lens<W, P> {
    /// Create a lens from a getter and a setter.
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&W) -> P + Send + Sync + 'static,
        S: Fn(W, P) -> W + Send + Sync + 'static,
    {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Read the focused part.
    pub fn get(&self, whole: &W) -> P {
        (self.get)(whole)
    }

    /// Replace the focused part, returning the new whole.
    pub fn set(&self, whole: W, part: P) -> W {
        (self.set)(whole, part)
    }

    /// Apply `f` to the focused part.
    pub fn modify<F>(&self, whole: W, f: F) -> W
    where
        F: FnOnce(P) -> P,
    {
        let part = self.get(&whole);
        self.set(whole, f(part))
    }

    /// Compose with a lens focusing further into the part.
    pub fn then<Q: 'static>(self, inner: Lens<P, Q>) -> Lens<W, Q> {
        let (outer_get, outer_set) = (self.clone(), self);
        let (inner_get, inner_set) = (inner.clone(), inner);
        Lens::new(
            move |whole: &W| inner_get.get(&outer_get.get(whole)),
            move |whole: W, q: Q| {
                let part = outer_set.get(&whole);
                outer_set.set(whole, inner_set.set(part, q))
            },
        )
    }

    /// Compose with a prism, yielding a focus that may miss.
    ///
    /// `try_get` is `None` when the lensed part is not the prism's case,
    /// and `set` is then a no-op.
    pub fn then_prism<Q: 'static>(self, prism: Prism<P, Q>) -> AffineTraversal<W, Q> {
        AffineTraversal::from(self).then_prism(prism)
    }
}

impl<W: Clone + 'static> Lens<W, W> {
    /// The lens focusing on the whole itself.
    pub fn identity() -> Self {
        Lens::new(|whole: &W| whole.clone(), |_, part| part)
    }
}
