//! Partial focus onto one case of a sum type.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

type TryGetter<W, P> = Arc<dyn Fn(&W) -> Option<P> + Send + Sync>;
type Injector<W, P> = Arc<dyn Fn(P) -> W + Send + Sync>;

/// Focus from a sum type onto one of its cases.
///
/// Lawful prisms satisfy `try_get(inject(p)) == Some(p)`.
///
/// Input composition goes through prisms: a parent input enum embeds a
/// child's input in one variant, and outputs of the child's effects are
/// routed back with [`Prism::inject`].
///
/// # Example
///
/// ```rust
/// use harvest::optics::Prism;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Shape { Circle(f64), Square(f64) }
///
/// let circle = Prism::new(
///     |s: &Shape| match s {
///         Shape::Circle(r) => Some(*r),
///         _ => None,
///     },
///     Shape::Circle,
/// );
///
/// assert_eq!(circle.try_get(&Shape::Circle(1.0)), Some(1.0));
/// assert_eq!(circle.try_get(&Shape::Square(1.0)), None);
/// assert_eq!(circle.inject(2.0), Shape::Circle(2.0));
/// ```
pub struct Prism<W, P> {
    try_get: TryGetter<W, P>,
    inject: Injector<W, P>,
}

impl<W, P> Clone for Prism<W, P> {
    fn clone(&self) -> Self {
        Self {
            try_get: Arc::clone(&self.try_get),
            inject: Arc::clone(&self.inject),
        }
    }
}

impl<W, P> fmt::Debug for Prism<W, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Prism(..)")
    }
}

impl<W: 'static, P: 'static> Prism<W, P> {
    /// Create a prism from a partial getter and an injector.
    pub fn new<G, I>(try_get: G, inject: I) -> Self
    where
        G: Fn(&W) -> Option<P> + Send + Sync + 'static,
        I: Fn(P) -> W + Send + Sync + 'static,
    {
        Self {
            try_get: Arc::new(try_get),
            inject: Arc::new(inject),
        }
    }

    /// Extract the part if `whole` is this prism's case.
    pub fn try_get(&self, whole: &W) -> Option<P> {
        (self.try_get)(whole)
    }

    /// Build the whole from the part.
    pub fn inject(&self, part: P) -> W {
        (self.inject)(part)
    }

    /// Whether `whole` is this prism's case.
    pub fn matches(&self, whole: &W) -> bool {
        self.try_get(whole).is_some()
    }

    /// Compose with a prism focusing on a case of the part.
    pub fn then<Q: 'static>(self, inner: Prism<P, Q>) -> Prism<W, Q> {
        let (outer_get, outer_inject) = (self.clone(), self);
        let (inner_get, inner_inject) = (inner.clone(), inner);
        Prism::new(
            move |whole: &W| outer_get.try_get(whole).and_then(|p| inner_get.try_get(&p)),
            move |q: Q| outer_inject.inject(inner_inject.inject(q)),
        )
    }
}

impl<T: Clone + 'static> Prism<Option<T>, T> {
    /// Focus on the `Some` case of an optional value.
    pub fn some() -> Self {
        Prism::new(|whole: &Option<T>| whole.clone(), Some)
    }
}

impl<W: 'static> Prism<W, Infallible> {
    /// A prism that never matches.
    ///
    /// Used to lift a mapping whose effects carry no identity into a
    /// composition with a richer identity type.
    pub fn never() -> Self {
        Prism::new(|_: &W| None, |never: Infallible| match never {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Outer {
        Inner(Inner),
        Empty,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Inner {
        Value(i32),
        Other,
    }

    fn inner_prism() -> Prism<Outer, Inner> {
        Prism::new(
            |o: &Outer| match o {
                Outer::Inner(i) => Some(i.clone()),
                Outer::Empty => None,
            },
            Outer::Inner,
        )
    }

    fn value_prism() -> Prism<Inner, i32> {
        Prism::new(
            |i: &Inner| match i {
                Inner::Value(v) => Some(*v),
                Inner::Other => None,
            },
            Inner::Value,
        )
    }

    #[test]
    fn try_get_misses_other_cases() {
        assert_eq!(inner_prism().try_get(&Outer::Empty), None);
        assert!(!inner_prism().matches(&Outer::Empty));
    }

    #[test]
    fn composed_prism_round_trips() {
        let value = inner_prism().then(value_prism());
        let whole = value.inject(7);
        assert_eq!(whole, Outer::Inner(Inner::Value(7)));
        assert_eq!(value.try_get(&whole), Some(7));
        assert_eq!(value.try_get(&Outer::Inner(Inner::Other)), None);
    }

    #[test]
    fn some_prism_focuses_on_present_value() {
        let some = Prism::<Option<i32>, i32>::some();
        assert_eq!(some.try_get(&Some(3)), Some(3));
        assert_eq!(some.try_get(&None), None);
        assert_eq!(some.inject(4), Some(4));
    }

    #[test]
    fn never_prism_never_matches() {
        let never = Prism::<Outer, Infallible>::never();
        assert!(!never.matches(&Outer::Empty));
    }
}
