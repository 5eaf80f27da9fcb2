//! Guard predicates for rule-based mappings.
//!
//! Guards are pure boolean functions over the current state. A [`Rule`]
//! fires only when its guard accepts the state it is applied to.
//!
//! [`Rule`]: super::Rule

use std::fmt;
use std::sync::Arc;

/// Pure predicate deciding whether a rule may fire from a state.
///
/// # Example
///
/// ```rust
/// use harvest::core::Guard;
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Session {
///     LoggedOut,
///     LoggingIn,
///     LoggedIn,
/// }
///
/// let signed_in = Guard::new(|s: &Session| matches!(s, Session::LoggingIn | Session::LoggedIn));
///
/// assert!(signed_in.check(&Session::LoggedIn));
/// assert!(!signed_in.check(&Session::LoggedOut));
/// ```
pub struct Guard<S> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}

impl<S: 'static> Guard<S> {
    /// Create a guard from a pure predicate.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard accepting exactly `state`.
    pub fn is(state: S) -> Self
    where
        S: PartialEq + Send + Sync,
    {
        Self::new(move |current| *current == state)
    }

    /// Guard accepting any of `states`.
    pub fn any_of<It>(states: It) -> Self
    where
        S: PartialEq + Send + Sync,
        It: IntoIterator<Item = S>,
    {
        let states: Vec<S> = states.into_iter().collect();
        Self::new(move |current| states.contains(current))
    }

    /// Check if the guard accepts this state.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}
