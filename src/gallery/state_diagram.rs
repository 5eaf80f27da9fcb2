//! Login session as a rule table.

use super::CommonEffectQueue;
use crate::core::{Guard, Mapping, Rule};
use crate::effects::{Effect, Scheduler};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

/// Simulated latency of logging in and out.
pub const ROUND_TRIP: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateDiagramInput {
    Login,
    LoginOk,
    Logout,
    ForceLogout,
    LogoutOk,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateDiagramState {
    #[default]
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

pub type StateDiagramWorld = Arc<dyn Scheduler>;

type StateDiagramMapping =
    Mapping<StateDiagramInput, StateDiagramState, CommonEffectQueue, Infallible, StateDiagramWorld>;

fn reply(input: StateDiagramInput) -> Effect<StateDiagramInput, CommonEffectQueue, Infallible, StateDiagramWorld> {
    Effect::delayed(ROUND_TRIP, input).on(CommonEffectQueue::Request)
}

pub fn mapping() -> StateDiagramMapping {
    use StateDiagramInput as I;
    use StateDiagramState as S;

    Mapping::rules([
        Rule::new(I::Login, S::LoggedOut, S::LoggingIn).with_effect(|| reply(I::LoginOk)),
        Rule::new(I::LoginOk, S::LoggingIn, S::LoggedIn),
        Rule::new(I::Logout, S::LoggedIn, S::LoggingOut).with_effect(|| reply(I::LogoutOk)),
        Rule::new(I::LogoutOk, S::LoggingOut, S::LoggedOut),
        Rule::guarded(
            I::ForceLogout,
            Guard::any_of([S::LoggingIn, S::LoggedIn]),
            S::LoggingOut,
        )
        .with_effect(|| reply(I::LogoutOk)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::{StateDiagramInput as I, StateDiagramState as S};

    #[test]
    fn login_schedules_confirmation_on_request_queue() {
        let (next, effect) = mapping().run(&I::Login, &S::LoggedOut).unwrap();
        assert_eq!(next, S::LoggingIn);
        assert_eq!(effect.queues(), vec![&CommonEffectQueue::Request]);
    }

    #[test]
    fn login_when_logged_in_is_unhandled() {
        assert!(mapping().run(&I::Login, &S::LoggedIn).is_none());
    }

    #[test]
    fn force_logout_only_from_active_sessions() {
        assert_eq!(
            mapping().run(&I::ForceLogout, &S::LoggingIn).map(|(s, _)| s),
            Some(S::LoggingOut)
        );
        assert!(mapping().run(&I::ForceLogout, &S::LoggedOut).is_none());
        assert!(mapping().run(&I::ForceLogout, &S::LoggingOut).is_none());
    }

    #[test]
    fn confirmations_complete_transitions() {
        assert_eq!(
            mapping().run(&I::LoginOk, &S::LoggingIn).map(|(s, _)| s),
            Some(S::LoggedIn)
        );
        assert_eq!(
            mapping().run(&I::LogoutOk, &S::LoggingOut).map(|(s, _)| s),
            Some(S::LoggedOut)
        );
    }
}
