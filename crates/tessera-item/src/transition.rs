#![forbid(unsafe_code)]

//! Transition bookkeeping.
//!
//! An item is either [`TransitionState::Idle`] or
//! [`TransitionState::Transitioning`]. While transitioning it holds exactly
//! one [`ActiveTransition`]: the keys being animated, the signal it waits
//! for, the completion action, and an optional stall deadline.
//!
//! # Invariants
//!
//! 1. `Transitioning` holds iff an `ActiveTransition` exists, and an
//!    `ActiveTransition` exists iff its listener is registered on the element.
//! 2. `pending_keys` is never empty.
//! 3. The completion action is taken at most once.

use std::fmt;

use web_time::Instant;

use tessera_core::signal::SignalKind;
use tessera_core::style::StyleMap;

/// Whether an item is animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionState {
    /// No transition in flight.
    #[default]
    Idle,
    /// Waiting for a completion signal.
    Transitioning,
}

/// What to do once a transition finishes.
pub enum OnComplete {
    /// Write the settled offset styling for the item's logical position.
    Settle,
    /// Detach the element from its container.
    Detach,
    /// Run an arbitrary callback.
    Notify(Box<dyn FnOnce()>),
}

impl OnComplete {
    /// Wrap a callback.
    pub fn notify(f: impl FnOnce() + 'static) -> Self {
        Self::Notify(Box::new(f))
    }
}

impl fmt::Debug for OnComplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settle => f.write_str("Settle"),
            Self::Detach => f.write_str("Detach"),
            Self::Notify(_) => f.write_str("Notify(..)"),
        }
    }
}

/// The single in-flight transition of an item.
#[derive(Debug)]
pub(crate) struct ActiveTransition {
    pub(crate) signal: SignalKind,
    pub(crate) pending_keys: Vec<String>,
    pub(crate) declaration_keys: [&'static str; 2],
    pub(crate) on_complete: Option<OnComplete>,
    pub(crate) deadline: Option<Instant>,
}

impl ActiveTransition {
    /// Take the completion action; later calls return `None`.
    pub(crate) fn take_on_complete(&mut self) -> Option<OnComplete> {
        self.on_complete.take()
    }

    /// Styling that removes every trace of this transition from the element.
    pub(crate) fn cleanup_style(&self) -> StyleMap {
        StyleMap::unset(
            self.declaration_keys
                .iter()
                .copied()
                .chain(self.pending_keys.iter().map(String::as_str)),
        )
    }

    /// Whether the stall deadline has passed at `now`.
    pub(crate) fn is_stalled(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
