#![forbid(unsafe_code)]

//! Completion signals raised by the rendering environment.
//!
//! The host delivers signals by name (`"transitionend"`,
//! `"webkitTransitionEnd"`, ...). Names are resolved once, through
//! [`SignalKind::from_name`], into a closed enum so that every consumer
//! dispatches with an exhaustive `match` instead of looking handlers up by
//! string.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Known completion signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Unprefixed `transitionend` (also fired by Gecko's `-moz-` transitions).
    TransitionEnd,
    /// WebKit's `webkitTransitionEnd`.
    WebkitTransitionEnd,
    /// Presto's `otransitionend`.
    OTransitionEnd,
}

/// Lookup table from host event name to signal kind.
const SIGNAL_NAMES: &[(&str, SignalKind)] = &[
    ("transitionend", SignalKind::TransitionEnd),
    ("webkitTransitionEnd", SignalKind::WebkitTransitionEnd),
    ("otransitionend", SignalKind::OTransitionEnd),
];

impl SignalKind {
    /// Resolve a host event name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        SIGNAL_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, kind)| kind)
    }

    /// The event name the host uses for this signal.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TransitionEnd => "transitionend",
            Self::WebkitTransitionEnd => "webkitTransitionEnd",
            Self::OTransitionEnd => "otransitionend",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a renderable element, used to tell a box's own signals apart
/// from ones bubbling up out of nested content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

impl ElementId {
    /// Wrap a host-assigned identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a fresh process-unique identifier.
    pub fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A signal as delivered to a listener: what happened and where it originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    /// Which signal fired.
    pub kind: SignalKind,
    /// The element the signal originated on. May be a descendant of the
    /// element the listener is registered on.
    pub target: ElementId,
}

impl Signal {
    /// Create a signal.
    #[inline]
    pub const fn new(kind: SignalKind, target: ElementId) -> Self {
        Self { kind, target }
    }

    /// Build a signal from a host event name, if the name is known.
    #[must_use]
    pub fn from_name(name: &str, target: ElementId) -> Option<Self> {
        SignalKind::from_name(name).map(|kind| Self { kind, target })
    }
}
