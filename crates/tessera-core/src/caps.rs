#![forbid(unsafe_code)]

//! Animation capability detection.
//!
//! Rendering environments differ in whether they animate style changes at
//! all, and in which (possibly vendor-prefixed) style keys and completion
//! signal they use when they do. [`AnimationCapabilities`] captures the
//! answer once so that items never re-probe.
//!
//! # Probing
//!
//! [`AnimationCapabilities::probe`] asks the host, through a predicate over
//! style-object property names, which spelling of `transition` and
//! `transform` it recognizes. The unprefixed name is tried first, then the
//! `Webkit`, `Moz` and `O` spellings.
//!
//! # Process-wide install
//!
//! Capabilities are immutable for the life of the process. Install them once
//! at startup with [`AnimationCapabilities::install_global`] and read them
//! with [`AnimationCapabilities::global`]; an uninstalled process reports
//! [`AnimationCapabilities::none`], so everything degrades to synchronous
//! behavior.
//!
//! ```
//! use tessera_core::caps::{AnimationCapabilities, VendorPrefix};
//!
//! let caps = AnimationCapabilities::probe(|prop| prop.starts_with("Webkit"));
//! assert_eq!(caps.transition_prefix(), Some(VendorPrefix::Webkit));
//! assert_eq!(caps.transition_duration_key(), Some("-webkit-transition-duration"));
//! ```

use std::sync::OnceLock;

use bitflags::bitflags;

use crate::signal::SignalKind;

bitflags! {
    /// Animation features the environment supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnimationFeatures: u8 {
        /// Animated style transitions with a completion signal.
        const TRANSITION = 0b01;
        /// 2D transforms (`translate`, `scale`).
        const TRANSFORM = 0b10;
    }
}

/// Spelling variant of an animation-related style key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorPrefix {
    /// No prefix (`transition`).
    Standard,
    /// `-webkit-` / `Webkit`.
    Webkit,
    /// `-moz-` / `Moz`.
    Moz,
    /// `-o-` / `O`.
    O,
}

impl VendorPrefix {
    /// Probe order: unprefixed first, then vendor spellings.
    pub const PROBE_ORDER: [VendorPrefix; 4] = [
        VendorPrefix::Standard,
        VendorPrefix::Webkit,
        VendorPrefix::Moz,
        VendorPrefix::O,
    ];

    /// The style-object property name for `base` (`"transition"` becomes
    /// `"WebkitTransition"` under [`VendorPrefix::Webkit`]).
    #[must_use]
    pub fn dom_property(self, base: &str) -> String {
        let stem = match self {
            Self::Standard => return base.to_owned(),
            Self::Webkit => "Webkit",
            Self::Moz => "Moz",
            Self::O => "O",
        };
        let mut chars = base.chars();
        let mut out = String::with_capacity(stem.len() + base.len());
        out.push_str(stem);
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
        out
    }
}

/// What the current rendering environment supports for animated moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnimationCapabilities {
    transition: Option<VendorPrefix>,
    transform: Option<VendorPrefix>,
}

static GLOBAL: OnceLock<AnimationCapabilities> = OnceLock::new();

impl AnimationCapabilities {
    /// No animation support at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            transition: None,
            transform: None,
        }
    }

    /// Unprefixed transitions and transforms.
    #[must_use]
    pub const fn standard() -> Self {
        Self::from_prefixes(Some(VendorPrefix::Standard), Some(VendorPrefix::Standard))
    }

    /// Build from explicit prefixes; `None` means unsupported.
    #[must_use]
    pub const fn from_prefixes(
        transition: Option<VendorPrefix>,
        transform: Option<VendorPrefix>,
    ) -> Self {
        Self {
            transition,
            transform,
        }
    }

    /// Build from a feature set, spelling every supported key with `prefix`.
    #[must_use]
    pub fn from_features(features: AnimationFeatures, prefix: VendorPrefix) -> Self {
        Self {
            transition: features.contains(AnimationFeatures::TRANSITION).then_some(prefix),
            transform: features.contains(AnimationFeatures::TRANSFORM).then_some(prefix),
        }
    }

    /// Probe the host. `is_supported` receives style-object property names
    /// such as `"transition"` or `"MozTransform"`.
    pub fn probe(is_supported: impl Fn(&str) -> bool) -> Self {
        let find = |base: &str| {
            VendorPrefix::PROBE_ORDER
                .into_iter()
                .find(|prefix| is_supported(&prefix.dom_property(base)))
        };
        Self {
            transition: find("transition"),
            transform: find("transform"),
        }
    }

    /// Install the process-wide capabilities.
    ///
    /// Returns `Err` with the rejected value if capabilities were already
    /// installed.
    pub fn install_global(caps: Self) -> Result<(), Self> {
        GLOBAL.set(caps)
    }

    /// The process-wide capabilities, or [`AnimationCapabilities::none`] if
    /// nothing was installed.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL.get().copied().unwrap_or_default()
    }

    /// Supported features as flags.
    #[must_use]
    pub fn features(&self) -> AnimationFeatures {
        let mut features = AnimationFeatures::empty();
        features.set(AnimationFeatures::TRANSITION, self.transition.is_some());
        features.set(AnimationFeatures::TRANSFORM, self.transform.is_some());
        features
    }

    /// Whether style transitions are animated.
    #[inline]
    #[must_use]
    pub const fn supports_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Whether both transitions and transforms are available, which animated
    /// moves and reveals need.
    #[inline]
    #[must_use]
    pub const fn supports_animation(&self) -> bool {
        self.transition.is_some() && self.transform.is_some()
    }

    /// Prefix used for transition keys.
    #[inline]
    #[must_use]
    pub const fn transition_prefix(&self) -> Option<VendorPrefix> {
        self.transition
    }

    /// Prefix used for the transform key.
    #[inline]
    #[must_use]
    pub const fn transform_prefix(&self) -> Option<VendorPrefix> {
        self.transform
    }

    /// Style key declaring which properties animate.
    #[must_use]
    pub const fn transition_property_key(&self) -> Option<&'static str> {
        match self.transition {
            Some(VendorPrefix::Standard) => Some("transition-property"),
            Some(VendorPrefix::Webkit) => Some("-webkit-transition-property"),
            Some(VendorPrefix::Moz) => Some("-moz-transition-property"),
            Some(VendorPrefix::O) => Some("-o-transition-property"),
            None => None,
        }
    }

    /// Style key declaring how long the animation runs.
    #[must_use]
    pub const fn transition_duration_key(&self) -> Option<&'static str> {
        match self.transition {
            Some(VendorPrefix::Standard) => Some("transition-duration"),
            Some(VendorPrefix::Webkit) => Some("-webkit-transition-duration"),
            Some(VendorPrefix::Moz) => Some("-moz-transition-duration"),
            Some(VendorPrefix::O) => Some("-o-transition-duration"),
            None => None,
        }
    }

    /// Style key for 2D transforms.
    #[must_use]
    pub const fn transform_key(&self) -> Option<&'static str> {
        match self.transform {
            Some(VendorPrefix::Standard) => Some("transform"),
            Some(VendorPrefix::Webkit) => Some("-webkit-transform"),
            Some(VendorPrefix::Moz) => Some("-moz-transform"),
            Some(VendorPrefix::O) => Some("-o-transform"),
            None => None,
        }
    }

    /// The signal fired when a transition completes.
    ///
    /// Gecko's prefixed transitions fire the unprefixed `transitionend`.
    #[must_use]
    pub const fn completion_signal(&self) -> Option<SignalKind> {
        match self.transition {
            Some(VendorPrefix::Standard | VendorPrefix::Moz) => Some(SignalKind::TransitionEnd),
            Some(VendorPrefix::Webkit) => Some(SignalKind::WebkitTransitionEnd),
            Some(VendorPrefix::O) => Some(SignalKind::OTransitionEnd),
            None => None,
        }
    }
}
