#![forbid(unsafe_code)]

//! Layout options shared by every item of one layout.
//!
//! [`LayoutOptions`] holds the few values an item consults while moving:
//! how long transitions last, the container padding added to every offset,
//! and the optional stall fallback. The layout engine owns one
//! [`OptionsStore`] and hands an `Arc` of it to each item; items read it at
//! the moment a value is needed, so updates take effect on the next move.
//!
//! # Sources
//!
//! - Builder methods on [`LayoutOptions`].
//! - Environment variables via [`LayoutOptions::from_env`].
//! - TOML or JSON with the `options-config` feature.
//!
//! ```toml
//! transition_duration = "0.4s"
//! stall_timeout_factor = 4
//!
//! [padding]
//! left = 10
//! top = 10
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, Guard};

use crate::geometry::Sides;

/// Default transition duration (0.4s).
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(400);

// ---------------------------------------------------------------------------
// TransitionDuration
// ---------------------------------------------------------------------------

/// A transition duration that renders as a CSS time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "options-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TransitionDuration(Duration);

impl TransitionDuration {
    /// Wrap a duration.
    #[inline]
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// The wrapped duration.
    #[inline]
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        self.0
    }

    /// Parse a CSS time value: `"0.4s"`, `"400ms"`, `" 1s "`.
    pub fn parse(value: &str) -> Result<Self, OptionsError> {
        let invalid = || OptionsError::InvalidDuration(value.to_owned());
        let trimmed = value.trim();
        let (number, scale) = if let Some(ms) = trimmed.strip_suffix("ms") {
            (ms, 1e-3)
        } else if let Some(s) = trimmed.strip_suffix('s') {
            (s, 1.0)
        } else {
            return Err(invalid());
        };
        let amount: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(invalid());
        }
        Duration::try_from_secs_f64(amount * scale)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl Default for TransitionDuration {
    fn default() -> Self {
        Self(DEFAULT_TRANSITION_DURATION)
    }
}

impl From<Duration> for TransitionDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl TryFrom<String> for TransitionDuration {
    type Error = OptionsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TransitionDuration> for String {
    fn from(value: TransitionDuration) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TransitionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0.as_micros();
        if micros % 1_000_000 == 0 {
            write!(f, "{}s", micros / 1_000_000)
        } else if micros % 1_000 == 0 {
            write!(f, "{}ms", micros / 1_000)
        } else {
            write!(f, "{}.{:03}ms", micros / 1_000, micros % 1_000)
        }
    }
}

// ---------------------------------------------------------------------------
// LayoutOptions
// ---------------------------------------------------------------------------

/// Options an item reads while positioning and animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "options-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LayoutOptions {
    /// How long transitions run.
    pub transition_duration: TransitionDuration,
    /// Container padding added to every written offset. Only `left` and
    /// `top` are used for positioning.
    pub padding: Sides,
    /// If set, a transition with no completion signal after
    /// `factor × transition_duration` may be force-completed by the host.
    pub stall_timeout_factor: Option<u32>,
}

impl LayoutOptions {
    /// Set the transition duration.
    #[must_use]
    pub fn with_transition_duration(mut self, duration: impl Into<TransitionDuration>) -> Self {
        self.transition_duration = duration.into();
        self
    }

    /// Set the container padding.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<Sides>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Enable the stall fallback.
    #[must_use]
    pub fn with_stall_timeout_factor(mut self, factor: u32) -> Self {
        self.stall_timeout_factor = Some(factor);
        self
    }

    /// How long to wait for a completion signal before a transition counts
    /// as stalled, if the fallback is enabled.
    #[must_use]
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_factor
            .map(|factor| self.transition_duration.as_duration().saturating_mul(factor))
    }

    /// Load options from environment variables.
    ///
    /// Reads:
    /// - `TESSERA_TRANSITION_DURATION`: CSS time value (`0.4s`, `250ms`)
    /// - `TESSERA_PADDING_LEFT`, `TESSERA_PADDING_TOP`: pixels
    /// - `TESSERA_STALL_TIMEOUT_FACTOR`: positive integer; `0` disables
    ///
    /// Unparseable values are ignored and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// [`LayoutOptions::from_env`] with an injectable variable lookup.
    #[must_use]
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(val) = lookup("TESSERA_TRANSITION_DURATION")
            && let Ok(duration) = TransitionDuration::parse(&val)
        {
            options.transition_duration = duration;
        }

        if let Some(val) = lookup("TESSERA_PADDING_LEFT")
            && let Ok(px) = val.trim().parse::<i32>()
        {
            options.padding.left = px;
        }

        if let Some(val) = lookup("TESSERA_PADDING_TOP")
            && let Ok(px) = val.trim().parse::<i32>()
        {
            options.padding.top = px;
        }

        if let Some(val) = lookup("TESSERA_STALL_TIMEOUT_FACTOR")
            && let Ok(factor) = val.trim().parse::<u32>()
        {
            options.stall_timeout_factor = (factor > 0).then_some(factor);
        }

        options
    }

    /// Load from a TOML string.
    #[cfg(feature = "options-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, OptionsError> {
        toml::from_str(s).map_err(OptionsError::Toml)
    }

    /// Load from a JSON string.
    #[cfg(feature = "options-config")]
    pub fn from_json_str(s: &str) -> Result<Self, OptionsError> {
        serde_json::from_str(s).map_err(OptionsError::Json)
    }
}

// ---------------------------------------------------------------------------
// OptionsStore
// ---------------------------------------------------------------------------

/// Shared, swappable [`LayoutOptions`].
///
/// Reads are wait-free (`arc-swap`); writes replace the whole value.
pub struct OptionsStore {
    inner: ArcSwap<LayoutOptions>,
}

impl OptionsStore {
    /// Create a store holding `options`.
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            inner: ArcSwap::from_pointee(options),
        }
    }

    /// Create a store already wrapped for sharing.
    pub fn shared(options: LayoutOptions) -> Arc<Self> {
        Arc::new(Self::new(options))
    }

    /// Read the current options.
    #[inline]
    pub fn load(&self) -> LayoutOptions {
        **self.inner.load()
    }

    /// Read without copying.
    pub fn load_ref(&self) -> Guard<Arc<LayoutOptions>> {
        self.inner.load()
    }

    /// Replace the options.
    pub fn store(&self, options: LayoutOptions) {
        self.inner.store(Arc::new(options));
    }

    /// Apply `f` to the current options and store the result.
    pub fn update(&self, f: impl Fn(&mut LayoutOptions)) {
        self.inner.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next
        });
    }
}

impl Default for OptionsStore {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl fmt::Debug for OptionsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionsStore").field(&self.load()).finish()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when building [`LayoutOptions`].
#[derive(Debug)]
pub enum OptionsError {
    /// A duration that is not a non-negative CSS time value.
    InvalidDuration(String),
    /// TOML parse error.
    #[cfg(feature = "options-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "options-config")]
    Json(serde_json::Error),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration(value) => write!(f, "invalid transition duration: {value:?}"),
            #[cfg(feature = "options-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "options-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDuration(_) => None,
            #[cfg(feature = "options-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "options-config")]
            Self::Json(e) => Some(e),
        }
    }
}
