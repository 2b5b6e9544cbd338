#![forbid(unsafe_code)]

//! Per-box positioning controller.
//!
//! An [`Item`] owns one [`Element`] and moves it, either instantly or with an
//! animated transition, on behalf of a layout engine.
//!
//! # Positions
//!
//! Two positions exist at any moment:
//!
//! - the **logical position** ([`Item::position`]): where the layout wants
//!   the box. Every move request commits it immediately, before any
//!   animation starts, so layout code reading it right after a move sees
//!   the target.
//! - the **on-screen position** ([`Item::current_position`]): what the
//!   element's computed offsets say right now, minus container padding.
//!   Animated moves measure their displacement from here.
//!
//! # Animated moves
//!
//! [`Item::transition_to_position`] animates with a `translate(..)` transform
//! relative to the current offsets, then *settles*: on completion it writes
//! the same `left`/`top` styling [`Item::layout_position`] would, and strips
//! the transform and transition declarations. Animated and instant moves
//! therefore end in identical element styling.
//!
//! # Completion
//!
//! The environment signals completion out of band. The host forwards those
//! signals to [`Item::handle_signal`]. Signals bubbling up from nested
//! content, signals of the wrong kind, and signals arriving while idle are
//! ignored. A transition started while another is in flight tears the old
//! one down first: its listener is removed, its styling stripped, and its
//! completion action dropped.
//!
//! # Degradation
//!
//! Without transition support every transition completes synchronously.
//! Without transform support animated moves fall back to instant ones and
//! reveals do nothing. None of these paths report errors.

use std::sync::Arc;

use web_time::Instant;

use tessera_core::caps::AnimationCapabilities;
use tessera_core::geometry::{Point, Rect};
use tessera_core::logging::{debug, trace, warn};
use tessera_core::options::{LayoutOptions, OptionsStore};
use tessera_core::signal::{ElementId, Signal, SignalKind};
use tessera_core::style::{self, StyleMap};

use crate::clock::{Clock, SystemClock};
use crate::element::Element;
use crate::transition::{ActiveTransition, OnComplete, TransitionState};

/// Transform of a collapsed (hidden) box.
const HIDDEN_SCALE: &str = "scale(0.001)";
/// Transform of a fully revealed box.
const VISIBLE_SCALE: &str = "scale(1)";

fn translate(delta: Point) -> String {
    format!("translate({}px, {}px)", delta.x, delta.y)
}

// ---------------------------------------------------------------------------
// ItemContext
// ---------------------------------------------------------------------------

/// Environment shared by every item of one layout.
#[derive(Debug, Clone)]
pub struct ItemContext {
    caps: AnimationCapabilities,
    options: Arc<OptionsStore>,
    clock: Arc<dyn Clock>,
}

impl ItemContext {
    /// Create a context from explicit capabilities, timed by the system
    /// clock.
    pub fn new(caps: AnimationCapabilities, options: Arc<OptionsStore>) -> Self {
        Self {
            caps,
            options,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a context using the process-wide capabilities.
    pub fn from_global(options: Arc<OptionsStore>) -> Self {
        Self::new(AnimationCapabilities::global(), options)
    }

    /// Replace the clock stall deadlines are measured against.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Animation capabilities of the environment.
    #[inline]
    pub fn caps(&self) -> AnimationCapabilities {
        self.caps
    }

    /// Snapshot of the current options.
    #[inline]
    pub fn options(&self) -> LayoutOptions {
        self.options.load()
    }

    /// The shared options store.
    pub fn options_store(&self) -> &Arc<OptionsStore> {
        &self.options
    }

    /// The current instant on this context's clock.
    #[inline]
    pub fn now(&self) -> Instant {
        self.clock.now()
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Controller for one positioned box.
#[derive(Debug)]
pub struct Item<E: Element> {
    element: E,
    ctx: ItemContext,
    position: Point,
    rect: Rect,
    active: Option<ActiveTransition>,
    removed: bool,
}

impl<E: Element> Item<E> {
    /// Take ownership of `element` and switch it to absolute positioning.
    pub fn new(mut element: E, ctx: ItemContext) -> Self {
        element.set_style("position", "absolute");
        Self {
            element,
            ctx,
            position: Point::ZERO,
            rect: Rect::default(),
            active: None,
            removed: false,
        }
    }

    // -- Introspection -----------------------------------------------------

    /// The logical (target) position.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Whether a transition is in flight.
    pub fn state(&self) -> TransitionState {
        if self.active.is_some() {
            TransitionState::Transitioning
        } else {
            TransitionState::Idle
        }
    }

    /// Shorthand for `state() == Transitioning`.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Style keys animated by the in-flight transition; empty when idle.
    pub fn pending_style_keys(&self) -> &[String] {
        self.active
            .as_ref()
            .map(|active| active.pending_keys.as_slice())
            .unwrap_or(&[])
    }

    /// Space the box occupies.
    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Mutable access to the occupied space, for the packer.
    #[inline]
    pub fn rect_mut(&mut self) -> &mut Rect {
        &mut self.rect
    }

    /// The owned element.
    #[inline]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// The item's environment.
    #[inline]
    pub fn context(&self) -> &ItemContext {
        &self.ctx
    }

    /// Whether the element has been detached by [`Item::remove`].
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Release the element. Any in-flight transition's listener is removed
    /// and its completion action dropped.
    pub fn into_element(mut self) -> E {
        if let Some(active) = self.active.take() {
            self.element.remove_listener(active.signal);
        }
        self.element
    }

    /// Apply `style` to the element wholesale.
    pub fn css(&mut self, style: &StyleMap) {
        self.element.apply(style);
    }

    // -- Positioning -------------------------------------------------------

    /// Read the on-screen position from the element's computed offsets.
    ///
    /// Offsets that do not start with an integer (`auto`, unset) read as
    /// `0` before the container padding is subtracted.
    pub fn current_position(&self) -> Point {
        let read = |key: &str| {
            self.element
                .computed_style(key)
                .as_deref()
                .and_then(style::parse_leading_int)
                .unwrap_or(0)
        };
        let padding = self.ctx.options().padding;
        Point::new(read("left"), read("top")).delta_from(Point::new(padding.left, padding.top))
    }

    /// Commit the on-screen position as the logical position and return it.
    pub fn layout_to_current_position(&mut self) -> Point {
        self.position = self.current_position();
        self.position
    }

    /// Set the logical position without touching the element.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = Point::new(x, y);
    }

    /// Offset styling that places the box at its logical position.
    pub fn settled_style(&self) -> StyleMap {
        let offset = self.position.offset_by(self.ctx.options().padding);
        StyleMap::new()
            .with("left", style::px(offset.x))
            .with("top", style::px(offset.y))
    }

    /// Write the settled offset styling for the logical position.
    pub fn layout_position(&mut self) {
        let style = self.settled_style();
        trace!(element = self.element.id().get(), %style, "layout position");
        self.css(&style);
    }

    /// Move to `(x, y)`, animating when the environment allows it.
    ///
    /// Does nothing when the box is already there on screen. Otherwise the
    /// logical position is committed before anything else happens.
    pub fn transition_to_position(&mut self, x: i32, y: i32) {
        let current = self.layout_to_current_position();
        let target = Point::new(x, y);
        if target == current {
            trace!(element = self.element.id().get(), %target, "already in place");
            return;
        }

        self.set_position(x, y);

        let caps = self.ctx.caps();
        let transform_key = match caps.transform_key() {
            Some(key) if caps.supports_transition() => key,
            _ => {
                self.layout_position();
                return;
            }
        };

        let style = StyleMap::new().with(transform_key, translate(target.delta_from(current)));
        self.transition(style, Some(OnComplete::Settle));
    }

    // -- Transition state machine -----------------------------------------

    /// Animate to `style`, running `on_complete` once the environment
    /// signals completion.
    ///
    /// Without transition support, or with an empty `style`, `on_complete`
    /// runs before this returns and the item stays idle.
    pub fn transition(&mut self, style: StyleMap, on_complete: Option<OnComplete>) {
        let caps = self.ctx.caps();
        let (Some(signal), Some(property_key), Some(duration_key)) = (
            caps.completion_signal(),
            caps.transition_property_key(),
            caps.transition_duration_key(),
        ) else {
            trace!(element = self.element.id().get(), "transitions unsupported, completing now");
            self.run_on_complete(on_complete);
            return;
        };

        self.teardown_active();

        if style.is_empty() {
            debug!(element = self.element.id().get(), "empty transition, completing now");
            self.run_on_complete(on_complete);
            return;
        }

        let options = self.ctx.options();
        let pending_keys: Vec<String> = style.keys().map(str::to_owned).collect();

        let mut declared = StyleMap::new()
            .with(property_key, pending_keys.join(","))
            .with(duration_key, options.transition_duration.to_string());
        for (key, value) in style.iter() {
            declared.insert(key, value);
        }

        self.element.add_listener(signal);
        self.css(&declared);

        let deadline = options
            .stall_timeout()
            .and_then(|timeout| self.ctx.now().checked_add(timeout));

        debug!(
            element = self.element.id().get(),
            signal = %signal,
            keys = %declared,
            stall_deadline = deadline.is_some(),
            "transition started"
        );

        self.active = Some(ActiveTransition {
            signal,
            pending_keys,
            declaration_keys: [property_key, duration_key],
            on_complete,
            deadline,
        });
    }

    /// Deliver a signal from the environment.
    ///
    /// Returns `true` if the signal completed this item's transition.
    pub fn handle_signal(&mut self, signal: Signal) -> bool {
        match signal.kind {
            SignalKind::TransitionEnd
            | SignalKind::WebkitTransitionEnd
            | SignalKind::OTransitionEnd => self.on_transition_end(signal),
        }
    }

    /// Deliver a signal by host event name. Unknown names are ignored.
    pub fn handle_event(&mut self, name: &str, target: ElementId) -> bool {
        match Signal::from_name(name, target) {
            Some(signal) => self.handle_signal(signal),
            None => {
                trace!(element = self.element.id().get(), name, "unknown event");
                false
            }
        }
    }

    /// Force-complete a transition whose stall deadline has passed.
    ///
    /// `now` must come from the context's clock (see [`ItemContext::now`]).
    /// Only transitions started with a stall timeout configured can expire.
    /// Returns `true` if a transition was completed.
    pub fn expire_stalled(&mut self, now: Instant) -> bool {
        if !self.active.as_ref().is_some_and(|active| active.is_stalled(now)) {
            return false;
        }
        warn!(
            element = self.element.id().get(),
            "no completion signal before stall deadline, settling"
        );
        self.complete_active();
        true
    }

    fn on_transition_end(&mut self, signal: Signal) -> bool {
        let own = self.element.id();
        if signal.target != own {
            trace!(element = own.get(), origin = signal.target.get(), "ignoring bubbled signal");
            return false;
        }
        match self.active.as_ref().map(|active| active.signal) {
            Some(expected) if expected == signal.kind => {
                self.complete_active();
                true
            }
            Some(_) => {
                trace!(
                    element = own.get(),
                    expected = ?self.active.as_ref().map(|active| active.signal),
                    received = %signal.kind,
                    "ignoring signal of another kind"
                );
                false
            }
            None => {
                trace!(element = own.get(), "signal with no transition in flight");
                false
            }
        }
    }

    fn complete_active(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let on_complete = active.take_on_complete();
        self.run_on_complete(on_complete);

        let cleanup = active.cleanup_style();
        self.css(&cleanup);
        self.element.remove_listener(active.signal);
        debug!(element = self.element.id().get(), "transition complete");
    }

    fn teardown_active(&mut self) {
        let Some(previous) = self.active.take() else {
            return;
        };
        debug!(
            element = self.element.id().get(),
            dropped_callback = previous.on_complete.is_some(),
            "replacing in-flight transition"
        );
        let cleanup = previous.cleanup_style();
        self.css(&cleanup);
        self.element.remove_listener(previous.signal);
    }

    fn run_on_complete(&mut self, on_complete: Option<OnComplete>) {
        match on_complete {
            None => {}
            Some(OnComplete::Settle) => self.layout_position(),
            Some(OnComplete::Detach) => self.detach(),
            Some(OnComplete::Notify(callback)) => callback(),
        }
    }

    fn detach(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        debug!(element = self.element.id().get(), "detaching element");
        self.element.detach();
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Animate the box's first appearance: from collapsed and transparent to
    /// full scale and opaque. Does nothing without animation support.
    pub fn reveal(&mut self) {
        let caps = self.ctx.caps();
        let transform_key = match caps.transform_key() {
            Some(key) if caps.supports_transition() => key,
            _ => return,
        };

        self.teardown_active();
        self.css(
            &StyleMap::new()
                .with("opacity", "0")
                .with(transform_key, HIDDEN_SCALE),
        );
        // Reading layout flushes the hidden state so the transition below
        // starts from it instead of being merged with it.
        let _ = self.element.offset_height();

        let visible = StyleMap::new()
            .with("opacity", "1")
            .with(transform_key, VISIBLE_SCALE);
        self.transition(visible, None);
    }

    /// Animate the box out, then detach its element.
    ///
    /// The element stays attached until the transition completes.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        let mut hidden = StyleMap::new().with("opacity", "0");
        if let Some(transform_key) = self.ctx.caps().transform_key() {
            hidden.insert(transform_key, HIDDEN_SCALE);
        }
        debug!(element = self.element.id().get(), "removing item");
        self.transition(hidden, Some(OnComplete::Detach));
    }

    /// Strip positioning styling from the element.
    ///
    /// Transition state is left alone; call this once the item is idle.
    pub fn destroy(&mut self) {
        debug!(element = self.element.id().get(), "destroying item");
        self.css(&StyleMap::unset(["position", "left", "top"]));
    }
}
