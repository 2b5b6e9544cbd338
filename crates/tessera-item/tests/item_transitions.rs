//! Integration tests for the item transition state machine.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tessera_core::caps::{AnimationCapabilities, AnimationFeatures, VendorPrefix};
use tessera_core::options::{LayoutOptions, OptionsStore};
use tessera_core::signal::{ElementId, Signal, SignalKind};
use tessera_core::style::StyleMap;
use tessera_core::Point;
use tessera_item::{
    Clock, Element, Item, ItemContext, ManualClock, MemoryElement, OnComplete, TransitionState,
};
use web_time::Instant;

// ── Helpers ─────────────────────────────────────────────────────────────

fn padded() -> LayoutOptions {
    LayoutOptions::default().with_padding((10, 10))
}

fn item_with(caps: AnimationCapabilities, options: LayoutOptions) -> Item<MemoryElement> {
    let ctx = ItemContext::new(caps, OptionsStore::shared(options));
    Item::new(MemoryElement::new(), ctx)
}

/// An animated item already settled at `(0, 0)`.
fn settled_item() -> Item<MemoryElement> {
    let mut item = item_with(AnimationCapabilities::standard(), padded());
    item.layout_position();
    item
}

fn own_signal(item: &Item<MemoryElement>) -> Signal {
    item.element().signal(SignalKind::TransitionEnd)
}

fn counter() -> (Rc<Cell<u32>>, OnComplete) {
    let count = Rc::new(Cell::new(0));
    let hook = Rc::clone(&count);
    (count, OnComplete::notify(move || hook.set(hook.get() + 1)))
}

fn assert_exclusive(item: &Item<MemoryElement>) {
    assert_eq!(
        item.is_transitioning(),
        item.element().total_listeners() > 0,
        "Transitioning must coincide with a registered listener"
    );
    assert_eq!(item.is_transitioning(), !item.pending_style_keys().is_empty());
}

// ── Construction ────────────────────────────────────────────────────────

#[test]
fn new_item_is_absolute_and_idle() {
    let item = item_with(AnimationCapabilities::standard(), padded());
    assert_eq!(item.element().style("position"), Some("absolute"));
    assert_eq!(item.state(), TransitionState::Idle);
    assert_eq!(item.position(), Point::ZERO);
    assert_exclusive(&item);
}

// ── Position query ──────────────────────────────────────────────────────

#[test]
fn current_position_reads_computed_offsets_minus_padding() {
    let mut item = item_with(AnimationCapabilities::standard(), padded());
    item.css(&StyleMap::new().with("left", "35px").with("top", "12.6px"));
    assert_eq!(item.current_position(), Point::new(25, 2));
    // Reading does not move the logical position.
    assert_eq!(item.position(), Point::ZERO);
}

#[test]
fn auto_offsets_read_as_zero() {
    let item = item_with(AnimationCapabilities::standard(), LayoutOptions::default());
    assert_eq!(item.element().computed_style("left").as_deref(), Some("auto"));
    assert_eq!(item.current_position(), Point::ZERO);
}

#[test]
fn layout_to_current_position_commits_on_screen_position() {
    let mut item = item_with(AnimationCapabilities::standard(), padded());
    item.css(&StyleMap::new().with("left", "110px").with("top", "40px"));
    assert_eq!(item.layout_to_current_position(), Point::new(100, 30));
    assert_eq!(item.position(), Point::new(100, 30));
}

// ── Instant positioning ─────────────────────────────────────────────────

#[test]
fn instant_move_writes_padded_offsets() {
    let mut item = item_with(AnimationCapabilities::standard(), padded());
    item.set_position(50, 20);
    assert_eq!(item.element().style("left"), None, "set_position alone writes nothing");
    item.layout_position();
    assert_eq!(item.element().style("left"), Some("60px"));
    assert_eq!(item.element().style("top"), Some("30px"));
    assert_eq!(item.state(), TransitionState::Idle);
}

// ── Animated positioning ────────────────────────────────────────────────

#[test]
fn animated_move_scenario() {
    let mut item = settled_item();
    item.transition_to_position(50, 20);

    assert_eq!(item.position(), Point::new(50, 20));
    assert_eq!(item.state(), TransitionState::Transitioning);
    assert_eq!(item.element().style("transform"), Some("translate(50px, 20px)"));
    assert_eq!(item.element().style("transition-property"), Some("transform"));
    assert_eq!(item.element().style("transition-duration"), Some("400ms"));
    assert_eq!(item.element().style("left"), Some("10px"), "offsets wait for settle");
    assert_eq!(item.pending_style_keys(), ["transform".to_owned()]);
    assert_exclusive(&item);

    assert!(item.handle_signal(own_signal(&item)));

    assert_eq!(item.state(), TransitionState::Idle);
    assert_eq!(
        item.element().inline_styles(),
        StyleMap::new()
            .with("left", "60px")
            .with("position", "absolute")
            .with("top", "30px")
    );
    assert_exclusive(&item);
}

#[test]
fn unsupported_environment_moves_instantly() {
    let mut item = item_with(AnimationCapabilities::none(), padded());
    item.transition_to_position(50, 20);

    assert_eq!(item.position(), Point::new(50, 20));
    assert_eq!(item.element().style("left"), Some("60px"));
    assert_eq!(item.element().style("top"), Some("30px"));
    assert_eq!(item.element().total_listeners(), 0);
    assert_eq!(item.state(), TransitionState::Idle);
}

#[test]
fn transition_without_transform_moves_instantly() {
    let caps =
        AnimationCapabilities::from_features(AnimationFeatures::TRANSITION, VendorPrefix::Standard);
    let mut item = item_with(caps, padded());
    item.transition_to_position(5, 5);
    assert_eq!(item.element().style("left"), Some("15px"));
    assert!(!item.is_transitioning());
}

#[test]
fn move_to_current_position_is_noop() {
    let mut item = settled_item();
    let writes = item.element().style_writes();
    item.transition_to_position(0, 0);
    assert_eq!(item.element().style_writes(), writes);
    assert_eq!(item.state(), TransitionState::Idle);
}

#[test]
fn logical_position_is_committed_before_completion() {
    let mut item = settled_item();
    item.transition_to_position(80, 40);
    assert_eq!(item.position(), Point::new(80, 40));
    // The element has not moved yet.
    assert_eq!(item.current_position(), Point::ZERO);
}

#[test]
fn displacement_is_measured_from_unsettled_offsets() {
    let mut item = settled_item();
    item.transition_to_position(50, 20);
    // Retarget mid-flight: left/top still describe (0, 0).
    item.transition_to_position(30, 70);
    assert_eq!(item.element().style("transform"), Some("translate(30px, 70px)"));
    assert!(item.handle_signal(own_signal(&item)));
    assert_eq!(item.element().style("left"), Some("40px"));
    assert_eq!(item.element().style("top"), Some("80px"));
}

#[test]
fn settle_uses_latest_logical_position() {
    let mut item = settled_item();
    item.transition_to_position(50, 20);
    item.set_position(7, 9);
    item.handle_signal(own_signal(&item));
    assert_eq!(item.element().style("left"), Some("17px"));
    assert_eq!(item.element().style("top"), Some("19px"));
}

#[test]
fn padding_is_read_at_use_time() {
    let store = OptionsStore::shared(LayoutOptions::default());
    let ctx = ItemContext::new(AnimationCapabilities::none(), store.clone());
    let mut item = Item::new(MemoryElement::new(), ctx);
    store.update(|o| o.padding = (0, 25).into());
    item.transition_to_position(1, 1);
    assert_eq!(item.element().style("left"), Some("26px"));
    assert_eq!(item.element().style("top"), Some("1px"));
}

// ── Transition primitive ────────────────────────────────────────────────

#[test]
fn transition_declares_keys_in_order() {
    let mut item = settled_item();
    item.transition(
        StyleMap::new().with("opacity", "0.5").with("transform", "scale(2)"),
        None,
    );
    assert_eq!(item.element().style("transition-property"), Some("opacity,transform"));
    assert_eq!(item.element().listener_count(SignalKind::TransitionEnd), 1);
}

#[test]
fn duration_is_read_when_transition_begins() {
    let store = OptionsStore::shared(LayoutOptions::default());
    let ctx = ItemContext::new(AnimationCapabilities::standard(), store.clone());
    let mut item = Item::new(MemoryElement::new(), ctx);
    store.update(|o| o.transition_duration = Duration::from_secs(2).into());
    item.transition(StyleMap::new().with("opacity", "0"), None);
    assert_eq!(item.element().style("transition-duration"), Some("2s"));
}

#[test]
fn vendor_prefixed_keys_and_signal() {
    let caps = AnimationCapabilities::from_features(AnimationFeatures::all(), VendorPrefix::Webkit);
    let mut item = item_with(caps, LayoutOptions::default());
    item.layout_position();
    item.transition_to_position(4, 8);

    assert_eq!(item.element().style("-webkit-transform"), Some("translate(4px, 8px)"));
    assert_eq!(item.element().style("-webkit-transition-property"), Some("-webkit-transform"));
    assert_eq!(item.element().listener_count(SignalKind::WebkitTransitionEnd), 1);

    // The unprefixed signal is not the one we listen for.
    assert!(!item.handle_signal(item.element().signal(SignalKind::TransitionEnd)));
    assert!(item.is_transitioning());

    assert!(item.handle_event("webkitTransitionEnd", item.element().id()));
    assert_eq!(item.element().style("-webkit-transform"), None);
    assert_eq!(item.element().style("-webkit-transition-duration"), None);
    assert_eq!(item.element().style("left"), Some("4px"));
}

#[test]
fn signal_of_another_kind_is_ignored() {
    let caps = AnimationCapabilities::from_features(AnimationFeatures::all(), VendorPrefix::Webkit);
    let mut item = item_with(caps, padded());
    item.layout_position();
    item.transition_to_position(30, 30);

    let own = item.element().id();
    assert!(!item.handle_signal(Signal::new(SignalKind::TransitionEnd, own)));
    assert!(!item.handle_signal(Signal::new(SignalKind::OTransitionEnd, own)));
    assert!(item.is_transitioning());
    assert_exclusive(&item);

    assert!(item.handle_signal(Signal::new(SignalKind::WebkitTransitionEnd, own)));
    assert_eq!(item.element().style("left"), Some("40px"));
}

#[test]
fn unsupported_transition_runs_callback_synchronously() {
    let mut item = item_with(AnimationCapabilities::none(), LayoutOptions::default());
    let (count, hook) = counter();
    item.transition(StyleMap::new().with("opacity", "0"), Some(hook));
    assert_eq!(count.get(), 1);
    assert_eq!(item.state(), TransitionState::Idle);
    assert_eq!(item.element().total_listeners(), 0);
}

#[test]
fn empty_style_completes_synchronously() {
    let mut item = settled_item();
    let (count, hook) = counter();
    item.transition(StyleMap::new(), Some(hook));
    assert_eq!(count.get(), 1);
    assert_exclusive(&item);
    assert!(!item.is_transitioning());
}

#[test]
fn callback_runs_exactly_once() {
    let mut item = settled_item();
    let (count, hook) = counter();
    item.transition(StyleMap::new().with("opacity", "0.2"), Some(hook));

    let signal = own_signal(&item);
    assert!(item.handle_signal(signal));
    assert!(!item.handle_signal(signal));
    assert!(!item.handle_signal(signal));
    assert_eq!(count.get(), 1);
}

#[test]
fn bubbled_signal_is_ignored() {
    let mut item = settled_item();
    let (count, hook) = counter();
    item.transition(StyleMap::new().with("opacity", "0.2"), Some(hook));

    let child = Signal::new(SignalKind::TransitionEnd, ElementId::next());
    assert!(!item.handle_signal(child));
    assert_eq!(count.get(), 0);
    assert!(item.is_transitioning());
    assert_eq!(item.element().style("opacity"), Some("0.2"));
    assert_exclusive(&item);

    assert!(item.handle_signal(own_signal(&item)));
    assert_eq!(count.get(), 1);
}

#[test]
fn unknown_event_names_are_ignored() {
    let mut item = settled_item();
    item.transition_to_position(3, 3);
    assert!(!item.handle_event("animationend", item.element().id()));
    assert!(item.is_transitioning());
}

#[test]
fn cleanup_removes_every_animation_key() {
    let mut item = settled_item();
    item.transition(
        StyleMap::new()
            .with("opacity", "0.5")
            .with("transform", "rotate(3deg)"),
        None,
    );
    item.handle_signal(own_signal(&item));

    for key in ["opacity", "transform", "transition-property", "transition-duration"] {
        assert_eq!(item.element().style(key), None, "{key} should be unset");
    }
    assert_eq!(item.element().total_listeners(), 0);
    assert!(item.pending_style_keys().is_empty());
}

#[test]
fn restart_tears_down_previous_transition() {
    let mut item = settled_item();
    let (first, first_hook) = counter();
    let (second, second_hook) = counter();

    item.transition(StyleMap::new().with("opacity", "0"), Some(first_hook));
    item.transition(StyleMap::new().with("transform", "scale(3)"), Some(second_hook));

    assert_eq!(item.element().listener_count(SignalKind::TransitionEnd), 1);
    assert_eq!(item.element().style("opacity"), None, "stale animated key stripped");
    assert_eq!(item.pending_style_keys(), ["transform".to_owned()]);
    assert_exclusive(&item);

    item.handle_signal(own_signal(&item));
    assert_eq!(first.get(), 0, "replaced callback is dropped");
    assert_eq!(second.get(), 1);
    assert_eq!(item.element().total_listeners(), 0);
}

// ── Stall fallback ──────────────────────────────────────────────────────

#[test]
fn stalled_transition_settles_after_deadline() {
    let options = padded()
        .with_transition_duration(Duration::from_millis(100))
        .with_stall_timeout_factor(3);
    let mut item = item_with(AnimationCapabilities::standard(), options);
    item.layout_position();
    let started = Instant::now();
    item.transition_to_position(50, 20);

    assert!(!item.expire_stalled(started));
    assert!(item.is_transitioning());

    assert!(item.expire_stalled(started + Duration::from_secs(1)));
    assert_eq!(item.state(), TransitionState::Idle);
    assert_eq!(item.element().style("left"), Some("60px"));
    assert_eq!(item.element().style("transform"), None);
    assert_exclusive(&item);

    // A late signal finds nothing to complete.
    assert!(!item.handle_signal(own_signal(&item)));
}

#[test]
fn without_stall_factor_transitions_never_expire() {
    let mut item = settled_item();
    item.transition_to_position(50, 20);
    assert!(!item.expire_stalled(Instant::now() + Duration::from_secs(86_400)));
    assert!(item.is_transitioning());
}

#[test]
fn stall_deadline_follows_the_context_clock() {
    let duration = Duration::from_millis(100);
    let options = padded()
        .with_transition_duration(duration)
        .with_stall_timeout_factor(2);
    let clock = Arc::new(ManualClock::new());
    let ctx = ItemContext::new(AnimationCapabilities::standard(), OptionsStore::shared(options))
        .with_clock(clock.clone());
    let mut item = Item::new(MemoryElement::new(), ctx);
    item.layout_position();

    let host_now = clock.now();
    clock.advance(Duration::from_millis(5));
    item.transition_to_position(50, 20);

    // The deadline counts from the clock's reading when the move began,
    // however much wall time has passed.
    assert!(!item.expire_stalled(host_now + duration * 2));
    assert!(!item.expire_stalled(clock.now() + duration * 2 - Duration::from_millis(1)));
    assert!(item.is_transitioning());

    clock.advance(duration * 2);
    assert_eq!(item.context().now(), clock.now());
    assert!(item.expire_stalled(clock.now()));
    assert_eq!(item.element().style("left"), Some("60px"));
    assert_exclusive(&item);
}

#[test]
fn frozen_clock_expires_at_exact_deadline() {
    let duration = Duration::from_millis(40);
    let options = padded()
        .with_transition_duration(duration)
        .with_stall_timeout_factor(3);
    let clock = Arc::new(ManualClock::new());
    let ctx = ItemContext::new(AnimationCapabilities::standard(), OptionsStore::shared(options))
        .with_clock(clock.clone());
    let mut item = Item::new(MemoryElement::new(), ctx);

    let host_now = clock.now();
    item.transition(StyleMap::new().with("opacity", "0.5"), None);
    assert!(item.expire_stalled(host_now + duration * 3));
    assert_eq!(item.state(), TransitionState::Idle);
}

// ── Reveal ──────────────────────────────────────────────────────────────

#[test]
fn reveal_flushes_hidden_state_then_transitions() {
    let mut item = settled_item();
    item.reveal();

    assert_eq!(item.element().reflows(), 1);
    assert_eq!(item.element().style("opacity"), Some("1"));
    assert_eq!(item.element().style("transform"), Some("scale(1)"));
    assert_eq!(item.element().style("transition-property"), Some("opacity,transform"));
    assert!(item.is_transitioning());

    item.handle_signal(own_signal(&item));
    assert_eq!(item.element().style("opacity"), None);
    assert_eq!(item.element().style("transform"), None);
    assert!(item.element().is_attached());
}

#[test]
fn reveal_without_animation_is_noop() {
    let mut item = item_with(AnimationCapabilities::none(), padded());
    let writes = item.element().style_writes();
    item.reveal();
    assert_eq!(item.element().style_writes(), writes);
    assert_eq!(item.element().reflows(), 0);
}

// ── Remove ──────────────────────────────────────────────────────────────

#[test]
fn remove_detaches_only_after_completion() {
    let mut item = settled_item();
    item.remove();

    assert!(item.element().is_attached());
    assert_eq!(item.element().style("opacity"), Some("0"));
    assert_eq!(item.element().style("transform"), Some("scale(0.001)"));
    assert!(!item.is_removed());

    let bubbled = Signal::new(SignalKind::TransitionEnd, ElementId::next());
    item.handle_signal(bubbled);
    assert!(item.element().is_attached());

    item.handle_signal(own_signal(&item));
    assert!(!item.element().is_attached());
    assert_eq!(item.element().detach_count(), 1);
    assert!(item.is_removed());

    item.handle_signal(own_signal(&item));
    item.remove();
    assert_eq!(item.element().detach_count(), 1);
}

#[test]
fn remove_without_animation_detaches_immediately() {
    let mut item = item_with(AnimationCapabilities::none(), padded());
    item.remove();
    assert!(!item.element().is_attached());
    assert_eq!(item.element().detach_count(), 1);
}

#[test]
fn remove_without_transform_fades_opacity_only() {
    let caps = AnimationCapabilities::from_features(AnimationFeatures::TRANSITION, VendorPrefix::Standard);
    let mut item = item_with(caps, padded());
    item.layout_position();
    item.remove();

    assert!(item.is_transitioning());
    assert_eq!(item.element().style("transition-property"), Some("opacity"));
    assert_eq!(item.element().style("opacity"), Some("0"));
    assert_eq!(item.element().style("transform"), None);
    assert_eq!(item.pending_style_keys(), ["opacity".to_owned()]);
    assert!(item.element().is_attached());

    assert!(item.handle_signal(own_signal(&item)));
    assert!(!item.element().is_attached());
    assert_eq!(item.element().detach_count(), 1);
    assert!(item.is_removed());
    assert_exclusive(&item);
}

// ── Destroy ─────────────────────────────────────────────────────────────

#[test]
fn destroy_strips_positioning() {
    let mut item = settled_item();
    item.destroy();
    assert_eq!(item.element().style("position"), None);
    assert_eq!(item.element().style("left"), None);
    assert_eq!(item.element().style("top"), None);
    assert_eq!(item.state(), TransitionState::Idle);

    let element = item.into_element();
    assert!(element.inline_styles().is_empty());
}

#[test]
fn into_element_releases_listener() {
    let mut item = settled_item();
    item.transition_to_position(9, 9);
    let element = item.into_element();
    assert_eq!(element.total_listeners(), 0);
}

// ── Occupied rect ───────────────────────────────────────────────────────

#[test]
fn rect_is_owned_per_item() {
    let mut item = settled_item();
    item.rect_mut().width = 120;
    item.rect_mut().set_origin(40, 0);
    assert_eq!(item.rect().right(), 160);
}
