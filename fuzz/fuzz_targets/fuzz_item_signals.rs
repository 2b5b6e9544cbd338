#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessera_core::caps::{AnimationCapabilities, AnimationFeatures, VendorPrefix};
use tessera_core::options::{LayoutOptions, OptionsStore};
use tessera_core::signal::{ElementId, Signal, SignalKind};
use tessera_core::style::StyleMap;
use tessera_item::{Element, Item, ItemContext, MemoryElement, OnComplete};

#[derive(Debug, Arbitrary)]
enum Op {
    Move(i16, i16),
    Instant(i16, i16),
    Signal(u8, bool),
    Reveal,
    Remove,
    Fade,
    Destroy,
}

#[derive(Debug, Arbitrary)]
struct Input {
    features: u8,
    prefix: u8,
    padding: (i8, i8),
    ops: Vec<Op>,
}

const KINDS: [SignalKind; 3] = [
    SignalKind::TransitionEnd,
    SignalKind::WebkitTransitionEnd,
    SignalKind::OTransitionEnd,
];

fuzz_target!(|input: Input| {
    let prefix = VendorPrefix::PROBE_ORDER[usize::from(input.prefix) % 4];
    let features = AnimationFeatures::from_bits_truncate(input.features);
    let caps = AnimationCapabilities::from_features(features, prefix);
    let options = LayoutOptions::default()
        .with_padding((i32::from(input.padding.1), i32::from(input.padding.0)));
    let mut item = Item::new(
        MemoryElement::new(),
        ItemContext::new(caps, OptionsStore::shared(options)),
    );

    let fired = Rc::new(Cell::new(0u32));
    let mut started = 0u32;

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::Move(x, y) => item.transition_to_position(x.into(), y.into()),
            Op::Instant(x, y) => {
                item.set_position(x.into(), y.into());
                item.layout_position();
            }
            Op::Signal(kind, own) => {
                let target = if own { item.element().id() } else { ElementId::next() };
                item.handle_signal(Signal::new(KINDS[usize::from(kind) % 3], target));
            }
            Op::Reveal => item.reveal(),
            Op::Remove => item.remove(),
            Op::Fade => {
                started += 1;
                let hook = Rc::clone(&fired);
                item.transition(
                    StyleMap::new().with("opacity", "0.5"),
                    Some(OnComplete::notify(move || hook.set(hook.get() + 1))),
                );
            }
            Op::Destroy => item.destroy(),
        }

        assert_eq!(item.is_transitioning(), item.element().total_listeners() > 0);
        assert!(item.element().total_listeners() <= 1);
        assert!(item.element().detach_count() <= 1);
        assert!(fired.get() <= started);
    }
});
