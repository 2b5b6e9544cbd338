#![no_main]

use libfuzzer_sys::fuzz_target;
use tessera_core::options::TransitionDuration;
use tessera_core::style::{parse_leading_int, px};

const ONE_DAY_MICROS: u128 = 86_400 * 1_000_000;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Integer offsets survive a format/parse cycle.
    if let Some(value) = parse_leading_int(text) {
        assert_eq!(parse_leading_int(&px(value)), Some(value));
    }

    // Accepted durations re-parse from their CSS rendering, up to the
    // microsecond precision the rendering keeps.
    if let Ok(duration) = TransitionDuration::parse(text) {
        let a = duration.as_duration().as_micros();
        if a > ONE_DAY_MICROS {
            return;
        }
        let rendered = duration.to_string();
        let reparsed = TransitionDuration::parse(&rendered).expect("rendered duration parses");
        let b = reparsed.as_duration().as_micros();
        assert!(a.abs_diff(b) <= 1, "{text:?} -> {rendered:?}");
    }
});
