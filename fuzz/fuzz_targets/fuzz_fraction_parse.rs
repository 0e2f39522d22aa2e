//! Fuzz target for fraction parsing
//!
//! Any UTF-8 input either parses or yields an error. A parsed fraction
//! must print back to text that parses to the same value.

#![no_main]

use dimensio::Fraction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(fraction) = text.parse::<Fraction>() {
        let reparsed: Fraction = fraction.to_string().parse().expect("display output parses");
        assert_eq!(reparsed, fraction);
    }
});
