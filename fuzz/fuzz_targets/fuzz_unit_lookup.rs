//! Fuzz target for unit identifier resolution
//!
//! Identifiers are split on whitespace and resolved against the built-in
//! catalog. Resolution and simplification must never panic, and
//! simplification must not change the value in base units.

#![no_main]

use dimensio::{Corpus, Dimension, Quantity};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

fn catalog() -> &'static Corpus {
    static CORPUS: OnceLock<Corpus> = OnceLock::new();
    CORPUS.get_or_init(|| Corpus::bootstrap().expect("built-in catalog"))
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let corpus = catalog();
    let identifiers: Vec<&str> = text.split_whitespace().take(8).collect();
    for identifier in &identifiers {
        let _ = Dimension::parse(identifier, corpus);
    }

    if let Ok(quantity) = Quantity::parse(1.0, &identifiers, corpus) {
        let base = quantity.base_value(corpus);
        let simplified = quantity.simplify(corpus);
        let drift = (simplified.base_value(corpus) - base).abs();
        if base.is_finite() && simplified.base_value(corpus).is_finite() {
            assert!(drift <= 1e-6 * base.abs().max(1.0));
        }
    }
});
