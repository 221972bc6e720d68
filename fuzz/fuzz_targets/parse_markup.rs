#![no_main]

use libfuzzer_sys::fuzz_target;
use vdom::{ParseOptions, parse_markup};

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };
    let tree = parse_markup(markup, &ParseOptions::default());
    let reparsed = parse_markup(&tree.to_markup(), &ParseOptions::default());
    assert_eq!(reparsed.to_markup(), tree.to_markup());
});
