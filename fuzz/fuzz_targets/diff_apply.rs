#![no_main]

use libfuzzer_sys::fuzz_target;
use live_dom::{Document, PatchContext};
use vdom::{DiffOptions, NoHooks, ParseOptions, diff, parse_markup};

// Input is two documents separated by a NUL byte.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((before, after)) = text.split_once('\0') else {
        return;
    };
    let parse = ParseOptions::default();
    let old = parse_markup(before, &parse);
    let new = parse_markup(after, &parse);
    let script = diff(&old, &new, &DiffOptions::default(), &NoHooks);

    let mut doc = Document::from_virtual(&old);
    let context = PatchContext::default();
    live_dom::apply(&mut doc, &script, &context).expect("script applies to its own source");
    assert_eq!(doc.to_markup(), new.to_markup());
    live_dom::undo(&mut doc, &script, &context).expect("script undoes");
    assert_eq!(doc.to_markup(), old.to_markup());
});
