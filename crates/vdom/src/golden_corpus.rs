//! Before/after markup pairs exercising the differ and both patch engines.
//!
//! Every pair must satisfy, with default options:
//! - applying `diff(before, after)` to `before` yields `after`;
//! - undoing that script yields `before` again.
//!
//! Comment content never changes between the two sides, since comments are not diffed.

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FixtureKind {
    Text,
    Attribute,
    Structure,
    Keyed,
    Replace,
    Void,
    Mixed,
}

#[derive(Clone, Copy, Debug)]
pub struct GoldenPair {
    pub name: &'static str,
    pub before: &'static str,
    pub after: &'static str,
    pub covers: &'static str,
    pub kind: FixtureKind,
}

const GOLDEN_PAIRS_V1: &[GoldenPair] = &[
    GoldenPair {
        name: "identical",
        before: "<div id=\"a\"><p>same</p></div>",
        after: "<div id=\"a\"><p>same</p></div>",
        covers: "No change yields an empty script.",
        kind: FixtureKind::Mixed,
    },
    GoldenPair {
        name: "text_change",
        before: "<p>hello</p>",
        after: "<p>goodbye</p>",
        covers: "Text data change inside an element.",
        kind: FixtureKind::Text,
    },
    GoldenPair {
        name: "text_with_entities",
        before: "<p>a &lt; b</p>",
        after: "<p>a &amp; b &gt; c</p>",
        covers: "Decoded entity text compared post-decode.",
        kind: FixtureKind::Text,
    },
    GoldenPair {
        name: "attr_modify_add_remove",
        before: "<div id=\"x\" class=\"a\" title=\"t\"></div>",
        after: "<div id=\"x\" class=\"b\" data-new=\"1\"></div>",
        covers: "All three attribute operations on one element.",
        kind: FixtureKind::Attribute,
    },
    GoldenPair {
        name: "attr_boolean",
        before: "<input type=\"checkbox\">",
        after: "<input type=\"checkbox\" checked disabled>",
        covers: "Valueless attributes added to a void element.",
        kind: FixtureKind::Void,
    },
    GoldenPair {
        name: "void_src_change",
        before: "<img src=\"a.png\">",
        after: "<img src=\"b.png\" />",
        covers: "Void element attribute change, with and without trailing slash.",
        kind: FixtureKind::Void,
    },
    GoldenPair {
        name: "append_children",
        before: "<ul><li>a</li></ul>",
        after: "<ul><li>a</li><li>b</li><li>c</li></ul>",
        covers: "Additions at the end of a list.",
        kind: FixtureKind::Structure,
    },
    GoldenPair {
        name: "insert_in_middle",
        before: "<div><h1>t</h1><p>body</p></div>",
        after: "<div><h1>t</h1><nav>n</nav><p>body</p></div>",
        covers: "Insertion between two matched siblings.",
        kind: FixtureKind::Structure,
    },
    GoldenPair {
        name: "remove_several",
        before: "<div><h1>t</h1><nav>n</nav><p>1</p><aside>x</aside><footer>f</footer></div>",
        after: "<div><h1>t</h1><p>1</p></div>",
        covers: "Several removals, highest position first.",
        kind: FixtureKind::Structure,
    },
    GoldenPair {
        name: "clear_children",
        before: "<div><p>1</p><p>2</p><!-- c --></div>",
        after: "<div></div>",
        covers: "Every child removed, comments included.",
        kind: FixtureKind::Structure,
    },
    GoldenPair {
        name: "keyed_reorder",
        before: "<ul><li data-key=\"a\">A</li><li data-key=\"b\">B</li><li data-key=\"c\">C</li></ul>",
        after: "<ul><li data-key=\"c\">C</li><li data-key=\"a\">A</li><li data-key=\"b\">B</li></ul>",
        covers: "Pure keyed rotation.",
        kind: FixtureKind::Keyed,
    },
    GoldenPair {
        name: "keyed_reverse",
        before: "<ol><li id=\"1\">1</li><li id=\"2\">2</li><li id=\"3\">3</li><li id=\"4\">4</li></ol>",
        after: "<ol><li id=\"4\">4</li><li id=\"3\">3</li><li id=\"2\">2</li><li id=\"1\">1</li></ol>",
        covers: "Full reversal by id keys.",
        kind: FixtureKind::Keyed,
    },
    GoldenPair {
        name: "keyed_mixed_edit",
        before: "<ul><li id=\"1\">a</li><li id=\"2\">b</li><li id=\"3\">c</li><li id=\"4\">d</li></ul>",
        after: "<ul><li id=\"4\">d</li><li id=\"5\">e</li><li id=\"2\" class=\"hot\">b!</li><li id=\"1\">a</li></ul>",
        covers: "Relocation, removal, insertion and nested edits in one list.",
        kind: FixtureKind::Keyed,
    },
    GoldenPair {
        name: "root_tag_change",
        before: "<p>x</p>",
        after: "<section>x</section>",
        covers: "Root name change becomes one replacement.",
        kind: FixtureKind::Replace,
    },
    GoldenPair {
        name: "keyed_tag_change",
        before: "<div><p data-key=\"k\">x</p></div>",
        after: "<div><section data-key=\"k\">x</section></div>",
        covers: "Key-matched pair with different names is replaced in place.",
        kind: FixtureKind::Replace,
    },
    GoldenPair {
        name: "text_to_element",
        before: "<div>plain</div>",
        after: "<div><b>bold</b></div>",
        covers: "Kind change among children.",
        kind: FixtureKind::Replace,
    },
    GoldenPair {
        name: "fragment_roots",
        before: "<p>1</p><p>2</p>",
        after: "<p>0</p><p>1</p><p>2</p><hr>",
        covers: "Top-level fragments on both sides.",
        kind: FixtureKind::Structure,
    },
    GoldenPair {
        name: "nested_deep",
        before: "<main><section><article><h2>a</h2><p>b</p></article></section></main>",
        after: "<main><section class=\"s\"><article><h2>a!</h2><p>b</p><p>c</p></article></section></main>",
        covers: "Edits several levels down.",
        kind: FixtureKind::Mixed,
    },
    GoldenPair {
        name: "svg_case",
        before: "<svg viewBox=\"0 0 1 1\"><linearGradient gradientUnits=\"a\"/></svg>",
        after: "<svg viewBox=\"0 0 2 2\"><linearGradient gradientUnits=\"b\"/><clipPath/></svg>",
        covers: "Case-preserved SVG names and attributes.",
        kind: FixtureKind::Attribute,
    },
    GoldenPair {
        name: "table_rows",
        before: "<table><tr><td>1</td><td>2</td></tr><tr><td>3</td></tr></table>",
        after: "<table><tr><td>3</td></tr><tr><td>1</td><td>2</td><td>x</td></tr></table>",
        covers: "Unkeyed rows matched by position.",
        kind: FixtureKind::Mixed,
    },
    GoldenPair {
        name: "utf8_text",
        before: "<p>café</p>",
        after: "<p>crème brûlée</p>",
        covers: "Non-ASCII text data.",
        kind: FixtureKind::Text,
    },
    GoldenPair {
        name: "script_body",
        before: "<div><script>let a = 1 < 2;</script></div>",
        after: "<div><script>let a = 3 > 2;</script><style>p{}</style></div>",
        covers: "Raw text element bodies diffed when not skipped.",
        kind: FixtureKind::Text,
    },
];

pub fn golden_pairs() -> &'static [GoldenPair] {
    GOLDEN_PAIRS_V1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ParseOptions, parse_markup};
    use crate::diff::diff;
    use crate::options::{DiffOptions, NoHooks};
    use crate::patch::{apply_virtual, undo_virtual};
    use std::collections::BTreeSet;

    #[test]
    fn fixture_names_are_unique() {
        let names: BTreeSet<_> = golden_pairs().iter().map(|pair| pair.name).collect();
        assert_eq!(names.len(), golden_pairs().len());
    }

    #[test]
    fn virtual_apply_and_undo_hold_for_every_pair() {
        let parse_options = ParseOptions::default();
        for pair in golden_pairs() {
            let before = parse_markup(pair.before, &parse_options);
            let after = parse_markup(pair.after, &parse_options);
            let script = diff(&before, &after, &DiffOptions::default(), &NoHooks);

            let mut tree = before.clone();
            apply_virtual(&mut tree, &script)
                .unwrap_or_else(|err| panic!("{}: apply failed: {err}", pair.name));
            assert_eq!(tree, after, "{}: apply ({})", pair.name, pair.covers);

            undo_virtual(&mut tree, &script)
                .unwrap_or_else(|err| panic!("{}: undo failed: {err}", pair.name));
            assert_eq!(tree, before, "{}: undo ({})", pair.name, pair.covers);
        }
    }

    #[test]
    fn identical_pair_diffs_empty() {
        let pair = golden_pairs()
            .iter()
            .find(|pair| pair.name == "identical")
            .expect("identical fixture");
        let parse_options = ParseOptions::default();
        let script = diff(
            &parse_markup(pair.before, &parse_options),
            &parse_markup(pair.after, &parse_options),
            &DiffOptions::default(),
            &NoHooks,
        );
        assert!(script.is_empty());
    }
}
