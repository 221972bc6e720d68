use crate::builder::ParseOptions;
use crate::entities::{escape_attribute, escape_text};
use crate::node::{Element, VNode, is_svg};

/// Serializes a virtual tree parsed with default options back to markup.
pub fn serialize(node: &VNode) -> String {
    serialize_with(node, &ParseOptions::default())
}

/// Serializes a virtual tree back to markup that `options` parses into the same tree.
///
/// Names the parser normalizes are written lowercase. Names it keeps as written (inside an SVG
/// subtree, or everywhere when parsing case-sensitively) are written unchanged.
pub fn serialize_with(node: &VNode, options: &ParseOptions) -> String {
    let mut out = String::new();
    let context = Context {
        raw_text: false,
        keep_case: options.case_sensitive,
    };
    write_node(node, context, &mut out);
    out
}

impl VNode {
    pub fn to_markup(&self) -> String {
        serialize(self)
    }

    pub fn to_markup_with(&self, options: &ParseOptions) -> String {
        serialize_with(self, options)
    }
}

#[derive(Clone, Copy)]
struct Context {
    raw_text: bool,
    keep_case: bool,
}

fn is_rawtext(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn write_node(node: &VNode, cx: Context, out: &mut String) {
    match node {
        VNode::Element(element) => write_element(element, cx.keep_case, out),
        VNode::Text(text) if cx.raw_text => out.push_str(&text.data),
        VNode::Text(text) => escape_text(&text.data, out),
        VNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.data);
            out.push_str("-->");
        }
        VNode::Fragment(fragment) => {
            for child in &fragment.children {
                write_node(child, Context { raw_text: false, ..cx }, out);
            }
        }
    }
}

fn write_element(element: &Element, keep_case: bool, out: &mut String) {
    let keep_case = keep_case || is_svg(&element.name);
    let name = if keep_case {
        element.name.clone()
    } else {
        element.name.to_ascii_lowercase()
    };
    out.push('<');
    out.push_str(&name);
    for (key, value) in element.attributes.iter() {
        out.push(' ');
        out.push_str(key);
        if !value.is_empty() {
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }
    out.push('>');
    let Some(children) = &element.children else {
        return;
    };
    let cx = Context {
        raw_text: is_rawtext(&element.name),
        keep_case,
    };
    for child in children {
        write_node(child, cx, out);
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}
