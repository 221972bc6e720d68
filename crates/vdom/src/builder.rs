use crate::node::{Attributes, Element, VNode, is_svg, normalize_attribute_name, normalize_name};
use crate::tokenizer::{Token, tokenize};
use crate::traverse::assign_routes;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep element and attribute names exactly as written.
    pub case_sensitive: bool,
}

struct OpenElement {
    element: Element,
    // Lowercased source name, used to match end tags.
    match_name: String,
    in_svg: bool,
}

struct TreeBuilder {
    options: ParseOptions,
    open: Vec<OpenElement>,
    top_level: Vec<VNode>,
}

impl TreeBuilder {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            open: Vec::new(),
            top_level: Vec::new(),
        }
    }

    fn in_svg(&self) -> bool {
        self.open.last().is_some_and(|frame| frame.in_svg)
    }

    fn current_children(&mut self) -> &mut Vec<VNode> {
        match self.open.last_mut() {
            Some(frame) => frame.element.children.get_or_insert_with(Vec::new),
            None => &mut self.top_level,
        }
    }

    fn push_node(&mut self, node: VNode) {
        self.current_children().push(node);
    }

    fn push_text(&mut self, text: String) {
        if self.open.is_empty() && text.trim().is_empty() {
            return;
        }
        let children = self.current_children();
        if let Some(VNode::Text(previous)) = children.last_mut() {
            previous.data.push_str(&text);
            return;
        }
        children.push(VNode::text(text));
    }

    fn start_tag(&mut self, name: String, attributes: Vec<(String, String)>, self_closing: bool) {
        let in_svg = self.in_svg() || is_svg(&name);
        let keep_case = self.options.case_sensitive || in_svg;
        let match_name = name.to_ascii_lowercase();
        let mut element = Element::new(normalize_name(&name, keep_case));
        element.attributes = attributes
            .into_iter()
            .map(|(k, v)| (normalize_attribute_name(&k, keep_case), v))
            .collect::<Attributes>();

        if element.is_void() || self_closing {
            self.push_node(element.into());
            return;
        }
        self.open.push(OpenElement {
            element,
            match_name,
            in_svg,
        });
    }

    fn end_tag(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        let Some(pos) = self.open.iter().rposition(|frame| frame.match_name == name) else {
            log::trace!(target: "vdom.markup", "ignoring unmatched end tag </{name}>");
            return;
        };
        while self.open.len() > pos {
            self.close_current();
        }
    }

    fn close_current(&mut self) {
        if let Some(frame) = self.open.pop() {
            self.push_node(frame.element.into());
        }
    }

    fn finish(mut self) -> VNode {
        while !self.open.is_empty() {
            self.close_current();
        }
        let mut root = if self.top_level.len() == 1 {
            self.top_level.pop().unwrap_or_else(|| VNode::fragment(Vec::new()))
        } else {
            VNode::fragment(self.top_level)
        };
        assign_routes(&mut root);
        root
    }
}

/// Parses markup leniently into a virtual tree.
///
/// A single top-level node is returned as is; zero or several are wrapped in a fragment.
/// Routes are assigned on the result.
pub fn parse_markup(input: &str, options: &ParseOptions) -> VNode {
    let mut builder = TreeBuilder::new(*options);
    for token in tokenize(input) {
        match token {
            Token::Doctype(_) => {}
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => builder.start_tag(name, attributes, self_closing),
            Token::EndTag(name) => builder.end_tag(&name),
            Token::Comment(data) => builder.push_node(VNode::comment(data)),
            Token::Text(text) => builder.push_text(text),
        }
    }
    builder.finish()
}
