use live_dom::Document;
use std::borrow::Cow;
use vdom::VNode;

/// One side of a diff: markup, a live document, or an already built virtual tree.
#[derive(Clone, Debug)]
pub enum Input<'a> {
    Markup(&'a str),
    Live(&'a Document),
    Virtual(Cow<'a, VNode>),
}

impl Input<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Markup(_) => "markup",
            Input::Live(_) => "live",
            Input::Virtual(_) => "virtual",
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(markup: &'a str) -> Self {
        Input::Markup(markup)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(markup: &'a String) -> Self {
        Input::Markup(markup.as_str())
    }
}

impl<'a> From<&'a Document> for Input<'a> {
    fn from(doc: &'a Document) -> Self {
        Input::Live(doc)
    }
}

impl From<VNode> for Input<'_> {
    fn from(node: VNode) -> Self {
        Input::Virtual(Cow::Owned(node))
    }
}

impl<'a> From<&'a VNode> for Input<'a> {
    fn from(node: &'a VNode) -> Self {
        Input::Virtual(Cow::Borrowed(node))
    }
}
