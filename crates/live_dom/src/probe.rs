use crate::document::Document;
use vdom::{LiveProbe, Route, SelectorList};

/// Answers selector questions against the live node at a route of `doc`.
#[derive(Clone, Copy, Debug)]
pub struct DocumentProbe<'a> {
    doc: &'a Document,
}

impl<'a> DocumentProbe<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }
}

impl LiveProbe for DocumentProbe<'_> {
    fn matches(&self, route: &Route, selectors: &SelectorList) -> Option<bool> {
        let key = self.doc.node_at_route(route)?;
        let Some(element) = self.doc.element(key) else {
            return Some(false);
        };
        Some(selectors.matches_with(&element.name, |name| element.attribute(name)))
    }
}
