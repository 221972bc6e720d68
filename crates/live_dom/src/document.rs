//! Arena-backed live document tree.
//!
//! Invariants:
//! - A `NodeKey` stays valid, and keeps naming the same node, until that node is removed.
//!   Moving a node never changes its key.
//! - A node has at most one parent. The root has none.
//! - Only fragments and non-void elements hold children.
//! - Removed slots are never reused.

use crate::convert::{ConvertOptions, to_live, to_virtual};
use crate::error::DomError;
use std::fmt;
use vdom::{ParseOptions, Route, VNode, is_void_element, parse_markup, serialize_with};

/// Stable handle to a node of one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u32);

impl NodeKey {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Form-control properties. `None` means never set; reads then fall back to attributes.
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

#[derive(Clone, Debug)]
struct NodeRecord {
    data: NodeData,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        match &self.data {
            NodeData::Element(element) => !is_void_element(&element.name),
            NodeData::Fragment => true,
            NodeData::Text(_) | NodeData::Comment(_) => false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Option<NodeRecord>>,
    root: Option<NodeKey>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document whose root is the parsed markup.
    pub fn from_markup(markup: &str, options: &ParseOptions) -> Self {
        Self::from_virtual(&parse_markup(markup, options))
    }

    pub fn from_virtual(tree: &VNode) -> Self {
        let mut doc = Self::new();
        let root = to_live(&mut doc, tree);
        doc.root = Some(root);
        doc
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    /// Makes a detached node the root. The previous root, if any, is removed.
    pub fn set_root(&mut self, key: NodeKey) -> Result<(), DomError> {
        if self.record(key)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(key));
        }
        if let Some(old) = self.root.replace(key) {
            if old != key {
                self.free_subtree(old);
            }
        }
        Ok(())
    }

    /// Number of nodes currently allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.get(key.index()).is_some_and(Option::is_some)
    }

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.nodes
            .get(key.index())
            .and_then(Option::as_ref)
            .ok_or(DomError::UnknownNode(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(key.index())
            .and_then(Option::as_mut)
            .ok_or(DomError::UnknownNode(key))
    }

    fn allocate(&mut self, data: NodeData) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(Some(NodeRecord {
            data,
            parent: None,
            children: Vec::new(),
        }));
        key
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeKey {
        self.allocate(NodeData::Element(ElementData::new(name)))
    }

    pub fn create_element_with(&mut self, element: ElementData) -> NodeKey {
        self.allocate(NodeData::Element(element))
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeKey {
        self.allocate(NodeData::Text(data.into()))
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeKey {
        self.allocate(NodeData::Comment(data.into()))
    }

    pub fn create_fragment(&mut self) -> NodeKey {
        self.allocate(NodeData::Fragment)
    }

    pub fn data(&self, key: NodeKey) -> Option<&NodeData> {
        self.record(key).ok().map(|record| &record.data)
    }

    pub fn element(&self, key: NodeKey) -> Option<&ElementData> {
        match self.data(key)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, key: NodeKey) -> Result<&mut ElementData, DomError> {
        match &mut self.record_mut(key)?.data {
            NodeData::Element(element) => Ok(element),
            _ => Err(DomError::WrongNodeKind {
                key,
                expected: "an element",
            }),
        }
    }

    /// Element name, or the `#text` style pseudo name for other kinds.
    pub fn node_name(&self, key: NodeKey) -> Option<&str> {
        Some(match self.data(key)? {
            NodeData::Element(element) => element.name.as_str(),
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
            NodeData::Fragment => "#document-fragment",
        })
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.record(key).ok()?.parent
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.record(key)
            .map(|record| record.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_at(&self, key: NodeKey, index: usize) -> Option<NodeKey> {
        self.children(key).get(index).copied()
    }

    pub fn can_have_children(&self, key: NodeKey) -> bool {
        self.record(key).is_ok_and(NodeRecord::allows_children)
    }

    /// Resolves a route by descending child indices from the root.
    pub fn node_at_route(&self, route: &Route) -> Option<NodeKey> {
        let mut current = self.root?;
        for &index in route.as_slice() {
            current = self.child_at(current, index)?;
        }
        Some(current)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// Inserts a detached node as child `index` of `parent`; an index past the end appends.
    pub fn insert_child(
        &mut self,
        parent: NodeKey,
        index: usize,
        child: NodeKey,
    ) -> Result<(), DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::NotAContainer(parent));
        }
        if self.record(child)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        if self.root == Some(child) {
            return Err(DomError::IsRoot(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        let siblings = &mut self.record_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlinks a node from its parent, returning the parent and the position it held.
    /// Detaching the root empties the document but keeps the node alive.
    pub fn detach(&mut self, key: NodeKey) -> Result<Option<(NodeKey, usize)>, DomError> {
        let Some(parent) = self.record_mut(key)?.parent.take() else {
            if self.root == Some(key) {
                self.root = None;
            }
            return Ok(None);
        };
        let siblings = &mut self.record_mut(parent)?.children;
        let position = siblings.iter().position(|sibling| *sibling == key);
        if let Some(position) = position {
            siblings.remove(position);
        }
        Ok(position.map(|position| (parent, position)))
    }

    /// Detaches a node and frees it along with its whole subtree.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.detach(key)?;
        self.free_subtree(key);
        Ok(())
    }

    /// Puts a detached node where `old` sits, then frees `old`.
    pub fn replace(&mut self, old: NodeKey, new: NodeKey) -> Result<(), DomError> {
        if old == new {
            return Ok(());
        }
        if self.record(new)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(new));
        }
        if self.root == Some(new) {
            return Err(DomError::IsRoot(new));
        }
        let parent = self.record(old)?.parent;
        match parent {
            None if self.root == Some(old) => self.set_root(new),
            None => self.remove(old),
            Some(parent) => {
                let position = self
                    .children(parent)
                    .iter()
                    .position(|sibling| *sibling == old)
                    .ok_or(DomError::UnknownNode(old))?;
                self.detach(old)?;
                self.insert_child(parent, position, new)?;
                self.free_subtree(old);
                Ok(())
            }
        }
    }

    fn free_subtree(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                stack.extend(record.children);
            }
        }
        if self.root == Some(key) {
            self.root = None;
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.element(key)?.attribute(name)
    }

    pub fn attributes(&self, key: NodeKey) -> &[(String, String)] {
        self.element(key)
            .map(|element| element.attributes.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_attribute(
        &mut self,
        key: NodeKey,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let value = value.into();
        let attributes = &mut self.element_mut(key)?.attributes;
        match attributes.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<Option<String>, DomError> {
        let attributes = &mut self.element_mut(key)?.attributes;
        let position = attributes.iter().position(|(existing, _)| existing == name);
        Ok(position.map(|position| attributes.remove(position).1))
    }

    /// Text or comment data.
    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match self.data(key)? {
            NodeData::Text(data) | NodeData::Comment(data) => Some(data),
            _ => None,
        }
    }

    pub fn set_text(&mut self, key: NodeKey, data: &str) -> Result<(), DomError> {
        let record = self.record_mut(key)?;
        match &mut record.data {
            NodeData::Text(existing) | NodeData::Comment(existing) => {
                existing.clear();
                existing.push_str(data);
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind {
                key,
                expected: "text or comment",
            }),
        }
    }

    /// Current value: the property when set, otherwise the `value` attribute.
    pub fn value(&self, key: NodeKey) -> Option<&str> {
        let element = self.element(key)?;
        element
            .value
            .as_deref()
            .or_else(|| element.attribute("value"))
    }

    pub fn checked(&self, key: NodeKey) -> bool {
        self.element(key).is_some_and(|element| {
            element
                .checked
                .unwrap_or_else(|| element.attribute("checked").is_some())
        })
    }

    pub fn selected(&self, key: NodeKey) -> bool {
        self.element(key).is_some_and(|element| {
            element
                .selected
                .unwrap_or_else(|| element.attribute("selected").is_some())
        })
    }

    pub fn set_value(&mut self, key: NodeKey, value: Option<String>) -> Result<(), DomError> {
        self.element_mut(key)?.value = value;
        Ok(())
    }

    pub fn set_checked(&mut self, key: NodeKey, checked: Option<bool>) -> Result<(), DomError> {
        self.element_mut(key)?.checked = checked;
        Ok(())
    }

    pub fn set_selected(&mut self, key: NodeKey, selected: Option<bool>) -> Result<(), DomError> {
        self.element_mut(key)?.selected = selected;
        Ok(())
    }

    /// Virtual view of the whole document, or `None` when it has no root.
    pub fn to_virtual(&self, options: &ConvertOptions) -> Option<VNode> {
        to_virtual(self, self.root?, options).ok()
    }

    pub fn to_markup(&self) -> String {
        self.to_markup_with(&ConvertOptions::default())
    }

    /// Markup that parses back to [`Document::to_virtual`] under the same case handling.
    pub fn to_markup_with(&self, options: &ConvertOptions) -> String {
        let parse = ParseOptions {
            case_sensitive: options.case_sensitive,
        };
        self.to_virtual(options)
            .map(|tree| serialize_with(&tree, &parse))
            .unwrap_or_default()
    }

    /// Links `child` under `parent` without the checks of [`Document::insert_child`], for
    /// freshly allocated nodes only.
    pub(crate) fn push_new_child(&mut self, parent: NodeKey, child: NodeKey) {
        if let Some(Some(record)) = self.nodes.get_mut(parent.index()) {
            record.children.push(child);
        }
        if let Some(Some(record)) = self.nodes.get_mut(child.index()) {
            record.parent = Some(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> (Document, NodeKey, Vec<NodeKey>) {
        let mut doc = Document::new();
        let ul = doc.create_element("UL");
        doc.set_root(ul).expect("root");
        let items: Vec<NodeKey> = (0..3)
            .map(|i| {
                let li = doc.create_element("LI");
                let text = doc.create_text(format!("{i}"));
                doc.append_child(li, text).expect("text");
                doc.append_child(ul, li).expect("li");
                li
            })
            .collect();
        (doc, ul, items)
    }

    #[test]
    fn routes_resolve_from_root() {
        let (doc, ul, items) = list();
        assert_eq!(doc.node_at_route(&Route::root()), Some(ul));
        assert_eq!(doc.node_at_route(&Route::from(vec![2])), Some(items[2]));
        let text = doc.node_at_route(&Route::from(vec![1, 0])).expect("text");
        assert_eq!(doc.text(text), Some("1"));
        assert_eq!(doc.node_at_route(&Route::from(vec![3])), None);
        assert_eq!(doc.node_at_route(&Route::from(vec![0, 0, 0])), None);
    }

    #[test]
    fn insert_clamps_index_and_moves_keep_keys() {
        let (mut doc, ul, items) = list();
        assert_eq!(doc.detach(items[0]).expect("detach"), Some((ul, 0)));
        doc.insert_child(ul, 99, items[0]).expect("append");
        assert_eq!(doc.children(ul), &[items[1], items[2], items[0]]);
        assert_eq!(doc.parent(items[0]), Some(ul));
        assert_eq!(doc.to_markup(), "<ul><li>1</li><li>2</li><li>0</li></ul>");
    }

    #[test]
    fn structural_misuse_is_rejected() {
        let (mut doc, ul, items) = list();
        assert_eq!(
            doc.append_child(ul, items[0]),
            Err(DomError::AlreadyAttached(items[0]))
        );
        let img = doc.create_element("IMG");
        let text = doc.create_text("x");
        assert_eq!(doc.append_child(img, text), Err(DomError::NotAContainer(img)));
        assert_eq!(doc.append_child(text, img), Err(DomError::NotAContainer(text)));

        doc.detach(items[0]).expect("detach");
        let inner = doc.children(items[0])[0];
        doc.detach(inner).expect("detach text");
        assert_eq!(
            doc.append_child(items[0], items[0]),
            Err(DomError::Cycle {
                parent: items[0],
                child: items[0],
            })
        );
        assert_eq!(doc.append_child(items[1], ul), Err(DomError::IsRoot(ul)));
    }

    #[test]
    fn remove_frees_whole_subtree() {
        let (mut doc, ul, items) = list();
        let text = doc.children(items[1])[0];
        let before = doc.len();
        doc.remove(items[1]).expect("remove");
        assert_eq!(doc.len(), before - 2);
        assert!(!doc.contains(items[1]));
        assert!(!doc.contains(text));
        assert_eq!(doc.children(ul), &[items[0], items[2]]);
        assert_eq!(doc.remove(items[1]), Err(DomError::UnknownNode(items[1])));
    }

    #[test]
    fn replace_keeps_position_and_handles_root() {
        let (mut doc, ul, items) = list();
        let p = doc.create_element("P");
        doc.replace(items[1], p).expect("replace child");
        assert_eq!(doc.children(ul), &[items[0], p, items[2]]);
        assert!(!doc.contains(items[1]));

        let section = doc.create_element("SECTION");
        doc.replace(ul, section).expect("replace root");
        assert_eq!(doc.root(), Some(section));
        assert!(!doc.contains(items[0]));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn attributes_update_in_place() {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        doc.set_attribute(div, "id", "a").expect("set");
        doc.set_attribute(div, "class", "x").expect("set");
        doc.set_attribute(div, "id", "b").expect("overwrite");
        assert_eq!(
            doc.attributes(div),
            &[
                ("id".to_string(), "b".to_string()),
                ("class".to_string(), "x".to_string())
            ]
        );
        assert_eq!(doc.remove_attribute(div, "id"), Ok(Some("b".to_string())));
        assert_eq!(doc.remove_attribute(div, "id"), Ok(None));
        let text = doc.create_text("t");
        assert!(matches!(
            doc.set_attribute(text, "id", "a"),
            Err(DomError::WrongNodeKind { .. })
        ));
    }

    #[test]
    fn form_properties_fall_back_to_attributes() {
        let mut doc = Document::from_markup("<input value=\"a\" checked>", &ParseOptions::default());
        let input = doc.root().expect("root");
        assert_eq!(doc.value(input), Some("a"));
        assert!(doc.checked(input));
        doc.set_value(input, Some("b".into())).expect("value");
        doc.set_checked(input, Some(false)).expect("checked");
        assert_eq!(doc.value(input), Some("b"));
        assert!(!doc.checked(input));
        assert_eq!(doc.attribute(input, "value"), Some("a"));
    }

    #[test]
    fn markup_round_trips_through_document() {
        let markup = "<div id=\"a\"><p>x &amp; y</p><!-- c --><br></div>";
        let doc = Document::from_markup(markup, &ParseOptions::default());
        assert_eq!(doc.to_markup(), markup);
    }
}
