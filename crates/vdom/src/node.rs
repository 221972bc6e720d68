//! Virtual node model.
//!
//! Invariants:
//! - Element names are normalized when a node is built (see [`normalize_name`]); equality of
//!   names is plain string equality afterwards.
//! - `children` is `None` only for void elements.
//! - `route` is an address into the tree it was computed on, never an identity. Anything that
//!   restructures a tree must call [`crate::traverse::assign_routes`] on the affected subtree.
//! - `skip` is transient annotation state and is neither serialized nor part of equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional path of child indices from the tree root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<usize>);

impl Route {
    pub const fn root() -> Self {
        Route(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Route {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(index);
        Route(steps)
    }

    /// Splits into the parent route and the index within that parent.
    pub fn split_last(&self) -> Option<(Route, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((Route(parent.to_vec()), *last))
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

impl From<Vec<usize>> for Route {
    fn from(steps: Vec<usize>) -> Self {
        Route(steps)
    }
}

impl From<&[usize]> for Route {
    fn from(steps: &[usize]) -> Self {
        Route(steps.to_vec())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

/// Skip annotation computed by the selector/predicate engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Skip {
    #[default]
    None,
    /// Diff the node itself but never its children.
    Children,
    /// Treat the whole subtree as equal.
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Fragment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::Fragment => "fragment",
        })
    }
}

/// Ordered attribute map. Order is kept for serialization only; equality ignores it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Sets `name`, keeping its position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Attributes {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            let k = k.into();
            // First occurrence wins, as in HTML attribute parsing.
            if !attributes.contains(&k) {
                attributes.0.push((k, v.into()));
            }
        }
        attributes
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<VNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Route::is_root")]
    pub route: Route,
    #[serde(skip)]
    pub skip: Skip,
}

impl Element {
    /// Creates an element; void element names get no child list.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let children = if is_void_element(&name) {
            None
        } else {
            Some(Vec::new())
        };
        Self {
            name,
            children,
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn is_void(&self) -> bool {
        self.children.is_none()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.children == other.children
            && self.value == other.value
            && self.checked == other.checked
            && self.selected == other.selected
    }
}

/// Payload of text and comment nodes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CharacterData {
    pub data: String,
    #[serde(default, skip_serializing_if = "Route::is_root")]
    pub route: Route,
    #[serde(skip)]
    pub skip: Skip,
}

impl CharacterData {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

impl PartialEq for CharacterData {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub children: Vec<VNode>,
    #[serde(default, skip_serializing_if = "Route::is_root")]
    pub route: Route,
    #[serde(skip)]
    pub skip: Skip,
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

/// A node of a virtual document tree.
///
/// Equality is observational: kind, names, attributes (order-insensitive), data, form state
/// and children in order. Routes and skip annotations are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "camelCase")]
pub enum VNode {
    Element(Element),
    Text(CharacterData),
    Comment(CharacterData),
    Fragment(Fragment),
}

impl VNode {
    pub fn element(name: impl Into<String>) -> Self {
        VNode::Element(Element::new(name))
    }

    pub fn text(data: impl Into<String>) -> Self {
        VNode::Text(CharacterData::new(data))
    }

    pub fn comment(data: impl Into<String>) -> Self {
        VNode::Comment(CharacterData::new(data))
    }

    pub fn fragment(children: Vec<VNode>) -> Self {
        VNode::Fragment(Fragment {
            children,
            ..Fragment::default()
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            VNode::Element(_) => NodeKind::Element,
            VNode::Text(_) => NodeKind::Text,
            VNode::Comment(_) => NodeKind::Comment,
            VNode::Fragment(_) => NodeKind::Fragment,
        }
    }

    pub fn node_name(&self) -> &str {
        match self {
            VNode::Element(element) => &element.name,
            VNode::Text(_) => "#text",
            VNode::Comment(_) => "#comment",
            VNode::Fragment(_) => "#document-fragment",
        }
    }

    pub fn route(&self) -> &Route {
        match self {
            VNode::Element(element) => &element.route,
            VNode::Text(data) | VNode::Comment(data) => &data.route,
            VNode::Fragment(fragment) => &fragment.route,
        }
    }

    pub fn set_route(&mut self, route: Route) {
        match self {
            VNode::Element(element) => element.route = route,
            VNode::Text(data) | VNode::Comment(data) => data.route = route,
            VNode::Fragment(fragment) => fragment.route = route,
        }
    }

    pub fn skip(&self) -> Skip {
        match self {
            VNode::Element(element) => element.skip,
            VNode::Text(data) | VNode::Comment(data) => data.skip,
            VNode::Fragment(fragment) => fragment.skip,
        }
    }

    pub fn set_skip(&mut self, skip: Skip) {
        match self {
            VNode::Element(element) => element.skip = skip,
            VNode::Text(data) | VNode::Comment(data) => data.skip = skip,
            VNode::Fragment(fragment) => fragment.skip = skip,
        }
    }

    pub fn children(&self) -> Option<&[VNode]> {
        match self {
            VNode::Element(element) => element.children.as_deref(),
            VNode::Fragment(fragment) => Some(&fragment.children),
            VNode::Text(_) | VNode::Comment(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<VNode>> {
        match self {
            VNode::Element(element) => element.children.as_mut(),
            VNode::Fragment(fragment) => Some(&mut fragment.children),
            VNode::Text(_) | VNode::Comment(_) => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            VNode::Element(element) => Some(&element.attributes),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            VNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            VNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text or comment payload.
    pub fn data(&self) -> Option<&str> {
        match self {
            VNode::Text(data) | VNode::Comment(data) => Some(&data.data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut String> {
        match self {
            VNode::Text(data) | VNode::Comment(data) => Some(&mut data.data),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, VNode::Element(_))
    }
}

impl From<Element> for VNode {
    fn from(element: Element) -> Self {
        VNode::Element(element)
    }
}

pub fn is_void_element(name: &str) -> bool {
    const VOID: [&str; 16] = [
        "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
        "meta", "param", "source", "track", "wbr",
    ];
    VOID.iter().any(|void| name.eq_ignore_ascii_case(void))
}

/// Which form-control state a tag carries when value diffing is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormFields {
    pub value: bool,
    pub checked: bool,
    pub selected: bool,
}

impl FormFields {
    pub fn any(self) -> bool {
        self.value || self.checked || self.selected
    }
}

pub fn form_fields(name: &str) -> FormFields {
    let is = |tag: &str| name.eq_ignore_ascii_case(tag);
    FormFields {
        value: is("input") || is("textarea") || is("select") || is("option"),
        checked: is("input"),
        selected: is("option"),
    }
}

/// Normalizes an element or attribute name: ASCII-uppercase for element names, ASCII-lowercase
/// for attribute names, untouched when `keep_case` (case-sensitive mode or SVG content).
pub fn normalize_name(name: &str, keep_case: bool) -> String {
    if keep_case {
        name.to_string()
    } else {
        name.to_ascii_uppercase()
    }
}

pub fn normalize_attribute_name(name: &str, keep_case: bool) -> String {
    if keep_case {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

pub fn is_svg(name: &str) -> bool {
    name.eq_ignore_ascii_case("svg")
}
