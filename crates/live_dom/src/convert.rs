//! Conversion between live documents and virtual trees.

use crate::document::{Document, ElementData, NodeData, NodeKey};
use crate::error::DomError;
use vdom::{
    CharacterData, DiffOptions, Element, Fragment, VNode, assign_routes, form_fields, is_svg,
    normalize_attribute_name, normalize_name,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Capture form-control properties that have been set on the live node.
    pub value_diffing: bool,
    pub case_sensitive: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            value_diffing: true,
            case_sensitive: false,
        }
    }
}

impl From<&DiffOptions> for ConvertOptions {
    fn from(options: &DiffOptions) -> Self {
        Self {
            value_diffing: options.value_diffing,
            case_sensitive: options.case_sensitive,
        }
    }
}

/// Builds the virtual tree of the subtree at `key`, with routes relative to `key`.
pub fn to_virtual(
    doc: &Document,
    key: NodeKey,
    options: &ConvertOptions,
) -> Result<VNode, DomError> {
    let mut tree = convert(doc, key, options, false)?;
    assign_routes(&mut tree);
    Ok(tree)
}

fn convert(
    doc: &Document,
    key: NodeKey,
    options: &ConvertOptions,
    in_svg: bool,
) -> Result<VNode, DomError> {
    let data = doc.data(key).ok_or(DomError::UnknownNode(key))?;
    let convert_children = |in_svg: bool| -> Result<Vec<VNode>, DomError> {
        doc.children(key)
            .iter()
            .map(|&child| convert(doc, child, options, in_svg))
            .collect()
    };
    Ok(match data {
        NodeData::Text(text) => VNode::Text(CharacterData::new(text.as_str())),
        NodeData::Comment(text) => VNode::Comment(CharacterData::new(text.as_str())),
        NodeData::Fragment => VNode::Fragment(Fragment {
            children: convert_children(in_svg)?,
            ..Fragment::default()
        }),
        NodeData::Element(live) => {
            let in_svg = in_svg || is_svg(&live.name);
            let keep_case = options.case_sensitive || in_svg;
            let mut element = Element::new(normalize_name(&live.name, keep_case));
            element.attributes = live
                .attributes
                .iter()
                .map(|(name, value)| (normalize_attribute_name(name, keep_case), value.as_str()))
                .collect();
            if options.value_diffing {
                let fields = form_fields(&live.name);
                if fields.value {
                    element.value.clone_from(&live.value);
                }
                if fields.checked {
                    element.checked = live.checked;
                }
                if fields.selected {
                    element.selected = live.selected;
                }
            }
            if let Some(children) = element.children.as_mut() {
                *children = convert_children(in_svg)?;
            }
            VNode::Element(element)
        }
    })
}

/// Materializes a virtual tree as a detached subtree of `doc`, returning its root.
///
/// The `&mut Document` is the node factory; nothing is attached to the existing tree.
pub fn to_live(doc: &mut Document, node: &VNode) -> NodeKey {
    match node {
        VNode::Text(text) => doc.create_text(text.data.as_str()),
        VNode::Comment(comment) => doc.create_comment(comment.data.as_str()),
        VNode::Fragment(fragment) => {
            let key = doc.create_fragment();
            for child in &fragment.children {
                let child = to_live(doc, child);
                doc.push_new_child(key, child);
            }
            key
        }
        VNode::Element(element) => {
            let key = doc.create_element_with(ElementData {
                name: element.name.clone(),
                attributes: element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                value: element.value.clone(),
                checked: element.checked,
                selected: element.selected,
            });
            for child in element.children.iter().flatten() {
                let child = to_live(doc, child);
                doc.push_new_child(key, child);
            }
            key
        }
    }
}
