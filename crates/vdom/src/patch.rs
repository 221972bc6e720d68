//! Applying edit scripts to virtual trees.
//!
//! Same semantics as the live patch engine. The diff engine uses it to keep its working copy
//! in step with the script it emits.

use crate::error::PatchError;
use crate::node::{Element, Route, VNode};
use crate::ops::{DiffOp, invert_script};
use crate::traverse::{assign_routes_from, find_node_by_route_mut};

fn node_mut<'a>(root: &'a mut VNode, route: &Route) -> Result<&'a mut VNode, PatchError> {
    find_node_by_route_mut(root, route).ok_or_else(|| PatchError::RouteNotFound(route.clone()))
}

fn element_mut<'a>(root: &'a mut VNode, route: &Route) -> Result<&'a mut Element, PatchError> {
    let node = node_mut(root, route)?;
    let found = node.kind();
    node.as_element_mut().ok_or_else(|| PatchError::WrongNodeKind {
        route: route.clone(),
        expected: "element",
        found,
    })
}

fn children_mut<'a>(root: &'a mut VNode, route: &Route) -> Result<&'a mut Vec<VNode>, PatchError> {
    node_mut(root, route)?
        .children_mut()
        .ok_or_else(|| PatchError::NoChildren(route.clone()))
}

fn reroute(root: &mut VNode, parent: &Route) {
    if let Some(node) = find_node_by_route_mut(root, parent) {
        assign_routes_from(node, parent.clone());
    }
}

fn detach(root: &mut VNode, route: &Route) -> Result<(Route, VNode), PatchError> {
    let (parent, index) = route
        .split_last()
        .ok_or_else(|| PatchError::RouteNotFound(route.clone()))?;
    let children = children_mut(root, &parent)?;
    if index >= children.len() {
        return Err(PatchError::RouteNotFound(route.clone()));
    }
    Ok((parent, children.remove(index)))
}

pub fn apply_virtual_one(root: &mut VNode, op: &DiffOp) -> Result<(), PatchError> {
    match op {
        DiffOp::AddElement {
            route,
            index,
            element,
        } => {
            let children = children_mut(root, route)?;
            let index = (*index).min(children.len());
            children.insert(index, element.clone());
            reroute(root, route);
        }
        DiffOp::RemoveElement { route, .. } => {
            let (parent, _) = detach(root, route)?;
            reroute(root, &parent);
        }
        DiffOp::RelocateElement { from, to } => {
            let (from_parent, node) = detach(root, from)?;
            let Some((to_parent, to_index)) = to.split_last() else {
                return Err(PatchError::RouteNotFound(to.clone()));
            };
            match children_mut(root, &to_parent) {
                Ok(children) => {
                    let index = to_index.min(children.len());
                    children.insert(index, node);
                }
                Err(err) => {
                    // Put the node back so a failed relocation leaves the tree unchanged.
                    if let Ok(children) = children_mut(root, &from_parent) {
                        let index = from.last().unwrap_or(0).min(children.len());
                        children.insert(index, node);
                    }
                    return Err(err);
                }
            }
            reroute(root, &from_parent);
            if to_parent != from_parent {
                reroute(root, &to_parent);
            }
        }
        DiffOp::ModifyText {
            route, new_value, ..
        } => {
            let node = node_mut(root, route)?;
            let found = node.kind();
            let data = node.data_mut().ok_or_else(|| PatchError::WrongNodeKind {
                route: route.clone(),
                expected: "text or comment",
                found,
            })?;
            data.clone_from(new_value);
        }
        DiffOp::ReplaceElement {
            route, new_value, ..
        } => {
            let node = node_mut(root, route)?;
            *node = new_value.clone();
            assign_routes_from(node, route.clone());
        }
        DiffOp::AddAttribute { route, name, value } => {
            element_mut(root, route)?.attributes.set(name, value);
        }
        DiffOp::ModifyAttribute {
            route,
            name,
            new_value,
            ..
        } => {
            element_mut(root, route)?.attributes.set(name, new_value);
        }
        DiffOp::RemoveAttribute { route, name, .. } => {
            element_mut(root, route)?.attributes.remove(name);
        }
        DiffOp::ModifyValue {
            route, new_value, ..
        } => element_mut(root, route)?.value.clone_from(new_value),
        DiffOp::ModifyChecked {
            route, new_value, ..
        } => element_mut(root, route)?.checked = *new_value,
        DiffOp::ModifySelected {
            route, new_value, ..
        } => element_mut(root, route)?.selected = *new_value,
    }
    Ok(())
}

/// Applies `script` in order, stopping at the first failing operation.
pub fn apply_virtual(root: &mut VNode, script: &[DiffOp]) -> Result<(), PatchError> {
    for (index, op) in script.iter().enumerate() {
        apply_virtual_one(root, op).map_err(|source| PatchError::Op {
            index,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

pub fn undo_virtual(root: &mut VNode, script: &[DiffOp]) -> Result<(), PatchError> {
    apply_virtual(root, &invert_script(script))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ParseOptions, parse_markup};
    use crate::traverse::find_node_by_route;

    fn parse(input: &str) -> VNode {
        parse_markup(input, &ParseOptions::default())
    }

    #[test]
    fn add_inserts_at_index_or_appends() {
        let mut tree = parse("<ul><li>a</li></ul>");
        let li = parse("<li>b</li>");
        apply_virtual_one(
            &mut tree,
            &DiffOp::AddElement {
                route: Route::root(),
                index: 0,
                element: li.clone(),
            },
        )
        .expect("add");
        apply_virtual_one(
            &mut tree,
            &DiffOp::AddElement {
                route: Route::root(),
                index: 99,
                element: li,
            },
        )
        .expect("append");
        assert_eq!(tree.to_markup(), "<ul><li>b</li><li>a</li><li>b</li></ul>");
        let last = find_node_by_route(&tree, &Route::from(vec![2])).expect("last");
        assert_eq!(last.route(), &Route::from(vec![2]));
    }

    #[test]
    fn relocate_moves_subtree_intact() {
        let mut tree = parse("<ul><li>a</li><li>b</li><li><b>c</b></li></ul>");
        apply_virtual_one(
            &mut tree,
            &DiffOp::RelocateElement {
                from: Route::from(vec![2]),
                to: Route::from(vec![0]),
            },
        )
        .expect("relocate");
        assert_eq!(
            tree.to_markup(),
            "<ul><li><b>c</b></li><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn replace_at_root_swaps_whole_tree() {
        let mut tree = parse("<p>old</p>");
        let new = parse("<section>new</section>");
        let op = DiffOp::ReplaceElement {
            route: Route::root(),
            old_value: tree.clone(),
            new_value: new.clone(),
        };
        apply_virtual_one(&mut tree, &op).expect("replace");
        assert_eq!(tree, new);
    }

    #[test]
    fn failing_op_reports_its_index() {
        let mut tree = parse("<p>x</p>");
        let script = vec![
            DiffOp::AddAttribute {
                route: Route::root(),
                name: "id".into(),
                value: "a".into(),
            },
            DiffOp::ModifyText {
                route: Route::from(vec![3]),
                old_value: "x".into(),
                new_value: "y".into(),
            },
        ];
        let err = apply_virtual(&mut tree, &script).expect_err("second op fails");
        assert_eq!(
            err,
            PatchError::Op {
                index: 1,
                source: Box::new(PatchError::RouteNotFound(Route::from(vec![3]))),
            }
        );
        // No rollback of the first op.
        assert_eq!(tree.attributes().and_then(|a| a.get("id")), Some("a"));
    }

    #[test]
    fn modify_text_on_element_is_a_kind_error() {
        let mut tree = parse("<p>x</p>");
        let err = apply_virtual_one(
            &mut tree,
            &DiffOp::ModifyText {
                route: Route::root(),
                old_value: String::new(),
                new_value: "y".into(),
            },
        )
        .expect_err("element has no data");
        assert!(matches!(err, PatchError::WrongNodeKind { expected: "text or comment", .. }));
    }

    #[test]
    fn undo_restores_form_state() {
        let mut tree = parse("<input type=checkbox>");
        let script = vec![
            DiffOp::ModifyChecked {
                route: Route::root(),
                old_value: None,
                new_value: Some(true),
            },
            DiffOp::ModifyValue {
                route: Route::root(),
                old_value: None,
                new_value: Some("on".into()),
            },
        ];
        let before = tree.clone();
        apply_virtual(&mut tree, &script).expect("apply");
        assert_eq!(tree.as_element().and_then(|e| e.checked), Some(true));
        undo_virtual(&mut tree, &script).expect("undo");
        assert_eq!(tree, before);
    }
}
