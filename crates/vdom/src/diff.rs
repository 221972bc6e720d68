//! Edit-script computation.
//!
//! The recursion walks the prepared old tree alongside the new one while tracking where each
//! old node currently sits in the working copy. Every emitted op is applied to the working copy
//! immediately, so each route in the script is valid against the tree produced by the ops
//! before it.
//!
//! Within a child list the order is: matched pairs in new-index order (relocation first, then
//! the pair's own diff), then removals from the highest position down, then additions from the
//! lowest index up.

use crate::matcher::reconcile;
use crate::node::{Element, Route, Skip, VNode};
use crate::ops::{DiffOp, EditScript};
use crate::options::{DiffHooks, DiffOptions};
use crate::patch::apply_virtual_one;
use crate::skip::prepare;

/// Computes the edit script turning `old` into `new`.
///
/// Both trees are cloned, routed and annotated with the skip rules from `options` first.
pub fn diff(old: &VNode, new: &VNode, options: &DiffOptions, hooks: &dyn DiffHooks) -> EditScript {
    let mut old = old.clone();
    let mut new = new.clone();
    prepare(&mut old, options, None, hooks);
    prepare(&mut new, options, None, hooks);
    diff_prepared(&old, &new, options, hooks)
}

/// Like [`diff`], for trees already passed through [`prepare`] (for example with a live probe).
pub fn diff_prepared(
    old: &VNode,
    new: &VNode,
    options: &DiffOptions,
    hooks: &dyn DiffHooks,
) -> EditScript {
    let mut differ = Differ {
        options,
        hooks,
        working: old.clone(),
        script: Vec::new(),
        cap: options.effective_cap(),
        cap_logged: false,
    };
    differ.diff_node(old, new, Route::root());
    let mut script = differ.script;
    hooks.filter_outer_diff(old, new, &mut script);
    log::debug!(target: "vdom.diff", "diff produced {} operations", script.len());
    script
}

struct Differ<'a> {
    options: &'a DiffOptions,
    hooks: &'a dyn DiffHooks,
    working: VNode,
    script: EditScript,
    cap: Option<usize>,
    cap_logged: bool,
}

fn same_shape(old: &VNode, new: &VNode) -> bool {
    if old.kind() != new.kind() || old.node_name() != new.node_name() {
        return false;
    }
    match (old, new) {
        (VNode::Element(a), VNode::Element(b)) => a.children.is_some() == b.children.is_some(),
        _ => true,
    }
}

impl Differ<'_> {
    fn cap_reached(&mut self) -> bool {
        let Some(cap) = self.cap else {
            return false;
        };
        if self.script.len() < cap {
            return false;
        }
        if !self.cap_logged {
            log::debug!(target: "vdom.diff", "diff cap of {cap} reached, stopping early");
            self.cap_logged = true;
        }
        true
    }

    fn emit(&mut self, op: DiffOp) {
        log::trace!(target: "vdom.diff", "{} {}", op.action(), op.route());
        if !self.hooks.pre_virtual_apply(&self.working, &op) {
            if let Err(err) = apply_virtual_one(&mut self.working, &op) {
                log::debug!(target: "vdom.diff", "working copy rejected {}: {err}", op.action());
            }
            self.hooks.post_virtual_apply(&self.working, &op);
        }
        self.script.push(op);
    }

    fn diff_node(&mut self, old: &VNode, new: &VNode, route: Route) {
        if self.cap_reached() {
            return;
        }
        // Comments are always annotated `Skip::Full`, which only hides their content. A comment
        // facing any other kind of node is still replaced.
        let has_comment = matches!(old, VNode::Comment(_)) || matches!(new, VNode::Comment(_));
        let same = same_shape(old, new);
        if (!has_comment || same) && (old.skip() == Skip::Full || new.skip() == Skip::Full) {
            return;
        }
        if !same {
            self.emit(DiffOp::ReplaceElement {
                route,
                old_value: old.clone(),
                new_value: new.clone(),
            });
            return;
        }
        let descend = old.skip() != Skip::Children && new.skip() != Skip::Children;
        match (old, new) {
            (VNode::Text(a), VNode::Text(b)) | (VNode::Comment(a), VNode::Comment(b)) => {
                if a.data != b.data {
                    self.emit(DiffOp::ModifyText {
                        route,
                        old_value: a.data.clone(),
                        new_value: b.data.clone(),
                    });
                }
            }
            (VNode::Element(a), VNode::Element(b)) => {
                self.diff_attributes(a, b, &route);
                if self.options.value_diffing {
                    self.diff_form_state(a, b, &route);
                }
                if descend && !self.options.skip_children {
                    if let (Some(old_children), Some(new_children)) = (&a.children, &b.children) {
                        self.diff_children(old_children, new_children, &route);
                    }
                }
            }
            (VNode::Fragment(a), VNode::Fragment(b)) => {
                if descend {
                    self.diff_children(&a.children, &b.children, &route);
                }
            }
            _ => {}
        }
    }

    fn diff_attributes(&mut self, old: &Element, new: &Element, route: &Route) {
        for (name, old_value) in old.attributes.iter() {
            if self.options.skips_attribute(name) {
                continue;
            }
            match new.attributes.get(name) {
                None => self.emit(DiffOp::RemoveAttribute {
                    route: route.clone(),
                    name: name.to_string(),
                    value: old_value.to_string(),
                }),
                Some(new_value) if new_value != old_value => {
                    self.emit(DiffOp::ModifyAttribute {
                        route: route.clone(),
                        name: name.to_string(),
                        old_value: old_value.to_string(),
                        new_value: new_value.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        for (name, value) in new.attributes.iter() {
            if self.options.skips_attribute(name) || old.attributes.contains(name) {
                continue;
            }
            self.emit(DiffOp::AddAttribute {
                route: route.clone(),
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    fn diff_form_state(&mut self, old: &Element, new: &Element, route: &Route) {
        if new.value.is_some() && new.value != old.value {
            self.emit(DiffOp::ModifyValue {
                route: route.clone(),
                old_value: old.value.clone(),
                new_value: new.value.clone(),
            });
        }
        if new.checked.is_some() && new.checked != old.checked {
            self.emit(DiffOp::ModifyChecked {
                route: route.clone(),
                old_value: old.checked,
                new_value: new.checked,
            });
        }
        if new.selected.is_some() && new.selected != old.selected {
            self.emit(DiffOp::ModifySelected {
                route: route.clone(),
                old_value: old.selected,
                new_value: new.selected,
            });
        }
    }

    fn diff_children(&mut self, old: &[VNode], new: &[VNode], route: &Route) {
        let mut pairs = reconcile(old, new);
        // In new-index order the child of pair `target` only moves toward the front, to position
        // `target`, past children not placed yet; positions 0..target are final. Old-index order
        // loses this once a relocation has shifted the siblings.
        pairs.sort_unstable_by_key(|&(_, new_index)| new_index);

        // `order[p]` is the old index of the child currently at position `p`.
        let mut order: Vec<usize> = (0..old.len()).collect();
        let mut new_matched = vec![false; new.len()];

        for (target, &(old_index, new_index)) in pairs.iter().enumerate() {
            if self.cap_reached() {
                return;
            }
            new_matched[new_index] = true;
            let Some(current) = order.iter().position(|&i| i == old_index) else {
                continue;
            };
            debug_assert!(current >= target, "placed children never move again");
            if current != target {
                self.emit(DiffOp::RelocateElement {
                    from: route.child(current),
                    to: route.child(target),
                });
                let moved = order.remove(current);
                order.insert(target, moved);
            }
            self.diff_node(&old[old_index], &new[new_index], route.child(target));
        }

        for position in (pairs.len()..order.len()).rev() {
            if self.cap_reached() {
                return;
            }
            self.emit(DiffOp::RemoveElement {
                route: route.child(position),
                element: old[order[position]].clone(),
            });
        }

        for (index, child) in new.iter().enumerate() {
            if new_matched[index] {
                continue;
            }
            if self.cap_reached() {
                return;
            }
            self.emit(DiffOp::AddElement {
                route: route.clone(),
                index,
                element: child.clone(),
            });
        }
    }
}
