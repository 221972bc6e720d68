//! Replaying edit scripts against a live document.
//!
//! Operations run strictly in order. Routes resolve against the document as earlier operations
//! left it, and a failure stops the replay without rolling anything back.

use crate::convert::to_live;
use crate::document::{Document, NodeKey};
use crate::error::{ApplyError, DomError};
use vdom::{DiffOp, Route, invert_script};

/// Caller-supplied strategy hooks for the patch engine. Every method has a no-op default.
pub trait PatchHooks {
    /// Runs before an operation; `true` marks it handled and skips the default action.
    fn pre_apply(&self, _doc: &Document, _op: &DiffOp) -> bool {
        false
    }

    /// Runs after the default action of an operation succeeded.
    fn post_apply(&self, _doc: &Document, _op: &DiffOp) {}

    /// Custom text patching for `ModifyText`. Return `true` once the change has been applied to
    /// `node`; `false` falls back to replacing the data.
    fn text_diff(
        &self,
        _doc: &mut Document,
        _node: NodeKey,
        _current: &str,
        _old_value: &str,
        _new_value: &str,
    ) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoPatchHooks;

impl PatchHooks for NoPatchHooks {}

#[derive(Clone, Copy)]
pub struct PatchContext<'a> {
    pub hooks: &'a dyn PatchHooks,
    /// Log failing operations through `log::debug!`.
    pub debug: bool,
}

impl Default for PatchContext<'_> {
    fn default() -> Self {
        Self {
            hooks: &NoPatchHooks,
            debug: false,
        }
    }
}

impl<'a> PatchContext<'a> {
    pub fn new(hooks: &'a dyn PatchHooks, debug: bool) -> Self {
        Self { hooks, debug }
    }
}

fn resolve(doc: &Document, route: &Route) -> Result<NodeKey, ApplyError> {
    doc.node_at_route(route)
        .ok_or_else(|| ApplyError::RouteNotFound(route.clone()))
}

fn apply_default(doc: &mut Document, op: &DiffOp, hooks: &dyn PatchHooks) -> Result<(), ApplyError> {
    match op {
        DiffOp::AddElement {
            route,
            index,
            element,
        } => {
            let parent = resolve(doc, route)?;
            let child = to_live(doc, element);
            if let Err(err) = doc.insert_child(parent, *index, child) {
                doc.remove(child)?;
                return Err(err.into());
            }
        }
        DiffOp::RemoveElement { route, .. } => {
            let key = resolve(doc, route)?;
            doc.remove(key)?;
        }
        DiffOp::RelocateElement { from, to } => {
            if from.is_root() {
                return Err(ApplyError::RouteNotFound(from.clone()));
            }
            let key = resolve(doc, from)?;
            let (to_parent, to_index) = to
                .split_last()
                .ok_or_else(|| ApplyError::RouteNotFound(to.clone()))?;
            let origin = doc.detach(key)?;
            let target = doc
                .node_at_route(&to_parent)
                .ok_or_else(|| ApplyError::RouteNotFound(to.clone()))
                .and_then(|parent| {
                    doc.insert_child(parent, to_index, key)
                        .map_err(ApplyError::from)
                });
            if let Err(err) = target {
                // Put the node back so a failed relocation leaves the document unchanged.
                if let Some((parent, position)) = origin {
                    doc.insert_child(parent, position, key)?;
                }
                return Err(err);
            }
        }
        DiffOp::ModifyText {
            route,
            old_value,
            new_value,
        } => {
            let key = resolve(doc, route)?;
            let Some(current) = doc.text(key).map(str::to_owned) else {
                return Err(DomError::WrongNodeKind {
                    key,
                    expected: "text or comment",
                }
                .into());
            };
            if !hooks.text_diff(doc, key, &current, old_value, new_value) {
                doc.set_text(key, new_value)?;
            }
        }
        DiffOp::ReplaceElement {
            route, new_value, ..
        } => {
            // A rootless document reads as an empty fragment, so replacing its root installs one.
            if route.is_root() && doc.root().is_none() {
                let replacement = to_live(doc, new_value);
                doc.set_root(replacement)?;
                return Ok(());
            }
            let key = resolve(doc, route)?;
            let replacement = to_live(doc, new_value);
            if let Err(err) = doc.replace(key, replacement) {
                doc.remove(replacement)?;
                return Err(err.into());
            }
        }
        DiffOp::AddAttribute { route, name, value } => {
            let key = resolve(doc, route)?;
            doc.set_attribute(key, name, value.as_str())?;
        }
        DiffOp::ModifyAttribute {
            route,
            name,
            new_value,
            ..
        } => {
            let key = resolve(doc, route)?;
            doc.set_attribute(key, name, new_value.as_str())?;
        }
        DiffOp::RemoveAttribute { route, name, .. } => {
            let key = resolve(doc, route)?;
            doc.remove_attribute(key, name)?;
        }
        DiffOp::ModifyValue {
            route, new_value, ..
        } => {
            let key = resolve(doc, route)?;
            doc.set_value(key, new_value.clone())?;
        }
        DiffOp::ModifyChecked {
            route, new_value, ..
        } => {
            let key = resolve(doc, route)?;
            doc.set_checked(key, *new_value)?;
        }
        DiffOp::ModifySelected {
            route, new_value, ..
        } => {
            let key = resolve(doc, route)?;
            doc.set_selected(key, *new_value)?;
        }
    }
    Ok(())
}

/// Applies one operation, consulting the hooks around the default action.
pub fn apply_one(doc: &mut Document, op: &DiffOp, cx: &PatchContext<'_>) -> Result<(), ApplyError> {
    if cx.hooks.pre_apply(doc, op) {
        log::trace!(target: "live_dom.patch", "{} at {} handled by hook", op.action(), op.route());
        return Ok(());
    }
    if let Err(err) = apply_default(doc, op, cx.hooks) {
        if cx.debug {
            log::debug!(target: "live_dom.patch", "{} at {} failed: {err}", op.action(), op.route());
        }
        return Err(err);
    }
    log::trace!(target: "live_dom.patch", "{} at {}", op.action(), op.route());
    cx.hooks.post_apply(doc, op);
    Ok(())
}

/// Applies `script` in order, stopping at the first failing operation.
pub fn apply(doc: &mut Document, script: &[DiffOp], cx: &PatchContext<'_>) -> Result<(), ApplyError> {
    for (index, op) in script.iter().enumerate() {
        apply_one(doc, op, cx).map_err(|source| ApplyError::Op {
            index,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Reverts a previously applied `script` by applying its inverse.
pub fn undo(doc: &mut Document, script: &[DiffOp], cx: &PatchContext<'_>) -> Result<(), ApplyError> {
    apply(doc, &invert_script(script), cx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use vdom::{ParseOptions, VNode, parse_markup};

    fn doc(markup: &str) -> Document {
        Document::from_markup(markup, &ParseOptions::default())
    }

    fn node(markup: &str) -> VNode {
        parse_markup(markup, &ParseOptions::default())
    }

    #[test]
    fn add_inserts_at_index_or_appends() {
        let mut doc = doc("<ul><li>a</li></ul>");
        let cx = PatchContext::default();
        let script = vec![
            DiffOp::AddElement {
                route: Route::root(),
                index: 0,
                element: node("<li>b</li>"),
            },
            DiffOp::AddElement {
                route: Route::root(),
                index: 42,
                element: node("<li>c</li>"),
            },
        ];
        apply(&mut doc, &script, &cx).expect("apply");
        assert_eq!(doc.to_markup(), "<ul><li>b</li><li>a</li><li>c</li></ul>");
    }

    #[test]
    fn relocate_keeps_node_identity() {
        let mut doc = doc("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let moved = doc.node_at_route(&Route::from(vec![2])).expect("li");
        let op = DiffOp::RelocateElement {
            from: Route::from(vec![2]),
            to: Route::from(vec![0]),
        };
        apply_one(&mut doc, &op, &PatchContext::default()).expect("relocate");
        assert_eq!(doc.node_at_route(&Route::from(vec![0])), Some(moved));
        assert_eq!(doc.to_markup(), "<ul><li>c</li><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn failed_relocation_restores_the_node() {
        let mut doc = doc("<ul><li>a</li><li>b</li></ul>");
        let op = DiffOp::RelocateElement {
            from: Route::from(vec![0]),
            to: Route::from(vec![5, 0]),
        };
        let err = apply_one(&mut doc, &op, &PatchContext::default()).expect_err("bad target");
        assert_eq!(err, ApplyError::RouteNotFound(Route::from(vec![5, 0])));
        assert_eq!(doc.to_markup(), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn replace_at_root_swaps_document_root() {
        let mut doc = doc("<p>old</p>");
        let op = DiffOp::ReplaceElement {
            route: Route::root(),
            old_value: node("<p>old</p>"),
            new_value: node("<section>new</section>"),
        };
        apply_one(&mut doc, &op, &PatchContext::default()).expect("replace");
        assert_eq!(doc.to_markup(), "<section>new</section>");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn replace_at_root_fills_an_empty_document() {
        let mut doc = Document::new();
        let op = DiffOp::ReplaceElement {
            route: Route::root(),
            old_value: VNode::fragment(Vec::new()),
            new_value: node("<p>x</p>"),
        };
        apply_one(&mut doc, &op, &PatchContext::default()).expect("replace");
        assert_eq!(doc.to_markup(), "<p>x</p>");

        undo(&mut doc, &[op], &PatchContext::default()).expect("undo");
        assert_eq!(doc.to_markup(), "");
    }

    #[test]
    fn missing_route_fails_with_op_index_and_no_rollback() {
        let mut doc = doc("<p>x</p>");
        let script = vec![
            DiffOp::AddAttribute {
                route: Route::root(),
                name: "id".into(),
                value: "a".into(),
            },
            DiffOp::RemoveElement {
                route: Route::from(vec![4]),
                element: node("<b>gone</b>"),
            },
        ];
        let err = apply(&mut doc, &script, &PatchContext::default()).expect_err("fails");
        assert_eq!(
            err,
            ApplyError::Op {
                index: 1,
                source: Box::new(ApplyError::RouteNotFound(Route::from(vec![4]))),
            }
        );
        assert_eq!(doc.to_markup(), "<p id=\"a\">x</p>");
    }

    #[test]
    fn adding_under_a_void_element_is_rejected_cleanly() {
        let mut doc = doc("<img src=\"a\">");
        let before = doc.len();
        let op = DiffOp::AddElement {
            route: Route::root(),
            index: 0,
            element: node("<b>x</b>"),
        };
        let err = apply_one(&mut doc, &op, &PatchContext::default()).expect_err("void");
        assert!(matches!(err, ApplyError::Dom(_)));
        assert_eq!(doc.len(), before);
    }

    #[derive(Default)]
    struct Recording {
        veto_attributes: bool,
        seen: RefCell<Vec<String>>,
    }

    impl PatchHooks for Recording {
        fn pre_apply(&self, _doc: &Document, op: &DiffOp) -> bool {
            self.seen.borrow_mut().push(format!("pre {}", op.action()));
            self.veto_attributes && matches!(op, DiffOp::AddAttribute { .. })
        }

        fn post_apply(&self, _doc: &Document, op: &DiffOp) {
            self.seen.borrow_mut().push(format!("post {}", op.action()));
        }

        fn text_diff(
            &self,
            doc: &mut Document,
            node: NodeKey,
            current: &str,
            _old_value: &str,
            new_value: &str,
        ) -> bool {
            self.seen.borrow_mut().push(format!("text {current}->{new_value}"));
            doc.set_text(node, &new_value.to_uppercase()).is_ok()
        }
    }

    #[test]
    fn hooks_veto_observe_and_patch_text() {
        let hooks = Recording {
            veto_attributes: true,
            ..Recording::default()
        };
        let cx = PatchContext::new(&hooks, true);
        let mut doc = doc("<p>abc</p>");
        let script = vec![
            DiffOp::AddAttribute {
                route: Route::root(),
                name: "id".into(),
                value: "a".into(),
            },
            DiffOp::ModifyText {
                route: Route::from(vec![0]),
                old_value: "abc".into(),
                new_value: "xyz".into(),
            },
        ];
        apply(&mut doc, &script, &cx).expect("apply");
        assert_eq!(doc.to_markup(), "<p>XYZ</p>");
        assert_eq!(
            *hooks.seen.borrow(),
            [
                "pre addAttribute",
                "pre modifyText",
                "text abc->xyz",
                "post modifyText"
            ]
        );
    }

    #[test]
    fn undo_reverts_form_state_and_attributes() {
        let mut doc = doc("<input type=\"text\">");
        let cx = PatchContext::default();
        let script = vec![
            DiffOp::ModifyValue {
                route: Route::root(),
                old_value: None,
                new_value: Some("hi".into()),
            },
            DiffOp::ModifyAttribute {
                route: Route::root(),
                name: "type".into(),
                old_value: "text".into(),
                new_value: "search".into(),
            },
        ];
        apply(&mut doc, &script, &cx).expect("apply");
        let input = doc.root().expect("root");
        assert_eq!(doc.value(input), Some("hi"));
        assert_eq!(doc.attribute(input, "type"), Some("search"));
        undo(&mut doc, &script, &cx).expect("undo");
        assert_eq!(doc.value(input), None);
        assert_eq!(doc.to_markup(), "<input type=\"text\">");
    }
}
