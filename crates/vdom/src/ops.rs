//! Edit-script operations.
//!
//! Routes in an operation address the tree as it stands after every earlier operation of the
//! same script has been applied.

use crate::node::{Route, VNode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiffOp {
    /// Insert `element` as child `index` of the node at `route`.
    AddElement {
        route: Route,
        index: usize,
        element: VNode,
    },
    RemoveElement {
        route: Route,
        element: VNode,
    },
    /// Detach the node at `from`, then insert it so that it ends up at `to`.
    RelocateElement {
        from: Route,
        to: Route,
    },
    ModifyText {
        route: Route,
        old_value: String,
        new_value: String,
    },
    ReplaceElement {
        route: Route,
        old_value: VNode,
        new_value: VNode,
    },
    AddAttribute {
        route: Route,
        name: String,
        value: String,
    },
    RemoveAttribute {
        route: Route,
        name: String,
        value: String,
    },
    ModifyAttribute {
        route: Route,
        name: String,
        old_value: String,
        new_value: String,
    },
    ModifyValue {
        route: Route,
        old_value: Option<String>,
        new_value: Option<String>,
    },
    ModifyChecked {
        route: Route,
        old_value: Option<bool>,
        new_value: Option<bool>,
    },
    ModifySelected {
        route: Route,
        old_value: Option<bool>,
        new_value: Option<bool>,
    },
}

pub type EditScript = Vec<DiffOp>;

impl DiffOp {
    /// Target route. For relocations this is the source position.
    pub fn route(&self) -> &Route {
        match self {
            DiffOp::RelocateElement { from, .. } => from,
            DiffOp::AddElement { route, .. }
            | DiffOp::RemoveElement { route, .. }
            | DiffOp::ModifyText { route, .. }
            | DiffOp::ReplaceElement { route, .. }
            | DiffOp::AddAttribute { route, .. }
            | DiffOp::RemoveAttribute { route, .. }
            | DiffOp::ModifyAttribute { route, .. }
            | DiffOp::ModifyValue { route, .. }
            | DiffOp::ModifyChecked { route, .. }
            | DiffOp::ModifySelected { route, .. } => route,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            DiffOp::AddElement { .. } => "addElement",
            DiffOp::RemoveElement { .. } => "removeElement",
            DiffOp::RelocateElement { .. } => "relocateElement",
            DiffOp::ModifyText { .. } => "modifyText",
            DiffOp::ReplaceElement { .. } => "replaceElement",
            DiffOp::AddAttribute { .. } => "addAttribute",
            DiffOp::RemoveAttribute { .. } => "removeAttribute",
            DiffOp::ModifyAttribute { .. } => "modifyAttribute",
            DiffOp::ModifyValue { .. } => "modifyValue",
            DiffOp::ModifyChecked { .. } => "modifyChecked",
            DiffOp::ModifySelected { .. } => "modifySelected",
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DiffOp::AddElement { .. }
                | DiffOp::RemoveElement { .. }
                | DiffOp::RelocateElement { .. }
                | DiffOp::ReplaceElement { .. }
        )
    }

    /// The operation that undoes `self` when applied right after it.
    pub fn invert(&self) -> DiffOp {
        match self.clone() {
            DiffOp::AddElement {
                route,
                index,
                element,
            } => DiffOp::RemoveElement {
                route: route.child(index),
                element,
            },
            DiffOp::RemoveElement { route, element } => {
                let (parent, index) = route.split_last().unwrap_or((Route::root(), 0));
                DiffOp::AddElement {
                    route: parent,
                    index,
                    element,
                }
            }
            DiffOp::RelocateElement { from, to } => DiffOp::RelocateElement { from: to, to: from },
            DiffOp::ModifyText {
                route,
                old_value,
                new_value,
            } => DiffOp::ModifyText {
                route,
                old_value: new_value,
                new_value: old_value,
            },
            DiffOp::ReplaceElement {
                route,
                old_value,
                new_value,
            } => DiffOp::ReplaceElement {
                route,
                old_value: new_value,
                new_value: old_value,
            },
            DiffOp::AddAttribute { route, name, value } => {
                DiffOp::RemoveAttribute { route, name, value }
            }
            DiffOp::RemoveAttribute { route, name, value } => {
                DiffOp::AddAttribute { route, name, value }
            }
            DiffOp::ModifyAttribute {
                route,
                name,
                old_value,
                new_value,
            } => DiffOp::ModifyAttribute {
                route,
                name,
                old_value: new_value,
                new_value: old_value,
            },
            DiffOp::ModifyValue {
                route,
                old_value,
                new_value,
            } => DiffOp::ModifyValue {
                route,
                old_value: new_value,
                new_value: old_value,
            },
            DiffOp::ModifyChecked {
                route,
                old_value,
                new_value,
            } => DiffOp::ModifyChecked {
                route,
                old_value: new_value,
                new_value: old_value,
            },
            DiffOp::ModifySelected {
                route,
                old_value,
                new_value,
            } => DiffOp::ModifySelected {
                route,
                old_value: new_value,
                new_value: old_value,
            },
        }
    }
}

/// Inverts every operation and reverses the order, so the result undoes `script`.
pub fn invert_script(script: &[DiffOp]) -> EditScript {
    script.iter().rev().map(DiffOp::invert).collect()
}
