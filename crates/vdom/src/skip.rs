//! Skip-region resolution.
//!
//! Annotation runs top-down before diffing. A node's own skip state is settled before its
//! children are visited, and nothing below a skipped node is visited at all.

use crate::node::{Route, Skip, VNode};
use crate::options::{DiffHooks, DiffOptions};
use crate::selector::SelectorList;
use crate::traverse::assign_routes;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipMode {
    /// Diff the node itself, never its descendants.
    Children,
    /// Treat the whole subtree as equal.
    #[default]
    Full,
}

impl From<SkipMode> for Skip {
    fn from(mode: SkipMode) -> Self {
        match mode {
            SkipMode::Children => Skip::Children,
            SkipMode::Full => Skip::Full,
        }
    }
}

/// Result of a custom skip predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SkipDecision {
    #[default]
    Continue,
    /// Skip with the configured mode.
    Skip,
    Mode(SkipMode),
}

impl From<bool> for SkipDecision {
    fn from(skip: bool) -> Self {
        if skip {
            SkipDecision::Skip
        } else {
            SkipDecision::Continue
        }
    }
}

impl From<SkipMode> for SkipDecision {
    fn from(mode: SkipMode) -> Self {
        SkipDecision::Mode(mode)
    }
}

/// Answers questions about the live counterpart of a virtual node.
///
/// `None` means the probe has no opinion (for example, the route does not resolve in the live
/// tree) and the virtual matcher is used instead.
pub trait LiveProbe {
    fn matches(&self, route: &Route, selectors: &SelectorList) -> Option<bool>;
}

#[derive(Clone, Copy, Debug)]
pub struct SkipRules<'a> {
    pub selector: Option<&'a SelectorList>,
    pub mode: SkipMode,
}

fn resolve(
    node: &VNode,
    rules: &SkipRules<'_>,
    probe: Option<&dyn LiveProbe>,
    hooks: &dyn DiffHooks,
) -> Skip {
    if matches!(node, VNode::Comment(_)) {
        return Skip::Full;
    }
    let by_selector = rules.selector.is_some_and(|selectors| {
        probe
            .and_then(|probe| probe.matches(node.route(), selectors))
            .unwrap_or_else(|| selectors.matches(node))
    });
    let by_selector: Skip = if by_selector {
        rules.mode.into()
    } else {
        Skip::None
    };
    let by_hook: Skip = match hooks.skip(node, probe) {
        SkipDecision::Continue => Skip::None,
        SkipDecision::Skip => rules.mode.into(),
        SkipDecision::Mode(mode) => mode.into(),
    };
    by_selector.max(by_hook)
}

/// Sets the skip annotation on `node` and, unless it is skipped, on its descendants.
pub fn annotate(
    node: &mut VNode,
    rules: &SkipRules<'_>,
    probe: Option<&dyn LiveProbe>,
    hooks: &dyn DiffHooks,
) {
    let skip = resolve(node, rules, probe, hooks);
    node.set_skip(skip);
    if skip != Skip::None {
        log::trace!(target: "vdom.skip", "{} at {} skipped: {skip:?}", node.node_name(), node.route());
        return;
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            annotate(child, rules, probe, hooks);
        }
    }
}

/// Assigns routes and skip annotations, readying a tree for diffing.
pub fn prepare(
    node: &mut VNode,
    options: &DiffOptions,
    probe: Option<&dyn LiveProbe>,
    hooks: &dyn DiffHooks,
) {
    assign_routes(node);
    annotate(node, &options.skip_rules(), probe, hooks);
}
