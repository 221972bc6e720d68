use crate::node::VNode;
use crate::ops::{DiffOp, EditScript};
use crate::selector::SelectorList;
use crate::skip::{LiveProbe, SkipDecision, SkipMode, SkipRules};

#[derive(Clone, Debug)]
pub struct DiffOptions {
    /// Elements matching this list are skipped with `skip_mode`.
    pub skip_selector: Option<SelectorList>,
    /// Attribute names never compared.
    pub skip_attributes: Vec<String>,
    /// Never descend into children of element pairs.
    pub skip_children: bool,
    pub skip_mode: SkipMode,
    pub debug: bool,
    /// Best-effort limit on script length; honored only when `debug` is on.
    pub diff_cap: Option<usize>,
    pub value_diffing: bool,
    pub case_sensitive: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            skip_selector: None,
            skip_attributes: Vec::new(),
            skip_children: false,
            skip_mode: SkipMode::Full,
            debug: false,
            diff_cap: None,
            value_diffing: true,
            case_sensitive: false,
        }
    }
}

impl DiffOptions {
    pub fn skip_rules(&self) -> SkipRules<'_> {
        SkipRules {
            selector: self.skip_selector.as_ref(),
            mode: self.skip_mode,
        }
    }

    pub fn effective_cap(&self) -> Option<usize> {
        if self.debug { self.diff_cap } else { None }
    }

    pub fn skips_attribute(&self, name: &str) -> bool {
        self.skip_attributes.iter().any(|skipped| skipped == name)
    }
}

/// Caller-supplied strategy hooks for the diff engine. Every method has a no-op default.
pub trait DiffHooks {
    /// Custom skip predicate, consulted for every annotated node.
    fn skip(&self, _node: &VNode, _probe: Option<&dyn LiveProbe>) -> SkipDecision {
        SkipDecision::Continue
    }

    /// Runs before an emitted op is applied to the working copy; `true` leaves the working
    /// copy untouched for that op.
    fn pre_virtual_apply(&self, _working: &VNode, _op: &DiffOp) -> bool {
        false
    }

    fn post_virtual_apply(&self, _working: &VNode, _op: &DiffOp) {}

    /// Post-processes the complete script of the outermost pair, once.
    fn filter_outer_diff(&self, _old: &VNode, _new: &VNode, _script: &mut EditScript) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl DiffHooks for NoHooks {}
