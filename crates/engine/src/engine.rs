use crate::config::{ConfigError, EngineConfig};
use crate::input::Input;
use live_dom::{
    ApplyError, ConvertOptions, Document, DocumentProbe, NoPatchHooks, PatchContext, PatchHooks,
};
use std::fmt;
use std::sync::Arc;
use vdom::{
    DiffHooks, DiffOp, DiffOptions, EditScript, LiveProbe, NoHooks, ParseOptions, VNode,
    diff_prepared, parse_markup, prepare,
};

/// Fixed options and hooks an [`Engine`] is bound to.
#[derive(Clone)]
pub struct EngineOptions {
    pub diff: DiffOptions,
    pub diff_hooks: Arc<dyn DiffHooks>,
    pub patch_hooks: Arc<dyn PatchHooks>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            diff: DiffOptions::default(),
            diff_hooks: Arc::new(NoHooks),
            patch_hooks: Arc::new(NoPatchHooks),
        }
    }
}

impl From<DiffOptions> for EngineOptions {
    fn from(diff: DiffOptions) -> Self {
        Self {
            diff,
            ..Self::default()
        }
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}

/// Diff, apply and undo bound to one set of options.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.into_options()?.into()))
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            case_sensitive: self.options.diff.case_sensitive,
        }
    }

    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions::from(&self.options.diff)
    }

    pub fn parse(&self, markup: &str) -> VNode {
        parse_markup(markup, &self.parse_options())
    }

    /// Normalizes any input to a virtual tree. An empty document becomes an empty fragment.
    pub fn to_virtual<'a>(&self, input: impl Into<Input<'a>>) -> VNode {
        match input.into() {
            Input::Markup(markup) => self.parse(markup),
            Input::Live(doc) => doc
                .to_virtual(&self.convert_options())
                .unwrap_or_else(|| VNode::fragment(Vec::new())),
            Input::Virtual(node) => node.into_owned(),
        }
    }

    /// Serializes any input so that [`Engine::parse`] reads it back as the same tree.
    pub fn to_markup<'a>(&self, input: impl Into<Input<'a>>) -> String {
        self.to_virtual(input).to_markup_with(&self.parse_options())
    }

    /// Builds a fresh live document from any input.
    pub fn materialize<'a>(&self, input: impl Into<Input<'a>>) -> Document {
        match input.into() {
            Input::Live(doc) => doc.clone(),
            other => Document::from_virtual(&self.to_virtual(other)),
        }
    }

    /// Computes the edit script turning `left` into `right`.
    ///
    /// A live side answers selector questions through its own document.
    pub fn diff<'l, 'r>(
        &self,
        left: impl Into<Input<'l>>,
        right: impl Into<Input<'r>>,
    ) -> EditScript {
        let left = left.into();
        let right = right.into();
        log::debug!(target: "engine", "diff {} against {}", left.kind(), right.kind());
        let old = self.prepared(left);
        let new = self.prepared(right);
        diff_prepared(&old, &new, &self.options.diff, self.options.diff_hooks.as_ref())
    }

    fn prepared(&self, input: Input<'_>) -> VNode {
        let doc = match &input {
            Input::Live(doc) => Some(*doc),
            _ => None,
        };
        let mut tree = self.to_virtual(input);
        let probe = doc.map(DocumentProbe::new);
        prepare(
            &mut tree,
            &self.options.diff,
            probe.as_ref().map(|probe| probe as &dyn LiveProbe),
            self.options.diff_hooks.as_ref(),
        );
        tree
    }

    fn patch_context(&self) -> PatchContext<'_> {
        PatchContext::new(self.options.patch_hooks.as_ref(), self.options.diff.debug)
    }

    pub fn apply(&self, doc: &mut Document, script: &[DiffOp]) -> Result<(), ApplyError> {
        live_dom::apply(doc, script, &self.patch_context())
    }

    pub fn undo(&self, doc: &mut Document, script: &[DiffOp]) -> Result<(), ApplyError> {
        live_dom::undo(doc, script, &self.patch_context())
    }
}

/// [`Engine::diff`] with default options.
pub fn diff<'l, 'r>(left: impl Into<Input<'l>>, right: impl Into<Input<'r>>) -> EditScript {
    Engine::default().diff(left, right)
}

/// [`Engine::apply`] with default options.
pub fn apply(doc: &mut Document, script: &[DiffOp]) -> Result<(), ApplyError> {
    Engine::default().apply(doc, script)
}

/// [`Engine::undo`] with default options.
pub fn undo(doc: &mut Document, script: &[DiffOp]) -> Result<(), ApplyError> {
    Engine::default().undo(doc, script)
}
