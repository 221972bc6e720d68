pub mod diff;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod golden_corpus;
pub mod matcher;
pub mod perf_fixtures;
pub mod selector;
pub mod skip;
pub mod traverse;

mod builder;
mod entities;
mod error;
mod node;
mod ops;
mod options;
mod patch;
mod serialize;
mod tokenizer;

pub use crate::builder::{ParseOptions, parse_markup};
pub use crate::diff::{diff, diff_prepared};
pub use crate::error::{PatchError, SelectorError};
pub use crate::matcher::{
    BEST_MATCH_THRESHOLD, POSITION_MATCH_THRESHOLD, calculate_similarity, element_key,
    elements_match, find_best_match, reconcile,
};
pub use crate::node::{
    Attributes, CharacterData, Element, FormFields, Fragment, NodeKind, Route, Skip, VNode,
    form_fields, is_svg, is_void_element, normalize_attribute_name, normalize_name,
};
pub use crate::ops::{DiffOp, EditScript, invert_script};
pub use crate::options::{DiffHooks, DiffOptions, NoHooks};
pub use crate::patch::{apply_virtual, apply_virtual_one, undo_virtual};
pub use crate::selector::SelectorList;
pub use crate::serialize::{serialize, serialize_with};
pub use crate::skip::{LiveProbe, SkipDecision, SkipMode, SkipRules, annotate, prepare};
pub use crate::tokenizer::{Token, tokenize};
pub use crate::traverse::{assign_routes, assign_routes_from, find_node_by_route};
