//! Live document tree and the patch engine that replays edit scripts against it.

mod convert;
mod document;
mod error;
mod patch;
mod probe;

pub use crate::convert::{ConvertOptions, to_live, to_virtual};
pub use crate::document::{Document, ElementData, NodeData, NodeKey};
pub use crate::error::{ApplyError, DomError};
pub use crate::patch::{NoPatchHooks, PatchContext, PatchHooks, apply, apply_one, undo};
pub use crate::probe::DocumentProbe;
