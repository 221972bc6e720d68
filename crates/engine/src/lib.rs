//! Entry points over the diff and patch engines, bound to one configuration.

mod config;
mod engine;
mod input;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::engine::{Engine, EngineOptions, apply, diff, undo};
pub use crate::input::Input;
