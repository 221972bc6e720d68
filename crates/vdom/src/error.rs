use crate::node::{NodeKind, Route};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector in list {0:?}")]
    Empty(String),
    #[error("expected a name in selector {0:?}")]
    ExpectedName(String),
    #[error("unclosed attribute selector in {0:?}")]
    UnclosedAttribute(String),
    #[error("unexpected {found:?} in selector {selector:?}")]
    Unexpected { selector: String, found: char },
}

/// Failure to apply an operation to a virtual tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("no node at route {0}")]
    RouteNotFound(Route),
    #[error("node at route {route} is a {found}, expected {expected}")]
    WrongNodeKind {
        route: Route,
        expected: &'static str,
        found: NodeKind,
    },
    #[error("node at route {0} cannot have children")]
    NoChildren(Route),
    #[error("operation {index} failed: {source}")]
    Op {
        index: usize,
        #[source]
        source: Box<PatchError>,
    },
}
