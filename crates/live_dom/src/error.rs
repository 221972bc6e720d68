use crate::document::NodeKey;
use thiserror::Error;
use vdom::Route;

/// Misuse of the document arena.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0}")]
    UnknownNode(NodeKey),
    #[error("node {0} cannot have children")]
    NotAContainer(NodeKey),
    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeKey),
    #[error("node {0} is the document root")]
    IsRoot(NodeKey),
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeKey, child: NodeKey },
    #[error("node {key} is not {expected}")]
    WrongNodeKind { key: NodeKey, expected: &'static str },
}

/// Failure to apply an operation to a live document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("no node at route {0}")]
    RouteNotFound(Route),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("operation {index} failed: {source}")]
    Op {
        index: usize,
        #[source]
        source: Box<ApplyError>,
    },
}
