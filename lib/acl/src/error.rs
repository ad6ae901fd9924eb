use crate::AccessKind;
use rdf_update_model::{GraphName, GraphNameRef};

/// Raised when an [AccessPolicy](crate::AccessPolicy) refuses an access.
///
/// The error carries the full context of the refused check and is never suppressed by `SILENT`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("User '{user}' is not allowed to {kind} on graph {graph}")]
pub struct AccessDeniedError {
    user: String,
    graph: GraphName,
    kind: AccessKind,
}

impl AccessDeniedError {
    pub fn new(user: impl Into<String>, graph: GraphNameRef<'_>, kind: AccessKind) -> Self {
        Self {
            user: user.into(),
            graph: graph.into_owned(),
            kind,
        }
    }

    /// The user that was refused.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The graph the user attempted to access.
    pub fn graph(&self) -> &GraphName {
        &self.graph
    }

    pub fn kind(&self) -> AccessKind {
        self.kind
    }
}
