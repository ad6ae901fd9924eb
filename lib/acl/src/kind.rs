use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The kind of access an operation requires on a graph.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// Creating a named graph.
    Create,
    /// Dropping a graph.
    Drop,
    /// Removing all quads of a graph.
    Clear,
    /// Inserting ground data.
    InsertData,
    /// Deleting ground data.
    DeleteData,
    /// Inserting the quads of a pattern-driven update.
    Update,
    /// Deleting the quads of a pattern-driven update.
    Delete,
    /// Reading from a graph.
    Query,
}

impl AccessKind {
    pub const ALL: [AccessKind; 8] = [
        AccessKind::Create,
        AccessKind::Drop,
        AccessKind::Clear,
        AccessKind::InsertData,
        AccessKind::DeleteData,
        AccessKind::Update,
        AccessKind::Delete,
        AccessKind::Query,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AccessKind::Create => "create",
            AccessKind::Drop => "drop",
            AccessKind::Clear => "clear",
            AccessKind::InsertData => "insert_data",
            AccessKind::DeleteData => "delete_data",
            AccessKind::Update => "update",
            AccessKind::Delete => "delete",
            AccessKind::Query => "query",
        }
    }

    /// Returns whether this kind mutates the graph.
    pub const fn is_write(self) -> bool {
        !matches!(self, AccessKind::Query)
    }
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
