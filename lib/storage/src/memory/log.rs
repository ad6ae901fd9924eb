use crate::memory::content::Content;
use rdf_update_model::{NamedOrBlankNode, Quad, Triple};

/// A single change performed by a [MemoryTransaction](super::MemoryTransaction).
#[derive(Clone, Debug)]
pub(super) enum LogEntry {
    InsertedTriple(Triple),
    RemovedTriple(Triple),
    InsertedQuad(Quad),
    RemovedQuad(Quad),
    InsertedGraph(NamedOrBlankNode),
    RemovedGraph(NamedOrBlankNode),
}

impl LogEntry {
    /// Replays this change on `content`. Returns `false` if the change had no effect, which means
    /// that `content` diverged from the state the transaction started from.
    pub fn apply(&self, content: &mut Content) -> bool {
        match self {
            LogEntry::InsertedTriple(triple) => content.insert_triple(triple.as_ref()),
            LogEntry::RemovedTriple(triple) => content.remove_triple(triple.as_ref()),
            LogEntry::InsertedQuad(quad) => content.insert_quad(quad.as_ref()),
            LogEntry::RemovedQuad(quad) => content.remove_quad(quad.as_ref()),
            LogEntry::InsertedGraph(graph) => content.insert_graph(graph.as_ref()),
            LogEntry::RemovedGraph(graph) => content.remove_graph(graph.as_ref()),
        }
    }
}
