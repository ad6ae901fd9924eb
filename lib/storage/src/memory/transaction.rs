use crate::memory::content::Content;
use crate::memory::log::LogEntry;
use async_trait::async_trait;
use rdf_update_common::error::{CorruptionError, StorageError};
use rdf_update_common::{QuadReader, QuadStoreTransaction};
use rdf_update_model::{
    to_graph_name, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, TripleFilter, TripleRef,
};
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::{debug, warn};

/// A write transaction of a [MemoryQuadStore](super::MemoryQuadStore).
///
/// Holds the writer lock of the store until it is committed, aborted, or dropped. Dropping an
/// open transaction discards its changes.
#[derive(Debug)]
pub struct MemoryTransaction {
    committed: Arc<RwLock<Content>>,
    _writer: OwnedMutexGuard<()>,
    content: Content,
    log: Vec<LogEntry>,
}

impl MemoryTransaction {
    pub(super) fn new(
        committed: Arc<RwLock<Content>>,
        writer: OwnedMutexGuard<()>,
        content: Content,
    ) -> Self {
        Self {
            committed,
            _writer: writer,
            content,
            log: Vec::new(),
        }
    }

    fn record(&mut self, changed: bool, entry: impl FnOnce() -> LogEntry) -> bool {
        if changed {
            self.log.push(entry());
        }
        changed
    }
}

#[async_trait]
impl QuadReader for MemoryTransaction {
    async fn find_in_default_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self.content.find_in_default_graph(filter))
    }

    async fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self.content.find_in_named_graph(graph_name, filter))
    }

    async fn find_in_any_named_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self.content.find_in_any_named_graph(filter))
    }

    async fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        Ok(self.content.named_graphs())
    }

    async fn contains_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        Ok(self.content.contains_named_graph(graph_name))
    }

    async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.content.len())
    }
}

#[async_trait]
impl QuadStoreTransaction for MemoryTransaction {
    fn as_reader(&self) -> &dyn QuadReader {
        self
    }

    async fn add_to_default_graph(&mut self, triple: TripleRef<'_>) -> Result<bool, StorageError> {
        let changed = self.content.insert_triple(triple);
        Ok(self.record(changed, || LogEntry::InsertedTriple(triple.into_owned())))
    }

    async fn remove_from_default_graph(
        &mut self,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError> {
        let changed = self.content.remove_triple(triple);
        Ok(self.record(changed, || LogEntry::RemovedTriple(triple.into_owned())))
    }

    async fn add_to_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError> {
        let quad = QuadRef::new(
            triple.subject,
            triple.predicate,
            triple.object,
            to_graph_name(graph_name),
        );
        let changed = self.content.insert_quad(quad);
        Ok(self.record(changed, || LogEntry::InsertedQuad(quad.into_owned())))
    }

    async fn remove_from_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError> {
        let quad = QuadRef::new(
            triple.subject,
            triple.predicate,
            triple.object,
            to_graph_name(graph_name),
        );
        let changed = self.content.remove_quad(quad);
        Ok(self.record(changed, || LogEntry::RemovedQuad(quad.into_owned())))
    }

    async fn insert_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        let changed = self.content.insert_graph(graph_name);
        Ok(self.record(changed, || LogEntry::InsertedGraph(graph_name.into_owned())))
    }

    async fn remove_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        let existed = self.content.contains_named_graph(graph_name);
        for quad in self
            .content
            .find_in_named_graph(graph_name, TripleFilter::any())
        {
            let changed = self.content.remove_quad(quad.as_ref());
            self.record(changed, || LogEntry::RemovedQuad(quad));
        }
        let changed = self.content.remove_graph(graph_name);
        self.record(changed, || LogEntry::RemovedGraph(graph_name.into_owned()));
        Ok(existed)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let mut committed = self.committed.write().await;
        let mut next = committed.clone();
        for entry in &self.log {
            if !entry.apply(&mut next) {
                warn!(?entry, "Transaction log does not apply to the committed content");
                return Err(CorruptionError::msg(
                    "The committed content changed while a write transaction was open",
                )
                .into());
            }
        }
        *committed = next;
        debug!(changes = self.log.len(), "Committed memory transaction");
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<(), StorageError> {
        debug!(changes = self.log.len(), "Aborted memory transaction");
        Ok(())
    }
}
