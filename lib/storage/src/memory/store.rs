use crate::memory::content::Content;
use crate::memory::transaction::MemoryTransaction;
use async_trait::async_trait;
use rdf_update_common::error::StorageError;
use rdf_update_common::{QuadReader, QuadStore, QuadStoreTransaction};
use rdf_update_model::{NamedOrBlankNode, NamedOrBlankNodeRef, Quad, TripleFilter};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// A quad store that keeps its content in memory and answers every lookup with a linear scan.
///
/// The store serves as the reference for the observable behavior of other quad stores. It keeps no
/// indexes and should not be used for large datasets.
///
/// A write transaction works on a private copy of the committed content and records every change
/// in a log. On commit, the log is replayed on the committed content while readers are blocked.
/// On abort, the copy and the log are dropped. A single write transaction is allowed at a time.
#[derive(Clone, Debug, Default)]
pub struct MemoryQuadStore {
    content: Arc<RwLock<Content>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryQuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates that all the store invariants hold in the data.
    pub async fn validate(&self) -> Result<(), StorageError> {
        self.content.read().await.validate()?;
        Ok(())
    }
}

#[async_trait]
impl QuadReader for MemoryQuadStore {
    async fn find_in_default_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self.content.read().await.find_in_default_graph(filter))
    }

    async fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self
            .content
            .read()
            .await
            .find_in_named_graph(graph_name, filter))
    }

    async fn find_in_any_named_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        Ok(self.content.read().await.find_in_any_named_graph(filter))
    }

    async fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        Ok(self.content.read().await.named_graphs())
    }

    async fn contains_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        Ok(self.content.read().await.contains_named_graph(graph_name))
    }

    async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.content.read().await.len())
    }
}

#[async_trait]
impl QuadStore for MemoryQuadStore {
    async fn begin_write(&self) -> Result<Box<dyn QuadStoreTransaction + '_>, StorageError> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let snapshot = self.content.read().await.clone();
        debug!("Opened memory transaction");
        Ok(Box::new(MemoryTransaction::new(
            Arc::clone(&self.content),
            writer,
            snapshot,
        )))
    }
}
