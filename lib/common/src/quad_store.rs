use crate::error::StorageError;
use async_trait::async_trait;
use rdf_update_model::{
    GraphNameRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, TripleFilter, TripleRef,
};
use std::fmt::Debug;

/// Read access to a dataset consisting of a default graph and zero or more named graphs.
///
/// Both committed stores and open write transactions are readers. A transaction must observe its
/// own uncommitted changes.
#[async_trait]
#[allow(clippy::len_without_is_empty, reason = "Emptiness is checked via named graphs")]
pub trait QuadReader: Debug + Send + Sync {
    /// Returns the triples of the default graph that match `filter`. The triples are returned as
    /// quads in the default graph.
    async fn find_in_default_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError>;

    /// Returns the quads of the named graph `graph_name` that match `filter`.
    async fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError>;

    /// Returns the quads of all named graphs that match `filter`.
    async fn find_in_any_named_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError>;

    /// Returns the list of named graphs. A named graph exists if it contains at least one quad or
    /// if it has been created explicitly.
    async fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError>;

    /// Returns whether `graph_name` is a named graph in the store.
    async fn contains_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Returns the quads that match `filter` in `graph_name`, or in all graphs if `graph_name` is
    /// [None].
    async fn find(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        match graph_name {
            None => {
                let mut result = self.find_in_default_graph(filter).await?;
                result.extend(self.find_in_any_named_graph(filter).await?);
                Ok(result)
            }
            Some(GraphNameRef::DefaultGraph) => self.find_in_default_graph(filter).await,
            Some(GraphNameRef::NamedNode(node)) => {
                self.find_in_named_graph(node.into(), filter).await
            }
            Some(GraphNameRef::BlankNode(node)) => {
                self.find_in_named_graph(node.into(), filter).await
            }
        }
    }

    /// Returns whether `quad` is in the store.
    async fn contains(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let filter = TripleFilter::any()
            .with_subject(quad.subject)
            .with_predicate(quad.predicate)
            .with_object(quad.object);
        Ok(!self.find(Some(quad.graph_name), filter).await?.is_empty())
    }

    /// Returns the number of quads in the store.
    async fn len(&self) -> Result<usize, StorageError> {
        Ok(self.find(None, TripleFilter::any()).await?.len())
    }
}

/// A quad store that supports atomic writes.
///
/// At most one write transaction may be open at a time. Readers that do not go through the
/// transaction observe the state before [QuadStoreTransaction::commit] until the commit finishes.
#[async_trait]
pub trait QuadStore: QuadReader {
    /// Opens a write transaction. Waits until any other write transaction has been closed.
    async fn begin_write(&self) -> Result<Box<dyn QuadStoreTransaction + '_>, StorageError>;

    /// Atomically loads the given quads into the store. Returns the number of quads that were not
    /// already present.
    async fn extend(&self, quads: Vec<Quad>) -> Result<usize, StorageError> {
        let mut transaction = self.begin_write().await?;
        let mut inserted = 0;
        for quad in &quads {
            match transaction.insert(quad.as_ref()).await {
                Ok(true) => inserted += 1,
                Ok(false) => {}
                Err(error) => {
                    transaction.abort().await?;
                    return Err(error);
                }
            }
        }
        transaction.commit().await?;
        Ok(inserted)
    }
}

/// An open write transaction. Changes become visible to other readers on [Self::commit] and are
/// discarded on [Self::abort].
///
/// All mutating methods report whether they changed anything. Adding a quad that is already
/// present or removing a quad that is absent is a no-op returning `false`.
#[async_trait]
pub trait QuadStoreTransaction: QuadReader {
    /// Returns this transaction as a [QuadReader].
    fn as_reader(&self) -> &dyn QuadReader;

    /// Adds a triple to the default graph.
    async fn add_to_default_graph(&mut self, triple: TripleRef<'_>) -> Result<bool, StorageError>;

    /// Removes a triple from the default graph.
    async fn remove_from_default_graph(
        &mut self,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Adds a triple to the named graph `graph_name`.
    async fn add_to_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Removes a triple from the named graph `graph_name`.
    async fn remove_from_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
        triple: TripleRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Registers an empty named graph. Returns `false` if the graph already existed.
    async fn insert_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Removes a named graph together with its content. Returns `false` if the graph did not
    /// exist.
    async fn remove_named_graph(
        &mut self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError>;

    /// Publishes all changes of this transaction.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all changes of this transaction.
    async fn abort(self: Box<Self>) -> Result<(), StorageError>;

    /// Adds `quad` to the graph it names.
    async fn insert(&mut self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let triple = TripleRef::new(quad.subject, quad.predicate, quad.object);
        match quad.graph_name {
            GraphNameRef::DefaultGraph => self.add_to_default_graph(triple).await,
            GraphNameRef::NamedNode(node) => self.add_to_named_graph(node.into(), triple).await,
            GraphNameRef::BlankNode(node) => self.add_to_named_graph(node.into(), triple).await,
        }
    }

    /// Removes `quad` from the graph it names.
    async fn remove(&mut self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let triple = TripleRef::new(quad.subject, quad.predicate, quad.object);
        match quad.graph_name {
            GraphNameRef::DefaultGraph => self.remove_from_default_graph(triple).await,
            GraphNameRef::NamedNode(node) => {
                self.remove_from_named_graph(node.into(), triple).await
            }
            GraphNameRef::BlankNode(node) => {
                self.remove_from_named_graph(node.into(), triple).await
            }
        }
    }
}
