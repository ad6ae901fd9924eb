//! API to update and read an in-memory [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).
//!
//! The entry point of the module is the [`Store`] struct.
//!
//! Usage example:
//! ```
//! use rdf_update::acl::{AccessControlList, GraphSelector};
//! use rdf_update::model::*;
//! use rdf_update::store::Store;
//!
//! # tokio_test::block_on(async {
//! let acl = AccessControlList::new()
//!     .allow_all("alice", GraphSelector::NamedGraph(NamedNode::new("http://example.com/g")?));
//! let store = Store::with_policy(acl);
//!
//! // alice may write to her graph
//! store
//!     .update_as(
//!         "INSERT DATA { GRAPH <http://example.com/g> { <http://example.com/s> <http://example.com/p> 1 } }",
//!         "alice",
//!     )
//!     .await?;
//!
//! // but not to the default graph
//! assert!(store
//!     .update_as(
//!         "INSERT DATA { <http://example.com/s> <http://example.com/p> 1 }",
//!         "alice",
//!     )
//!     .await
//!     .is_err());
//! assert_eq!(store.len().await?, 1);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! # }).unwrap();
//! ```

use crate::error::UpdateEvaluationError;
use futures::stream;
use rdf_update_acl::{AccessPolicy, PermitAll};
use rdf_update_common::error::StorageError;
use rdf_update_common::{QuadReader, QuadStore, QuadStoreTransaction};
use rdf_update_execution::{
    lower_update_text, AccessFilteredReader, QuadDataSink, SimplePatternEvaluator,
    UpdateExecutor, UpdateOperation, UpdateOptions, UpdateResult, UsingList,
};
use rdf_update_model::{
    GraphNameRef, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadPattern, QuadRef,
    SubjectRef, TermRef, TripleFilter, Update,
};
use rdf_update_storage::MemoryQuadStore;
use std::sync::Arc;
use tracing::debug;

/// An in-memory [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset) store.
///
/// The store can be updated using [SPARQL 1.1 Update](https://www.w3.org/TR/sparql11-update/).
/// Every update is checked against the [AccessPolicy] of the store and applied atomically.
///
/// Usage example:
/// ```
/// use rdf_update::model::*;
/// use rdf_update::store::Store;
///
/// # tokio_test::block_on(async {
/// let store = Store::new();
///
/// // insertion
/// let ex = NamedNode::new("http://example.com")?;
/// let quad = Quad::new(ex.clone(), ex.clone(), ex.clone(), GraphName::DefaultGraph);
/// store.insert(quad.as_ref()).await?;
///
/// // quad filter
/// let results = store.quads_for_pattern(None, None, None, None, None).await?;
/// assert_eq!(vec![quad], results);
///
/// // SPARQL update
/// let results = store.update("DELETE WHERE { ?s ?p ?o }").await?;
/// assert_eq!(results[0].deleted().map(<[Quad]>::len), Some(1));
/// assert!(store.is_empty().await?);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    storage: Arc<MemoryQuadStore>,
    executor: UpdateExecutor,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty [Store] in which every user may access every graph.
    pub fn new() -> Self {
        Self::with_policy(PermitAll)
    }

    /// Creates an empty [Store] that guards all graph accesses of updates with `policy`.
    pub fn with_policy(policy: impl AccessPolicy + 'static) -> Self {
        Self::with_policy_and_options(policy, UpdateOptions::default())
    }

    /// Creates an empty [Store] with a custom `policy` and `options`.
    pub fn with_policy_and_options(
        policy: impl AccessPolicy + 'static,
        options: UpdateOptions,
    ) -> Self {
        let storage = Arc::new(MemoryQuadStore::new());
        let executor = UpdateExecutor::new(
            Arc::<MemoryQuadStore>::clone(&storage),
            Arc::new(policy),
            Arc::new(SimplePatternEvaluator::new()),
        )
        .with_options(options);
        Self { storage, executor }
    }

    /// Returns the executor that applies the updates of this store.
    pub fn executor(&self) -> &UpdateExecutor {
        &self.executor
    }

    /// Executes a [SPARQL 1.1 update](https://www.w3.org/TR/sparql11-update/) as the default user.
    ///
    /// Returns one [UpdateResult] per operation of the update.
    pub async fn update(&self, update: &str) -> Result<Vec<UpdateResult>, UpdateEvaluationError> {
        self.update_opt(update, None, None).await
    }

    /// Executes a [SPARQL 1.1 update](https://www.w3.org/TR/sparql11-update/) as `user`.
    pub async fn update_as(
        &self,
        update: &str,
        user: &str,
    ) -> Result<Vec<UpdateResult>, UpdateEvaluationError> {
        self.update_opt(update, Some(user), None).await
    }

    /// Executes a [SPARQL 1.1 update](https://www.w3.org/TR/sparql11-update/) with some options.
    ///
    /// If `using` is set, every `DELETE`/`INSERT` operation of the update without a `USING` clause
    /// of its own is evaluated against the given graphs.
    ///
    /// ```
    /// use rdf_update::execution::UsingList;
    /// use rdf_update::model::*;
    /// use rdf_update::store::Store;
    ///
    /// # tokio_test::block_on(async {
    /// let store = Store::new();
    /// store
    ///     .update("INSERT DATA { GRAPH <http://example.com/g> { <http://example.com/s> <http://example.com/p> 1 } }")
    ///     .await?;
    ///
    /// let using = UsingList {
    ///     default: vec![NamedNode::new("http://example.com/g")?],
    ///     named: Vec::new(),
    /// };
    /// let results = store
    ///     .update_opt("INSERT { ?s ?p ?o } WHERE { ?s ?p ?o }", None, Some(&using))
    ///     .await?;
    /// assert_eq!(results[0].inserted().map(<[Quad]>::len), Some(1));
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// # }).unwrap();
    /// ```
    pub async fn update_opt(
        &self,
        update: &str,
        user: Option<&str>,
        using: Option<&UsingList>,
    ) -> Result<Vec<UpdateResult>, UpdateEvaluationError> {
        let base_iri = self.executor.options().base_iri.as_deref();
        let parsed = Update::parse(update, base_iri)?;
        let operations = lower_update_text(&parsed, update)?;
        debug!(operations = operations.len(), "Parsed update");
        Ok(self
            .executor
            .execute_stream(stream::iter(operations.into_iter().map(Ok)), using, user, None)
            .await?)
    }

    /// Executes already built operations as a single atomic batch.
    pub async fn execute(
        &self,
        operations: &[UpdateOperation],
        user: Option<&str>,
    ) -> Result<Vec<UpdateResult>, UpdateEvaluationError> {
        Ok(self.executor.execute(operations, user, None).await?)
    }

    /// Inserts the quads of `data` as an `INSERT DATA` operation.
    ///
    /// Every pattern must be ground. Otherwise, nothing is inserted.
    ///
    /// ```
    /// use rdf_update::model::*;
    /// use rdf_update::store::Store;
    ///
    /// # tokio_test::block_on(async {
    /// let store = Store::new();
    /// let pattern = QuadPattern {
    ///     subject: Variable::new("s")?.into(),
    ///     predicate: NamedNode::new("http://example.com/p")?.into(),
    ///     object: Literal::from("o").into(),
    ///     graph_name: GraphNamePattern::DefaultGraph,
    /// };
    /// assert!(store.insert_data(&[pattern], None).await.is_err());
    /// assert!(store.is_empty().await?);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// # }).unwrap();
    /// ```
    pub async fn insert_data(
        &self,
        data: &[QuadPattern],
        user: Option<&str>,
    ) -> Result<UpdateResult, UpdateEvaluationError> {
        let mut sink = QuadDataSink::new();
        for pattern in data {
            sink.accept_quad(pattern)?;
        }
        let operation = UpdateOperation::insert_data(sink.into_quads());
        let mut results = self.execute(&[operation], user).await?;
        Ok(results.pop().unwrap_or_else(UpdateResult::untracked))
    }

    /// Parses `update` into operations without executing them.
    pub fn parse_update(&self, update: &str) -> Result<Vec<UpdateOperation>, UpdateEvaluationError> {
        let parsed = Update::parse(update, self.executor.options().base_iri.as_deref())?;
        Ok(lower_update_text(&parsed, update)?)
    }

    /// Retrieves quads with a filter on each quad component.
    ///
    /// If `user` is set, only the graphs that the user may query are visible.
    pub async fn quads_for_pattern(
        &self,
        user: Option<&str>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
        graph_name: Option<GraphNameRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        let filter = TripleFilter {
            subject,
            predicate,
            object,
        };
        match user {
            Some(user) => {
                let reader = AccessFilteredReader::new(
                    self.storage.as_ref(),
                    self.executor.policy().as_ref(),
                    user,
                );
                reader.find(graph_name, filter).await
            }
            None => self.storage.find(graph_name, filter).await,
        }
    }

    /// Returns all the named graphs of the store, restricted to the ones `user` may query if
    /// `user` is set.
    pub async fn named_graphs(
        &self,
        user: Option<&str>,
    ) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        match user {
            Some(user) => {
                AccessFilteredReader::new(
                    self.storage.as_ref(),
                    self.executor.policy().as_ref(),
                    user,
                )
                .named_graphs()
                .await
            }
            None => self.storage.named_graphs().await,
        }
    }

    pub async fn contains_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        self.storage.contains_named_graph(graph_name).await
    }

    pub async fn contains(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        self.storage.contains(quad).await
    }

    pub async fn len(&self) -> Result<usize, StorageError> {
        self.storage.len().await
    }

    pub async fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len().await? == 0)
    }

    /// Adds a quad to this store, bypassing the access policy.
    ///
    /// Returns `true` if the quad was not already in the store.
    pub async fn insert(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let mut transaction = self.storage.begin_write().await?;
        let inserted = match transaction.insert(quad).await {
            Ok(inserted) => inserted,
            Err(error) => {
                transaction.abort().await?;
                return Err(error);
            }
        };
        transaction.commit().await?;
        Ok(inserted)
    }

    /// Atomically adds a set of quads to this store, bypassing the access policy.
    ///
    /// Returns the number of quads that were not already in the store.
    pub async fn extend(
        &self,
        quads: impl IntoIterator<Item = impl Into<Quad>>,
    ) -> Result<usize, StorageError> {
        let quads = quads.into_iter().map(Into::into).collect();
        self.storage.extend(quads).await
    }

    /// Removes a quad from this store, bypassing the access policy.
    ///
    /// Returns `true` if the quad was in the store.
    pub async fn remove(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let mut transaction = self.storage.begin_write().await?;
        let removed = match transaction.remove(quad).await {
            Ok(removed) => removed,
            Err(error) => {
                transaction.abort().await?;
                return Err(error);
            }
        };
        transaction.commit().await?;
        Ok(removed)
    }

    /// Checks the internal consistency of the store.
    pub async fn validate(&self) -> Result<(), StorageError> {
        self.storage.validate().await
    }
}
