use crate::error::{StructuralError, UpdateError};
use crate::evaluator::PatternEvaluator;
use crate::operation::{
    check_graph_operation, CreateGraph, DataOperation, GraphOperation, GraphOperationKind,
    GraphTarget, Modify, UpdateOperation, UsingList,
};
use crate::options::UpdateOptions;
use crate::reader::AccessFilteredReader;
use crate::result::UpdateResult;
use crate::template::{constant_graph, instantiate_delete, instantiate_insert};
use futures::{stream, Stream, StreamExt, TryStreamExt};
use itertools::Itertools;
use rdf_update_acl::{AccessKind, AccessPolicy};
use rdf_update_common::error::StorageError;
use rdf_update_common::{QuadStore, QuadStoreTransaction};
use rdf_update_model::{
    to_graph_name, to_named_graph, Binding, GraphName, GraphNameRef, Quad, QuadRef, Triple,
    TripleFilter,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn, Instrument};

/// Executes batches of [UpdateOperation]s against a [QuadStore].
///
/// Every batch runs in a single write transaction. If any operation fails, the transaction is
/// aborted and the error of the failing operation is returned. Otherwise, the transaction is
/// committed and one [UpdateResult] per operation is returned in operation order.
#[derive(Debug, Clone)]
pub struct UpdateExecutor {
    store: Arc<dyn QuadStore>,
    policy: Arc<dyn AccessPolicy>,
    evaluator: Arc<dyn PatternEvaluator>,
    options: UpdateOptions,
}

impl UpdateExecutor {
    pub fn new(
        store: Arc<dyn QuadStore>,
        policy: Arc<dyn AccessPolicy>,
        evaluator: Arc<dyn PatternEvaluator>,
    ) -> Self {
        Self {
            store,
            policy,
            evaluator,
            options: UpdateOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &Arc<dyn QuadStore> {
        &self.store
    }

    pub fn policy(&self) -> &Arc<dyn AccessPolicy> {
        &self.policy
    }

    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    /// Executes `operations` as a single atomic batch.
    ///
    /// `user` defaults to the user of the [UpdateOptions]. `input` seeds the evaluation of every
    /// pattern-driven operation that has no input of its own.
    pub async fn execute(
        &self,
        operations: &[UpdateOperation],
        user: Option<&str>,
        input: Option<&Binding>,
    ) -> Result<Vec<UpdateResult>, UpdateError> {
        let operations = stream::iter(operations.iter().cloned().map(Ok));
        self.execute_stream(operations, None, user, input).await
    }

    /// Executes the operations produced by `operations` as a single atomic batch.
    ///
    /// Operations are pulled one at a time and executed in order. An error produced by the stream
    /// aborts the batch like a failing operation. `using` is attached to every pattern-driven
    /// operation that has no `USING` clause of its own.
    pub async fn execute_stream<S>(
        &self,
        operations: S,
        using: Option<&UsingList>,
        user: Option<&str>,
        input: Option<&Binding>,
    ) -> Result<Vec<UpdateResult>, UpdateError>
    where
        S: Stream<Item = Result<UpdateOperation, UpdateError>> + Send,
    {
        let user = user.unwrap_or(&self.options.default_user);
        let span = debug_span!("update_batch", user = %user);
        self.execute_batch(operations, using, user, input)
            .instrument(span)
            .await
    }

    async fn execute_batch<S>(
        &self,
        operations: S,
        using: Option<&UsingList>,
        user: &str,
        input: Option<&Binding>,
    ) -> Result<Vec<UpdateResult>, UpdateError>
    where
        S: Stream<Item = Result<UpdateOperation, UpdateError>> + Send,
    {
        let mut operations = pin!(operations);
        let mut transaction = self.store.begin_write().await?;
        let mut results = Vec::new();

        while let Some(operation) = operations.next().await {
            let outcome = match operation {
                Ok(operation) => {
                    let operation = inject_using(operation, using);
                    self.execute_operation(&mut *transaction, &operation, user, input)
                        .await
                }
                Err(error) => Err(error),
            };

            match outcome {
                Ok(result) => results.push(result),
                Err(error) => {
                    warn!(%error, index = results.len(), "Aborting update batch");
                    if let Err(abort_error) = transaction.abort().await {
                        warn!(error = %abort_error, "Could not abort the update transaction");
                    }
                    return Err(error);
                }
            }
        }

        transaction.commit().await?;
        info!(operations = results.len(), "Committed update batch");
        Ok(results)
    }

    async fn execute_operation(
        &self,
        transaction: &mut dyn QuadStoreTransaction,
        operation: &UpdateOperation,
        batch_user: &str,
        input: Option<&Binding>,
    ) -> Result<UpdateResult, UpdateError> {
        let user = operation
            .context()
            .and_then(|context| context.user.as_deref())
            .unwrap_or(batch_user);
        let mut run = OperationRun {
            transaction,
            policy: self.policy.as_ref(),
            user,
            checked: FxHashSet::default(),
            deleted: self.options.track_changes.then(Vec::new),
            inserted: self.options.track_changes.then(Vec::new),
        };

        match operation {
            UpdateOperation::CreateGraph(op) => run.create_graph(op).await?,
            UpdateOperation::Graph(op) => run.graph_operation(op).await?,
            UpdateOperation::InsertData(op) => run.insert_data(op).await?,
            UpdateOperation::DeleteData(op) => run.delete_data(op).await?,
            UpdateOperation::Modify(op) => {
                run.modify(self.evaluator.as_ref(), op, input).await?;
            }
        }

        debug!(
            operation = operation.name(),
            user,
            deleted = run.deleted.as_ref().map(Vec::len),
            inserted = run.inserted.as_ref().map(Vec::len),
            "Executed update operation"
        );
        Ok(UpdateResult::new(run.deleted, run.inserted))
    }
}

fn inject_using(operation: UpdateOperation, using: Option<&UsingList>) -> UpdateOperation {
    match (operation, using) {
        (UpdateOperation::Modify(mut modify), Some(using)) if modify.using.is_none() => {
            modify.using = Some(using.clone());
            UpdateOperation::Modify(modify)
        }
        (operation, _) => operation,
    }
}

fn silent_or(silent: bool, error: StructuralError) -> Result<(), UpdateError> {
    if silent {
        debug!(%error, "Ignoring error of silent operation");
        Ok(())
    } else {
        Err(error.into())
    }
}

/// The state of a single operation within a batch.
struct OperationRun<'a> {
    transaction: &'a mut dyn QuadStoreTransaction,
    policy: &'a dyn AccessPolicy,
    user: &'a str,
    /// The (kind, graph) pairs that already passed the access policy.
    checked: FxHashSet<(AccessKind, GraphName)>,
    /// [None] if changes are not tracked.
    deleted: Option<Vec<Quad>>,
    inserted: Option<Vec<Quad>>,
}

impl OperationRun<'_> {
    fn check(&mut self, kind: AccessKind, graph_name: GraphNameRef<'_>) -> Result<(), UpdateError> {
        if self.checked.insert((kind, graph_name.into_owned())) {
            self.policy.check(kind, graph_name, self.user)?;
        }
        Ok(())
    }

    async fn insert(&mut self, quad: QuadRef<'_>) -> Result<(), StorageError> {
        if self.transaction.insert(quad).await? {
            if let Some(inserted) = &mut self.inserted {
                inserted.push(quad.into_owned());
            }
        }
        Ok(())
    }

    async fn remove(&mut self, quad: QuadRef<'_>) -> Result<(), StorageError> {
        if self.transaction.remove(quad).await? {
            if let Some(deleted) = &mut self.deleted {
                deleted.push(quad.into_owned());
            }
        }
        Ok(())
    }

    /// Removes every quad of `graph_name`. The graph itself stays registered.
    async fn clear_graph(&mut self, graph_name: GraphNameRef<'_>) -> Result<(), StorageError> {
        let quads = self
            .transaction
            .find(Some(graph_name), TripleFilter::any())
            .await?;
        for quad in &quads {
            self.remove(quad.as_ref()).await?;
        }
        Ok(())
    }

    async fn create_graph(&mut self, op: &CreateGraph) -> Result<(), UpdateError> {
        self.check(AccessKind::Create, to_graph_name(op.graph.as_ref()))?;
        if self.transaction.contains_named_graph(op.graph.as_ref()).await? {
            return silent_or(op.silent, StructuralError::GraphAlreadyExists(op.graph.clone()));
        }
        self.transaction.insert_named_graph(op.graph.as_ref()).await?;
        Ok(())
    }

    async fn graph_operation(&mut self, op: &GraphOperation) -> Result<(), UpdateError> {
        check_graph_operation(op)?;
        match (op.source.as_graph_name(), &op.destination) {
            (Some(source), Some(destination)) if op.kind.is_transfer() => {
                self.transfer(op.kind, source, destination.as_ref(), op.silent)
                    .await
            }
            _ => self.drop_or_clear(op).await,
        }
    }

    async fn drop_or_clear(&mut self, op: &GraphOperation) -> Result<(), UpdateError> {
        let kind = if op.kind == GraphOperationKind::Drop {
            AccessKind::Drop
        } else {
            AccessKind::Clear
        };

        let graphs: Vec<GraphName> = match &op.source {
            GraphTarget::NamedGraph(graph) => {
                self.check(kind, to_graph_name(graph.as_ref()))?;
                if !self.transaction.contains_named_graph(graph.as_ref()).await? {
                    return silent_or(op.silent, StructuralError::GraphDoesNotExist(graph.clone()));
                }
                vec![to_graph_name(graph.as_ref()).into_owned()]
            }
            GraphTarget::DefaultGraph => vec![GraphName::DefaultGraph],
            GraphTarget::NamedGraphs | GraphTarget::AllGraphs => {
                let mut graphs = Vec::new();
                if op.source == GraphTarget::AllGraphs {
                    graphs.push(GraphName::DefaultGraph);
                }
                for graph in self.transaction.named_graphs().await? {
                    graphs.push(to_graph_name(graph.as_ref()).into_owned());
                }
                graphs
            }
        };

        for graph in &graphs {
            self.check(kind, graph.as_ref())?;
        }
        for graph in &graphs {
            self.clear_graph(graph.as_ref()).await?;
            if op.kind == GraphOperationKind::Drop {
                if let Some(named) = to_named_graph(graph.as_ref()) {
                    self.transaction.remove_named_graph(named).await?;
                }
            }
        }
        Ok(())
    }

    async fn transfer(
        &mut self,
        kind: GraphOperationKind,
        source: GraphNameRef<'_>,
        destination: GraphNameRef<'_>,
        silent: bool,
    ) -> Result<(), UpdateError> {
        self.check(AccessKind::Query, source)?;
        if kind != GraphOperationKind::Add {
            self.check(AccessKind::Clear, destination)?;
        }
        self.check(AccessKind::Update, destination)?;
        if kind == GraphOperationKind::Move {
            self.check(AccessKind::Drop, source)?;
        }

        if source == destination {
            return Ok(());
        }
        if let Some(named) = to_named_graph(source) {
            if !self.transaction.contains_named_graph(named).await? {
                return silent_or(
                    silent,
                    StructuralError::GraphDoesNotExist(named.into_owned()),
                );
            }
        }

        let source_quads = self
            .transaction
            .find(Some(source), TripleFilter::any())
            .await?;
        if kind != GraphOperationKind::Add {
            let source_triples: FxHashSet<Triple> =
                source_quads.iter().map(triple_of).collect();
            let stale = self
                .transaction
                .find(Some(destination), TripleFilter::any())
                .await?
                .into_iter()
                .filter(|quad| !source_triples.contains(&triple_of(quad)))
                .collect::<Vec<_>>();
            for quad in &stale {
                self.remove(quad.as_ref()).await?;
            }
        }

        // An empty source still leaves an existing destination behind.
        if source_quads.is_empty() {
            if let Some(named) = to_named_graph(destination) {
                self.transaction.insert_named_graph(named).await?;
            }
        }
        for quad in &source_quads {
            let copied = Quad::new(
                quad.subject.clone(),
                quad.predicate.clone(),
                quad.object.clone(),
                destination.into_owned(),
            );
            self.insert(copied.as_ref()).await?;
        }

        if kind == GraphOperationKind::Move {
            self.clear_graph(source).await?;
            if let Some(named) = to_named_graph(source) {
                self.transaction.remove_named_graph(named).await?;
            }
        }
        Ok(())
    }

    async fn insert_data(&mut self, op: &DataOperation) -> Result<(), UpdateError> {
        for graph in op.quads.iter().map(|quad| quad.graph_name.as_ref()).unique() {
            self.check(AccessKind::InsertData, graph)?;
        }
        for quad in &op.quads {
            self.insert(quad.as_ref()).await?;
        }
        Ok(())
    }

    async fn delete_data(&mut self, op: &DataOperation) -> Result<(), UpdateError> {
        for graph in op.quads.iter().map(|quad| quad.graph_name.as_ref()).unique() {
            self.check(AccessKind::DeleteData, graph)?;
        }
        for quad in &op.quads {
            self.remove(quad.as_ref()).await?;
        }
        Ok(())
    }

    async fn modify(
        &mut self,
        evaluator: &dyn PatternEvaluator,
        op: &Modify,
        batch_input: Option<&Binding>,
    ) -> Result<(), UpdateError> {
        for graph in op.delete.iter().filter_map(constant_graph) {
            self.check(AccessKind::Delete, graph.as_ref())?;
        }
        for graph in op.insert.iter().filter_map(constant_graph) {
            self.check(AccessKind::Update, graph.as_ref())?;
        }

        let reader = AccessFilteredReader::new(self.transaction.as_reader(), self.policy, self.user);
        let solutions: Vec<Binding> = evaluator
            .evaluate(
                &reader,
                &op.pattern,
                op.using.as_ref(),
                op.input.as_ref().or(batch_input),
            )
            .await?
            .try_collect()
            .await?;

        let mut seen = FxHashSet::default();
        let mut deletions = Vec::new();
        let mut insertions = Vec::new();
        for solution in &solutions {
            for template in &op.delete {
                if let Some(quad) = instantiate_delete(template, solution) {
                    if seen.insert((false, quad.clone())) {
                        deletions.push(quad);
                    }
                }
            }
            let mut blank_nodes = FxHashMap::default();
            for template in &op.insert {
                if let Some(quad) = instantiate_insert(template, solution, &mut blank_nodes) {
                    if seen.insert((true, quad.clone())) {
                        insertions.push(quad);
                    }
                }
            }
        }

        for quad in &deletions {
            self.check(AccessKind::Delete, quad.graph_name.as_ref())?;
        }
        for quad in &insertions {
            self.check(AccessKind::Update, quad.graph_name.as_ref())?;
        }
        for quad in &deletions {
            self.remove(quad.as_ref()).await?;
        }
        for quad in &insertions {
            self.insert(quad.as_ref()).await?;
        }
        Ok(())
    }
}

fn triple_of(quad: &Quad) -> Triple {
    Triple::new(
        quad.subject.clone(),
        quad.predicate.clone(),
        quad.object.clone(),
    )
}
