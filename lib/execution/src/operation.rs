use crate::error::UpdateError;
use rdf_update_model::{
    Binding, GraphName, GraphNameRef, GraphPattern, NamedNode, NamedOrBlankNode, Quad,
    QuadPattern, QueryDataset,
};
use std::fmt::{Display, Formatter};

/// A single operation of an update batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOperation {
    /// `CREATE GRAPH`
    CreateGraph(CreateGraph),
    /// `DROP`, `CLEAR`, `ADD`, `COPY` and `MOVE`
    Graph(GraphOperation),
    /// `INSERT DATA`
    InsertData(DataOperation),
    /// `DELETE DATA`
    DeleteData(DataOperation),
    /// `DELETE ... INSERT ... WHERE ...`
    Modify(Modify),
}

impl UpdateOperation {
    pub fn insert_data(quads: impl IntoIterator<Item = Quad>) -> Self {
        Self::InsertData(DataOperation::new(quads))
    }

    pub fn delete_data(quads: impl IntoIterator<Item = Quad>) -> Self {
        Self::DeleteData(DataOperation::new(quads))
    }

    /// The context attached to this operation.
    pub fn context(&self) -> Option<&OperationContext> {
        match self {
            UpdateOperation::CreateGraph(op) => op.context.as_ref(),
            UpdateOperation::Graph(op) => op.context.as_ref(),
            UpdateOperation::InsertData(op) | UpdateOperation::DeleteData(op) => {
                op.context.as_ref()
            }
            UpdateOperation::Modify(op) => op.context.as_ref(),
        }
    }

    /// Attaches `context` to this operation, replacing any previous one.
    #[must_use]
    pub fn with_context(mut self, context: OperationContext) -> Self {
        let slot = match &mut self {
            UpdateOperation::CreateGraph(op) => &mut op.context,
            UpdateOperation::Graph(op) => &mut op.context,
            UpdateOperation::InsertData(op) | UpdateOperation::DeleteData(op) => &mut op.context,
            UpdateOperation::Modify(op) => &mut op.context,
        };
        *slot = Some(context);
        self
    }

    /// A short name of the operation used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOperation::CreateGraph(_) => "create",
            UpdateOperation::Graph(op) => op.kind.as_str(),
            UpdateOperation::InsertData(_) => "insert_data",
            UpdateOperation::DeleteData(_) => "delete_data",
            UpdateOperation::Modify(_) => "modify",
        }
    }
}

/// Execution-scoped settings attached to a single operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationContext {
    /// Overrides the user of the batch for this operation.
    pub user: Option<String>,
}

impl OperationContext {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }
}

/// Registers an empty named graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateGraph {
    pub graph: NamedOrBlankNode,
    pub silent: bool,
    pub context: Option<OperationContext>,
}

impl CreateGraph {
    pub fn new(graph: impl Into<NamedOrBlankNode>, silent: bool) -> Self {
        Self {
            graph: graph.into(),
            silent,
            context: None,
        }
    }
}

/// The graphs a `DROP` or `CLEAR` applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GraphTarget {
    /// A single named graph.
    NamedGraph(NamedOrBlankNode),
    /// The default graph.
    DefaultGraph,
    /// All named graphs (`NAMED`).
    NamedGraphs,
    /// The default graph and all named graphs (`ALL`).
    AllGraphs,
}

impl GraphTarget {
    /// Returns the single graph this target refers to, if any.
    pub fn as_graph_name(&self) -> Option<GraphNameRef<'_>> {
        match self {
            GraphTarget::NamedGraph(NamedOrBlankNode::NamedNode(node)) => {
                Some(GraphNameRef::NamedNode(node.as_ref()))
            }
            GraphTarget::NamedGraph(NamedOrBlankNode::BlankNode(node)) => {
                Some(GraphNameRef::BlankNode(node.as_ref()))
            }
            GraphTarget::DefaultGraph => Some(GraphNameRef::DefaultGraph),
            GraphTarget::NamedGraphs | GraphTarget::AllGraphs => None,
        }
    }
}

impl From<GraphName> for GraphTarget {
    fn from(value: GraphName) -> Self {
        match value {
            GraphName::NamedNode(node) => GraphTarget::NamedGraph(node.into()),
            GraphName::BlankNode(node) => GraphTarget::NamedGraph(node.into()),
            GraphName::DefaultGraph => GraphTarget::DefaultGraph,
        }
    }
}

impl From<NamedNode> for GraphTarget {
    fn from(value: NamedNode) -> Self {
        GraphTarget::NamedGraph(value.into())
    }
}

impl Display for GraphTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphTarget::NamedGraph(node) => write!(f, "GRAPH {node}"),
            GraphTarget::DefaultGraph => f.write_str("DEFAULT"),
            GraphTarget::NamedGraphs => f.write_str("NAMED"),
            GraphTarget::AllGraphs => f.write_str("ALL"),
        }
    }
}

/// Discriminates the operations represented by a [GraphOperation].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphOperationKind {
    Drop,
    Clear,
    Add,
    Copy,
    Move,
}

impl GraphOperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphOperationKind::Drop => "drop",
            GraphOperationKind::Clear => "clear",
            GraphOperationKind::Add => "add",
            GraphOperationKind::Copy => "copy",
            GraphOperationKind::Move => "move",
        }
    }

    /// Returns whether the operation moves quads from a source to a destination graph.
    pub fn is_transfer(self) -> bool {
        matches!(
            self,
            GraphOperationKind::Add | GraphOperationKind::Copy | GraphOperationKind::Move
        )
    }
}

/// An operation on whole graphs.
///
/// For `DROP` and `CLEAR`, `source` is the target and `destination` is [None]. For `ADD`, `COPY`
/// and `MOVE`, `source` is a single graph and `destination` is set. Use
/// [check_graph_operation] to validate a hand-built record.
///
/// A transfer registers its destination as a named graph only if the source holds no quads.
/// Otherwise, the destination exists through the copied quads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphOperation {
    pub kind: GraphOperationKind,
    pub source: GraphTarget,
    pub destination: Option<GraphName>,
    pub silent: bool,
    pub context: Option<OperationContext>,
}

impl GraphOperation {
    pub fn drop(target: impl Into<GraphTarget>, silent: bool) -> Self {
        Self::unary(GraphOperationKind::Drop, target.into(), silent)
    }

    pub fn clear(target: impl Into<GraphTarget>, silent: bool) -> Self {
        Self::unary(GraphOperationKind::Clear, target.into(), silent)
    }

    pub fn add(source: impl Into<GraphName>, destination: impl Into<GraphName>, silent: bool) -> Self {
        Self::transfer(GraphOperationKind::Add, source.into(), destination.into(), silent)
    }

    pub fn copy(
        source: impl Into<GraphName>,
        destination: impl Into<GraphName>,
        silent: bool,
    ) -> Self {
        Self::transfer(GraphOperationKind::Copy, source.into(), destination.into(), silent)
    }

    pub fn r#move(
        source: impl Into<GraphName>,
        destination: impl Into<GraphName>,
        silent: bool,
    ) -> Self {
        Self::transfer(GraphOperationKind::Move, source.into(), destination.into(), silent)
    }

    fn unary(kind: GraphOperationKind, target: GraphTarget, silent: bool) -> Self {
        Self {
            kind,
            source: target,
            destination: None,
            silent,
            context: None,
        }
    }

    fn transfer(
        kind: GraphOperationKind,
        source: GraphName,
        destination: GraphName,
        silent: bool,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            destination: Some(destination),
            silent,
            context: None,
        }
    }
}

/// Checks that the fields of `operation` fit its kind.
pub fn check_graph_operation(operation: &GraphOperation) -> Result<(), UpdateError> {
    let kind = operation.kind.as_str();
    if operation.kind.is_transfer() {
        if operation.destination.is_none() {
            return Err(UpdateError::InvalidOperation(format!(
                "{kind} requires a destination graph"
            )));
        }
        if operation.source.as_graph_name().is_none() {
            return Err(UpdateError::InvalidOperation(format!(
                "{kind} requires a single source graph, found {}",
                operation.source
            )));
        }
    } else if operation.destination.is_some() {
        return Err(UpdateError::InvalidOperation(format!(
            "{kind} does not take a destination graph"
        )));
    }
    Ok(())
}

/// The ground quads of an `INSERT DATA` or `DELETE DATA` operation.
///
/// Build the quads with a [QuadDataSink](crate::QuadDataSink) when they come from patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataOperation {
    pub quads: Vec<Quad>,
    pub context: Option<OperationContext>,
}

impl DataOperation {
    pub fn new(quads: impl IntoIterator<Item = Quad>) -> Self {
        Self {
            quads: quads.into_iter().collect(),
            context: None,
        }
    }
}

/// The graphs that the `WHERE` clause of a [Modify] is evaluated against (`USING` and
/// `USING NAMED`).
///
/// The default graph is the merge of the `default` graphs and only the `named` graphs are
/// available to `GRAPH` patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UsingList {
    pub default: Vec<NamedNode>,
    pub named: Vec<NamedNode>,
}

impl From<QueryDataset> for UsingList {
    fn from(value: QueryDataset) -> Self {
        Self {
            default: value.default,
            named: value.named.unwrap_or_default(),
        }
    }
}

/// A pattern-driven update.
///
/// The `pattern` is evaluated into bindings. Every binding instantiates the `delete` and `insert`
/// templates. All instantiated deletions are applied before all instantiated insertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modify {
    pub delete: Vec<QuadPattern>,
    pub insert: Vec<QuadPattern>,
    pub pattern: GraphPattern,
    /// [None] if the operation has no `USING` clause of its own.
    pub using: Option<UsingList>,
    /// Seeds the evaluation of `pattern`. Takes precedence over the binding of the batch.
    pub input: Option<Binding>,
    pub context: Option<OperationContext>,
}

impl Modify {
    pub fn new(delete: Vec<QuadPattern>, insert: Vec<QuadPattern>, pattern: GraphPattern) -> Self {
        Self {
            delete,
            insert,
            pattern,
            using: None,
            input: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_using(mut self, using: UsingList) -> Self {
        self.using = Some(using);
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: Binding) -> Self {
        self.input = Some(input);
        self
    }
}
