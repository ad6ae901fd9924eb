use crate::operation::UsingList;
use itertools::Itertools;
use rdf_update_common::error::StorageError;
use rdf_update_common::QuadReader;
use rdf_update_model::{
    to_graph_name, to_named_graph, GraphName, NamedOrBlankNode, NamedOrBlankNodeRef, Quad,
    TripleFilter,
};
use std::fmt::Display;

/// The active graph defines which graphs can partake in the pattern matching process.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActiveGraph {
    /// Only the default graph of the store forms the active graph.
    #[default]
    DefaultGraph,
    /// A set of graphs form the active graph. This allows expressing the user-intent of
    /// updates that use the `USING` and `USING NAMED` clause.
    Union(Vec<GraphName>),
    /// Any named graph is part of the active graph. This corresponds to `GRAPH ?x { ... }` patterns
    /// with no explicitly defined set of named graphs.
    AnyNamedGraph,
}

impl Display for ActiveGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveGraph::DefaultGraph => write!(f, "Default Graph"),
            ActiveGraph::Union(graphs) => write!(f, "Union of [{}]", graphs.iter().join(", ")),
            ActiveGraph::AnyNamedGraph => write!(f, "Any Named Graph"),
        }
    }
}

/// The dataset a `WHERE` clause is evaluated against: a store seen through a `USING` list.
#[derive(Debug, Clone)]
pub struct EvaluationDataset<'a> {
    reader: &'a dyn QuadReader,
    default_graph: ActiveGraph,
    named_graphs: ActiveGraph,
}

impl<'a> EvaluationDataset<'a> {
    pub fn new(reader: &'a dyn QuadReader, using: Option<&UsingList>) -> Self {
        match using {
            None => Self {
                reader,
                default_graph: ActiveGraph::DefaultGraph,
                named_graphs: ActiveGraph::AnyNamedGraph,
            },
            Some(using) => Self {
                reader,
                default_graph: ActiveGraph::Union(
                    using.default.iter().cloned().map(GraphName::from).collect(),
                ),
                named_graphs: ActiveGraph::Union(
                    using.named.iter().cloned().map(GraphName::from).collect(),
                ),
            },
        }
    }

    pub fn default_graph(&self) -> &ActiveGraph {
        &self.default_graph
    }

    pub fn named_graph_scope(&self) -> &ActiveGraph {
        &self.named_graphs
    }

    /// Returns the triples of the default graph of the dataset that match `filter`. The triples
    /// are returned as quads in the default graph.
    pub async fn find_in_default_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        let quads = match &self.default_graph {
            ActiveGraph::DefaultGraph => return self.reader.find_in_default_graph(filter).await,
            ActiveGraph::AnyNamedGraph => self.reader.find_in_any_named_graph(filter).await?,
            ActiveGraph::Union(graphs) => {
                let mut quads = Vec::new();
                for graph in graphs {
                    quads.extend(self.reader.find(Some(graph.as_ref()), filter).await?);
                }
                quads
            }
        };
        Ok(quads
            .into_iter()
            .map(|quad| {
                Quad::new(
                    quad.subject,
                    quad.predicate,
                    quad.object,
                    GraphName::DefaultGraph,
                )
            })
            .unique()
            .collect())
    }

    /// Returns the quads of the named graph `graph_name` that match `filter`. Named graphs
    /// outside the dataset are empty.
    pub async fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        if !self.is_named_graph(graph_name) {
            return Ok(Vec::new());
        }
        self.reader.find_in_named_graph(graph_name, filter).await
    }

    /// Returns the named graphs of the dataset.
    pub async fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        match &self.named_graphs {
            ActiveGraph::AnyNamedGraph => self.reader.named_graphs().await,
            ActiveGraph::DefaultGraph => Ok(Vec::new()),
            ActiveGraph::Union(graphs) => Ok(graphs
                .iter()
                .filter_map(|graph| to_named_graph(graph.as_ref()))
                .map(NamedOrBlankNodeRef::into_owned)
                .unique()
                .collect()),
        }
    }

    fn is_named_graph(&self, graph_name: NamedOrBlankNodeRef<'_>) -> bool {
        match &self.named_graphs {
            ActiveGraph::AnyNamedGraph => true,
            ActiveGraph::DefaultGraph => false,
            ActiveGraph::Union(graphs) => {
                let graph_name = to_graph_name(graph_name);
                graphs.iter().any(|graph| graph.as_ref() == graph_name)
            }
        }
    }
}
