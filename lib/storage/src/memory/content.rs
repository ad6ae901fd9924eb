use rdf_update_common::error::CorruptionError;
use rdf_update_model::{
    to_graph_name, to_named_graph, GraphName, NamedOrBlankNode, NamedOrBlankNodeRef, Quad,
    QuadRef, Triple, TripleFilter, TripleRef,
};

/// The content of a [MemoryQuadStore](super::MemoryQuadStore).
///
/// Default graph triples and named graph quads are kept in two separate lists. Both lists are
/// sets: an element is never stored twice. `graphs` contains the named graphs that have been
/// created explicitly, independent of their content.
#[derive(Clone, Debug, Default)]
pub(super) struct Content {
    triples: Vec<Triple>,
    quads: Vec<Quad>,
    graphs: Vec<NamedOrBlankNode>,
}

impl Content {
    pub fn find_in_default_graph(&self, filter: TripleFilter<'_>) -> Vec<Quad> {
        self.triples
            .iter()
            .filter(|triple| filter.matches(triple.as_ref()))
            .map(|triple| triple.clone().in_graph(GraphName::DefaultGraph))
            .collect()
    }

    pub fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Vec<Quad> {
        let graph_name = to_graph_name(graph_name);
        self.quads
            .iter()
            .filter(|quad| {
                quad.graph_name.as_ref() == graph_name && filter.matches_quad(quad.as_ref())
            })
            .cloned()
            .collect()
    }

    pub fn find_in_any_named_graph(&self, filter: TripleFilter<'_>) -> Vec<Quad> {
        self.quads
            .iter()
            .filter(|quad| filter.matches_quad(quad.as_ref()))
            .cloned()
            .collect()
    }

    /// Explicitly created graphs come first, followed by the graphs that only exist because
    /// they hold quads.
    pub fn named_graphs(&self) -> Vec<NamedOrBlankNode> {
        let mut result = self.graphs.clone();
        for quad in &self.quads {
            if let Some(graph) = to_named_graph(quad.graph_name.as_ref()) {
                if !result.iter().any(|g| g.as_ref() == graph) {
                    result.push(graph.into_owned());
                }
            }
        }
        result
    }

    pub fn contains_named_graph(&self, graph_name: NamedOrBlankNodeRef<'_>) -> bool {
        let as_graph_name = to_graph_name(graph_name);
        self.graphs.iter().any(|g| g.as_ref() == graph_name)
            || self
                .quads
                .iter()
                .any(|quad| quad.graph_name.as_ref() == as_graph_name)
    }

    pub fn insert_triple(&mut self, triple: TripleRef<'_>) -> bool {
        if self.triples.iter().any(|t| t.as_ref() == triple) {
            return false;
        }
        self.triples.push(triple.into_owned());
        true
    }

    pub fn remove_triple(&mut self, triple: TripleRef<'_>) -> bool {
        match self.triples.iter().position(|t| t.as_ref() == triple) {
            Some(index) => {
                self.triples.remove(index);
                true
            }
            None => false,
        }
    }

    /// The caller must make sure that `quad` is in a named graph.
    pub fn insert_quad(&mut self, quad: QuadRef<'_>) -> bool {
        if self.quads.iter().any(|q| q.as_ref() == quad) {
            return false;
        }
        self.quads.push(quad.into_owned());
        true
    }

    pub fn remove_quad(&mut self, quad: QuadRef<'_>) -> bool {
        match self.quads.iter().position(|q| q.as_ref() == quad) {
            Some(index) => {
                self.quads.remove(index);
                true
            }
            None => false,
        }
    }

    /// Registers `graph_name` as an explicitly created graph. Returns `false` if the graph already
    /// existed, either explicitly or by holding quads.
    pub fn insert_graph(&mut self, graph_name: NamedOrBlankNodeRef<'_>) -> bool {
        if self.contains_named_graph(graph_name) {
            return false;
        }
        self.graphs.push(graph_name.into_owned());
        true
    }

    /// Removes the explicit registration of `graph_name`. The quads of the graph are untouched.
    pub fn remove_graph(&mut self, graph_name: NamedOrBlankNodeRef<'_>) -> bool {
        match self.graphs.iter().position(|g| g.as_ref() == graph_name) {
            Some(index) => {
                self.graphs.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.triples.len() + self.quads.len()
    }

    pub fn validate(&self) -> Result<(), CorruptionError> {
        for (index, triple) in self.triples.iter().enumerate() {
            if self.triples[..index].contains(triple) {
                return Err(CorruptionError::msg(format!(
                    "Triple {triple} is stored twice in the default graph"
                )));
            }
        }
        for (index, quad) in self.quads.iter().enumerate() {
            if quad.graph_name.is_default_graph() {
                return Err(CorruptionError::msg(format!(
                    "Quad {quad} is stored with the named graph quads"
                )));
            }
            if self.quads[..index].contains(quad) {
                return Err(CorruptionError::msg(format!("Quad {quad} is stored twice")));
            }
        }
        for (index, graph) in self.graphs.iter().enumerate() {
            if self.graphs[..index].contains(graph) {
                return Err(CorruptionError::msg(format!(
                    "Graph {graph} is registered twice"
                )));
            }
        }
        Ok(())
    }
}
