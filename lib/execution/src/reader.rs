use async_trait::async_trait;
use rdf_update_acl::{AccessKind, AccessPolicy};
use rdf_update_common::error::StorageError;
use rdf_update_common::QuadReader;
use rdf_update_model::{
    to_graph_name, GraphNameRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, TripleFilter,
};

/// A [QuadReader] that hides every graph the user may not query.
///
/// Hidden graphs behave as if they were empty and absent. Reading never raises an access error.
#[derive(Debug, Clone, Copy)]
pub struct AccessFilteredReader<'a> {
    inner: &'a dyn QuadReader,
    policy: &'a dyn AccessPolicy,
    user: &'a str,
}

impl<'a> AccessFilteredReader<'a> {
    pub fn new(inner: &'a dyn QuadReader, policy: &'a dyn AccessPolicy, user: &'a str) -> Self {
        Self {
            inner,
            policy,
            user,
        }
    }

    fn can_query(&self, graph_name: GraphNameRef<'_>) -> bool {
        self.policy
            .is_allowed(AccessKind::Query, graph_name, self.user)
    }
}

#[async_trait]
impl QuadReader for AccessFilteredReader<'_> {
    async fn find_in_default_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        if !self.can_query(GraphNameRef::DefaultGraph) {
            return Ok(Vec::new());
        }
        self.inner.find_in_default_graph(filter).await
    }

    async fn find_in_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        if !self.can_query(to_graph_name(graph_name)) {
            return Ok(Vec::new());
        }
        self.inner.find_in_named_graph(graph_name, filter).await
    }

    async fn find_in_any_named_graph(
        &self,
        filter: TripleFilter<'_>,
    ) -> Result<Vec<Quad>, StorageError> {
        let mut quads = self.inner.find_in_any_named_graph(filter).await?;
        quads.retain(|quad| self.can_query(quad.graph_name.as_ref()));
        Ok(quads)
    }

    async fn named_graphs(&self) -> Result<Vec<NamedOrBlankNode>, StorageError> {
        let mut graphs = self.inner.named_graphs().await?;
        graphs.retain(|graph| self.can_query(to_graph_name(graph.as_ref())));
        Ok(graphs)
    }

    async fn contains_named_graph(
        &self,
        graph_name: NamedOrBlankNodeRef<'_>,
    ) -> Result<bool, StorageError> {
        if !self.can_query(to_graph_name(graph_name)) {
            return Ok(false);
        }
        self.inner.contains_named_graph(graph_name).await
    }
}
