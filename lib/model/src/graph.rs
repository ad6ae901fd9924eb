use oxrdf::{GraphNameRef, NamedOrBlankNodeRef};

/// Returns the [GraphNameRef] that names the graph `graph`.
pub fn to_graph_name(graph: NamedOrBlankNodeRef<'_>) -> GraphNameRef<'_> {
    match graph {
        NamedOrBlankNodeRef::NamedNode(node) => GraphNameRef::NamedNode(node),
        NamedOrBlankNodeRef::BlankNode(node) => GraphNameRef::BlankNode(node),
    }
}

/// Returns the name of a named graph or [None] for the default graph.
pub fn to_named_graph(graph_name: GraphNameRef<'_>) -> Option<NamedOrBlankNodeRef<'_>> {
    match graph_name {
        GraphNameRef::NamedNode(node) => Some(NamedOrBlankNodeRef::NamedNode(node)),
        GraphNameRef::BlankNode(node) => Some(NamedOrBlankNodeRef::BlankNode(node)),
        GraphNameRef::DefaultGraph => None,
    }
}
