mod binding;
mod filter;
mod graph;

pub use binding::Binding;
pub use filter::TripleFilter;
pub use graph::{to_graph_name, to_named_graph};

// Re-export some oxrdf types.
pub use oxiri::{Iri, IriParseError};
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Subject, SubjectRef, Term,
    TermRef, Triple, TripleRef, Variable, VariableRef,
};
pub use oxrdf::vocab;

// Re-export the parsed SPARQL update algebra.
pub use spargebra::algebra::{Expression, GraphPattern, QueryDataset};
pub use spargebra::term::{
    GraphNamePattern, GroundQuad, GroundQuadPattern, GroundTerm, GroundTermPattern,
    NamedNodePattern, QuadPattern, TermPattern, TriplePattern,
};
pub use spargebra::{GraphUpdateOperation, SparqlSyntaxError, Update};
