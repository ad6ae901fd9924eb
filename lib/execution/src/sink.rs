use crate::error::{DataValidationError, TermPosition, ValidationRule};
use crate::lower::lower_graph_name;
use rdf_update_model::{
    GraphName, GraphNamePattern, NamedNodePattern, Quad, QuadPattern, Subject, Term, TermPattern,
    TriplePattern,
};
use rustc_hash::FxHashSet;
use spargebra::term::{GroundQuad, GroundSubject, GroundTerm};

/// Accumulates the data of an `INSERT DATA` or `DELETE DATA` operation.
///
/// Every accepted unit must be ground: no position may hold a variable and the subject may not be
/// a literal. A unit that breaks a rule is rejected as a whole and leaves the accumulated data
/// untouched.
///
/// Triples are placed in the current graph of the sink, which starts as the default graph.
#[derive(Clone, Debug, Default)]
pub struct QuadDataSink {
    graph: GraphName,
    quads: Vec<Quad>,
    seen: FxHashSet<Quad>,
}

impl QuadDataSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph that accepted triples are placed in.
    pub fn graph(&self) -> &GraphName {
        &self.graph
    }

    /// Changes the graph that subsequently accepted triples are placed in, for example when
    /// entering a `GRAPH` block.
    pub fn set_graph(&mut self, graph: GraphName) {
        self.graph = graph;
    }

    /// Accepts a triple into the current graph.
    ///
    /// Returns `false` if the quad has already been accepted.
    pub fn accept_triple(&mut self, triple: &TriplePattern) -> Result<bool, DataValidationError> {
        let subject = ground_subject(&triple.subject)?;
        let predicate = ground_predicate(&triple.predicate)?;
        let object = ground_object(&triple.object)?;
        Ok(self.push(Quad::new(subject, predicate, object, self.graph.clone())))
    }

    /// Accepts a quad. The graph of the quad takes precedence over the current graph.
    ///
    /// Returns `false` if the quad has already been accepted.
    pub fn accept_quad(&mut self, quad: &QuadPattern) -> Result<bool, DataValidationError> {
        let subject = ground_subject(&quad.subject)?;
        let predicate = ground_predicate(&quad.predicate)?;
        let object = ground_object(&quad.object)?;
        let graph_name = match &quad.graph_name {
            GraphNamePattern::NamedNode(node) => GraphName::NamedNode(node.clone()),
            GraphNamePattern::DefaultGraph => GraphName::DefaultGraph,
            GraphNamePattern::Variable(variable) => {
                return Err(DataValidationError::new(
                    variable,
                    TermPosition::GraphName,
                    ValidationRule::NonGroundTerm,
                ))
            }
        };
        Ok(self.push(Quad::new(subject, predicate, object, graph_name)))
    }

    /// Accepts a quad that the parser already guarantees to be ground.
    pub fn accept_ground_quad(&mut self, quad: &GroundQuad) -> bool {
        let subject = match &quad.subject {
            GroundSubject::NamedNode(node) => Subject::NamedNode(node.clone()),
        };
        let object = match &quad.object {
            GroundTerm::NamedNode(node) => Term::NamedNode(node.clone()),
            GroundTerm::Literal(literal) => Term::Literal(literal.clone()),
        };
        self.push(Quad::new(
            subject,
            quad.predicate.clone(),
            object,
            lower_graph_name(&quad.graph_name),
        ))
    }

    /// Accepts an already built quad.
    pub fn accept(&mut self, quad: Quad) -> bool {
        self.push(quad)
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Returns the accepted quads in the order they were accepted.
    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }

    fn push(&mut self, quad: Quad) -> bool {
        if !self.seen.insert(quad.clone()) {
            return false;
        }
        self.quads.push(quad);
        true
    }
}

fn ground_subject(pattern: &TermPattern) -> Result<Subject, DataValidationError> {
    match pattern {
        TermPattern::NamedNode(node) => Ok(node.clone().into()),
        TermPattern::BlankNode(node) => Ok(node.clone().into()),
        TermPattern::Literal(literal) => Err(DataValidationError::new(
            literal,
            TermPosition::Subject,
            ValidationRule::LiteralSubject,
        )),
        TermPattern::Variable(variable) => Err(DataValidationError::new(
            variable,
            TermPosition::Subject,
            ValidationRule::NonGroundTerm,
        )),
    }
}

fn ground_predicate(
    pattern: &NamedNodePattern,
) -> Result<rdf_update_model::NamedNode, DataValidationError> {
    match pattern {
        NamedNodePattern::NamedNode(node) => Ok(node.clone()),
        NamedNodePattern::Variable(variable) => Err(DataValidationError::new(
            variable,
            TermPosition::Predicate,
            ValidationRule::NonGroundTerm,
        )),
    }
}

fn ground_object(pattern: &TermPattern) -> Result<Term, DataValidationError> {
    match pattern {
        TermPattern::NamedNode(node) => Ok(node.clone().into()),
        TermPattern::BlankNode(node) => Ok(node.clone().into()),
        TermPattern::Literal(literal) => Ok(literal.clone().into()),
        TermPattern::Variable(variable) => Err(DataValidationError::new(
            variable,
            TermPosition::Object,
            ValidationRule::NonGroundTerm,
        )),
    }
}
