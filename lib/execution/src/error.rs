use rdf_update_acl::AccessDeniedError;
use rdf_update_common::error::StorageError;
use rdf_update_model::NamedOrBlankNode;
use std::fmt::{Display, Formatter};

/// An error raised while executing a batch of update operations.
///
/// Whenever an error is returned, the write transaction of the batch has been aborted and none of
/// the operations of the batch is visible.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpdateError {
    /// The access policy refused an access. Never suppressed by `SILENT`.
    #[error(transparent)]
    AccessDenied(#[from] AccessDeniedError),
    /// Data of an `INSERT DATA` or `DELETE DATA` operation is not ground.
    #[error(transparent)]
    DataValidation(#[from] DataValidationError),
    /// A graph targeted by an operation is missing or already exists.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The operation is malformed, for example a `COPY` without a destination.
    #[error("Invalid update operation: {0}")]
    InvalidOperation(String),
    /// An error from the quad store.
    #[error(transparent)]
    Transaction(#[from] StorageError),
    /// An error while evaluating the `WHERE` clause of a pattern-driven update.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("The update operation {0} is not supported")]
    Unsupported(String),
}

/// A graph targeted by an operation is in the wrong state. Suppressed by `SILENT`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// Error when `CREATE` tries to create an already existing graph
    #[error("The graph {0} already exists")]
    GraphAlreadyExists(NamedOrBlankNode),
    /// Error when `DROP`, `CLEAR` or a graph transfer targets a not existing graph
    #[error("The graph {0} does not exist")]
    GraphDoesNotExist(NamedOrBlankNode),
}

/// A term that may not appear in ground data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{rule}: {term} in {position} position")]
pub struct DataValidationError {
    term: String,
    position: TermPosition,
    rule: ValidationRule,
}

impl DataValidationError {
    pub(crate) fn new(term: impl Display, position: TermPosition, rule: ValidationRule) -> Self {
        Self {
            term: term.to_string(),
            position,
            rule,
        }
    }

    /// The offending term, rendered in its canonical textual form.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn position(&self) -> TermPosition {
        self.position
    }

    pub fn rule(&self) -> ValidationRule {
        self.rule
    }
}

/// A position of a quad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
    GraphName,
}

impl Display for TermPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TermPosition::Subject => "subject",
            TermPosition::Predicate => "predicate",
            TermPosition::Object => "object",
            TermPosition::GraphName => "graph name",
        })
    }
}

/// The rule violated by a [DataValidationError].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// A variable, or a nested term containing a variable.
    NonGroundTerm,
    /// A literal in subject position.
    LiteralSubject,
}

impl Display for ValidationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationRule::NonGroundTerm => "Variables not permitted in data",
            ValidationRule::LiteralSubject => "Literals not allowed as subjects in data",
        })
    }
}

/// An error of a [PatternEvaluator](crate::PatternEvaluator).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluationError {
    /// An error from the quad store that was read.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The pattern uses a construct the evaluator cannot evaluate.
    #[error("The graph pattern {0} is not supported by this evaluator")]
    Unsupported(String),
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
