use rdf_update_execution::{DataValidationError, UpdateError};
use rdf_update_model::SparqlSyntaxError;

/// An error raised while executing an update on a [`Store`](crate::store::Store).
#[derive(Debug, thiserror::Error)]
pub enum UpdateEvaluationError {
    /// The update string is not valid SPARQL.
    #[error(transparent)]
    Parsing(#[from] SparqlSyntaxError),
    /// An error raised while executing the update. Nothing of the update has been applied.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

impl From<DataValidationError> for UpdateEvaluationError {
    #[inline]
    fn from(error: DataValidationError) -> Self {
        Self::Update(error.into())
    }
}
