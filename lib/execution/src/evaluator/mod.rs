//! Evaluation of the `WHERE` clause of pattern-driven updates.

mod dataset;
mod expression;
mod simple;

pub use dataset::{ActiveGraph, EvaluationDataset};
pub use simple::SimplePatternEvaluator;

use crate::error::EvaluationError;
use crate::operation::UsingList;
use async_trait::async_trait;
use futures::stream::BoxStream;
use rdf_update_common::QuadReader;
use rdf_update_model::{Binding, GraphPattern};
use std::fmt::Debug;

/// A stream of bindings produced by a [PatternEvaluator].
pub type BindingStream = BoxStream<'static, Result<Binding, EvaluationError>>;

/// Evaluates a graph pattern against a dataset and produces the matching bindings.
///
/// Query engines plug into the update executor through this trait. Every call evaluates the
/// pattern from scratch. The order of the bindings is unspecified unless the pattern defines one.
#[async_trait]
pub trait PatternEvaluator: Debug + Send + Sync {
    /// Evaluates `pattern` over `dataset`.
    ///
    /// If `using` is set, the default graph of the evaluation is the merge of the listed default
    /// graphs and only the listed named graphs are visible. Otherwise, the default graph of
    /// `dataset` is used and all of its named graphs are visible. Every produced binding is
    /// compatible with `input`.
    async fn evaluate(
        &self,
        dataset: &dyn QuadReader,
        pattern: &GraphPattern,
        using: Option<&UsingList>,
        input: Option<&Binding>,
    ) -> Result<BindingStream, EvaluationError>;
}
