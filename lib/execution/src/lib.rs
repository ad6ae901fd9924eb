#![doc(test(attr(deny(warnings))))]

//! This crate defines the update execution engine of RDF Update.
//!
//! # Executing updates
//!
//! An [UpdateExecutor] applies a batch of [UpdateOperation]s to a
//! [QuadStore](rdf_update_common::QuadStore):
//!
//! ```text
//! SPARQL Update (spargebra) -> [UpdateOperation] -> UpdateExecutor -> [UpdateResult]
//! ```
//!
//! Every batch runs in a single write transaction. Before an operation touches a graph, the
//! [AccessPolicy](rdf_update_acl::AccessPolicy) of the executor is consulted. The first failing
//! operation aborts the transaction, so either all operations of a batch become visible or none.
//!
//! # Pattern-driven updates
//!
//! The `WHERE` clause of a [Modify] is evaluated by a [PatternEvaluator]. The
//! [SimplePatternEvaluator] covers the graph patterns commonly used in updates. Other query engines
//! can be plugged in by implementing [PatternEvaluator].

mod clause;
mod error;
pub mod evaluator;
mod executor;
mod lower;
mod operation;
mod options;
mod reader;
mod result;
mod sink;
mod template;

pub use error::{
    DataValidationError, EvaluationError, StructuralError, TermPosition, UpdateError,
    ValidationRule,
};
pub use evaluator::{BindingStream, PatternEvaluator, SimplePatternEvaluator};
pub use executor::UpdateExecutor;
pub use lower::{lower_operation, lower_update, lower_update_text};
pub use operation::{
    check_graph_operation, CreateGraph, DataOperation, GraphOperation, GraphOperationKind,
    GraphTarget, Modify, OperationContext, UpdateOperation, UsingList,
};
pub use options::UpdateOptions;
pub use reader::AccessFilteredReader;
pub use result::UpdateResult;
pub use sink::QuadDataSink;
