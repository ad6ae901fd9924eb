//! Access control for graph-touching operations.
//!
//! An [AccessPolicy] is consulted before any operation reads from or writes to a graph. A denied
//! check yields an [AccessDeniedError] that identifies the user, the graph, and the kind of access
//! that was refused.

mod error;
mod kind;
mod list;
mod policy;

pub use error::AccessDeniedError;
pub use kind::AccessKind;
pub use list::{AccessControlList, AccessRule, GraphSelector, ADMIN_USER};
pub use policy::{policy_fn, AccessPolicy, FnPolicy, PermitAll};
