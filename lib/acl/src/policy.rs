use crate::{AccessDeniedError, AccessKind};
use rdf_update_model::GraphNameRef;
use std::fmt::{Debug, Formatter};

/// Decides whether a user may perform a given kind of access on a graph.
///
/// Implementations define who counts as an administrator. The gate itself has no notion of
/// privileged users.
pub trait AccessPolicy: Debug + Send + Sync {
    /// Returns an [AccessDeniedError] if `user` may not perform `kind` on `graph`.
    fn check(
        &self,
        kind: AccessKind,
        graph: GraphNameRef<'_>,
        user: &str,
    ) -> Result<(), AccessDeniedError>;

    /// Returns whether `user` may perform `kind` on `graph`.
    fn is_allowed(&self, kind: AccessKind, graph: GraphNameRef<'_>, user: &str) -> bool {
        self.check(kind, graph, user).is_ok()
    }
}

/// A policy that allows every access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermitAll;

impl AccessPolicy for PermitAll {
    fn check(
        &self,
        _kind: AccessKind,
        _graph: GraphNameRef<'_>,
        _user: &str,
    ) -> Result<(), AccessDeniedError> {
        Ok(())
    }
}

/// Creates a policy from a predicate. A `false` answer is turned into an [AccessDeniedError].
///
/// ```
/// use rdf_update_acl::{policy_fn, AccessKind, AccessPolicy};
/// use rdf_update_model::GraphNameRef;
///
/// let read_only = policy_fn(|kind: AccessKind, _: GraphNameRef<'_>, _: &str| !kind.is_write());
/// assert!(read_only.check(AccessKind::Query, GraphNameRef::DefaultGraph, "alice").is_ok());
/// assert!(read_only.check(AccessKind::Drop, GraphNameRef::DefaultGraph, "alice").is_err());
/// ```
pub fn policy_fn<F>(predicate: F) -> FnPolicy<F>
where
    F: Fn(AccessKind, GraphNameRef<'_>, &str) -> bool + Send + Sync,
{
    FnPolicy(predicate)
}

/// See [policy_fn].
pub struct FnPolicy<F>(F);

impl<F> Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPolicy").finish_non_exhaustive()
    }
}

impl<F> AccessPolicy for FnPolicy<F>
where
    F: Fn(AccessKind, GraphNameRef<'_>, &str) -> bool + Send + Sync,
{
    fn check(
        &self,
        kind: AccessKind,
        graph: GraphNameRef<'_>,
        user: &str,
    ) -> Result<(), AccessDeniedError> {
        if (self.0)(kind, graph, user) {
            Ok(())
        } else {
            Err(AccessDeniedError::new(user, graph, kind))
        }
    }
}
