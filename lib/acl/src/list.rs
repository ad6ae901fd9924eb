use crate::{AccessDeniedError, AccessKind, AccessPolicy};
use rdf_update_model::{GraphNameRef, IriParseError, NamedNode};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The user id that is an administrator in a default [AccessControlList].
pub const ADMIN_USER: &str = "admin";

/// A static access policy built from administrators and per-user rules.
///
/// Administrators pass every check. Any other user needs a rule that grants the requested kind on
/// a selector matching the graph. Everything else is denied.
///
/// The list can be deserialized from configuration:
/// ```
/// use rdf_update_acl::{AccessControlList, AccessKind, AccessPolicy};
/// use rdf_update_model::{GraphNameRef, NamedNodeRef};
///
/// let acl: AccessControlList = serde_json::from_str(
///     r#"{
///         "admins": ["root"],
///         "rules": [{ "user": "monger", "graph": "http://graph_1", "kinds": ["query", "update"] }]
///     }"#,
/// )?;
/// let graph_1 = GraphNameRef::NamedNode(NamedNodeRef::new("http://graph_1")?);
/// assert!(acl.is_allowed(AccessKind::Update, graph_1, "monger"));
/// assert!(!acl.is_allowed(AccessKind::Drop, graph_1, "monger"));
/// assert!(acl.is_allowed(AccessKind::Drop, graph_1, "root"));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlList {
    admins: Vec<String>,
    rules: Vec<AccessRule>,
}

impl AccessControlList {
    /// Creates a list whose only administrator is [ADMIN_USER].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list without any administrator.
    pub fn without_admins() -> Self {
        Self {
            admins: Vec::new(),
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_admin(mut self, user: impl Into<String>) -> Self {
        self.admins.push(user.into());
        self
    }

    /// Grants `user` the given kinds of access on the graphs matched by `graph`.
    #[must_use]
    pub fn allow(
        mut self,
        user: impl Into<String>,
        graph: GraphSelector,
        kinds: impl IntoIterator<Item = AccessKind>,
    ) -> Self {
        self.rules.push(AccessRule {
            user: user.into(),
            graph,
            kinds: kinds.into_iter().collect(),
        });
        self
    }

    /// Grants `user` every kind of access on the graphs matched by `graph`.
    #[must_use]
    pub fn allow_all(self, user: impl Into<String>, graph: GraphSelector) -> Self {
        self.allow(user, graph, AccessKind::ALL)
    }

    pub fn is_admin(&self, user: &str) -> bool {
        self.admins.iter().any(|admin| admin == user)
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

impl Default for AccessControlList {
    fn default() -> Self {
        Self::without_admins().with_admin(ADMIN_USER)
    }
}

impl AccessPolicy for AccessControlList {
    fn check(
        &self,
        kind: AccessKind,
        graph: GraphNameRef<'_>,
        user: &str,
    ) -> Result<(), AccessDeniedError> {
        if self.is_admin(user) || self.rules.iter().any(|rule| rule.grants(kind, graph, user)) {
            Ok(())
        } else {
            Err(AccessDeniedError::new(user, graph, kind))
        }
    }
}

/// Grants a single user a set of access kinds on some graphs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub user: String,
    pub graph: GraphSelector,
    #[serde(default = "all_kinds")]
    pub kinds: Vec<AccessKind>,
}

impl AccessRule {
    fn grants(&self, kind: AccessKind, graph: GraphNameRef<'_>, user: &str) -> bool {
        self.user == user && self.graph.matches(graph) && self.kinds.contains(&kind)
    }
}

fn all_kinds() -> Vec<AccessKind> {
    AccessKind::ALL.to_vec()
}

/// Selects the graphs an [AccessRule] applies to.
///
/// In configuration, the default graph is written `DEFAULT`, every graph is written `ALL`, and a
/// named graph is written as its IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GraphSelector {
    DefaultGraph,
    AllGraphs,
    NamedGraph(NamedNode),
}

impl GraphSelector {
    pub fn matches(&self, graph: GraphNameRef<'_>) -> bool {
        match self {
            GraphSelector::AllGraphs => true,
            GraphSelector::DefaultGraph => graph.is_default_graph(),
            GraphSelector::NamedGraph(name) => match graph {
                GraphNameRef::NamedNode(node) => node == name.as_ref(),
                GraphNameRef::BlankNode(_) | GraphNameRef::DefaultGraph => false,
            },
        }
    }
}

impl From<NamedNode> for GraphSelector {
    fn from(value: NamedNode) -> Self {
        GraphSelector::NamedGraph(value)
    }
}

impl TryFrom<String> for GraphSelector {
    type Error = IriParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "DEFAULT" => Ok(GraphSelector::DefaultGraph),
            "ALL" => Ok(GraphSelector::AllGraphs),
            _ => NamedNode::new(value).map(GraphSelector::NamedGraph),
        }
    }
}

impl From<GraphSelector> for String {
    fn from(value: GraphSelector) -> Self {
        match value {
            GraphSelector::DefaultGraph => "DEFAULT".to_owned(),
            GraphSelector::AllGraphs => "ALL".to_owned(),
            GraphSelector::NamedGraph(node) => node.into_string(),
        }
    }
}

impl Display for GraphSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphSelector::DefaultGraph => f.write_str("DEFAULT"),
            GraphSelector::AllGraphs => f.write_str("ALL"),
            GraphSelector::NamedGraph(node) => write!(f, "{node}"),
        }
    }
}
