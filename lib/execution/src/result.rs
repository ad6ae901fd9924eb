use rdf_update_model::Quad;
use std::fmt::{Display, Formatter};

/// The quads removed and added by a single operation of an update batch.
///
/// Both lists contain the quads that actually changed, not the quads that were requested. A list
/// is [None] if changes were not tracked, which is distinct from an empty list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateResult {
    deleted: Option<Vec<Quad>>,
    inserted: Option<Vec<Quad>>,
}

impl UpdateResult {
    pub fn new(deleted: Option<Vec<Quad>>, inserted: Option<Vec<Quad>>) -> Self {
        Self { deleted, inserted }
    }

    /// A result without change tracking.
    pub fn untracked() -> Self {
        Self {
            deleted: None,
            inserted: None,
        }
    }

    pub fn deleted(&self) -> Option<&[Quad]> {
        self.deleted.as_deref()
    }

    pub fn inserted(&self) -> Option<&[Quad]> {
        self.inserted.as_deref()
    }
}

impl Display for UpdateResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Deleted quads")?;
        write_quads(f, self.deleted.as_deref())?;
        f.write_str("\nUpdated quads")?;
        write_quads(f, self.inserted.as_deref())
    }
}

fn write_quads(f: &mut Formatter<'_>, quads: Option<&[Quad]>) -> std::fmt::Result {
    let Some(quads) = quads else {
        return f.write_str("\n\t<NONE>");
    };
    for quad in quads {
        write!(f, "\n\t{quad}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_update_model::{GraphName, Literal, NamedNode};

    fn quad(graph: GraphName) -> Quad {
        Quad::new(
            NamedNode::new_unchecked("http://example.com/s"),
            NamedNode::new_unchecked("http://example.com/p"),
            Literal::new_simple_literal("o"),
            graph,
        )
    }

    #[test]
    fn display_tracked_result() {
        let result = UpdateResult::new(
            Some(vec![quad(GraphName::DefaultGraph)]),
            Some(vec![
                quad(NamedNode::new_unchecked("http://example.com/g").into()),
                quad(GraphName::DefaultGraph),
            ]),
        );
        insta::assert_snapshot!(result, @r#"
        Deleted quads
        	<http://example.com/s> <http://example.com/p> "o"
        Updated quads
        	<http://example.com/s> <http://example.com/p> "o" <http://example.com/g>
        	<http://example.com/s> <http://example.com/p> "o"
        "#);
    }

    #[test]
    fn display_empty_and_untracked_lists() {
        let result = UpdateResult::new(Some(Vec::new()), None);
        insta::assert_snapshot!(result, @r"
        Deleted quads
        Updated quads
        	<NONE>
        ");
        assert_eq!(UpdateResult::untracked().deleted(), None);
    }
}
