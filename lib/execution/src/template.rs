use rdf_update_model::{
    BlankNode, Binding, GraphName, GraphNamePattern, NamedNodePattern, Quad, QuadPattern, Subject,
    Term, TermPattern,
};
use rustc_hash::FxHashMap;

/// Returns the graph of `template` if it does not depend on a binding.
pub(crate) fn constant_graph(template: &QuadPattern) -> Option<GraphName> {
    match &template.graph_name {
        GraphNamePattern::NamedNode(node) => Some(node.clone().into()),
        GraphNamePattern::DefaultGraph => Some(GraphName::DefaultGraph),
        GraphNamePattern::Variable(_) => None,
    }
}

/// Instantiates a delete template. Blank nodes never match existing data, so templates with a
/// blank node are skipped.
pub(crate) fn instantiate_delete(template: &QuadPattern, solution: &Binding) -> Option<Quad> {
    instantiate(template, solution, &mut |_| None)
}

/// Instantiates an insert template. Every blank node of the template is replaced by a fresh blank
/// node that is shared by all templates instantiated with the same `blank_nodes` map.
pub(crate) fn instantiate_insert(
    template: &QuadPattern,
    solution: &Binding,
    blank_nodes: &mut FxHashMap<BlankNode, BlankNode>,
) -> Option<Quad> {
    instantiate(template, solution, &mut |node| {
        Some(blank_nodes.entry(node.clone()).or_default().clone())
    })
}

/// Returns [None] if a position is unbound or bound to a term that is not allowed in that
/// position.
fn instantiate(
    template: &QuadPattern,
    solution: &Binding,
    blank_node: &mut dyn FnMut(&BlankNode) -> Option<BlankNode>,
) -> Option<Quad> {
    let subject: Subject = match &template.subject {
        TermPattern::NamedNode(node) => node.clone().into(),
        TermPattern::BlankNode(node) => blank_node(node)?.into(),
        TermPattern::Literal(_) => return None,
        TermPattern::Variable(variable) => match solution.get(variable)? {
            Term::NamedNode(node) => node.clone().into(),
            Term::BlankNode(node) => node.clone().into(),
            Term::Literal(_) => return None,
        },
    };
    let predicate = match &template.predicate {
        NamedNodePattern::NamedNode(node) => node.clone(),
        NamedNodePattern::Variable(variable) => match solution.get(variable)? {
            Term::NamedNode(node) => node.clone(),
            Term::BlankNode(_) | Term::Literal(_) => return None,
        },
    };
    let object: Term = match &template.object {
        TermPattern::NamedNode(node) => node.clone().into(),
        TermPattern::BlankNode(node) => blank_node(node)?.into(),
        TermPattern::Literal(literal) => literal.clone().into(),
        TermPattern::Variable(variable) => solution.get(variable)?.clone(),
    };
    let graph_name: GraphName = match &template.graph_name {
        GraphNamePattern::NamedNode(node) => node.clone().into(),
        GraphNamePattern::DefaultGraph => GraphName::DefaultGraph,
        GraphNamePattern::Variable(variable) => match solution.get(variable)? {
            Term::NamedNode(node) => node.clone().into(),
            Term::BlankNode(node) => node.clone().into(),
            Term::Literal(_) => return None,
        },
    };
    Some(Quad::new(subject, predicate, object, graph_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_update_model::{Literal, NamedNode, Variable};

    fn template(subject: TermPattern, graph_name: GraphNamePattern) -> QuadPattern {
        QuadPattern {
            subject,
            predicate: NamedNode::new_unchecked("http://example.com/p").into(),
            object: Variable::new_unchecked("o").into(),
            graph_name,
        }
    }

    fn solution() -> Binding {
        [
            (
                Variable::new_unchecked("s"),
                Term::from(NamedNode::new_unchecked("http://example.com/s")),
            ),
            (
                Variable::new_unchecked("o"),
                Term::from(Literal::new_simple_literal("o")),
            ),
            (
                Variable::new_unchecked("g"),
                Term::from(Literal::new_simple_literal("not a graph")),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn instantiate_bound_template() {
        let quad = instantiate_delete(
            &template(
                Variable::new_unchecked("s").into(),
                GraphNamePattern::DefaultGraph,
            ),
            &solution(),
        )
        .unwrap();
        insta::assert_snapshot!(quad, @r#"<http://example.com/s> <http://example.com/p> "o""#);
    }

    #[test]
    fn unbound_and_ill_typed_positions_are_skipped() {
        let unbound = template(
            Variable::new_unchecked("x").into(),
            GraphNamePattern::DefaultGraph,
        );
        assert!(instantiate_delete(&unbound, &solution()).is_none());

        let literal_subject = template(
            Variable::new_unchecked("o").into(),
            GraphNamePattern::DefaultGraph,
        );
        assert!(instantiate_delete(&literal_subject, &solution()).is_none());

        let literal_graph = template(
            Variable::new_unchecked("s").into(),
            Variable::new_unchecked("g").into(),
        );
        assert!(instantiate_delete(&literal_graph, &solution()).is_none());
    }

    #[test]
    fn blank_nodes_are_fresh_per_map() {
        let with_blank_node = template(
            BlankNode::new_unchecked("b").into(),
            GraphNamePattern::DefaultGraph,
        );
        assert!(instantiate_delete(&with_blank_node, &solution()).is_none());

        let mut first = FxHashMap::default();
        let a = instantiate_insert(&with_blank_node, &solution(), &mut first).unwrap();
        let b = instantiate_insert(&with_blank_node, &solution(), &mut first).unwrap();
        let c = instantiate_insert(&with_blank_node, &solution(), &mut FxHashMap::default())
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            a.subject,
            Subject::BlankNode(BlankNode::new_unchecked("b"))
        );
    }
}
