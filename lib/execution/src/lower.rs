use crate::clause::{transfer_clauses, TransferClause};
use crate::error::UpdateError;
use crate::operation::{
    CreateGraph, GraphOperation, GraphOperationKind, GraphTarget, Modify, UpdateOperation,
    UsingList,
};
use crate::sink::QuadDataSink;
use rdf_update_model::{
    BlankNode, GraphName, GraphNamePattern, GraphPattern, GraphUpdateOperation,
    GroundQuadPattern, GroundTermPattern, NamedNodePattern, Quad, QuadPattern, Subject, Term,
    TermPattern, TriplePattern, Update,
};
use rustc_hash::FxHashMap;
use spargebra::algebra::GraphTarget as SparqlGraphTarget;
use spargebra::term::{GraphName as SparqlGraphName, Quad as SparqlQuad};

/// Converts a parsed SPARQL update into the operations of an update batch.
///
/// The parser rewrites `COPY` and `MOVE` into `DROP` and pattern-driven operations. These
/// rewritings are folded back into a single [GraphOperation]. Without the text of the update, the
/// `SILENT` flag of `COPY` is lost and `ADD` stays a pattern-driven operation. Prefer
/// [lower_update_text] when the text is at hand. `LOAD` is not supported.
pub fn lower_update(update: &Update) -> Result<Vec<UpdateOperation>, UpdateError> {
    lower_operations(&update.operations, None)
}

/// Converts a parsed SPARQL update, restoring its `ADD`, `COPY` and `MOVE` operations with the
/// help of `text`, the update that `update` was parsed from.
pub fn lower_update_text(
    update: &Update,
    text: &str,
) -> Result<Vec<UpdateOperation>, UpdateError> {
    lower_operations(&update.operations, Some(&transfer_clauses(text)))
}

fn lower_operations(
    operations: &[GraphUpdateOperation],
    clauses: Option<&[TransferClause]>,
) -> Result<Vec<UpdateOperation>, UpdateError> {
    let mut clauses = clauses.map(|clauses| clauses.iter().peekable());
    let mut lowered = Vec::with_capacity(operations.len());
    let mut rest = operations;
    while let Some(operation) = rest.first() {
        let folded = match &mut clauses {
            None => fold_transfer(rest, None),
            Some(clauses) => {
                let folded = clauses
                    .peek()
                    .and_then(|clause| fold_transfer(rest, Some(**clause)));
                if folded.is_some() {
                    clauses.next();
                }
                folded
            }
        };
        if let Some((transfer, consumed)) = folded {
            lowered.push(UpdateOperation::Graph(transfer));
            rest = &rest[consumed..];
        } else {
            lowered.push(lower_operation(operation)?);
            rest = &rest[1..];
        }
    }
    Ok(lowered)
}

/// Folds the rewriting of a transfer at the start of `operations` into a single operation.
///
/// Returns the operation and the number of parsed operations it replaces. If `clause` is [None],
/// the kind is guessed from the shape of the operations.
fn fold_transfer(
    operations: &[GraphUpdateOperation],
    clause: Option<TransferClause>,
) -> Option<(GraphOperation, usize)> {
    let kind = clause.map(|clause| clause.kind);
    if kind == Some(GraphOperationKind::Add) {
        let (source, destination) = copy_all_quads(operations.first()?)?;
        let silent = clause.is_some_and(|clause| clause.silent);
        return Some((GraphOperation::add(source, destination, silent), 1));
    }

    // COPY and MOVE start by silently dropping the destination.
    let [GraphUpdateOperation::Drop {
        silent: true,
        graph,
    }, rest @ ..] = operations
    else {
        return None;
    };
    let cleared = single_graph(graph)?;
    let (source, destination) = copy_all_quads(rest.first()?)?;
    if cleared != destination {
        return None;
    }
    let dropped_source = match rest.get(1) {
        Some(GraphUpdateOperation::Drop { silent, graph })
            if single_graph(graph).as_ref() == Some(&source) =>
        {
            Some(*silent)
        }
        _ => None,
    };
    match (clause, dropped_source) {
        (Some(clause), _) if clause.kind == GraphOperationKind::Copy => {
            Some((GraphOperation::copy(source, destination, clause.silent), 2))
        }
        (Some(clause), Some(_)) => Some((
            GraphOperation::r#move(source, destination, clause.silent),
            3,
        )),
        (Some(_), None) => None,
        (None, Some(silent)) => Some((GraphOperation::r#move(source, destination, silent), 3)),
        (None, None) => Some((GraphOperation::copy(source, destination, false), 2)),
    }
}

/// Matches `INSERT { GRAPH <to> { ?s ?p ?o } } WHERE { GRAPH <from> { ?s ?p ?o } }`, the parser's
/// rewriting of copying a graph, and returns the source and the destination.
fn copy_all_quads(operation: &GraphUpdateOperation) -> Option<(GraphName, GraphName)> {
    let GraphUpdateOperation::DeleteInsert {
        delete,
        insert,
        using: None,
        pattern,
    } = operation
    else {
        return None;
    };
    let [QuadPattern {
        subject,
        predicate,
        object,
        graph_name,
    }] = insert.as_slice()
    else {
        return None;
    };
    if !delete.is_empty() || !is_any_triple(subject, predicate, object) {
        return None;
    }
    let destination = match graph_name {
        GraphNamePattern::NamedNode(node) => GraphName::NamedNode(node.clone()),
        GraphNamePattern::DefaultGraph => GraphName::DefaultGraph,
        GraphNamePattern::Variable(_) => return None,
    };
    let (source, inner) = match pattern.as_ref() {
        GraphPattern::Graph {
            name: NamedNodePattern::NamedNode(node),
            inner,
        } => (GraphName::NamedNode(node.clone()), inner.as_ref()),
        pattern => (GraphName::DefaultGraph, pattern),
    };
    let GraphPattern::Bgp { patterns } = inner else {
        return None;
    };
    let [TriplePattern {
        subject,
        predicate,
        object,
    }] = patterns.as_slice()
    else {
        return None;
    };
    is_any_triple(subject, predicate, object).then_some((source, destination))
}

fn is_any_triple(
    subject: &TermPattern,
    predicate: &NamedNodePattern,
    object: &TermPattern,
) -> bool {
    matches!(subject, TermPattern::Variable(v) if v.as_str() == "s")
        && matches!(predicate, NamedNodePattern::Variable(v) if v.as_str() == "p")
        && matches!(object, TermPattern::Variable(v) if v.as_str() == "o")
}

fn single_graph(target: &SparqlGraphTarget) -> Option<GraphName> {
    match target {
        SparqlGraphTarget::NamedNode(node) => Some(GraphName::NamedNode(node.clone())),
        SparqlGraphTarget::DefaultGraph => Some(GraphName::DefaultGraph),
        SparqlGraphTarget::NamedGraphs | SparqlGraphTarget::AllGraphs => None,
    }
}

/// Converts a single parsed SPARQL update operation.
pub fn lower_operation(operation: &GraphUpdateOperation) -> Result<UpdateOperation, UpdateError> {
    Ok(match operation {
        GraphUpdateOperation::InsertData { data } => {
            // Blank nodes of the data denote fresh nodes scoped to the operation.
            let mut blank_nodes = FxHashMap::default();
            let mut sink = QuadDataSink::new();
            for quad in data {
                sink.accept(rename_blank_nodes(quad, &mut blank_nodes));
            }
            UpdateOperation::insert_data(sink.into_quads())
        }
        GraphUpdateOperation::DeleteData { data } => {
            let mut sink = QuadDataSink::new();
            for quad in data {
                sink.accept_ground_quad(quad);
            }
            UpdateOperation::delete_data(sink.into_quads())
        }
        GraphUpdateOperation::DeleteInsert {
            delete,
            insert,
            using,
            pattern,
        } => {
            let mut modify = Modify::new(
                delete.iter().map(lower_ground_quad_pattern).collect(),
                insert.clone(),
                pattern.as_ref().clone(),
            );
            if let Some(using) = using {
                modify = modify.with_using(UsingList::from(using.clone()));
            }
            UpdateOperation::Modify(modify)
        }
        GraphUpdateOperation::Load { .. } => {
            return Err(UpdateError::Unsupported(String::from("LOAD")))
        }
        GraphUpdateOperation::Clear { silent, graph } => {
            UpdateOperation::Graph(GraphOperation::clear(lower_graph_target(graph), *silent))
        }
        GraphUpdateOperation::Create { silent, graph } => {
            UpdateOperation::CreateGraph(CreateGraph::new(graph.clone(), *silent))
        }
        GraphUpdateOperation::Drop { silent, graph } => {
            UpdateOperation::Graph(GraphOperation::drop(lower_graph_target(graph), *silent))
        }
    })
}

pub(crate) fn lower_graph_name(graph_name: &SparqlGraphName) -> GraphName {
    match graph_name {
        SparqlGraphName::NamedNode(node) => GraphName::NamedNode(node.clone()),
        SparqlGraphName::DefaultGraph => GraphName::DefaultGraph,
    }
}

fn lower_graph_target(target: &SparqlGraphTarget) -> GraphTarget {
    match target {
        SparqlGraphTarget::NamedNode(node) => GraphTarget::NamedGraph(node.clone().into()),
        SparqlGraphTarget::DefaultGraph => GraphTarget::DefaultGraph,
        SparqlGraphTarget::NamedGraphs => GraphTarget::NamedGraphs,
        SparqlGraphTarget::AllGraphs => GraphTarget::AllGraphs,
    }
}

fn lower_ground_quad_pattern(pattern: &GroundQuadPattern) -> QuadPattern {
    QuadPattern {
        subject: lower_ground_term_pattern(&pattern.subject),
        predicate: pattern.predicate.clone(),
        object: lower_ground_term_pattern(&pattern.object),
        graph_name: pattern.graph_name.clone(),
    }
}

fn lower_ground_term_pattern(pattern: &GroundTermPattern) -> TermPattern {
    match pattern {
        GroundTermPattern::NamedNode(node) => TermPattern::NamedNode(node.clone()),
        GroundTermPattern::Literal(literal) => TermPattern::Literal(literal.clone()),
        GroundTermPattern::Variable(variable) => TermPattern::Variable(variable.clone()),
    }
}

fn rename_blank_nodes(
    quad: &SparqlQuad,
    blank_nodes: &mut FxHashMap<BlankNode, BlankNode>,
) -> Quad {
    let mut rename = |node: &BlankNode| blank_nodes.entry(node.clone()).or_default().clone();
    let subject = match &quad.subject {
        Subject::BlankNode(node) => Subject::BlankNode(rename(node)),
        subject => subject.clone(),
    };
    let object = match &quad.object {
        Term::BlankNode(node) => Term::BlankNode(rename(node)),
        object => object.clone(),
    };
    Quad::new(
        subject,
        quad.predicate.clone(),
        object,
        lower_graph_name(&quad.graph_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_update_model::NamedNode;

    fn lower(update: &str) -> Result<Vec<UpdateOperation>, UpdateError> {
        lower_update_text(&Update::parse(update, None).unwrap(), update)
    }

    fn graph(iri: &str) -> GraphName {
        NamedNode::new_unchecked(iri).into()
    }

    #[test]
    fn lower_insert_data_deduplicates_quads() {
        let operations = lower(
            "INSERT DATA { <http://e.com/s> <http://e.com/p> 1 . <http://e.com/s> <http://e.com/p> 1 }",
        )
        .unwrap();
        let [UpdateOperation::InsertData(data)] = operations.as_slice() else {
            panic!("unexpected operations: {operations:?}");
        };
        assert_eq!(data.quads.len(), 1);
    }

    #[test]
    fn lower_insert_data_renames_blank_nodes() {
        let operations = lower("INSERT DATA { _:b <http://e.com/p> _:b }").unwrap();
        let [UpdateOperation::InsertData(data)] = operations.as_slice() else {
            panic!("unexpected operations: {operations:?}");
        };
        let quad = &data.quads[0];
        let Subject::BlankNode(subject) = &quad.subject else {
            panic!("subject is not a blank node");
        };
        assert_ne!(subject.as_str(), "b");
        assert_eq!(quad.object, Term::BlankNode(subject.clone()));
    }

    #[test]
    fn lower_graph_management() {
        let operations =
            lower("CREATE SILENT GRAPH <http://e.com/g> ; DROP NAMED ; CLEAR GRAPH <http://e.com/g>")
                .unwrap();
        assert!(matches!(
            &operations[0],
            UpdateOperation::CreateGraph(CreateGraph { silent: true, .. })
        ));
        assert!(matches!(
            &operations[1],
            UpdateOperation::Graph(GraphOperation {
                kind: GraphOperationKind::Drop,
                source: GraphTarget::NamedGraphs,
                ..
            })
        ));
        assert!(matches!(
            &operations[2],
            UpdateOperation::Graph(GraphOperation {
                kind: GraphOperationKind::Clear,
                source: GraphTarget::NamedGraph(_),
                silent: false,
                ..
            })
        ));
    }

    #[test]
    fn lower_delete_insert_keeps_using() {
        let operations = lower(
            "DELETE { ?s ?p ?o } INSERT { ?s ?p 1 } USING <http://e.com/g> WHERE { ?s ?p ?o }",
        )
        .unwrap();
        let [UpdateOperation::Modify(modify)] = operations.as_slice() else {
            panic!("unexpected operations: {operations:?}");
        };
        assert_eq!(modify.delete.len(), 1);
        assert_eq!(modify.insert.len(), 1);
        assert_eq!(modify.using.as_ref().map(|using| using.default.len()), Some(1));
    }

    #[test]
    fn lower_load_is_unsupported() {
        let error = lower("LOAD <http://e.com/data.ttl>").unwrap_err();
        insta::assert_snapshot!(error, @"The update operation LOAD is not supported");
    }

    #[test]
    fn lower_delete_data_keeps_graph() {
        let operations =
            lower("DELETE DATA { GRAPH <http://e.com/g> { <http://e.com/s> <http://e.com/p> 1 } }")
                .unwrap();
        let [UpdateOperation::DeleteData(data)] = operations.as_slice() else {
            panic!("unexpected operations: {operations:?}");
        };
        assert_eq!(data.quads[0].graph_name, graph("http://e.com/g"));
    }

    #[test]
    fn lower_transfers_to_single_operations() {
        let operations = lower(
            "ADD SILENT <http://e.com/a> TO DEFAULT ; \
             COPY GRAPH <http://e.com/a> TO <http://e.com/b> ; \
             MOVE SILENT DEFAULT TO <http://e.com/c>",
        )
        .unwrap();
        assert_eq!(
            operations,
            vec![
                UpdateOperation::Graph(GraphOperation::add(
                    graph("http://e.com/a"),
                    GraphName::DefaultGraph,
                    true
                )),
                UpdateOperation::Graph(GraphOperation::copy(
                    graph("http://e.com/a"),
                    graph("http://e.com/b"),
                    false
                )),
                UpdateOperation::Graph(GraphOperation::r#move(
                    GraphName::DefaultGraph,
                    graph("http://e.com/c"),
                    true
                )),
            ]
        );
    }

    #[test]
    fn lower_copy_silent_keeps_flag() {
        let operations = lower("COPY SILENT <http://e.com/a> TO <http://e.com/b>").unwrap();
        assert_eq!(
            operations,
            vec![UpdateOperation::Graph(GraphOperation::copy(
                graph("http://e.com/a"),
                graph("http://e.com/b"),
                true
            ))]
        );
    }

    #[test]
    fn lower_transfer_to_itself_is_empty() {
        assert!(lower("COPY <http://e.com/a> TO <http://e.com/a>").unwrap().is_empty());
    }

    #[test]
    fn lower_insert_where_is_not_an_add() {
        let update = "INSERT { GRAPH <http://e.com/b> { ?s ?p ?o } } \
                      WHERE { GRAPH <http://e.com/a> { ?s ?p ?o } }";
        let [UpdateOperation::Modify(_)] = lower(update).unwrap().as_slice() else {
            panic!("expected a pattern-driven update");
        };
    }

    #[test]
    fn lower_without_text_folds_copy_and_move() {
        let update = Update::parse(
            "COPY <http://e.com/a> TO <http://e.com/b> ; MOVE SILENT <http://e.com/b> TO DEFAULT",
            None,
        )
        .unwrap();
        assert_eq!(
            lower_update(&update).unwrap(),
            vec![
                UpdateOperation::Graph(GraphOperation::copy(
                    graph("http://e.com/a"),
                    graph("http://e.com/b"),
                    false
                )),
                UpdateOperation::Graph(GraphOperation::r#move(
                    graph("http://e.com/b"),
                    GraphName::DefaultGraph,
                    true
                )),
            ]
        );
    }
}
