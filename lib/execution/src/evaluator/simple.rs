use crate::error::EvaluationError;
use crate::evaluator::dataset::EvaluationDataset;
use crate::evaluator::expression::{effective_boolean_value, evaluate_expression};
use crate::evaluator::{BindingStream, PatternEvaluator};
use crate::operation::UsingList;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use itertools::Itertools;
use rdf_update_common::QuadReader;
use rdf_update_model::{
    BlankNode, Binding, GraphPattern, GroundTerm, NamedNode, NamedNodePattern, NamedOrBlankNode,
    Subject, SubjectRef, Term, TermPattern, TermRef, TripleFilter, TriplePattern, Variable,
};
use tracing::trace;

/// A pattern evaluator that scans the dataset for every triple pattern.
///
/// Supports basic graph patterns, `GRAPH`, joins, `OPTIONAL`, `UNION`, `FILTER`, `BIND`, `VALUES`,
/// sub-selects, `DISTINCT`, `REDUCED`, and `LIMIT`/`OFFSET`. Blank nodes in the pattern match like
/// variables. Everything else is rejected with [EvaluationError::Unsupported].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimplePatternEvaluator;

impl SimplePatternEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PatternEvaluator for SimplePatternEvaluator {
    async fn evaluate(
        &self,
        dataset: &dyn QuadReader,
        pattern: &GraphPattern,
        using: Option<&UsingList>,
        input: Option<&Binding>,
    ) -> Result<BindingStream, EvaluationError> {
        let dataset = EvaluationDataset::new(dataset, using);
        trace!(
            default_graph = %dataset.default_graph(),
            named_graphs = %dataset.named_graph_scope(),
            "Evaluating graph pattern"
        );
        let seed = input.cloned().unwrap_or_default();
        let solutions =
            evaluate_pattern(&dataset, pattern, GraphContext::DefaultGraph, vec![seed]).await?;
        Ok(stream::iter(solutions.into_iter().map(Ok)).boxed())
    }
}

/// The graph that triple patterns are matched against.
#[derive(Clone, Debug)]
enum GraphContext {
    DefaultGraph,
    NamedGraph(NamedOrBlankNode),
}

/// Evaluates `pattern` once for every binding of `input` and returns all extended bindings.
fn evaluate_pattern<'a>(
    dataset: &'a EvaluationDataset<'a>,
    pattern: &'a GraphPattern,
    graph: GraphContext,
    input: Vec<Binding>,
) -> BoxFuture<'a, Result<Vec<Binding>, EvaluationError>> {
    async move {
        match pattern {
            GraphPattern::Bgp { patterns } => {
                let mut solutions = input;
                for triple in patterns {
                    solutions = match_triple_pattern(dataset, triple, &graph, solutions).await?;
                }
                Ok(solutions)
            }
            GraphPattern::Join { left, right } => {
                let left = evaluate_pattern(dataset, left, graph.clone(), input).await?;
                evaluate_pattern(dataset, right, graph, left).await
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => {
                let left = evaluate_pattern(dataset, left, graph.clone(), input).await?;
                let mut solutions = Vec::new();
                for solution in left {
                    let mut extended =
                        evaluate_pattern(dataset, right, graph.clone(), vec![solution.clone()])
                            .await?;
                    if let Some(expression) = expression {
                        extended = filter_solutions(expression, extended)?;
                    }
                    if extended.is_empty() {
                        solutions.push(solution);
                    } else {
                        solutions.extend(extended);
                    }
                }
                Ok(solutions)
            }
            GraphPattern::Filter { expr, inner } => {
                let solutions = evaluate_pattern(dataset, inner, graph, input).await?;
                filter_solutions(expr, solutions)
            }
            GraphPattern::Union { left, right } => {
                let mut solutions =
                    evaluate_pattern(dataset, left, graph.clone(), input.clone()).await?;
                solutions.extend(evaluate_pattern(dataset, right, graph, input).await?);
                Ok(solutions)
            }
            GraphPattern::Graph { name, inner } => match name {
                NamedNodePattern::NamedNode(node) => {
                    let graph = GraphContext::NamedGraph(node.clone().into());
                    evaluate_pattern(dataset, inner, graph, input).await
                }
                NamedNodePattern::Variable(variable) => {
                    let mut solutions = Vec::new();
                    for graph_name in dataset.named_graphs().await? {
                        let value = named_graph_term(&graph_name);
                        let seeds = input
                            .iter()
                            .filter_map(|solution| {
                                let mut solution = solution.clone();
                                unify_variable(variable, value.as_ref(), &mut solution)
                                    .then_some(solution)
                            })
                            .collect::<Vec<_>>();
                        if seeds.is_empty() {
                            continue;
                        }
                        let graph = GraphContext::NamedGraph(graph_name);
                        solutions.extend(evaluate_pattern(dataset, inner, graph, seeds).await?);
                    }
                    Ok(solutions)
                }
            },
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let solutions = evaluate_pattern(dataset, inner, graph, input).await?;
                let mut extended = Vec::with_capacity(solutions.len());
                for mut solution in solutions {
                    match evaluate_expression(expression, &solution)? {
                        Some(value) => {
                            if unify_variable(variable, value.as_ref(), &mut solution) {
                                extended.push(solution);
                            }
                        }
                        None => extended.push(solution),
                    }
                }
                Ok(extended)
            }
            GraphPattern::Values {
                variables,
                bindings,
            } => {
                let mut solutions = Vec::new();
                for seed in &input {
                    for row in bindings {
                        let mut solution = seed.clone();
                        let compatible = variables.iter().zip(row).all(|(variable, value)| {
                            value.as_ref().map_or(true, |value| {
                                unify_variable(variable, ground_term(value).as_ref(), &mut solution)
                            })
                        });
                        if compatible {
                            solutions.push(solution);
                        }
                    }
                }
                Ok(solutions)
            }
            GraphPattern::Project { inner, variables } => {
                let projected = evaluate_pattern(dataset, inner, graph, vec![Binding::new()])
                    .await?
                    .into_iter()
                    .map(|solution| solution.project(variables))
                    .collect::<Vec<_>>();
                Ok(input
                    .iter()
                    .cartesian_product(&projected)
                    .filter_map(|(seed, solution)| seed.merge(solution))
                    .collect())
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => {
                let solutions = evaluate_pattern(dataset, inner, graph, input).await?;
                Ok(solutions.into_iter().unique_by(binding_key).collect())
            }
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                let solutions = evaluate_pattern(dataset, inner, graph, input).await?;
                let solutions = solutions.into_iter().skip(*start);
                Ok(match length {
                    Some(length) => solutions.take(*length).collect(),
                    None => solutions.collect(),
                })
            }
            other => Err(EvaluationError::Unsupported(other.to_string())),
        }
    }
    .boxed()
}

async fn match_triple_pattern(
    dataset: &EvaluationDataset<'_>,
    pattern: &TriplePattern,
    graph: &GraphContext,
    input: Vec<Binding>,
) -> Result<Vec<Binding>, EvaluationError> {
    let mut solutions = Vec::new();
    for solution in input {
        let subject = match lookup(&pattern.subject, &solution) {
            Some(Term::NamedNode(node)) => Some(Subject::NamedNode(node)),
            Some(Term::BlankNode(node)) => Some(Subject::BlankNode(node)),
            Some(Term::Literal(_)) => continue,
            None => None,
        };
        let predicate = match &pattern.predicate {
            NamedNodePattern::NamedNode(node) => Some(node.clone()),
            NamedNodePattern::Variable(variable) => match solution.get(variable) {
                Some(Term::NamedNode(node)) => Some(node.clone()),
                Some(_) => continue,
                None => None,
            },
        };
        let object = lookup(&pattern.object, &solution);

        let filter = TripleFilter {
            subject: subject.as_ref().map(Subject::as_ref),
            predicate: predicate.as_ref().map(NamedNode::as_ref),
            object: object.as_ref().map(Term::as_ref),
        };
        let quads = match graph {
            GraphContext::DefaultGraph => dataset.find_in_default_graph(filter).await?,
            GraphContext::NamedGraph(graph_name) => {
                dataset
                    .find_in_named_graph(graph_name.as_ref(), filter)
                    .await?
            }
        };

        for quad in quads {
            let mut extended = solution.clone();
            let matches = unify(&pattern.subject, subject_term(quad.subject.as_ref()), &mut extended)
                && match &pattern.predicate {
                    NamedNodePattern::NamedNode(node) => *node == quad.predicate,
                    NamedNodePattern::Variable(variable) => {
                        unify_variable(variable, quad.predicate.as_ref().into(), &mut extended)
                    }
                }
                && unify(&pattern.object, quad.object.as_ref(), &mut extended);
            if matches {
                solutions.push(extended);
            }
        }
    }
    Ok(solutions)
}

fn filter_solutions(
    expression: &rdf_update_model::Expression,
    solutions: Vec<Binding>,
) -> Result<Vec<Binding>, EvaluationError> {
    let mut result = Vec::with_capacity(solutions.len());
    for solution in solutions {
        if effective_boolean_value(expression, &solution)? == Some(true) {
            result.push(solution);
        }
    }
    Ok(result)
}

/// Returns the term a pattern position is fixed to under `solution`, or [None] if the position is
/// open.
fn lookup(pattern: &TermPattern, solution: &Binding) -> Option<Term> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::Literal(literal) => Some(literal.clone().into()),
        TermPattern::BlankNode(node) => solution.get(&blank_node_variable(node)).cloned(),
        TermPattern::Variable(variable) => solution.get(variable).cloned(),
    }
}

fn unify(pattern: &TermPattern, term: TermRef<'_>, solution: &mut Binding) -> bool {
    match pattern {
        TermPattern::NamedNode(node) => term == TermRef::from(node.as_ref()),
        TermPattern::Literal(literal) => term == TermRef::from(literal.as_ref()),
        TermPattern::BlankNode(node) => unify_variable(&blank_node_variable(node), term, solution),
        TermPattern::Variable(variable) => unify_variable(variable, term, solution),
    }
}

fn unify_variable(variable: &Variable, term: TermRef<'_>, solution: &mut Binding) -> bool {
    match solution.get(variable) {
        Some(bound) => bound.as_ref() == term,
        None => {
            solution.insert(variable.clone(), term.into_owned());
            true
        }
    }
}

/// Blank nodes of a `WHERE` clause are matched like variables that cannot clash with named
/// variables.
fn blank_node_variable(node: &BlankNode) -> Variable {
    Variable::new_unchecked(format!("_:{}", node.as_str()))
}

fn subject_term(subject: SubjectRef<'_>) -> TermRef<'_> {
    match subject {
        SubjectRef::NamedNode(node) => node.into(),
        SubjectRef::BlankNode(node) => node.into(),
    }
}

fn named_graph_term(graph_name: &NamedOrBlankNode) -> Term {
    match graph_name {
        NamedOrBlankNode::NamedNode(node) => node.clone().into(),
        NamedOrBlankNode::BlankNode(node) => node.clone().into(),
    }
}

fn ground_term(term: &GroundTerm) -> Term {
    match term {
        GroundTerm::NamedNode(node) => node.clone().into(),
        GroundTerm::Literal(literal) => literal.clone().into(),
    }
}

fn binding_key(solution: &Binding) -> Vec<(Variable, Term)> {
    solution
        .iter()
        .map(|(variable, value)| (variable.clone(), value.clone()))
        .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
        .collect()
}
