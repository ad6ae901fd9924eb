use crate::error::EvaluationError;
use rdf_update_model::vocab::xsd;
use rdf_update_model::{Binding, Expression, Literal, Term};

/// Evaluates `expression` under `solution`.
///
/// `Ok(None)` is an evaluation error in the SPARQL sense, for example an unbound variable.
/// Constructs outside of term constants, variables, `BOUND`, `COALESCE`, `IF`, and the logical
/// and equality operators are reported as unsupported.
pub(super) fn evaluate_expression(
    expression: &Expression,
    solution: &Binding,
) -> Result<Option<Term>, EvaluationError> {
    Ok(match expression {
        Expression::NamedNode(node) => Some(node.clone().into()),
        Expression::Literal(literal) => Some(literal.clone().into()),
        Expression::Variable(variable) => solution.get(variable).cloned(),
        Expression::Bound(variable) => Some(boolean(solution.contains(variable))),
        Expression::Not(inner) => effective_boolean_value(inner, solution)?.map(|v| boolean(!v)),
        Expression::And(left, right) => {
            let left = effective_boolean_value(left, solution)?;
            let right = effective_boolean_value(right, solution)?;
            match (left, right) {
                (Some(false), _) | (_, Some(false)) => Some(boolean(false)),
                (Some(true), Some(true)) => Some(boolean(true)),
                _ => None,
            }
        }
        Expression::Or(left, right) => {
            let left = effective_boolean_value(left, solution)?;
            let right = effective_boolean_value(right, solution)?;
            match (left, right) {
                (Some(true), _) | (_, Some(true)) => Some(boolean(true)),
                (Some(false), Some(false)) => Some(boolean(false)),
                _ => None,
            }
        }
        Expression::Equal(left, right) | Expression::SameTerm(left, right) => {
            let left = evaluate_expression(left, solution)?;
            let right = evaluate_expression(right, solution)?;
            match (left, right) {
                (Some(left), Some(right)) => Some(boolean(left == right)),
                _ => None,
            }
        }
        Expression::If(condition, then, otherwise) => {
            match effective_boolean_value(condition, solution)? {
                Some(true) => evaluate_expression(then, solution)?,
                Some(false) => evaluate_expression(otherwise, solution)?,
                None => None,
            }
        }
        Expression::Coalesce(expressions) => {
            for expression in expressions {
                if let Some(value) = evaluate_expression(expression, solution)? {
                    return Ok(Some(value));
                }
            }
            None
        }
        other => return Err(EvaluationError::Unsupported(other.to_string())),
    })
}

/// Computes the effective boolean value of `expression` under `solution`.
pub(super) fn effective_boolean_value(
    expression: &Expression,
    solution: &Binding,
) -> Result<Option<bool>, EvaluationError> {
    let Some(Term::Literal(literal)) = evaluate_expression(expression, solution)? else {
        return Ok(None);
    };
    let datatype = literal.datatype();
    Ok(if datatype == xsd::BOOLEAN {
        match literal.value() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    } else if datatype == xsd::STRING {
        Some(!literal.value().is_empty())
    } else {
        None
    })
}

fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}
