use tracing::trace;

use crate::ast::Mode;
use crate::runtime::{EvalError, Plan, PredicatePlan, Scope, Seq, Truth};
use crate::value::Value;

/// A compiled subscript: an index expression, or a `from to to` range.
#[derive(Clone)]
pub struct IndexPlan {
    pub from: Plan,
    pub to: Option<Plan>,
}

/// `.name`
pub fn member(mode: Mode, value: Value, name: &str) -> Result<Seq, EvalError> {
    match value {
        Value::Object(mut members) => match members.swap_remove(name) {
            Some(found) => Ok(Seq::Single(found)),
            None if mode.is_strict() => Err(EvalError::KeyNotFound(name.to_string())),
            None => Ok(Seq::Empty),
        },
        Value::Array(items) if !mode.is_strict() => {
            let found = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(mut members) => members.swap_remove(name),
                    _ => None,
                })
                .collect();
            Ok(Seq::from_values(found))
        }
        other if mode.is_strict() => Err(EvalError::NotAnObject {
            accessor: "member accessor",
            found: other.type_name(),
        }),
        _ => Ok(Seq::Empty),
    }
}

/// `.*`
pub fn member_wildcard(mode: Mode, value: Value) -> Result<Seq, EvalError> {
    match value {
        Value::Object(members) => Ok(Seq::from_values(members.into_values().collect())),
        Value::Array(items) if !mode.is_strict() => {
            let values = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(members) => Some(members.into_values()),
                    _ => None,
                })
                .flatten()
                .collect();
            Ok(Seq::from_values(values))
        }
        other if mode.is_strict() => Err(EvalError::NotAnObject {
            accessor: "member wildcard",
            found: other.type_name(),
        }),
        _ => Ok(Seq::Empty),
    }
}

/// `[*]`
pub fn element_wildcard(mode: Mode, value: Value) -> Result<Seq, EvalError> {
    match value {
        Value::Array(items) => Ok(Seq::from_values(items)),
        other if mode.is_strict() => Err(EvalError::NotAnArray {
            accessor: "element wildcard",
            found: other.type_name(),
        }),
        other => Ok(Seq::Single(other)),
    }
}

fn as_index(value: Value) -> Result<i64, EvalError> {
    match value {
        Value::Integer(n) => Ok(n),
        Value::Float(n) if n.is_finite() => Ok(n.trunc() as i64),
        other => Err(EvalError::TypeMismatch(format!(
            "array subscript must be a number, got {}",
            other.type_name()
        ))),
    }
}

fn single_index(plan: &Plan, scope: &Scope) -> Result<i64, EvalError> {
    let mut values = plan(scope).collect_values()?;
    match values.len() {
        1 => as_index(values.remove(0)),
        n => Err(EvalError::TypeMismatch(format!(
            "range bound must be a single number, got {n} items"
        ))),
    }
}

/// `[i, j to k, ...]`
///
/// Index expressions are evaluated with `last` bound to this array, so a
/// nested subscript sees its own array. Selected elements come back in
/// subscript order, duplicates included.
pub fn subscripts(
    mode: Mode,
    value: Value,
    scope: &Scope,
    indexes: &[IndexPlan],
) -> Result<Seq, EvalError> {
    let items = match value {
        Value::Array(items) => items,
        other if mode.is_strict() => {
            return Err(EvalError::NotAnArray {
                accessor: "array subscript",
                found: other.type_name(),
            });
        }
        other => vec![other],
    };
    let len = items.len();
    let scope = scope.with_array_len(len);
    let in_bounds = |index: i64| index >= 0 && (index as usize) < len;

    let mut selected = Vec::new();
    for index in indexes {
        match &index.to {
            None => {
                for position in (index.from)(&scope) {
                    let position = as_index(position?)?;
                    if in_bounds(position) {
                        selected.push(items[position as usize].clone());
                    } else if mode.is_strict() {
                        return Err(EvalError::IndexOutOfRange {
                            index: position,
                            len,
                        });
                    }
                }
            }
            Some(to) => {
                let start = single_index(&index.from, &scope)?;
                let end = single_index(to, &scope)?;
                if mode.is_strict() {
                    if let Some(bad) = [start, end].into_iter().find(|i| !in_bounds(*i)) {
                        return Err(EvalError::IndexOutOfRange { index: bad, len });
                    }
                    if start > end {
                        return Err(EvalError::IndexOutOfRange { index: start, len });
                    }
                }
                let start = start.max(0);
                let end = end.min(len as i64 - 1);
                if start <= end {
                    selected.extend_from_slice(&items[start as usize..=end as usize]);
                }
            }
        }
    }
    Ok(Seq::from_values(selected))
}

/// `? (predicate)`
///
/// A candidate whose predicate fails with an error is dropped like one
/// whose predicate is FALSE or UNKNOWN.
pub fn filter(mode: Mode, value: Value, scope: &Scope, predicate: &PredicatePlan) -> Seq {
    let candidates = match value {
        Value::Array(items) if !mode.is_strict() => items,
        other => vec![other],
    };
    let scope = scope.clone();
    let predicate = predicate.clone();

    Seq::lazy(candidates.into_iter().filter(move |candidate| {
        match predicate(&scope.with_current(candidate.clone())) {
            Ok(truth) => truth == Truth::True,
            Err(e) => {
                trace!(error = %e, "filter candidate excluded");
                false
            }
        }
    }))
}
