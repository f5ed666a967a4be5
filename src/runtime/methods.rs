use std::sync::Arc;

use crate::ast::{ItemMethod, Mode};
use crate::runtime::datetime::parse_iso;
use crate::runtime::{DateTemplate, EvalError, Seq};
use crate::value::Value;

/// Dispatch an argument-free item method on one value.
///
/// In lax mode the numeric methods are applied to each element of an array
/// argument; `type()` and `size()` always look at the value itself.
pub fn item_method(mode: Mode, method: ItemMethod, value: Value) -> Result<Seq, EvalError> {
    match method {
        ItemMethod::Type => Ok(Seq::Single(Value::String(value.type_name().to_string()))),
        ItemMethod::Size => Ok(Seq::Single(Value::Integer(method_size(&value)))),
        ItemMethod::KeyValue => method_keyvalue(mode, value),
        ItemMethod::Double | ItemMethod::Ceiling | ItemMethod::Floor | ItemMethod::Abs => {
            unwrap_lax(mode, value, move |v| numeric_method(method, v))
        }
    }
}

/// `.datetime()` / `.datetime(template)`.
pub fn datetime(
    mode: Mode,
    template: Option<Arc<DateTemplate>>,
    value: Value,
) -> Result<Seq, EvalError> {
    unwrap_lax(mode, value, move |v| method_datetime(template.as_deref(), v))
}

fn unwrap_lax<F>(mode: Mode, value: Value, mut f: F) -> Result<Seq, EvalError>
where
    F: FnMut(Value) -> Result<Value, EvalError> + 'static,
{
    match value {
        Value::Array(items) if !mode.is_strict() => {
            Ok(Seq::Many(Box::new(items.into_iter().map(move |item| f(item)))))
        }
        other => f(other).map(Seq::Single),
    }
}

fn method_size(value: &Value) -> i64 {
    match value {
        Value::Array(items) => items.len() as i64,
        _ => 1,
    }
}

/// Whole floats come back as integers when they fit.
fn integral(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Integer(n as i64)
    } else {
        Value::Float(n)
    }
}

fn numeric_method(method: ItemMethod, value: Value) -> Result<Value, EvalError> {
    match (method, value) {
        (ItemMethod::Double, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (ItemMethod::Double, Value::Float(n)) => Ok(Value::Float(n)),
        (ItemMethod::Double, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Float)
            .ok_or(EvalError::UnparsableValue {
                text: s,
                target: "a double",
            }),
        (ItemMethod::Ceiling | ItemMethod::Floor, Value::Integer(n)) => Ok(Value::Integer(n)),
        (ItemMethod::Ceiling, Value::Float(n)) => Ok(integral(n.ceil())),
        (ItemMethod::Floor, Value::Float(n)) => Ok(integral(n.floor())),
        (ItemMethod::Abs, Value::Integer(n)) => Ok(n
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or(Value::Float((n as f64).abs()))),
        (ItemMethod::Abs, Value::Float(n)) => Ok(Value::Float(n.abs())),
        (method, other) => Err(EvalError::TypeMismatch(format!(
            ".{}() requires {}, got {}",
            method.name(),
            if method == ItemMethod::Double {
                "a number or numeric string"
            } else {
                "a number"
            },
            other.type_name()
        ))),
    }
}

fn method_datetime(template: Option<&DateTemplate>, value: Value) -> Result<Value, EvalError> {
    let text = match value {
        Value::String(s) => s,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                ".datetime() requires a string, got {}",
                other.type_name()
            )));
        }
    };

    let parsed = match template {
        Some(template) => template.parse(&text),
        None => parse_iso(&text),
    };
    parsed.map(Value::DateTime).ok_or(EvalError::UnparsableValue {
        text,
        target: "a datetime",
    })
}

fn keyvalue_records(id: usize, members: indexmap::IndexMap<String, Value>) -> Vec<Value> {
    members
        .into_iter()
        .map(|(key, value)| {
            Value::object([
                ("id", Value::Integer(id as i64)),
                ("key", Value::String(key)),
                ("value", value),
            ])
        })
        .collect()
}

/// `.keyvalue()`: one `{id, key, value}` record per member.
///
/// For an array of objects (lax only) `id` is the position of the object
/// the member came from.
fn method_keyvalue(mode: Mode, value: Value) -> Result<Seq, EvalError> {
    let not_an_object = |found: &Value| EvalError::NotAnObject {
        accessor: ".keyvalue()",
        found: found.type_name(),
    };

    match value {
        Value::Object(members) => Ok(Seq::from_values(keyvalue_records(0, members))),
        Value::Array(items) if !mode.is_strict() => {
            let mut records = Vec::new();
            for (id, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(members) => records.extend(keyvalue_records(id, members)),
                    other => return Err(not_an_object(&other)),
                }
            }
            Ok(Seq::from_values(records))
        }
        other => Err(not_an_object(&other)),
    }
}
