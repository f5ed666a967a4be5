//! Three-valued predicate logic.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::ast::CompareOp;
use crate::runtime::{EvalError, Seq};
use crate::value::Value;

/// Result of a predicate: never a plain boolean until the statement
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl From<bool> for Truth {
    fn from(b: bool) -> Self {
        if b { Truth::True } else { Truth::False }
    }
}

impl Truth {
    /// Statement-level rendering: unknown becomes `null`.
    pub fn into_value(self) -> Value {
        match self {
            Truth::True => Value::Boolean(true),
            Truth::False => Value::Boolean(false),
            Truth::Unknown => Value::Null,
        }
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (a, b) if a.is_number() && b.is_number() => a.as_float()?.partial_cmp(&b.as_float()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Compares two single values.
///
/// UNKNOWN unless both sides share a structural type. Arrays and objects
/// only support `==` and `!=`.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Truth {
    if let Some(ord) = ordering(left, right) {
        return Truth::from(match op {
            CompareOp::Equal => ord == Ordering::Equal,
            CompareOp::NotEqual => ord != Ordering::Equal,
            CompareOp::LessThan => ord == Ordering::Less,
            CompareOp::LessEqual => ord != Ordering::Greater,
            CompareOp::GreaterThan => ord == Ordering::Greater,
            CompareOp::GreaterEqual => ord != Ordering::Less,
        });
    }

    match (left, right, op) {
        (Value::Array(_), Value::Array(_), CompareOp::Equal)
        | (Value::Object(_), Value::Object(_), CompareOp::Equal) => {
            Truth::from(left.structurally_equals(right))
        }
        (Value::Array(_), Value::Array(_), CompareOp::NotEqual)
        | (Value::Object(_), Value::Object(_), CompareOp::NotEqual) => {
            Truth::from(!left.structurally_equals(right))
        }
        _ => Truth::Unknown,
    }
}

/// Folds per-item outcomes of a sequence-valued predicate.
///
/// TRUE if any outcome is TRUE, else UNKNOWN if any is UNKNOWN, else FALSE.
/// Stops at the first TRUE. The fold is the same in both modes.
pub fn compare_all(outcomes: impl IntoIterator<Item = Truth>) -> Truth {
    let mut unknown = false;
    for outcome in outcomes {
        match outcome {
            Truth::True => return Truth::True,
            Truth::Unknown => unknown = true,
            Truth::False => {}
        }
    }
    if unknown { Truth::Unknown } else { Truth::False }
}

/// FALSE as soon as an operand is not TRUE; later operands are not
/// evaluated.
pub fn and<I>(operands: I) -> Result<Truth, EvalError>
where
    I: IntoIterator<Item = Result<Truth, EvalError>>,
{
    for operand in operands {
        if operand? != Truth::True {
            return Ok(Truth::False);
        }
    }
    Ok(Truth::True)
}

/// TRUE as soon as an operand is TRUE; later operands are not evaluated.
pub fn or<I>(operands: I) -> Result<Truth, EvalError>
where
    I: IntoIterator<Item = Result<Truth, EvalError>>,
{
    for operand in operands {
        if operand? == Truth::True {
            return Ok(Truth::True);
        }
    }
    Ok(Truth::False)
}

// UNKNOWN negates to TRUE here, not UNKNOWN; existing callers depend on it.
pub fn not(operand: Truth) -> Truth {
    match operand {
        Truth::True => Truth::False,
        Truth::False | Truth::Unknown => Truth::True,
    }
}

pub fn is_unknown(operand: Truth) -> Truth {
    Truth::from(operand == Truth::Unknown)
}

/// The sequence is drained up to its first error, so an error anywhere in
/// the operand makes the result UNKNOWN.
pub fn exists(results: Seq) -> Truth {
    let mut found = false;
    for result in results {
        match result {
            Ok(_) => found = true,
            Err(_) => return Truth::Unknown,
        }
    }
    Truth::from(found)
}

pub fn starts_with(subject: &Value, prefix: &Value) -> Truth {
    match (subject, prefix) {
        (Value::String(s), Value::String(p)) => Truth::from(s.starts_with(p.as_str())),
        _ => Truth::Unknown,
    }
}

/// A `like_regex` pattern, compiled once when the statement is compiled.
#[derive(Clone)]
pub struct LikePattern {
    pattern: String,
    flags: String,
    regex: Regex,
}

impl LikePattern {
    /// Flags: `i` case-insensitive, `s` dot matches newline, `m` multi-line,
    /// `x` ignore whitespace, `q` treat the pattern as literal text.
    pub fn new(pattern: &str, flags: &str) -> Result<Self, String> {
        let source = if flags.contains('q') {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };

        let mut builder = RegexBuilder::new(&source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                's' => builder.dot_matches_new_line(true),
                'm' => builder.multi_line(true),
                'x' => builder.ignore_whitespace(true),
                'q' => &mut builder,
                other => return Err(format!("unrecognized like_regex flag '{other}'")),
            };
        }
        let regex = builder
            .build()
            .map_err(|e| format!("invalid like_regex pattern: {e}"))?;

        Ok(LikePattern {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn test(&self, subject: &Value) -> Truth {
        match subject {
            Value::String(s) => Truth::from(self.regex.is_match(s)),
            _ => Truth::Unknown,
        }
    }
}

impl PartialEq for LikePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl fmt::Debug for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LikePattern")
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .finish()
    }
}
