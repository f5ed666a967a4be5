use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::ast::{BinOp, Mode, UnaryOp};
use crate::runtime::{EvalError, Seq};
use crate::value::Value;

/// Binary arithmetic on two operand sequences.
///
/// Each side must hold exactly one number. In lax mode a side holding a
/// single array is unwrapped first, so `[3] + 1` works there.
pub fn binary(mode: Mode, op: BinOp, left: Seq, right: Seq) -> Result<Value, EvalError> {
    let left = singleton(mode, op, "left", left)?;
    let right = singleton(mode, op, "right", right)?;

    match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => integer_op(op, *a, *b),
        (a, b) => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => decimal_op(op, a, b),
            _ => Err(EvalError::UnsupportedOperator {
                op: op.to_string(),
                left: left.type_name(),
                right: right.type_name(),
            }),
        },
    }
}

/// Prefix `+`/`-` on one item.
pub fn unary(mode: Mode, op: UnaryOp, value: Value) -> Result<Seq, EvalError> {
    match value {
        Value::Array(items) if !mode.is_strict() => {
            let negated = items
                .into_iter()
                .map(|item| negate(op, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Seq::from_values(negated))
        }
        other => negate(op, other).map(Seq::Single),
    }
}

fn negate(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Plus, v @ (Value::Integer(_) | Value::Float(_))) => Ok(v),
        (UnaryOp::Minus, Value::Integer(n)) => Ok(n
            .checked_neg()
            .map(Value::Integer)
            .unwrap_or(Value::Float(-(n as f64)))),
        (UnaryOp::Minus, Value::Float(n)) => Ok(Value::Float(-n)),
        (op, other) => Err(EvalError::TypeMismatch(format!(
            "unary '{op}' requires a number, got {}",
            other.type_name()
        ))),
    }
}

fn singleton(mode: Mode, op: BinOp, side: &str, operand: Seq) -> Result<Value, EvalError> {
    let mut values = operand.collect_values()?;
    if !mode.is_strict() && values.len() == 1 && matches!(values[0], Value::Array(_)) {
        if let Some(Value::Array(items)) = values.pop() {
            values = items;
        }
    }

    match values.len() {
        1 => Ok(values.remove(0)),
        n => Err(EvalError::TypeMismatch(format!(
            "{side} operand of '{op}' must be a single item, got {n} items"
        ))),
    }
}

fn integer_op(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let exact = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // Non-exact quotients go through the float path
            if a % b == 0 { a.checked_div(b) } else { None }
        }
        BinOp::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Some(a.checked_rem(b).unwrap_or(0))
        }
    };
    match exact {
        Some(n) => Ok(Value::Integer(n)),
        None => decimal_op(op, a as f64, b as f64),
    }
}

fn decimal_op(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    if matches!(op, BinOp::Divide | BinOp::Modulo) && b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        let rd = match op {
            BinOp::Add => ad.checked_add(bd),
            BinOp::Subtract => ad.checked_sub(bd),
            BinOp::Multiply => ad.checked_mul(bd),
            BinOp::Divide => ad.checked_div(bd),
            BinOp::Modulo => ad.checked_rem(bd),
        };
        if let Some(rd) = rd {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Ok(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Ok(Value::Float(r));
            }
        }
    }

    let res = match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide => a / b,
        BinOp::Modulo => a % b,
    };
    Ok(Value::Float(res))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(op: BinOp, a: Value, b: Value) -> Result<Value, EvalError> {
        binary(Mode::Lax, op, Seq::Single(a), Seq::Single(b))
    }

    #[test]
    fn integer_arithmetic_stays_exact() {
        assert_eq!(calc(BinOp::Add, Value::Integer(2), Value::Integer(3)), Ok(Value::Integer(5)));
        assert_eq!(calc(BinOp::Divide, Value::Integer(6), Value::Integer(3)), Ok(Value::Integer(2)));
        assert_eq!(calc(BinOp::Divide, Value::Integer(7), Value::Integer(2)), Ok(Value::Float(3.5)));
        assert_eq!(calc(BinOp::Modulo, Value::Integer(7), Value::Integer(4)), Ok(Value::Integer(3)));
    }

    #[test]
    fn overflow_falls_back_to_float() {
        let result = calc(BinOp::Add, Value::Integer(i64::MAX), Value::Integer(1)).unwrap();
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn mixed_arithmetic_uses_decimals() {
        assert_eq!(calc(BinOp::Multiply, Value::Float(1.5), Value::Integer(2)), Ok(Value::Integer(3)));
        assert_eq!(calc(BinOp::Add, Value::Float(0.1), Value::Float(0.2)), Ok(Value::Float(0.3)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(calc(BinOp::Divide, Value::Integer(1), Value::Integer(0)), Err(EvalError::DivisionByZero));
        assert_eq!(calc(BinOp::Modulo, Value::Float(1.5), Value::Integer(0)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn operands_must_be_single_numbers() {
        assert!(matches!(
            calc(BinOp::Add, Value::from("a"), Value::Integer(1)),
            Err(EvalError::UnsupportedOperator { .. })
        ));
        let two = Seq::from_values(vec![Value::Integer(1), Value::Integer(2)]);
        assert!(matches!(
            binary(Mode::Lax, BinOp::Add, two, Seq::Single(Value::Integer(1))),
            Err(EvalError::TypeMismatch(_))
        ));
        assert!(matches!(
            binary(Mode::Lax, BinOp::Add, Seq::Empty, Seq::Single(Value::Integer(1))),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn lax_unwraps_single_array_operand() {
        let wrapped = || Seq::Single(Value::Array(vec![Value::Integer(3)]));
        assert_eq!(
            binary(Mode::Lax, BinOp::Add, wrapped(), Seq::Single(Value::Integer(1))),
            Ok(Value::Integer(4))
        );
        assert!(binary(Mode::Strict, BinOp::Add, wrapped(), Seq::Single(Value::Integer(1))).is_err());
    }

    #[test]
    fn unary_minus() {
        let negated = unary(Mode::Lax, UnaryOp::Minus, Value::Integer(4))
            .unwrap()
            .collect_values()
            .unwrap();
        assert_eq!(negated, vec![Value::Integer(-4)]);
        assert!(unary(Mode::Lax, UnaryOp::Minus, Value::from("x")).is_err());
    }
}
