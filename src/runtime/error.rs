use thiserror::Error;

/// Errors that can occur while evaluating a compiled path.
///
/// Strict mode surfaces the structural variants; lax mode turns most of
/// them into empty results before they get this far.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Operand has the wrong type or cardinality for the operation
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Member accessor named a key the object does not have
    #[error("member '{0}' not found")]
    KeyNotFound(String),

    /// Subscript outside the bounds of the array
    #[error("array index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// Array accessor applied to a non-array
    #[error("{accessor} expects an array, got {found}")]
    NotAnArray {
        accessor: &'static str,
        found: &'static str,
    },

    /// Object accessor applied to a non-object
    #[error("{accessor} expects an object, got {found}")]
    NotAnObject {
        accessor: &'static str,
        found: &'static str,
    },

    /// String could not be converted by `double()` or `datetime()`
    #[error("cannot parse '{text}' as {target}")]
    UnparsableValue { text: String, target: &'static str },

    /// Named variable missing from the caller's bindings
    #[error("variable ${0} is not defined")]
    UnknownVariable(String),

    /// Operator is not defined for the operand types
    #[error("operator '{op}' is not defined for {left} and {right}")]
    UnsupportedOperator {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    /// Division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,
}
