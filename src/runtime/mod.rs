//! Runtime library invoked by compiled plans.
//!
//! Every operation here works on one [`Value`] at a time; sequences are
//! threaded through [`Seq::bind`] by the plan nodes that call them.

mod access;
mod arithmetic;
mod datetime;
mod error;
mod logic;
mod methods;
mod sequence;

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

pub use access::{IndexPlan, element_wildcard, filter, member, member_wildcard, subscripts};
pub use arithmetic::{binary, unary};
pub use datetime::DateTemplate;
pub use error::EvalError;
pub use logic::{
    LikePattern, Truth, and, compare, compare_all, exists, is_unknown, not, or, starts_with,
};
pub use methods::{datetime, item_method};
pub use sequence::{Item, Seq};

use crate::value::Value;

/// Caller-supplied named variables, looked up by `$name`.
pub type Variables = HashMap<String, Value>;

/// A compiled, reusable value-producing plan node.
pub type Plan = Arc<dyn Fn(&Scope) -> Seq + Send + Sync>;

/// A compiled predicate node.
pub type PredicatePlan = Arc<dyn Fn(&Scope) -> Result<Truth, EvalError> + Send + Sync>;

/// Per-evaluation context.
///
/// Created fresh for every input item and cloned cheaply when a filter
/// binds a new `@` or a subscript brings a new array into scope. Nothing
/// in here is shared between evaluations.
#[derive(Clone)]
pub struct Scope {
    root: Rc<Value>,
    variables: Rc<Variables>,
    current: Option<Rc<Value>>,
    last: Option<usize>,
}

impl Scope {
    pub fn new(root: Rc<Value>, variables: Rc<Variables>) -> Self {
        Scope {
            root,
            variables,
            current: None,
            last: None,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The filter candidate bound to `@`; the root outside any filter.
    pub fn current(&self) -> &Value {
        self.current.as_deref().unwrap_or(&self.root)
    }

    pub fn variable(&self, name: &str) -> Result<&Value, EvalError> {
        self.variables
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))
    }

    /// Index of the last element of the innermost array being subscripted.
    pub fn last_index(&self) -> Option<i64> {
        self.last.map(|len| len as i64 - 1)
    }

    pub fn with_current(&self, value: Value) -> Self {
        Scope {
            current: Some(Rc::new(value)),
            ..self.clone()
        }
    }

    pub fn with_array_len(&self, len: usize) -> Self {
        Scope {
            last: Some(len),
            ..self.clone()
        }
    }
}
