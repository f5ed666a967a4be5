//! Lazy result sequences and the auto-lift combinator.

use std::iter;

use crate::runtime::EvalError;
use crate::value::Value;

pub type Item = Result<Value, EvalError>;

/// Zero or more results of one evaluation stage.
///
/// A lone value and a lazily produced sequence are distinct variants, and
/// every accessor goes through [`Seq::bind`] so it never has to care which
/// one it received. Errors travel inside the sequence so that values
/// produced before the failure can still be consumed.
pub enum Seq {
    Empty,
    Single(Value),
    Many(Box<dyn Iterator<Item = Item>>),
}

impl Seq {
    pub fn failed(error: EvalError) -> Self {
        Seq::Many(Box::new(iter::once(Err(error))))
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        match values.len() {
            0 => Seq::Empty,
            _ => Seq::Many(Box::new(values.into_iter().map(Ok))),
        }
    }

    pub fn lazy<I>(items: I) -> Self
    where
        I: Iterator<Item = Value> + 'static,
    {
        Seq::Many(Box::new(items.map(Ok)))
    }

    pub fn from_result(result: Result<Seq, EvalError>) -> Self {
        result.unwrap_or_else(Seq::failed)
    }

    /// Applies a per-value operation to every value of the sequence and
    /// flattens one level of the produced sequences.
    pub fn bind<F>(self, mut f: F) -> Seq
    where
        F: FnMut(Value) -> Result<Seq, EvalError> + 'static,
    {
        match self {
            Seq::Empty => Seq::Empty,
            Seq::Single(value) => Seq::from_result(f(value)),
            Seq::Many(items) => Seq::Many(Box::new(items.flat_map(move |item| match item {
                Ok(value) => Seq::from_result(f(value)),
                Err(e) => Seq::failed(e),
            }))),
        }
    }

    /// Drains the sequence, stopping at the first error.
    pub fn collect_values(self) -> Result<Vec<Value>, EvalError> {
        self.collect()
    }
}

impl Iterator for Seq {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        match self {
            Seq::Empty => None,
            Seq::Single(_) => match std::mem::replace(self, Seq::Empty) {
                Seq::Single(value) => Some(Ok(value)),
                _ => None,
            },
            Seq::Many(items) => items.next(),
        }
    }
}

impl From<Value> for Seq {
    fn from(value: Value) -> Self {
        Seq::Single(value)
    }
}
