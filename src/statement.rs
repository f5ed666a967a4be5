//! Compiled statements and the entry points that run them.

use std::fmt;
use std::rc::Rc;
use std::vec;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{Body, Mode, ParsedStatement, Position};
use crate::compiler::Compiler;
use crate::lexer::{LexError, Lexer};
use crate::parser::{ParseError, Parser};
use crate::runtime::{EvalError, Item, Plan, Scope, Seq, Variables};
use crate::value::Value;

/// A statement that failed to lex or parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
}

impl CompileError {
    pub fn message(&self) -> String {
        match self {
            CompileError::Lex(e) => e.to_string(),
            CompileError::Parse(e) => e.to_string(),
        }
    }

    pub fn position(&self) -> Position {
        match self {
            CompileError::Lex(e) => e.position(),
            CompileError::Parse(e) => e.position(),
        }
    }
}

/// Parses a statement without compiling it.
pub fn parse(source: &str) -> Result<ParsedStatement, CompileError> {
    Ok(Parser::new(Lexer::new(source))?.parse()?)
}

/// Compiles a path statement once for repeated evaluation.
///
/// # Examples
///
/// ```
/// use sqlpath::{compile, Value};
/// use serde_json::json;
///
/// let statement = compile("$.a").unwrap();
/// let input = Value::from(json!([{"a": 1}, {"b": 2}, {"a": 3}]));
/// let values: Vec<Value> = statement
///     .value(input, &Default::default())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(values, vec![Value::Integer(1), Value::Integer(3)]);
/// ```
pub fn compile(source: &str) -> Result<Statement, CompileError> {
    let parsed = parse(source)?;
    let plan = Compiler::new(parsed.mode).compile_body(&parsed.body);
    debug!(source, mode = %parsed.mode, "compiled path statement");

    Ok(Statement {
        source: source.to_string(),
        mode: parsed.mode,
        predicate: matches!(parsed.body, Body::Predicate(_)),
        plan,
    })
}

/// What a statement runs against.
///
/// A single value, even an array, is one item. Only an explicit
/// `Sequence` supplies several items.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Item(Value),
    Sequence(Vec<Value>),
}

impl Input {
    fn into_items(self) -> vec::IntoIter<Value> {
        match self {
            Input::Item(value) => vec![value].into_iter(),
            Input::Sequence(values) => values.into_iter(),
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Item(value)
    }
}

impl From<Vec<Value>> for Input {
    fn from(values: Vec<Value>) -> Self {
        Input::Sequence(values)
    }
}

impl From<serde_json::Value> for Input {
    fn from(value: serde_json::Value) -> Self {
        Input::Item(Value::from(value))
    }
}

/// Options for [`Statement::value`].
///
/// A default is applied when it is present, whatever its value; a
/// `Some(Value::Null)` default still replaces an empty result.
#[derive(Debug, Clone, Default)]
pub struct ValueConfig {
    pub default_on_empty: Option<Value>,
    pub default_on_error: Option<Value>,
    pub named_variables: Variables,
}

impl ValueConfig {
    pub fn with_default_on_empty(mut self, value: impl Into<Value>) -> Self {
        self.default_on_empty = Some(value.into());
        self
    }

    pub fn with_default_on_error(mut self, value: impl Into<Value>) -> Self {
        self.default_on_error = Some(value.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named_variables.insert(name.into(), value.into());
        self
    }
}

/// An immutable compiled statement; share it freely between threads.
#[derive(Clone)]
pub struct Statement {
    source: String,
    mode: Mode,
    predicate: bool,
    plan: Plan,
}

fn run(plan: &Plan, item: Value, variables: &Rc<Variables>) -> Seq {
    plan(&Scope::new(Rc::new(item), variables.clone()))
}

/// A path matches when it yields anything; a predicate statement always
/// yields one truth value and matches only when that value is `true`.
fn matched(first: Option<Item>, predicate: bool) -> Result<bool, EvalError> {
    match first {
        None => Ok(false),
        Some(Ok(value)) => Ok(!predicate || value == Value::Boolean(true)),
        Some(Err(e)) => Err(e),
    }
}

impl Statement {
    /// The exact text the statement was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Lazily evaluates the statement against one item.
    pub fn evaluate(&self, item: Value, variables: &Variables) -> Seq {
        run(&self.plan, item, &Rc::new(variables.clone()))
    }

    /// Whether each input item yields at least one value, or for a
    /// predicate statement, whether the predicate is TRUE.
    ///
    /// Only the first result of each item is computed. An error in that
    /// position is reported for the item instead of a boolean.
    pub fn exists<I: Into<Input>>(
        &self,
        input: I,
        variables: &Variables,
    ) -> impl Iterator<Item = Result<bool, EvalError>> + use<I> {
        let plan = self.plan.clone();
        let predicate = self.predicate;
        let variables = Rc::new(variables.clone());
        input
            .into()
            .into_items()
            .map(move |item| matched(run(&plan, item, &variables).next(), predicate))
    }

    /// The input items that [`Statement::exists`] reports as matching.
    pub fn query<I: Into<Input>>(
        &self,
        input: I,
        variables: &Variables,
    ) -> impl Iterator<Item = Result<Value, EvalError>> + use<I> {
        let plan = self.plan.clone();
        let predicate = self.predicate;
        let variables = Rc::new(variables.clone());
        input.into().into_items().filter_map(move |item| {
            match matched(run(&plan, item.clone(), &variables).next(), predicate) {
                Ok(true) => Some(Ok(item)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Every value the statement yields, item after item.
    pub fn value(&self, input: impl Into<Input>, config: &ValueConfig) -> Values {
        Values {
            plan: self.plan.clone(),
            items: input.into().into_items(),
            variables: Rc::new(config.named_variables.clone()),
            default_on_empty: config.default_on_empty.clone(),
            default_on_error: config.default_on_error.clone(),
            current: None,
            produced: false,
        }
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("source", &self.source)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Iterator returned by [`Statement::value`].
///
/// An error ends the current item's results; iteration then moves on to
/// the next input item.
pub struct Values {
    plan: Plan,
    items: vec::IntoIter<Value>,
    variables: Rc<Variables>,
    default_on_empty: Option<Value>,
    default_on_error: Option<Value>,
    current: Option<Seq>,
    produced: bool,
}

impl Iterator for Values {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        loop {
            if let Some(results) = self.current.as_mut() {
                match results.next() {
                    Some(Ok(value)) => {
                        self.produced = true;
                        return Some(Ok(value));
                    }
                    Some(Err(e)) => {
                        self.current = None;
                        if !self.produced
                            && let Some(default) = &self.default_on_error
                        {
                            trace!(error = %e, "using default on error");
                            return Some(Ok(default.clone()));
                        }
                        return Some(Err(e));
                    }
                    None => {
                        self.current = None;
                        if !self.produced
                            && let Some(default) = &self.default_on_empty
                        {
                            trace!("using default on empty");
                            return Some(Ok(default.clone()));
                        }
                    }
                }
            }

            let item = self.items.next()?;
            self.current = Some(run(&self.plan, item, &self.variables));
            self.produced = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn statement_is_shareable() {
        assert_send_sync::<Statement>();
    }

    #[test]
    fn compile_error_reports_position() {
        let err = compile("$.a ==").unwrap_err();
        assert_eq!(err.position().column, 7);
        assert!(err.message().contains("end of input"));
    }
}
