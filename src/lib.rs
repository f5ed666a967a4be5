//! # sqlpath
//!
//! A SQL/JSON path engine. Statements are compiled once into a tree of
//! closures and evaluated lazily against JSON-like values, in either `lax`
//! (forgiving) or `strict` (erroring) mode.
//!
//! ```
//! use sqlpath::{compile, ValueConfig, Value};
//! use serde_json::json;
//!
//! let statement = compile("strict $.items[*] ? (@.price > 10).name").unwrap();
//! let input = Value::from(json!({"items": [
//!     {"name": "pen", "price": 2},
//!     {"name": "lamp", "price": 30},
//! ]}));
//! let names: Vec<Value> = statement
//!     .value(input, &ValueConfig::default())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(names, vec![Value::from("lamp")]);
//! ```
pub mod ast;
pub mod cli;
pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod statement;
pub mod value;

pub use ast::{Mode, Position, Token};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use runtime::{EvalError, Seq, Truth, Variables};
pub use statement::{CompileError, Input, Statement, ValueConfig, Values, compile, parse};
pub use value::Value;
