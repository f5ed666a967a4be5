//! # SQL/JSON Path - Concrete Syntax Tree
//!
//! This module defines the syntax tree produced by the parser and consumed by
//! the plan compiler. It exists only while a statement is being compiled.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and source positions
//! - **[expressions]** - Value-producing expressions and accessor chains
//! - **[predicates]** - Filter conditions (three-valued)
//! - **[operators]** - Arithmetic, unary and comparison operators
//! - **[statements]** - Mode prefix and statement body
//!
//! ## Quick Start
//!
//! ```text
//! strict $.orders[*] ? (@.total > 100 && @.status == "open").id
//! ```
//!
//! Selects the ids of open orders above 100, failing if any order is not an
//! object or lacks one of the referenced members.
//!
//! ## Core Concepts
//!
//! ### Accessor Chains
//!
//! Every path starts at a primary (`$`, `@`, a literal, a variable) and
//! applies accessors left to right:
//!
//! ```text
//! $ .store .book [0 to last] .title
//! ```
//!
//! Each accessor consumes a sequence and produces a sequence.
//!
//! ### Modes
//!
//! - **lax** (default) - missing members and out-of-range indexes produce
//!   nothing, arrays are unwrapped where an object is expected
//! - **strict** - the same situations raise errors
//!
//! ### Predicates
//!
//! Filters evaluate to TRUE, FALSE or UNKNOWN. Comparing values of different
//! types is UNKNOWN, and a filter keeps only candidates whose predicate is
//! TRUE:
//!
//! ```text
//! $ ? ((@.a == 1) is unknown)
//! ```
pub mod expressions;
pub mod operators;
pub mod predicates;
pub mod statements;
pub mod tokens;

pub use expressions::{Accessor, Expr, ItemMethod, Subscript};
pub use operators::{BinOp, CompareOp, UnaryOp};
pub use predicates::Predicate;
pub use statements::{Body, Mode, ParsedStatement};
pub use tokens::{Position, SpannedToken, Token};
