//! Execute path statements against JSON input

use crate::{EvalError, Input, Mode, ValueConfig, Variables, compile, parse};

use super::{CliError, parse_input, parse_json, parse_variable};

/// Which statement entry point to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Every value the path yields
    #[default]
    Value,
    /// One boolean per input item
    Exists,
    /// The input items the path matches
    Query,
}

/// Options for running a statement
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// The path statement to execute
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Treat each non-blank input line as a separate item
    pub lines: bool,
    /// `NAME=JSON` variable bindings
    pub variables: Vec<String>,
    /// JSON value used when an item yields nothing
    pub default_on_empty: Option<String>,
    /// JSON value used when an item fails before yielding anything
    pub default_on_error: Option<String>,
    pub operation: Operation,
}

/// One line of command output
#[derive(Debug)]
pub enum RunOutput {
    Value(serde_json::Value),
    Error(EvalError),
}

impl From<Result<crate::Value, EvalError>> for RunOutput {
    fn from(result: Result<crate::Value, EvalError>) -> Self {
        match result {
            Ok(value) => RunOutput::Value(value.into()),
            Err(e) => RunOutput::Error(e),
        }
    }
}

/// Validate a statement without running it; returns its mode.
pub fn execute_check(path: &str) -> Result<Mode, CliError> {
    Ok(parse(path)?.mode)
}

/// Compile and run a statement over every input item.
///
/// Per-item evaluation errors do not stop the run; they come back as
/// [`RunOutput::Error`] in their position.
pub fn execute(options: &RunOptions) -> Result<Vec<RunOutput>, CliError> {
    let statement = compile(&options.path)?;

    let text = options.input.as_ref().ok_or(CliError::NoInput)?;
    let items = parse_input(text, options.lines)?;
    let input = Input::Sequence(items);

    let variables = options
        .variables
        .iter()
        .map(|binding| parse_variable(binding))
        .collect::<Result<Variables, _>>()?;

    let outputs: Vec<RunOutput> = match options.operation {
        Operation::Value => {
            let mut config = ValueConfig {
                named_variables: variables,
                ..ValueConfig::default()
            };
            if let Some(default) = &options.default_on_empty {
                config.default_on_empty = Some(parse_json(default)?);
            }
            if let Some(default) = &options.default_on_error {
                config.default_on_error = Some(parse_json(default)?);
            }
            statement.value(input, &config).map(RunOutput::from).collect()
        }
        Operation::Exists => statement
            .exists(input, &variables)
            .map(|result| match result {
                Ok(found) => RunOutput::Value(serde_json::Value::Bool(found)),
                Err(e) => RunOutput::Error(e),
            })
            .collect(),
        Operation::Query => statement
            .query(input, &variables)
            .map(RunOutput::from)
            .collect(),
    };
    Ok(outputs)
}
