//! Text to [`Value`] conversion for CLI arguments and input

use crate::Value;

use super::CliError;

pub fn parse_json(text: &str) -> Result<Value, CliError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

/// Splits raw input into items.
///
/// Without `lines` the whole text is one JSON document and therefore one
/// item. With `lines` every non-blank line is its own item.
pub fn parse_input(text: &str, lines: bool) -> Result<Vec<Value>, CliError> {
    if !lines {
        return Ok(vec![parse_json(text)?]);
    }
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_json)
        .collect()
}

/// Parses a `--var NAME=JSON` binding.
///
/// A value that is not valid JSON is taken as a plain string, so
/// `--var name=alice` works without extra quoting.
pub fn parse_variable(binding: &str) -> Result<(String, Value), CliError> {
    let (name, raw) = binding
        .split_once('=')
        .ok_or_else(|| CliError::Variable(binding.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Variable(binding.to_string()));
    }
    let value = parse_json(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_skip_blanks() {
        let items = parse_input("1\n\n{\"a\": 2}\n", true).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Value::Integer(1));
    }

    #[test]
    fn whole_input_is_one_item() {
        let items = parse_input("[1, 2]", false).unwrap();
        assert_eq!(items, vec![Value::Array(vec![Value::Integer(1), Value::Integer(2)])]);
    }

    #[test]
    fn variables() {
        assert_eq!(parse_variable("n=5").unwrap(), ("n".to_string(), Value::Integer(5)));
        assert_eq!(
            parse_variable("who=alice").unwrap(),
            ("who".to_string(), Value::from("alice"))
        );
        assert!(matches!(parse_variable("oops"), Err(CliError::Variable(_))));
    }
}
