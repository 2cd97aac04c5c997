/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
/// pairs key-vector of values. Used for solver task files:
/// ```text
/// solver_settings
///   tolerance: 1e-8
///   max_iterations: 50
/// // comment
/// logging
///   loglevel: warn
/// ```
/// Lines starting with //, #, % or ; are dropped before parsing.
use crate::error::ConfigError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// integers are accepted where a float is expected
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// word characters without spaces; used both for titles and keys
fn parse_name(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    let (input, raw) =
        take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';')).parse(input)?;
    // integer first, so that "50" is not read as 50.0
    let value = if let Ok(val) = raw.parse::<i64>() {
        Value::Integer(val)
    } else if let Ok(val) = raw.parse::<f64>() {
        Value::Float(val)
    } else if let Ok(val) = raw.parse::<bool>() {
        Value::Boolean(val)
    } else {
        Value::String(raw.to_string())
    };
    Ok((input, value))
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_coma = delimited(space0, tag(","), space0);
    separated_list1(separator_coma, parse_value).parse(input)
}

fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let (input, result) =
        separated_pair(parse_name, colon_separator, parse_value_list).parse(input)?;
    Ok((input.trim_start(), result))
}

fn parse_section(input: &str) -> IResult<&str, (String, Vec<(String, Vec<Value>)>)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_name(input)?;
    let (input, _) = multispace0(input)?;
    let (input, pairs) = many1(terminated(parse_key_value_pair, space0)).parse(input)?;
    Ok((input, (title, pairs)))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

fn parse_sections(input: &str) -> IResult<&str, Vec<(String, Vec<(String, Vec<Value>)>)>> {
    many1(delimited(space0, parse_section, multispace0)).parse(input)
}

/// Parses a whole task file. A repeated section is merged; a repeated key keeps the last value.
pub fn parse_document(input: &str) -> Result<DocumentMap, ConfigError> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(DocumentMap::new());
    }
    let (remaining, sections) = parse_sections(&filtered)
        .map_err(|e| ConfigError::Syntax(format!("{:?}", e)))?;
    if !remaining.trim().is_empty() {
        return Err(ConfigError::Syntax(format!(
            "failed to parse entire document, remaining: '{}'",
            remaining.trim()
        )));
    }
    let mut document = DocumentMap::new();
    for (title, pairs) in sections {
        document.entry(title).or_default().extend(pairs);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_types() {
        assert_eq!(parse_value("50").unwrap().1, Value::Integer(50));
        assert_eq!(parse_value("1e-8").unwrap().1, Value::Float(1e-8));
        assert_eq!(parse_value("true").unwrap().1, Value::Boolean(true));
        assert_eq!(parse_value("warn").unwrap().1, Value::String("warn".to_string()));
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.0).as_integer(), None);
    }

    #[test]
    fn test_parse_key_value_pair_with_list() {
        let (rest, (key, values)) = parse_key_value_pair("window: -1.5, 2 \nnext: 1").unwrap();
        assert_eq!(key, "window");
        assert_eq!(values, vec![Value::Float(-1.5), Value::Integer(2)]);
        assert_eq!(rest, "next: 1");
    }

    #[test]
    fn test_parse_document() {
        let input = "solver_settings\n  tolerance: 1e-8\n  max_iterations: 50\nplot_settings\n  samples: 400\n";
        let doc = parse_document(input).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["solver_settings"]["tolerance"], vec![Value::Float(1e-8)]);
        assert_eq!(doc["solver_settings"]["max_iterations"], vec![Value::Integer(50)]);
        assert_eq!(doc["plot_settings"]["samples"], vec![Value::Integer(400)]);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let input = "// task file\n# another comment\n\nlogging\n  % level\n  loglevel: warn\n; end\n";
        let doc = parse_document(input).unwrap();
        assert_eq!(doc["logging"]["loglevel"], vec![Value::String("warn".to_string())]);
    }

    #[test]
    fn test_repeated_sections_are_merged() {
        let input = "solver_settings\n tolerance: 1e-3\nsolver_settings\n max_iterations: 7\n";
        let doc = parse_document(input).unwrap();
        assert_eq!(doc["solver_settings"].len(), 2);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_document("// nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            parse_document("solver_settings\n tolerance 1e-3\n"),
            Err(ConfigError::Syntax(_))
        ));
        assert!(matches!(
            parse_document("solver_settings\n tolerance: 1e-3\n : 5\n"),
            Err(ConfigError::Syntax(_))
        ));
    }
}
