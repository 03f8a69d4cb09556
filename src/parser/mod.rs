//! Parser for SCIM attribute paths and filter expressions.
//!
//! Both grammars share one character reader. Paths are split into tokens at
//! `.` and `[`; a `[` hands the reader to the filter parser in value-filter
//! mode, which runs until the matching `]`. Filters are built with an operator
//! stack and an output stack: `and` binds tighter than `or`, and `(` and
//! `not(` open groups that are closed by `)`.
//!
//! ```rust
//! use scim_path::parser::{parse_filter, parse_path};
//! use scim_path::Filter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let filter = parse_filter(r#"a eq 1 and b eq 2 or c eq 3"#)?;
//!     assert!(matches!(filter, Filter::Or(ref parts) if parts.len() == 2));
//!
//!     let path = parse_path("urn:ietf:params:scim:schemas:core:2.0:User:name.givenName")?;
//!     assert_eq!(path.size(), 2);
//!
//!     let err = parse_filter("userName xx \"bjensen\"").unwrap_err();
//!     assert_eq!(err.position(), Some(9));
//!     Ok(())
//! }
//! ```

mod reader;
mod value;

use crate::error::{ScimError, ScimResult};
use crate::filter::{ComparisonOperator, Filter};
use crate::path::{Path, SchemaUrn};
use log::{debug, trace};
use reader::StringReader;
use serde_json::Value;

/// Deepest nesting of groups, `not(` and complex value filters a filter may
/// have. Bounds recursion in the parser and in everything that walks a parsed
/// filter.
pub const MAX_FILTER_DEPTH: usize = 64;

/// Parse an attribute path. Empty input yields the root path.
pub fn parse_path(text: &str) -> ScimResult<Path> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Path::root());
    }

    let result = read_path(text);
    match &result {
        Ok(path) => trace!("Parsed path '{}' as {:?}", text, path),
        Err(e) => debug!("Rejected path '{}': {}", text, e),
    }
    result
}

/// Parse a filter expression.
pub fn parse_filter(text: &str) -> ScimResult<Filter> {
    let text = text.trim();
    let mut reader = StringReader::new(text);

    let result = read_filter(&mut reader, false, 0);
    match &result {
        Ok(filter) => trace!("Parsed filter '{}' as {}", text, filter),
        Err(e) => debug!("Rejected filter '{}': {}", text, e),
    }
    result
}

fn read_path(text: &str) -> ScimResult<Path> {
    let mut reader = StringReader::new(text);
    let mut path = Path::root();

    // The schema URN ends at the last ':' that precedes any value filter.
    let colon = text
        .chars()
        .take_while(|&c| c != '[')
        .enumerate()
        .filter(|&(_, c)| c == ':')
        .map(|(i, _)| i)
        .last();
    if let Some(colon) = colon {
        let urn: String = text.chars().take(colon).collect();
        let urn = SchemaUrn::new(urn.as_str())
            .map_err(|_| ScimError::invalid_path_at(format!("Invalid schema URN '{}'", urn), 0))?;
        path = Path::root_with_schema(urn.as_str())?;
        reader.skip(colon + 1);
    }

    while let Some(token) = read_path_token(&mut reader)? {
        if token.is_empty() {
            // Only a value filter may be followed directly by '.'.
            let follows_filter = path
                .last_element()
                .is_some_and(|element| element.value_filter().is_some());
            if !follows_filter {
                return Err(attribute_expected(&reader));
            }
            continue;
        }

        let (name, value_filter) = match token.strip_suffix('[') {
            Some(name) => {
                if name.is_empty() {
                    return Err(attribute_expected(&reader));
                }
                let filter = read_filter(&mut reader, true, 1).map_err(into_path_error)?;
                // Only '.' or the end of the path may follow ']'.
                if let Some(c) = reader.peek().filter(|&c| c != '.') {
                    let position = reader.position();
                    return Err(ScimError::invalid_path_at(
                        format!(
                            "Unexpected character '{}' at position {} after value filter",
                            c, position
                        ),
                        position,
                    ));
                }
                (name.to_string(), Some(filter))
            }
            None => (token, None),
        };

        path = path
            .attribute_with_optional_filter(&name, value_filter)
            .map_err(|e| ScimError::invalid_path_at(message_of(&e), reader.mark_position()))?;
    }

    Ok(path)
}

fn attribute_expected(reader: &StringReader) -> ScimError {
    let position = reader.mark_position();
    ScimError::invalid_path_at(
        format!("Attribute name expected at position {}", position),
        position,
    )
}

/// Reads the next path segment. The returned token keeps a trailing `[` when
/// a value filter follows; a terminating `.` is consumed and dropped.
fn read_path_token(reader: &mut StringReader) -> ScimResult<Option<String>> {
    reader.mark();
    let mut token = String::new();

    while let Some(c) = reader.read() {
        match c {
            '.' => {
                if reader.is_at_end() {
                    return Err(ScimError::invalid_path_at(
                        "Unexpected end of path string",
                        reader.position(),
                    ));
                }
                return Ok(Some(token));
            }
            '[' => {
                token.push(c);
                return Ok(Some(token));
            }
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '$' => token.push(c),
            other => {
                let position = reader.position() - 1;
                return Err(ScimError::invalid_path_at(
                    format!(
                        "Unexpected character '{}' at position {} for token starting at {}",
                        other,
                        position,
                        reader.mark_position()
                    ),
                    position,
                ));
            }
        }
    }

    Ok(if token.is_empty() { None } else { Some(token) })
}

/// Reads the next filter token, skipping leading spaces. Parentheses are
/// tokens of their own; in normal mode `[` ends and is kept on an attribute
/// token, in value-filter mode `]` is a token of its own.
fn read_filter_token(reader: &mut StringReader, is_value_filter: bool) -> Option<String> {
    let mut next = loop {
        reader.mark();
        match reader.read() {
            Some(' ') => continue,
            other => break other,
        }
    };

    let mut token = String::new();
    while let Some(c) = next {
        match c {
            ' ' => return Some(token),
            '(' | ')' => {
                if token.is_empty() {
                    token.push(c);
                } else {
                    reader.unread();
                }
                return Some(token);
            }
            ']' if is_value_filter => {
                if token.is_empty() {
                    token.push(c);
                } else {
                    reader.unread();
                }
                return Some(token);
            }
            '[' if !is_value_filter => {
                token.push(c);
                return Some(token);
            }
            _ => token.push(c),
        }
        next = reader.read();
    }

    if token.is_empty() { None } else { Some(token) }
}

/// Entries of the operator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Group,
    Not,
    And,
    Or,
}

/// `depth` counts the value filters enclosing this one.
fn read_filter(
    reader: &mut StringReader,
    is_value_filter: bool,
    depth: usize,
) -> ScimResult<Filter> {
    let mut output: Vec<Filter> = Vec::new();
    let mut operators: Vec<Pending> = Vec::new();
    // Groups and `not(` currently open on the operator stack.
    let mut open = 0;
    // True at the start, and after '(', 'not(' and 'and'/'or'.
    let mut expects_filter = true;
    let mut closed = !is_value_filter;

    while let Some(token) = read_filter_token(reader, is_value_filter) {
        if token == "(" && expects_filter {
            check_depth(depth + open + 1, reader)?;
            operators.push(Pending::Group);
            open += 1;
        } else if token.eq_ignore_ascii_case("not") && expects_filter && read_group_opener(reader) {
            check_depth(depth + open + 1, reader)?;
            operators.push(Pending::Not);
            open += 1;
        } else if token == ")" && !expects_filter {
            match close_grouping(&mut operators, &mut output, false, reader)? {
                Some(Pending::Not) => {
                    let inner = pop_output(&mut output, reader)?;
                    output.push(Filter::not(inner));
                    open -= 1;
                }
                Some(Pending::Group) => open -= 1,
                _ => {
                    let position = reader.mark_position();
                    return Err(ScimError::invalid_filter_at(
                        format!(
                            "No opening parenthesis matching closing parenthesis at position {}",
                            position
                        ),
                        position,
                    ));
                }
            }
        } else if token.eq_ignore_ascii_case("and") && !expects_filter {
            operators.push(Pending::And);
            expects_filter = true;
        } else if token.eq_ignore_ascii_case("or") && !expects_filter {
            collapse_and_run(&mut operators, &mut output, reader)?;
            operators.push(Pending::Or);
            expects_filter = true;
        } else if is_value_filter && token == "]" {
            closed = true;
            break;
        } else if expects_filter && token.ends_with('[') {
            let attribute = read_filter_attribute(&token[..token.len() - 1], reader)?;
            check_depth(depth + open + 1, reader)?;
            let value_filter = read_filter(reader, true, depth + open + 1)?;
            output.push(Filter::has_complex_value(attribute, value_filter));
            expects_filter = false;
        } else if expects_filter {
            let attribute = read_filter_attribute(&token, reader)?;
            output.push(read_attribute_filter(attribute, reader, is_value_filter)?);
            expects_filter = false;
        } else {
            let position = reader.mark_position();
            return Err(ScimError::invalid_filter_at(
                format!("Unexpected token '{}' at position {}", token, position),
                position,
            ));
        }
    }

    if !closed {
        let position = reader.position();
        return Err(ScimError::invalid_filter_at(
            format!("Missing ']' closing the value filter at position {}", position),
            position,
        ));
    }

    close_grouping(&mut operators, &mut output, true, reader)?;
    pop_output(&mut output, reader)
}

/// Consumes the `(` of a `not(` if it is the next non-space character. A `not`
/// followed by anything else names an attribute.
fn read_group_opener(reader: &mut StringReader) -> bool {
    while reader.peek() == Some(' ') {
        reader.read();
    }
    if reader.peek() != Some('(') {
        return false;
    }
    reader.mark();
    reader.read();
    true
}

fn check_depth(depth: usize, reader: &StringReader) -> ScimResult<()> {
    if depth <= MAX_FILTER_DEPTH {
        return Ok(());
    }
    let position = reader.mark_position();
    Err(ScimError::invalid_filter_at(
        format!(
            "Filter nesting exceeds {} levels at position {}",
            MAX_FILTER_DEPTH, position
        ),
        position,
    ))
}

/// Reads `pr` or an operator and comparison value following an attribute.
fn read_attribute_filter(
    attribute: Path,
    reader: &mut StringReader,
    is_value_filter: bool,
) -> ScimResult<Filter> {
    let Some(keyword) = read_filter_token(reader, is_value_filter) else {
        return Err(unexpected_end(reader));
    };

    if keyword.eq_ignore_ascii_case("pr") {
        return Ok(Filter::pr(attribute));
    }

    let Some(operator) = ComparisonOperator::from_keyword(&keyword) else {
        let position = reader.mark_position();
        return Err(ScimError::invalid_filter_at(
            format!(
                "Unrecognized attribute operator '{}' at position {}. Expected: eq,ne,co,sw,ew,pr,gt,ge,lt,le",
                keyword, position
            ),
            position,
        ));
    };

    let value = read_comparison_value(reader)?;
    Ok(Filter::compare(operator, attribute, value))
}

/// Reads a JSON scalar. The reader is marked at the start of the literal and
/// advanced by exactly the characters the JSON parser consumed. The literal
/// must be followed by a space, a closing bracket or the end of input.
fn read_comparison_value(reader: &mut StringReader) -> ScimResult<Value> {
    reader.mark();
    let start = reader.mark_position();

    let parsed = value::read_json_value(&reader.remaining()).map_err(|e| {
        ScimError::invalid_filter_at(
            format!("Invalid comparison value at position {}: {}", start, e),
            start,
        )
    })?;
    let Some((value, consumed)) = parsed else {
        return Err(ScimError::invalid_filter_at(
            "End of input while expecting a value",
            start,
        ));
    };

    if value.is_array() || value.is_object() {
        return Err(ScimError::invalid_filter_at(
            format!(
                "Invalid comparison value at position {}: expected a string, number, boolean or null",
                start
            ),
            start,
        ));
    }

    reader.reset();
    reader.skip(consumed);
    match reader.peek() {
        None | Some(' ' | ')' | ']') => Ok(value),
        Some(c) => {
            let position = reader.position();
            Err(ScimError::invalid_filter_at(
                format!(
                    "Unexpected character '{}' at position {} after comparison value",
                    c, position
                ),
                position,
            ))
        }
    }
}

fn read_filter_attribute(token: &str, reader: &StringReader) -> ScimResult<Path> {
    let position = reader.mark_position();
    let attribute = parse_path(token).map_err(|e| {
        ScimError::invalid_filter_at(
            format!(
                "Invalid attribute path at position {}: {}",
                position,
                message_of(&e)
            ),
            position,
        )
    })?;

    if attribute.is_root() {
        return Err(ScimError::invalid_filter_at(
            format!("Attribute path expected at position {}", position),
            position,
        ));
    }
    Ok(attribute)
}

/// Pops the run of pending `and`s, if any, and replaces their operands on the
/// output stack with a single `And`.
fn collapse_and_run(
    operators: &mut Vec<Pending>,
    output: &mut Vec<Filter>,
    reader: &StringReader,
) -> ScimResult<()> {
    let mut count = 0;
    while operators.last() == Some(&Pending::And) {
        operators.pop();
        count += 1;
    }
    if count == 0 {
        return Ok(());
    }
    if output.len() < count + 1 {
        return Err(unexpected_end(reader));
    }
    let components = output.split_off(output.len() - count - 1);
    output.push(Filter::And(components));
    Ok(())
}

/// Pops operators until a group opener (or the bottom of the stack), folding
/// each same-operator run into one N-ary node. Returns the opener found.
fn close_grouping(
    operators: &mut Vec<Pending>,
    output: &mut Vec<Filter>,
    at_end: bool,
    reader: &StringReader,
) -> ScimResult<Option<Pending>> {
    let mut repeating: Option<Pending> = None;
    let mut components: Vec<Filter> = Vec::new();

    while let Some(operator) = operators.pop() {
        if matches!(operator, Pending::Group | Pending::Not) {
            if at_end {
                return Err(unexpected_end(reader));
            }
            fold_run(repeating, &mut components, output, reader)?;
            return Ok(Some(operator));
        }

        match repeating {
            Some(current) if current != operator => {
                fold_run(Some(current), &mut components, output, reader)?;
                repeating = Some(operator);
            }
            None => repeating = Some(operator),
            _ => {}
        }
        components.push(pop_output(output, reader)?);
    }

    fold_run(repeating, &mut components, output, reader)?;
    Ok(None)
}

/// Combines the collected right-hand operands of a run with the operand to
/// their left.
fn fold_run(
    operator: Option<Pending>,
    components: &mut Vec<Filter>,
    output: &mut Vec<Filter>,
    reader: &StringReader,
) -> ScimResult<()> {
    let Some(operator) = operator else {
        return Ok(());
    };
    if components.is_empty() {
        return Ok(());
    }

    components.push(pop_output(output, reader)?);
    // Operands were collected right to left.
    components.reverse();
    let parts = std::mem::take(components);
    output.push(match operator {
        Pending::And => Filter::And(parts),
        _ => Filter::Or(parts),
    });
    Ok(())
}

fn pop_output(output: &mut Vec<Filter>, reader: &StringReader) -> ScimResult<Filter> {
    output.pop().ok_or_else(|| unexpected_end(reader))
}

fn unexpected_end(reader: &StringReader) -> ScimError {
    ScimError::invalid_filter_at("Unexpected end of filter string", reader.position())
}

fn message_of(error: &ScimError) -> String {
    match error {
        ScimError::InvalidPath { message, .. } | ScimError::InvalidFilter { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

/// Value filters inside a path are reported as path errors.
fn into_path_error(error: ScimError) -> ScimError {
    match error {
        ScimError::InvalidFilter { message, position } => {
            ScimError::InvalidPath { message, position }
        }
        other => other,
    }
}
