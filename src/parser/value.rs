//! Reads one JSON literal from the front of a filter's remaining input.
//!
//! Strings are handed to serde_json's stream deserializer, which stops right
//! after the closing quote and reports its byte offset. Bare literals
//! (`true`, `false`, `null`, numbers) end at the next filter delimiter and are
//! parsed as a slice, because the stream deserializer rejects a number that is
//! directly followed by `)` or `]`.

use serde_json::Value;

const JSON_WHITESPACE: [char; 4] = [' ', '\t', '\n', '\r'];

fn is_literal_end(c: char) -> bool {
    JSON_WHITESPACE.contains(&c) || matches!(c, '(' | ')' | '[' | ']' | ',')
}

/// Parse the JSON value at the start of `input`.
///
/// Returns the value and the number of characters consumed, including any
/// leading whitespace, or `None` if `input` holds nothing but whitespace.
pub(crate) fn read_json_value(input: &str) -> Result<Option<(Value, usize)>, serde_json::Error> {
    let trimmed = input.trim_start_matches(JSON_WHITESPACE);
    let leading = input.len() - trimmed.len();

    let Some(first) = trimmed.chars().next() else {
        return Ok(None);
    };

    let (value, consumed_bytes) = if matches!(first, '"' | '[' | '{') {
        let mut stream = serde_json::Deserializer::from_str(trimmed).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => (value, stream.byte_offset()),
            Some(Err(e)) => return Err(e),
            None => return Ok(None),
        }
    } else {
        let end = trimmed.find(is_literal_end).unwrap_or(trimmed.len());
        (serde_json::from_str::<Value>(&trimmed[..end])?, end)
    };

    let consumed = input[..leading + consumed_bytes].chars().count();
    Ok(Some((value, consumed)))
}
