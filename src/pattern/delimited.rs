//! Delimited regular expressions
//!
//! A definition such as `files.<[a-z]+>.read` mixes literal text with regex
//! fragments enclosed in a start and stop delimiter (`<` and `>` by default).
//! Literal text is quoted, each fragment becomes a capture group, and the
//! whole expression is anchored at both ends.

use regex::Regex;

use crate::error::{AuthzError, Result};

/// Default fragment start delimiter
pub const DEFAULT_START_DELIMITER: char = '<';

/// Default fragment stop delimiter
pub const DEFAULT_STOP_DELIMITER: char = '>';

/// Whether `definition` contains either delimiter
pub fn has_delimiters(definition: &str, start: char, stop: char) -> bool {
    definition.contains(start) || definition.contains(stop)
}

/// Byte ranges `(open, close)` of each outermost delimited span, where
/// `open` is the index of the start delimiter and `close` the index just past
/// its matching stop delimiter.
fn delimiter_spans(definition: &str, start: char, stop: char) -> Result<Vec<(usize, usize)>> {
    let mut spans = Vec::new();
    let mut depth: usize = 0;
    let mut open = 0;

    for (idx, c) in definition.char_indices() {
        if c == start {
            depth += 1;
            if depth == 1 {
                open = idx;
            }
        } else if c == stop {
            if depth == 0 {
                return Err(AuthzError::UnbalancedDelimiter {
                    pattern: definition.to_string(),
                });
            }
            depth -= 1;
            if depth == 0 {
                spans.push((open, idx + c.len_utf8()));
            }
        }
    }

    if depth != 0 {
        return Err(AuthzError::UnbalancedDelimiter {
            pattern: definition.to_string(),
        });
    }

    Ok(spans)
}

/// Returns the raw text of each outermost delimited fragment.
///
/// # Examples
///
/// ```rust
/// use policy_gate::pattern::extract_delimited;
///
/// let fragments = extract_delimited("foo.bar.<.*>.<[ABC]>", '<', '>').unwrap();
/// assert_eq!(fragments, vec![".*", "[ABC]"]);
/// ```
pub fn extract_delimited(definition: &str, start: char, stop: char) -> Result<Vec<String>> {
    let spans = delimiter_spans(definition, start, stop)?;
    Ok(spans
        .into_iter()
        .map(|(open, close)| definition[open + start.len_utf8()..close - stop.len_utf8()].to_string())
        .collect())
}

/// Builds the anchored expression for a delimited definition.
///
/// # Errors
///
/// - [`AuthzError::UnbalancedDelimiter`] when delimiters do not pair up
/// - [`AuthzError::InvalidPattern`] when a fragment is not a valid regex
///
/// # Examples
///
/// ```rust
/// use policy_gate::pattern::compile_delimited_regex;
///
/// let re = compile_delimited_regex("foo.bar.<.*>", '<', '>').unwrap();
/// assert!(re.is_match("foo.bar.test"));
/// assert!(!re.is_match("fooXbar.test"));
/// assert!(compile_delimited_regex("foo.<bar", '<', '>').is_err());
/// ```
pub fn compile_delimited_regex(definition: &str, start: char, stop: char) -> Result<Regex> {
    let spans = delimiter_spans(definition, start, stop)?;

    let mut expression = String::with_capacity(definition.len() + 8);
    expression.push('^');

    let mut end = 0;
    for (open, close) in spans {
        expression.push_str(&regex::escape(&definition[end..open]));
        expression.push('(');
        expression.push_str(&definition[open + start.len_utf8()..close - stop.len_utf8()]);
        expression.push(')');
        end = close;
    }

    expression.push_str(&regex::escape(&definition[end..]));
    expression.push('$');

    Regex::new(&expression).map_err(|e| AuthzError::InvalidPattern {
        pattern: definition.to_string(),
        reason: e.to_string(),
    })
}
