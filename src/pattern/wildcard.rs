//! Glob-style wildcard matching
//!
//! Supported tokens:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character ([`WildcardMode::Strict`]) or zero or
//!   one character ([`WildcardMode::Simple`])
//!
//! Every other character must match literally. Matching works on `char`s,
//! so multi-byte characters count as one.

use serde::{Deserialize, Serialize};

/// How `?` treats a missing character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WildcardMode {
    /// `?` consumes exactly one character
    #[default]
    Strict,
    /// `?` consumes zero or one character
    Simple,
}

/// Matches `value` against `pattern` with strict `?` semantics.
///
/// # Examples
///
/// ```rust
/// use policy_gate::pattern::match_wildcard;
///
/// assert!(match_wildcard("*", "anything"));
/// assert!(match_wildcard("test*", "test_string"));
/// assert!(match_wildcard("doc-?", "doc-1"));
/// assert!(!match_wildcard("doc-?", "doc-"));
/// ```
pub fn match_wildcard(pattern: &str, value: &str) -> bool {
    match_wildcard_mode(pattern, value, WildcardMode::Strict)
}

/// Matches `value` against `pattern`, letting `?` match nothing.
///
/// # Examples
///
/// ```rust
/// use policy_gate::pattern::match_simple_wildcard;
///
/// assert!(match_simple_wildcard("doc-?", "doc-1"));
/// assert!(match_simple_wildcard("doc-?", "doc-"));
/// ```
pub fn match_simple_wildcard(pattern: &str, value: &str) -> bool {
    match_wildcard_mode(pattern, value, WildcardMode::Simple)
}

/// Matches `value` against `pattern` using the given `?` semantics.
///
/// Runs in time bounded by the product of the pattern and value lengths and
/// uses no recursion, so arbitrarily long values are safe to match.
pub fn match_wildcard_mode(pattern: &str, value: &str, mode: WildcardMode) -> bool {
    if pattern == value || pattern == "*" {
        return true;
    }

    let value: Vec<char> = value.chars().collect();

    // Runs of `*` are equivalent to one
    let mut tokens: Vec<char> = Vec::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && tokens.last() == Some(&'*') {
            continue;
        }
        tokens.push(c);
    }

    match mode {
        WildcardMode::Strict => match_strict(&tokens, &value),
        WildcardMode::Simple => match_simple(&tokens, &value),
    }
}

/// Greedy scan that resumes from the most recent `*` on a mismatch
fn match_strict(pattern: &[char], value: &[char]) -> bool {
    let (mut p, mut v) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while v < value.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                resume = Some((p, v));
                p += 1;
            }
            Some('?') => {
                p += 1;
                v += 1;
            }
            Some(c) if c == value[v] => {
                p += 1;
                v += 1;
            }
            _ => match resume {
                Some((star, consumed)) => {
                    p = star + 1;
                    v = consumed + 1;
                    resume = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Row-by-row table where `next[j]` holds whether `pattern[i + 1..]`
/// matches `value[j..]`
fn match_simple(pattern: &[char], value: &[char]) -> bool {
    let n = value.len();
    let mut next = vec![false; n + 1];
    next[n] = true;
    let mut current = vec![false; n + 1];

    for &token in pattern.iter().rev() {
        for j in (0..=n).rev() {
            current[j] = match token {
                '*' => next[j] || (j < n && current[j + 1]),
                '?' => next[j] || (j < n && next[j + 1]),
                literal => j < n && value[j] == literal && next[j + 1],
            };
        }
        std::mem::swap(&mut next, &mut current);
    }

    next[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("*", "" ; "star matches empty")]
    #[test_case("*", "anything" ; "star matches anything")]
    #[test_case("test*", "test_string" ; "trailing star")]
    #[test_case("*_role", "test_role" ; "leading star")]
    #[test_case("a*c*e", "abcde" ; "multiple stars")]
    #[test_case("a**b", "ab" ; "collapsed stars")]
    #[test_case("doc-?", "doc-1" ; "question consumes one")]
    #[test_case("exact", "exact" ; "identical strings")]
    #[test_case("caf?", "café" ; "multibyte char counts once")]
    #[test_case("a?c", "a?c" ; "identical pattern with question")]
    fn test_strict_matches(pattern: &str, value: &str) {
        assert!(match_wildcard(pattern, value));
    }

    #[test_case("test*", "tes" ; "prefix too short")]
    #[test_case("doc-?", "doc-" ; "question needs one char")]
    #[test_case("doc-?", "doc-12" ; "question consumes only one")]
    #[test_case("abc", "abd" ; "literal mismatch")]
    #[test_case("abc", "" ; "empty value")]
    #[test_case("", "abc" ; "empty pattern")]
    #[test_case("Admin", "admin" ; "case sensitive")]
    fn test_strict_rejects(pattern: &str, value: &str) {
        assert!(!match_wildcard(pattern, value));
    }

    #[test]
    fn test_question_on_empty_remainder() {
        assert!(!match_wildcard("?", ""));
        assert!(match_simple_wildcard("?", ""));
        assert!(!match_wildcard("ab?", "ab"));
        assert!(match_simple_wildcard("ab?", "ab"));
    }

    #[test]
    fn test_simple_question_backtracks() {
        // `?` may match nothing so the following literal can still line up
        assert!(match_simple_wildcard("a?b", "ab"));
        assert!(match_simple_wildcard("a?b", "axb"));
        assert!(!match_simple_wildcard("a?b", "axxb"));
        assert!(!match_wildcard("a?b", "ab"));
    }

    #[test]
    fn test_mode_is_the_only_difference() {
        let cases = [("test*", "test_string"), ("*", ""), ("a*z", "abcz"), ("x", "y")];
        for (pattern, value) in cases {
            assert_eq!(match_wildcard(pattern, value), match_simple_wildcard(pattern, value));
        }
    }

    #[test_case(WildcardMode::Strict ; "strict")]
    #[test_case(WildcardMode::Simple ; "simple")]
    fn test_long_value(mode: WildcardMode) {
        let value = format!("docs/{}", "a".repeat(100_000));
        assert!(!match_wildcard_mode("docs/*.pdf", &value, mode));
        assert!(match_wildcard_mode("docs/*a", &value, mode));
        assert!(match_wildcard_mode("*/a?a*", &value, mode));

        let pdf = format!("{}.pdf", value);
        assert!(match_wildcard_mode("docs/*.pdf", &pdf, mode));
    }

    #[test_case(WildcardMode::Strict ; "strict")]
    #[test_case(WildcardMode::Simple ; "simple")]
    fn test_many_stars_without_match(mode: WildcardMode) {
        let value = "a".repeat(80);
        assert!(!match_wildcard_mode("*a*a*a*a*a*a*b", &value, mode));
        assert!(match_wildcard_mode("*a*a*a*a*a*a*", &value, mode));

        let long = "a".repeat(20_000);
        assert!(!match_wildcard_mode("*a*a*a*a*a*a*a*a*a*a*b", &long, mode));
    }

    #[test]
    fn test_simple_question_before_star() {
        assert!(match_simple_wildcard("a?*b", "ab"));
        assert!(match_simple_wildcard("?*", ""));
        assert!(!match_wildcard("?*", ""));
        assert!(match_wildcard("?*", "x"));
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        let mode: WildcardMode = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(mode, WildcardMode::Simple);
        assert_eq!(WildcardMode::default(), WildcardMode::Strict);
    }
}
