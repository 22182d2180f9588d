//! Wildcard pattern matching (C1): `*` matches any run of zero or more
//! characters, `?` matches exactly one character, matching is case-sensitive.
//! Implemented by translating the glob into an anchored regular expression,
//! shared by action, resource, and condition string comparisons alike.

use regex::RegexBuilder;

/// Compile a glob pattern into an anchored, case-sensitive regex.
pub(crate) fn regex_from_glob(pattern: &str) -> RegexBuilder {
    let mut regex_pattern = String::with_capacity(2 + pattern.len());
    regex_pattern.push('^');

    for c in pattern.chars() {
        match c {
            '*' => regex_pattern.push_str(".*"),
            '?' => regex_pattern.push('.'),
            _ => regex_pattern.push_str(&regex::escape(&String::from(c))),
        }
    }

    regex_pattern.push('$');
    RegexBuilder::new(&regex_pattern)
}

/// Does `value` match `pattern`?
pub fn matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    match regex_from_glob(pattern).build() {
        Ok(re) => re.is_match(value),
        Err(_) => false,
    }
}

/// Does `value` match any of `patterns`?
pub fn matches_any<'a, I: IntoIterator<Item = &'a str>>(patterns: I, value: &str) -> bool {
    patterns.into_iter().any(|p| matches(p, value))
}
