//! Route templates: compilation and line matching.
//!
//! A route template is literal text interleaved with `{name}` placeholders:
//!
//! ```text
//! Say hello to {name}.
//! └──────────┘ └────┘└┘
//!   literal     name  literal
//! ```
//!
//! Compiling a template produces an ordered list of [`RoutePart`]s. Matching
//! walks those parts against an input line: each literal is located at its
//! first occurrence after the cursor, and whatever text lies between the
//! cursor and that occurrence is captured by the placeholder before it.
//! A trailing placeholder captures the rest of the line.
//!
//! # Matching Policy
//!
//! Matching is greedy-forward with no backtracking. With the template
//! `{a}, {b}` and the line `x, y, z`, `a` captures `x` and `b` captures
//! `y, z`: the separator always binds at its first occurrence.
//!
//! # Brace Handling
//!
//! Braces are scanned with two toggles (one for `{`, one for `}`). Doubled
//! braces are therefore not an escape: `{{name}}` compiles to the literal
//! text `{{name}}`, and a stray `}` makes the next `}` inert.

use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// One unit of a compiled route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoutePart {
    /// Text that must appear in the line (never empty).
    Literal(String),
    /// A named capture point (name never empty).
    Placeholder(String),
}

impl RoutePart {
    /// Returns true if this is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RoutePart::Placeholder(_))
    }

    /// The literal text or the placeholder name.
    pub fn text(&self) -> &str {
        match self {
            RoutePart::Literal(text) | RoutePart::Placeholder(text) => text,
        }
    }
}

/// A compiled route template.
///
/// # Example
///
/// ```rust
/// use lineroute::{RoutePart, RouteTemplate};
///
/// let route = RouteTemplate::parse("Say hello to {name}.")?;
/// assert_eq!(
///     route.parts(),
///     &[
///         RoutePart::Literal("Say hello to ".into()),
///         RoutePart::Placeholder("name".into()),
///         RoutePart::Literal(".".into()),
///     ]
/// );
///
/// let captures = route.matches("Say hello to World.", true).unwrap();
/// assert_eq!(captures.get("name"), Some("World"));
/// # Ok::<(), lineroute::RouteError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    source: String,
    parts: Vec<RoutePart>,
}

impl RouteTemplate {
    /// Compiles a template string.
    ///
    /// Fails when the template is empty, when two placeholders follow each
    /// other without literal text in between (unless the first one opens the
    /// template), or when a placeholder name is repeated.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        if template.is_empty() {
            return Err(RouteError::EmptyTemplate);
        }

        let mut parts: Vec<RoutePart> = Vec::new();
        let mut open = false;
        let mut closed = false;
        let mut name_start = 0;
        let mut part_end = 0;

        for (i, c) in template.char_indices() {
            match c {
                '{' => {
                    open = !open;
                    if open {
                        name_start = i + 1;
                    }
                }
                '}' => {
                    closed = !closed;
                    if !(closed && open) {
                        continue;
                    }

                    let literal = &template[part_end..name_start - 1];
                    let name = &template[name_start..i];

                    if !literal.is_empty() {
                        parts.push(RoutePart::Literal(literal.to_string()));
                    } else if part_end > 0 {
                        return Err(RouteError::AdjacentPlaceholders {
                            position: name_start - 1,
                        });
                    }

                    if !name.is_empty() {
                        if parts.iter().any(|p| p.is_placeholder() && p.text() == name) {
                            return Err(RouteError::DuplicatePlaceholder {
                                name: name.to_string(),
                            });
                        }
                        parts.push(RoutePart::Placeholder(name.to_string()));
                    }

                    open = false;
                    closed = false;
                    part_end = i + 1;
                }
                _ => {}
            }
        }

        if part_end < template.len() {
            parts.push(RoutePart::Literal(template[part_end..].to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            parts,
        })
    }

    /// The template text this route was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled parts, in template order.
    pub fn parts(&self) -> &[RoutePart] {
        &self.parts
    }

    /// Placeholder names, in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| p.is_placeholder())
            .map(RoutePart::text)
    }

    /// Rejects placeholder names that collide under the given case policy.
    ///
    /// [`parse`](Self::parse) only catches exact repeats. On a
    /// case-insensitive route `{Name}` and `{name}` would share one capture.
    pub fn check_placeholders(&self, case_sensitive: bool) -> Result<(), RouteError> {
        let names: Vec<&str> = self.placeholders().collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].iter().any(|seen| names_eq(seen, name, case_sensitive)) {
                return Err(RouteError::DuplicatePlaceholder {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Matches a line against this route.
    ///
    /// Returns the captured placeholder values, or `None` when the line does
    /// not match. A placeholder whose extent is empty is left out of the
    /// captures rather than captured as an empty string.
    pub fn matches(&self, line: &str, case_sensitive: bool) -> Option<Captures> {
        let mut captures = Captures::new(case_sensitive);
        let mut cursor = 0;
        let mut pending: Option<&str> = None;

        for part in &self.parts {
            match part {
                RoutePart::Placeholder(name) => pending = Some(name),
                RoutePart::Literal(text) => {
                    let (start, end) = find_from(line, text, cursor, case_sensitive)?;
                    if start > cursor {
                        // Text between the cursor and the literal must belong to a placeholder.
                        let name = pending?;
                        captures.push(name, &line[cursor..start]);
                    }
                    cursor = end;
                    pending = None;
                }
            }
        }

        if cursor < line.len() {
            let name = pending?;
            captures.push(name, &line[cursor..]);
        }

        Some(captures)
    }
}

impl FromStr for RouteTemplate {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Placeholder values captured from a matched line.
///
/// Names are looked up with the case policy of the route that produced
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<(String, String)>,
    case_sensitive: bool,
}

impl Captures {
    fn new(case_sensitive: bool) -> Self {
        Self {
            values: Vec::new(),
            case_sensitive,
        }
    }

    fn push(&mut self, name: &str, value: &str) {
        self.values.push((name.to_string(), value.to_string()));
    }

    /// Returns the raw text captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| names_eq(key, name, self.case_sensitive))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if a value was captured for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of captured values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Finds the first occurrence of `needle` in `haystack` at or after byte
/// offset `from`. Returns the byte range of the occurrence.
fn find_from(
    haystack: &str,
    needle: &str,
    from: usize,
    case_sensitive: bool,
) -> Option<(usize, usize)> {
    let rest = haystack.get(from..)?;

    if case_sensitive {
        return rest
            .find(needle)
            .map(|i| (from + i, from + i + needle.len()));
    }

    rest.char_indices().find_map(|(i, _)| {
        prefix_len_ignore_case(&rest[i..], needle).map(|len| (from + i, from + i + len))
    })
}

/// If `text` starts with `prefix` (ignoring case), returns how many bytes of
/// `text` the prefix covers. Case folding can change byte lengths, so this
/// is not always `prefix.len()`.
fn prefix_len_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !chars_eq_ignore_case(actual, expected) {
            return None;
        }
    }
    Some(chars.next().map_or(text.len(), |(i, _)| i))
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn names_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b) || eq_ignore_case(a, b)
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| chars_eq_ignore_case(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> RoutePart {
        RoutePart::Literal(s.into())
    }

    fn ph(s: &str) -> RoutePart {
        RoutePart::Placeholder(s.into())
    }

    fn parts(template: &str) -> Vec<RoutePart> {
        RouteTemplate::parse(template).unwrap().parts().to_vec()
    }

    // ============================================================================
    // Compilation
    // ============================================================================

    #[test]
    fn test_parse_literal_only() {
        assert_eq!(parts("help"), vec![lit("help")]);
    }

    #[test]
    fn test_parse_placeholder_between_literals() {
        assert_eq!(
            parts("Say hello to {name}."),
            vec![lit("Say hello to "), ph("name"), lit(".")]
        );
    }

    #[test]
    fn test_parse_leading_and_trailing_placeholders() {
        assert_eq!(
            parts("{who} says {what}"),
            vec![ph("who"), lit(" says "), ph("what")]
        );
    }

    #[test]
    fn test_parse_adjacent_placeholders_rejected() {
        let err = RouteTemplate::parse("move {a}{b}").unwrap_err();
        assert_eq!(err, RouteError::AdjacentPlaceholders { position: 8 });
    }

    #[test]
    fn test_parse_adjacent_placeholders_at_start_rejected() {
        // Only the first placeholder may go without a literal before it.
        let err = RouteTemplate::parse("{a}{b}").unwrap_err();
        assert_eq!(err, RouteError::AdjacentPlaceholders { position: 3 });
    }

    #[test]
    fn test_parse_empty_placeholder_dropped() {
        assert_eq!(parts("go{}now"), vec![lit("go"), lit("now")]);
    }

    #[test]
    fn test_parse_empty_placeholder_still_closes_boundary() {
        let err = RouteTemplate::parse("go{}{where}").unwrap_err();
        assert!(matches!(err, RouteError::AdjacentPlaceholders { .. }));
    }

    #[test]
    fn test_parse_doubled_braces_are_literal() {
        assert_eq!(parts("show {{name}}"), vec![lit("show {{name}}")]);
    }

    #[test]
    fn test_parse_stray_closing_brace_disables_next_close() {
        assert_eq!(parts("a}b{c}"), vec![lit("a}b{c}")]);
    }

    #[test]
    fn test_parse_unclosed_brace_is_literal() {
        assert_eq!(parts("{a} and {b"), vec![ph("a"), lit(" and {b")]);
    }

    #[test]
    fn test_parse_empty_template_rejected() {
        assert_eq!(RouteTemplate::parse(""), Err(RouteError::EmptyTemplate));
    }

    #[test]
    fn test_parse_duplicate_placeholder_rejected() {
        let err = RouteTemplate::parse("{x} plus {x}").unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicatePlaceholder { name: "x".into() }
        );
    }

    #[test]
    fn test_placeholders_differing_in_case() {
        let route = RouteTemplate::parse("{Name} and {name}").unwrap();
        assert!(route.check_placeholders(true).is_ok());
        assert_eq!(
            route.check_placeholders(false).unwrap_err(),
            RouteError::DuplicatePlaceholder {
                name: "name".into()
            }
        );
    }

    #[test]
    fn test_parse_non_ascii_literals() {
        assert_eq!(
            parts("grüß {name} schön"),
            vec![lit("grüß "), ph("name"), lit(" schön")]
        );
    }

    #[test]
    fn test_placeholders_in_order() {
        let route: RouteTemplate = "copy {from} to {to}".parse().unwrap();
        assert_eq!(route.placeholders().collect::<Vec<_>>(), vec!["from", "to"]);
        assert_eq!(route.to_string(), "copy {from} to {to}");
    }

    // ============================================================================
    // Matching
    // ============================================================================

    #[test]
    fn test_match_captures_placeholder() {
        let route = RouteTemplate::parse("Say hello to {name}.").unwrap();
        let captures = route.matches("Say hello to World.", true).unwrap();
        assert_eq!(captures.get("name"), Some("World"));
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_match_case_policy() {
        let route = RouteTemplate::parse("hello").unwrap();
        assert!(route.matches("HELLO", false).is_some());
        assert!(route.matches("HELLO", true).is_none());
    }

    #[test]
    fn test_match_case_insensitive_keeps_input_casing() {
        let route = RouteTemplate::parse("say hello to {name}.").unwrap();
        let captures = route.matches("SAY HELLO TO Ada.", false).unwrap();
        assert_eq!(captures.get("name"), Some("Ada"));
    }

    #[test]
    fn test_match_case_insensitive_non_ascii() {
        let route = RouteTemplate::parse("grüß {name}").unwrap();
        let captures = route.matches("GRÜSS Ada", false);
        // Simple per-character folding: 'ß' does not fold to "SS".
        assert!(captures.is_none());

        let captures = route.matches("GRÜß Ada", false).unwrap();
        assert_eq!(captures.get("name"), Some("Ada"));
    }

    #[test]
    fn test_match_trailing_placeholder_takes_rest() {
        let route = RouteTemplate::parse("echo {text}").unwrap();
        let captures = route.matches("echo a b c", true).unwrap();
        assert_eq!(captures.get("text"), Some("a b c"));
    }

    #[test]
    fn test_match_leading_placeholder() {
        let route = RouteTemplate::parse("{who} says hi").unwrap();
        let captures = route.matches("Bob says hi", true).unwrap();
        assert_eq!(captures.get("who"), Some("Bob"));
    }

    #[test]
    fn test_match_literal_missing() {
        let route = RouteTemplate::parse("Say hello to {name}.").unwrap();
        assert!(route.matches("Say hello to World", true).is_none());
    }

    #[test]
    fn test_match_leading_garbage_rejected() {
        let route = RouteTemplate::parse("help").unwrap();
        assert!(route.matches("please help", true).is_none());
    }

    #[test]
    fn test_match_trailing_garbage_rejected() {
        let route = RouteTemplate::parse("help").unwrap();
        assert!(route.matches("help me", true).is_none());
    }

    #[test]
    fn test_match_empty_placeholder_not_captured() {
        let route = RouteTemplate::parse("greet {name}!").unwrap();
        let captures = route.matches("greet !", true).unwrap();
        assert!(!captures.contains("name"));
        assert!(captures.is_empty());
    }

    #[test]
    fn test_match_trailing_placeholder_at_end_not_captured() {
        let route = RouteTemplate::parse("list {filter}").unwrap();
        let captures = route.matches("list ", true).unwrap();
        assert!(captures.is_empty());
    }

    #[test]
    fn test_match_greedy_forward_first_separator_wins() {
        let route = RouteTemplate::parse("{a}, {b}").unwrap();
        let captures = route.matches("x, y, z", true).unwrap();
        assert_eq!(captures.get("a"), Some("x"));
        assert_eq!(captures.get("b"), Some("y, z"));
    }

    #[test]
    fn test_match_no_backtracking() {
        // The "." inside the name ends the capture early and the rest is unmatched.
        let route = RouteTemplate::parse("hello {name}.").unwrap();
        assert!(route.matches("hello J. Doe.", true).is_none());
    }

    #[test]
    fn test_match_two_placeholders() {
        let route = RouteTemplate::parse("copy {from} to {to}").unwrap();
        let captures = route.matches("copy a.txt to b.txt", true).unwrap();
        assert_eq!(
            captures.iter().collect::<Vec<_>>(),
            vec![("from", "a.txt"), ("to", "b.txt")]
        );
    }

    #[test]
    fn test_capture_lookup_follows_case_policy() {
        let route = RouteTemplate::parse("set {Key}").unwrap();

        let insensitive = route.matches("set x", false).unwrap();
        assert_eq!(insensitive.get("key"), Some("x"));

        let sensitive = route.matches("set x", true).unwrap();
        assert_eq!(sensitive.get("key"), None);
        assert_eq!(sensitive.get("Key"), Some("x"));
    }

    #[test]
    fn test_find_from_ignore_case_offsets() {
        assert_eq!(find_from("abcABC", "abc", 1, false), Some((3, 6)));
        assert_eq!(find_from("abcABC", "abc", 1, true), None);
        assert_eq!(find_from("abc", "c", 5, true), None);
    }
}
