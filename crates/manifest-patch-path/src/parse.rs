//! Path string parsing.
//!
//! ```text
//! PATH    := ("/" SEGMENT)*
//! SEGMENT := KEY | INDEX | QUERY
//! INDEX   := digit+
//! QUERY   := "[?" FIELD "='" LITERAL "']"
//! ```
//!
//! Parsing never fails. A token that looks like a query but is malformed is
//! kept as a [`Segment::Key`] and shows up later as a resolution miss.

use crate::types::{Path, Segment};
use crate::unescape_component;

/// Parse a path string into segments.
///
/// The empty string is the root path. The leading `/` is optional.
///
/// # Example
///
/// ```
/// use manifest_patch_path::{parse_path, Segment};
///
/// let path = parse_path("/spec/env/[?name='A']/0");
/// assert_eq!(
///     path,
///     vec![
///         Segment::Key("spec".into()),
///         Segment::Key("env".into()),
///         Segment::Query { field: "name".into(), value: "A".into() },
///         Segment::Index(0),
///     ]
/// );
/// ```
pub fn parse_path(path: &str) -> Path {
    if path.is_empty() {
        return Vec::new();
    }
    let body = path.strip_prefix('/').unwrap_or(path);
    split_tokens(body).into_iter().map(parse_segment).collect()
}

/// Classify a single path token.
pub fn parse_segment(token: &str) -> Segment {
    if let Some(query) = parse_query(token) {
        return query;
    }
    if is_integer(token) {
        // Out of range for every sequence, so it still resolves as a miss.
        return Segment::Index(token.parse().unwrap_or(usize::MAX));
    }
    Segment::Key(unescape_component(token))
}

/// Check if a string consists only of ASCII digits.
pub fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_query(token: &str) -> Option<Segment> {
    let inner = token.strip_prefix("[?")?.strip_suffix(']')?;
    let (field, literal) = inner.split_once('=')?;
    if field.is_empty() {
        return None;
    }
    let quote = literal.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let value = literal.strip_prefix(quote)?.strip_suffix(quote)?;
    Some(Segment::Query {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Split on `/`, except inside the quoted literal of a query token.
fn split_tokens(body: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '/' => {
                tokens.push(&body[start..i]);
                start = i + 1;
            }
            None if (c == '\'' || c == '"') && body[start..].starts_with("[?") => quote = Some(c),
            None => {}
        }
    }
    tokens.push(&body[start..]);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Segment {
        Segment::Key(s.to_string())
    }

    #[test]
    fn empty_is_root() {
        assert_eq!(parse_path(""), Vec::<Segment>::new());
    }

    #[test]
    fn slash_alone_is_empty_key() {
        assert_eq!(parse_path("/"), vec![key("")]);
    }

    #[test]
    fn keys_and_indices() {
        assert_eq!(
            parse_path("/spec/containers/0/image"),
            vec![key("spec"), key("containers"), Segment::Index(0), key("image")]
        );
    }

    #[test]
    fn leading_slash_optional() {
        assert_eq!(parse_path("metadata/name"), parse_path("/metadata/name"));
    }

    #[test]
    fn dash_is_a_key() {
        assert_eq!(parse_path("/items/-"), vec![key("items"), key("-")]);
    }

    #[test]
    fn query_single_and_double_quotes() {
        let expected = Segment::Query {
            field: "name".into(),
            value: "app".into(),
        };
        assert_eq!(parse_segment("[?name='app']"), expected);
        assert_eq!(parse_segment("[?name=\"app\"]"), expected);
    }

    #[test]
    fn query_literal_may_contain_slash() {
        assert_eq!(
            parse_path("/volumeMounts/[?mountPath='/var/run']/name"),
            vec![
                key("volumeMounts"),
                Segment::Query {
                    field: "mountPath".into(),
                    value: "/var/run".into()
                },
                key("name"),
            ]
        );
    }

    #[test]
    fn malformed_query_degrades_to_key() {
        assert_eq!(parse_segment("[?name=app]"), key("[?name=app]"));
        assert_eq!(parse_segment("[?='x']"), key("[?='x']"));
        assert_eq!(parse_segment("[?name='x'"), key("[?name='x'"));
        assert_eq!(parse_segment("[name='x']"), key("[name='x']"));
    }

    #[test]
    fn keys_are_unescaped() {
        assert_eq!(
            parse_path("/metadata/annotations/app.kubernetes.io~1name"),
            vec![key("metadata"), key("annotations"), key("app.kubernetes.io/name")]
        );
    }

    #[test]
    fn huge_index_stays_an_index() {
        assert_eq!(
            parse_segment("99999999999999999999999999"),
            Segment::Index(usize::MAX)
        );
    }

    #[test]
    fn mixed_tokens_are_keys() {
        assert_eq!(parse_segment("1a"), key("1a"));
        assert_eq!(parse_segment("-1"), key("-1"));
    }
}
