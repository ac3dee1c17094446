//! Field path expressions.
//!
//! A [`PathExpression`] is parsed once from text such as
//! `"ratings.critics_score"` or `"abridged_cast[*].name"` and then evaluated
//! against any number of records.
//!
//! # Syntax
//!
//! | Segment | Meaning |
//! |---------|---------|
//! | `name` / `.name` | object member |
//! | `[*]` | every element of an array |
//! | `[2]` | array element by index |
//! | `["a.b"]` / `['a.b']` | object member whose key needs quoting |
//!
//! An empty path evaluates to the record itself.
//!
//! # Fan-out
//!
//! Crossing an array, either through `[*]` or because a member segment lands
//! on an array, evaluates the rest of the path against every element and
//! yields [`Resolved::Many`]. Each wildcard adds one level of nesting; results
//! are never flattened.
//!
//! `[*]` on anything other than an array passes the value through unchanged,
//! so `cast[*].name` reads a lone `{"name": ..}` object the same way it reads
//! a one-element list. A missing value stays missing.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{Result, SiftError};
use crate::value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Member(String),
    Index(usize),
    Wildcard,
}

/// A parsed, reusable field path.
///
/// # Example
///
/// ```
/// use jsonsift::{PathExpression, Resolved};
/// use serde_json::json;
///
/// let path = PathExpression::parse("ratings.critics_score").unwrap();
/// let movie = json!({ "ratings": { "critics_score": 70 } });
///
/// assert_eq!(path.evaluate(&movie).as_value(), Some(&json!(70)));
/// assert!(matches!(path.evaluate(&json!({})), Resolved::Missing));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    source: String,
    segments: Vec<Segment>,
}

impl PathExpression {
    /// Parses a path expression.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(PathExpression {
            source: text.to_string(),
            segments: parse_segments(text)?,
        })
    }

    /// Evaluates the path against a record.
    ///
    /// Never fails: paths that do not exist on the record resolve to
    /// [`Resolved::Missing`].
    pub fn evaluate<'a>(&self, record: &'a Value) -> Resolved<'a> {
        resolve(record, &self.segments)
    }

    /// Returns the original path text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the member names if the path is a plain chain of members.
    ///
    /// Paths containing indices or wildcards return `None`.
    pub fn member_names(&self) -> Option<Vec<&str>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Member(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl FromStr for PathExpression {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        PathExpression::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(text: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut first = true;

    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('[') {
            let (segment, remaining) = parse_bracket(text, inner)?;
            segments.push(segment);
            rest = remaining;
        } else {
            let member = if first {
                rest
            } else {
                rest.strip_prefix('.')
                    .ok_or_else(|| SiftError::path(text, "expected '.' or '['"))?
            };
            let end = member
                .find(|c| matches!(c, '.' | '[' | ']'))
                .unwrap_or(member.len());
            if end == 0 {
                return Err(SiftError::path(text, "empty member name"));
            }
            segments.push(Segment::Member(member[..end].to_string()));
            rest = &member[end..];
        }
        first = false;
    }

    Ok(segments)
}

fn parse_bracket<'a>(text: &str, inner: &'a str) -> Result<(Segment, &'a str)> {
    if let Some(quote) = inner.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let body = &inner[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| SiftError::path(text, "unterminated quoted key"))?;
        let rest = body[end + 1..]
            .strip_prefix(']')
            .ok_or_else(|| SiftError::path(text, "expected ']' after quoted key"))?;
        return Ok((Segment::Member(body[..end].to_string()), rest));
    }

    let close = inner
        .find(']')
        .ok_or_else(|| SiftError::path(text, "unterminated '['"))?;
    let token = inner[..close].trim();
    let segment = if token == "*" {
        Segment::Wildcard
    } else {
        token.parse::<usize>().map(Segment::Index).map_err(|_| {
            SiftError::path(text, "expected '*', an index, or a quoted key inside '[]'")
        })?
    };
    Ok((segment, &inner[close + 1..]))
}

fn resolve<'a>(current: &'a Value, segments: &[Segment]) -> Resolved<'a> {
    let Some((segment, rest)) = segments.split_first() else {
        return Resolved::Value(current);
    };

    match (segment, current) {
        (Segment::Wildcard, Value::Array(items)) => {
            Resolved::Many(items.iter().map(|item| resolve(item, rest)).collect())
        }
        // Non-array values pass through a wildcard unchanged.
        (Segment::Wildcard, _) => resolve(current, rest),
        (Segment::Index(index), Value::Array(items)) => items
            .get(*index)
            .map_or(Resolved::Missing, |item| resolve(item, rest)),
        (Segment::Index(index), Value::Object(map)) => map
            .get(&index.to_string())
            .map_or(Resolved::Missing, |item| resolve(item, rest)),
        // A member step on an array applies to each element.
        (Segment::Member(_), Value::Array(items)) => {
            Resolved::Many(items.iter().map(|item| resolve(item, segments)).collect())
        }
        (Segment::Member(name), Value::Object(map)) => map
            .get(name)
            .map_or(Resolved::Missing, |member| resolve(member, rest)),
        _ => Resolved::Missing,
    }
}

/// Result of evaluating a path against one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The path does not exist on the record.
    Missing,
    /// A single value, borrowed from the record.
    Value(&'a Value),
    /// One result per element of a crossed array.
    Many(Vec<Resolved<'a>>),
}

impl<'a> Resolved<'a> {
    /// Returns the single value, if this is not missing or fanned out.
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Resolved::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns `true` for a missing member or an explicit `null`.
    pub fn is_nullish(&self) -> bool {
        match self {
            Resolved::Missing => true,
            Resolved::Value(value) => value.is_null(),
            Resolved::Many(_) => false,
        }
    }

    /// Truthiness of the whole result. A fanned-out list is always truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Resolved::Missing => false,
            Resolved::Value(v) => value::is_truthy(Some(*v)),
            Resolved::Many(_) => true,
        }
    }

    /// Existential test over the result.
    ///
    /// Fanned-out results and JSON arrays match when any element matches,
    /// descending through nested lists. An empty list never matches. A
    /// missing member is tested as `None`.
    pub fn any<F>(&self, test: &F) -> bool
    where
        F: Fn(Option<&Value>) -> bool,
    {
        match self {
            Resolved::Missing => test(None),
            Resolved::Value(Value::Array(items)) => {
                items.iter().any(|item| Resolved::Value(item).any(test))
            }
            Resolved::Value(value) => test(Some(*value)),
            Resolved::Many(items) => items.iter().any(|item| item.any(test)),
        }
    }

    /// Returns the elements if the result is a list.
    ///
    /// JSON arrays count as lists, so a path ending on an array behaves the
    /// same as one fanning out through `[*]`.
    pub fn elements(&self) -> Option<Vec<Resolved<'a>>> {
        match self {
            Resolved::Many(items) => Some(items.clone()),
            Resolved::Value(Value::Array(items)) => {
                Some(items.iter().map(Resolved::Value).collect())
            }
            _ => None,
        }
    }

    /// Copies the result into an owned value. Missing becomes `null`.
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::Missing => Value::Null,
            Resolved::Value(value) => (*value).clone(),
            Resolved::Many(items) => Value::Array(items.iter().map(Resolved::to_value).collect()),
        }
    }
}

/// Inserts `value` into `target` under a chain of member names, creating
/// intermediate objects as needed.
pub(crate) fn insert_at(target: &mut Map<String, Value>, names: &[&str], value: Value) {
    let Some((last, parents)) = names.split_last() else {
        return;
    };
    let mut current = target;
    for name in parents {
        let slot = current
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie() -> Value {
        json!({
            "title": "Toy Story 3",
            "ratings": { "critics_score": 99, "audience_score": 89 },
            "abridged_cast": [
                { "name": "Tom Hanks", "characters": ["Woody"] },
                { "name": "Tim Allen", "characters": ["Buzz Lightyear"] }
            ],
            "links": { "self.json": "http://example.com/770672122.json" }
        })
    }

    #[test]
    fn member_access() {
        let record = movie();
        let path = PathExpression::parse("ratings.critics_score").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Value(&json!(99)));
    }

    #[test]
    fn empty_path_is_identity() {
        let record = json!(5);
        let path = PathExpression::parse("").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Value(&json!(5)));
    }

    #[test]
    fn missing_members_resolve_to_missing() {
        let record = movie();
        for text in ["nope", "ratings.nope", "title.length", "ratings.critics_score.x"] {
            let path = PathExpression::parse(text).unwrap();
            assert_eq!(path.evaluate(&record), Resolved::Missing, "{text}");
        }
    }

    #[test]
    fn explicit_null_is_a_value() {
        let record = json!({ "a": null });
        let path = PathExpression::parse("a").unwrap();
        let resolved = path.evaluate(&record);
        assert_eq!(resolved, Resolved::Value(&Value::Null));
        assert!(resolved.is_nullish());
    }

    #[test]
    fn wildcard_fans_out() {
        let record = movie();
        let path = PathExpression::parse("abridged_cast[*].name").unwrap();
        assert_eq!(
            path.evaluate(&record).to_value(),
            json!(["Tom Hanks", "Tim Allen"])
        );
    }

    #[test]
    fn wildcard_passes_non_arrays_through() {
        let record = json!({ "cast": { "name": "Tom Hanks" }, "year": 1995 });

        let path = PathExpression::parse("cast[*].name").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Value(&json!("Tom Hanks")));

        let path = PathExpression::parse("year[*]").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Value(&json!(1995)));

        let path = PathExpression::parse("crew[*].name").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Missing);
    }

    #[test]
    fn implicit_fan_out_over_arrays() {
        let record = movie();
        let path = PathExpression::parse("abridged_cast.name").unwrap();
        assert_eq!(
            path.evaluate(&record).to_value(),
            json!(["Tom Hanks", "Tim Allen"])
        );
    }

    #[test]
    fn nested_wildcards_keep_one_level_per_wildcard() {
        let record = movie();
        let path = PathExpression::parse("abridged_cast[*].characters[*]").unwrap();
        assert_eq!(
            path.evaluate(&record).to_value(),
            json!([["Woody"], ["Buzz Lightyear"]])
        );
    }

    #[test]
    fn index_and_quoted_segments() {
        let record = movie();
        let path = PathExpression::parse("abridged_cast[1].name").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Value(&json!("Tim Allen")));

        let path = PathExpression::parse("links[\"self.json\"]").unwrap();
        assert!(path.evaluate(&record).as_value().is_some());

        let path = PathExpression::parse("links['self.json']").unwrap();
        assert!(path.evaluate(&record).as_value().is_some());

        let path = PathExpression::parse("abridged_cast[9].name").unwrap();
        assert_eq!(path.evaluate(&record), Resolved::Missing);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for text in [".a", "a.", "a..b", "a[", "a[x]", "a[*]b", "a]", "a['b]", "a['b'x]"] {
            assert!(
                matches!(
                    PathExpression::parse(text),
                    Err(SiftError::InvalidPath { .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn existential_any() {
        let record = movie();
        let path = PathExpression::parse("abridged_cast[*].name").unwrap();
        let resolved = path.evaluate(&record);
        assert!(resolved.any(&|v| v == Some(&json!("Tim Allen"))));
        assert!(!resolved.any(&|v| v == Some(&json!("Harrison Ford"))));

        let empty = json!({ "list": [] });
        let path = PathExpression::parse("list").unwrap();
        assert!(!path.evaluate(&empty).any(&|_| true));
    }

    #[test]
    fn member_names_for_plain_paths() {
        let path = PathExpression::parse("a.b.c").unwrap();
        assert_eq!(path.member_names(), Some(vec!["a", "b", "c"]));

        let path = PathExpression::parse("a[*].c").unwrap();
        assert_eq!(path.member_names(), None);
    }

    #[test]
    fn insert_at_builds_nested_objects() {
        let mut target = Map::new();
        insert_at(&mut target, &["a", "b"], json!(1));
        insert_at(&mut target, &["a", "c"], json!(2));
        assert_eq!(Value::Object(target), json!({ "a": { "b": 1, "c": 2 } }));
    }

    #[test]
    fn display_is_source_text() {
        let path: PathExpression = "abridged_cast[*].name".parse().unwrap();
        assert_eq!(path.to_string(), "abridged_cast[*].name");
    }
}
