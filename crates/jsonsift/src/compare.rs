//! Sort specification to comparator compilation.
//!
//! [`compile_sort`] turns a [`SortSpec`] into a [`Comparator`], a three-way
//! comparison usable with any slice sort. Fields are tried in priority order
//! and the first non-equal field decides.
//!
//! # Value ordering
//!
//! - A missing or falsy value sorts before a truthy one.
//! - Lists (from fan-out or JSON arrays) compare element by element, with
//!   the shorter list padded by missing values; a scalar compared against a
//!   list acts as a one-element list.
//! - Numbers, strings, and booleans use their natural order. Strings are
//!   case-folded first unless the comparator is case-sensitive.
//! - Anything else compares equal.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::options::CompileOptions;
use crate::path::{PathExpression, Resolved};
use crate::sort::{SortField, SortOrder, SortSpec};
use crate::value::compare_scalars;

/// A compiled sort order.
///
/// # Example
///
/// ```
/// use jsonsift::{compile_sort, CompileOptions};
/// use serde_json::json;
///
/// let comparator = compile_sort("-year", CompileOptions::default()).unwrap();
/// let mut movies = vec![json!({ "year": 1995 }), json!({ "year": 2010 })];
/// comparator.sort(&mut movies);
/// assert_eq!(movies[0]["year"], 2010);
/// ```
pub struct Comparator {
    keys: Vec<(PathExpression, SortField)>,
    case_sensitive: bool,
}

impl Comparator {
    /// Compares two records.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (path, field) in &self.keys {
            let ordering = compare_resolved(
                &path.evaluate(a),
                &path.evaluate(b),
                self.case_sensitive,
            );
            if ordering != Ordering::Equal {
                return field.apply(ordering);
            }
        }
        Ordering::Equal
    }

    /// Stable-sorts records in place.
    pub fn sort(&self, records: &mut [Value]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Stable-sorts record references in place.
    pub fn sort_refs(&self, records: &mut [&Value]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    /// Returns the sort fields in priority order.
    pub fn fields(&self) -> impl Iterator<Item = &SortField> {
        self.keys.iter().map(|(_, field)| field)
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order: SortOrder = self.fields().cloned().collect();
        f.debug_struct("Comparator")
            .field("order", &order.to_string())
            .field("case_sensitive", &self.case_sensitive)
            .finish()
    }
}

/// Compiles a sort specification into a comparator.
///
/// Accepts a single encoded field (`"-title"`), a list of encoded fields
/// (`["-rating", "title"]`), or a [`SortOrder`]. Fails on an invalid field
/// encoding or path.
pub fn compile_sort(spec: impl Into<SortSpec>, options: CompileOptions) -> Result<Comparator> {
    let order = spec.into().into_sort_order()?;
    log::debug!("compiling sort order '{order}'");
    let keys = order
        .fields()
        .iter()
        .map(|field| Ok((PathExpression::parse(&field.name)?, field.clone())))
        .collect::<Result<Vec<_>>>()?;
    Ok(Comparator {
        keys,
        case_sensitive: options.case_sensitive,
    })
}

/// Compares two resolved values, ascending.
pub fn compare_resolved(a: &Resolved<'_>, b: &Resolved<'_>, case_sensitive: bool) -> Ordering {
    let (a_present, b_present) = (a.is_truthy(), b.is_truthy());
    if a_present != b_present {
        return if a_present {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    match (a.elements(), b.elements()) {
        (None, None) => {}
        (a_items, b_items) => {
            let a_items = a_items.unwrap_or_else(|| vec![a.clone()]);
            let b_items = b_items.unwrap_or_else(|| vec![b.clone()]);
            let len = a_items.len().max(b_items.len());
            return (0..len)
                .map(|i| {
                    compare_resolved(
                        a_items.get(i).unwrap_or(&Resolved::Missing),
                        b_items.get(i).unwrap_or(&Resolved::Missing),
                        case_sensitive,
                    )
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal);
        }
    }

    match (a.as_value(), b.as_value()) {
        (Some(Value::String(a)), Some(Value::String(b))) if !case_sensitive => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (Some(a), Some(b)) => compare_scalars(a, b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(a: Value, b: Value) -> Ordering {
        compare_resolved(&Resolved::Value(&a), &Resolved::Value(&b), false)
    }

    #[test]
    fn absent_sorts_first() {
        assert_eq!(
            compare_resolved(&Resolved::Missing, &Resolved::Value(&json!(1)), false),
            Ordering::Less
        );
        assert_eq!(cmp(json!("a"), json!(null)), Ordering::Greater);
        assert_eq!(cmp(json!(0), json!(5)), Ordering::Less);
        assert_eq!(
            compare_resolved(&Resolved::Missing, &Resolved::Missing, false),
            Ordering::Equal
        );
    }

    #[test]
    fn scalars_use_natural_order() {
        assert_eq!(cmp(json!(2), json!(10)), Ordering::Less);
        assert_eq!(cmp(json!("b"), json!("a")), Ordering::Greater);
        assert_eq!(cmp(json!(1.5), json!(1.5)), Ordering::Equal);
    }

    #[test]
    fn strings_fold_case_unless_case_sensitive() {
        let (a, b) = (json!("apple"), json!("Banana"));
        assert_eq!(
            compare_resolved(&Resolved::Value(&a), &Resolved::Value(&b), false),
            Ordering::Less
        );
        assert_eq!(
            compare_resolved(&Resolved::Value(&a), &Resolved::Value(&b), true),
            Ordering::Greater
        );
    }

    #[test]
    fn lists_compare_elementwise() {
        assert_eq!(cmp(json!([1, 2]), json!([1, 3])), Ordering::Less);
        assert_eq!(cmp(json!([1, 2]), json!([1, 2])), Ordering::Equal);
        assert_eq!(cmp(json!([1]), json!([1, 2])), Ordering::Less);
        assert_eq!(cmp(json!(2), json!([1, 5])), Ordering::Greater);
        assert_eq!(cmp(json!(1), json!([1])), Ordering::Equal);
    }

    #[test]
    fn mixed_types_compare_equal() {
        assert_eq!(cmp(json!("10"), json!(5)), Ordering::Equal);
        assert_eq!(cmp(json!({"a": 1}), json!(5)), Ordering::Equal);
    }

    #[test]
    fn comparator_uses_tie_breakers() {
        let comparator = compile_sort(["-year", "title"], CompileOptions::default()).unwrap();
        let mut movies = vec![
            json!({ "title": "b", "year": 2000 }),
            json!({ "title": "a", "year": 2000 }),
            json!({ "title": "c", "year": 2010 }),
        ];
        comparator.sort(&mut movies);
        let titles: Vec<&str> = movies.iter().map(|m| m["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn comparator_sorts_by_fanned_out_paths() {
        let comparator = compile_sort("cast[*].name", CompileOptions::default()).unwrap();
        let a = json!({ "cast": [{ "name": "Ann" }, { "name": "Zed" }] });
        let b = json!({ "cast": [{ "name": "Ann" }, { "name": "Bob" }] });
        assert_eq!(comparator.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn invalid_sort_fields_fail() {
        assert!(compile_sort(["+"], CompileOptions::default()).is_err());
        assert!(compile_sort("a[", CompileOptions::default()).is_err());
    }

    #[test]
    fn debug_shows_order() {
        let comparator = compile_sort(["-a", "b"], CompileOptions::case_sensitive()).unwrap();
        let debug = format!("{comparator:?}");
        assert!(debug.contains("-a,+b"));
        assert!(debug.contains("case_sensitive: true"));
    }
}
