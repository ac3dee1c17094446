//! Filter tree to predicate compilation.
//!
//! [`compile`] walks a [`Filter`] once and returns a [`Predicate`]: a single
//! closure answering "does this record match?". Child filters are compiled
//! eagerly, field paths are parsed once, and regular expressions are built
//! once; evaluating the predicate only reads the record.
//!
//! # Arrays
//!
//! When a field path crosses an array (see [`PathExpression`]), text, enum,
//! and range tests are existential: the node matches if any element passes.
//! `null`, `boolean`, and range tests without bounds look at the whole value.
//!
//! # Case sensitivity
//!
//! [`CompileOptions::case_sensitive`] governs `string`, `containsString`,
//! `like`, and `stringMap`. `stringEnum` and `stringRange` always compare
//! case-sensitively.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::Result;
use crate::filter::{
    BooleanFilter, ContainsStringFilter, DateRange, DoubleRange, Filter, LikeFilter,
    LogOpFilter, LongEnum, LongRange, NullFilter, StringEnum, StringFilter, StringMapFilter,
    StringRange,
};
use crate::options::CompileOptions;
use crate::path::{PathExpression, Resolved};
use crate::value::{as_text, compare_loose, compare_scalars, is_truthy, loose_eq};
use crate::visitor::FilterVisitor;

type Test = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A compiled filter.
///
/// # Example
///
/// ```
/// use jsonsift::{compile, CompileOptions, Filter};
/// use serde_json::json;
///
/// let filter = Filter::long_range("ratings.critics_score", Some(70), Some(88));
/// let predicate = compile(&filter, CompileOptions::default()).unwrap();
///
/// assert!(predicate.matches(&json!({ "ratings": { "critics_score": 70 } })));
/// assert!(!predicate.matches(&json!({ "ratings": { "critics_score": 92 } })));
/// ```
pub struct Predicate {
    test: Test,
}

impl Predicate {
    /// Tests a single record.
    pub fn matches(&self, record: &Value) -> bool {
        (self.test)(record)
    }

    /// Returns references to the matching records, in input order.
    pub fn filter<'a>(&self, records: &'a [Value]) -> Vec<&'a Value> {
        records.iter().filter(|record| self.matches(record)).collect()
    }

    /// Counts the matching records.
    pub fn count(&self, records: &[Value]) -> usize {
        records.iter().filter(|record| self.matches(record)).count()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

/// Compiles a filter tree into a predicate.
///
/// Fails on malformed field paths or patterns. Each call builds an
/// independent closure tree; nothing is cached between calls.
pub fn compile(filter: &Filter, options: CompileOptions) -> Result<Predicate> {
    log::debug!(
        "compiling {} filter (case_sensitive: {})",
        filter.filter_type(),
        options.case_sensitive
    );
    let test = PredicateCompiler { options }.visit(filter)?;
    Ok(Predicate { test })
}

impl Filter {
    /// Shorthand for [`compile`].
    pub fn compile(&self, options: CompileOptions) -> Result<Predicate> {
        compile(self, options)
    }
}

/// Element-level text test shared by `string`, `containsString`, `like`,
/// and `stringMap`.
enum TextTest {
    Equals(Value),
    Contains(String),
    Pattern(Regex),
}

impl TextTest {
    fn equals(expected: &str, case_sensitive: bool) -> Result<Self> {
        if case_sensitive {
            Ok(TextTest::Equals(Value::String(expected.to_string())))
        } else {
            Ok(TextTest::Pattern(build_regex(
                &format!("^{}$", regex::escape(expected)),
                false,
            )?))
        }
    }

    fn contains(needle: &str, case_sensitive: bool) -> Result<Self> {
        if case_sensitive {
            Ok(TextTest::Contains(needle.to_string()))
        } else {
            Ok(TextTest::Pattern(build_regex(&regex::escape(needle), false)?))
        }
    }

    fn like(pattern: &str, case_sensitive: bool) -> Result<Self> {
        let body: Vec<String> = pattern.split('%').map(regex::escape).collect();
        Ok(TextTest::Pattern(build_regex(
            &format!("^{}$", body.join(".*")),
            case_sensitive,
        )?))
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            TextTest::Equals(expected) => loose_eq(value, expected),
            TextTest::Contains(needle) => {
                as_text(value).is_some_and(|text| text.contains(needle.as_str()))
            }
            TextTest::Pattern(regex) => as_text(value).is_some_and(|text| regex.is_match(&text)),
        }
    }
}

fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()?)
}

/// Tests the resolved field as a whole.
fn field_test<F>(field_name: &str, test: F) -> Result<Test>
where
    F: Fn(&Resolved<'_>) -> bool + Send + Sync + 'static,
{
    let path = PathExpression::parse(field_name)?;
    Ok(Box::new(move |record: &Value| test(&path.evaluate(record))))
}

/// Tests each element of the resolved field; any passing element matches.
fn element_test<F>(field_name: &str, test: F) -> Result<Test>
where
    F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
{
    field_test(field_name, move |resolved| resolved.any(&test))
}

fn text_test(field_name: &str, test: TextTest) -> Result<Test> {
    element_test(field_name, move |value| value.is_some_and(|v| test.matches(v)))
}

fn nullish_test(field_name: &str) -> Result<Test> {
    field_test(field_name, |resolved| resolved.is_nullish())
}

fn range_test(field_name: &str, min: Option<Value>, max: Option<Value>) -> Result<Test> {
    let at_least = |value: &Value, bound: &Value| {
        matches!(
            compare_loose(value, bound),
            Some(Ordering::Greater | Ordering::Equal)
        )
    };
    let at_most = |value: &Value, bound: &Value| {
        matches!(
            compare_loose(value, bound),
            Some(Ordering::Less | Ordering::Equal)
        )
    };

    // Falsy values (0, "", null, false) never pass a bounded range test.
    match (min, max) {
        (None, None) => field_test(field_name, |resolved| resolved.is_truthy()),
        (Some(min), Some(max)) if compare_scalars(&min, &max) == Some(Ordering::Equal) => {
            element_test(field_name, move |value| {
                is_truthy(value) && value.is_some_and(|v| loose_eq(v, &min))
            })
        }
        (None, Some(max)) => element_test(field_name, move |value| {
            is_truthy(value) && value.is_some_and(|v| at_most(v, &max))
        }),
        (Some(min), None) => element_test(field_name, move |value| {
            is_truthy(value) && value.is_some_and(|v| at_least(v, &min))
        }),
        (Some(min), Some(max)) => element_test(field_name, move |value| {
            is_truthy(value) && value.is_some_and(|v| at_least(v, &min) && at_most(v, &max))
        }),
    }
}

fn enum_test(field_name: &str, values: Option<Vec<Value>>) -> Result<Test> {
    match values {
        None => field_test(field_name, |resolved| !resolved.is_truthy()),
        Some(values) => element_test(field_name, move |value| {
            value.is_some_and(|v| {
                values
                    .iter()
                    .any(|candidate| compare_scalars(v, candidate) == Some(Ordering::Equal))
            })
        }),
    }
}

struct PredicateCompiler {
    options: CompileOptions,
}

impl PredicateCompiler {
    fn children(&mut self, filter: &LogOpFilter) -> Result<Vec<Test>> {
        filter.filters.iter().map(|child| self.visit(child)).collect()
    }
}

impl FilterVisitor for PredicateCompiler {
    type Output = Result<Test>;

    fn boolean(&mut self, filter: &BooleanFilter) -> Result<Test> {
        let expected = filter.value;
        field_test(&filter.field_name, move |resolved| {
            resolved.is_truthy() == expected
        })
    }

    fn contains_string(&mut self, filter: &ContainsStringFilter) -> Result<Test> {
        match &filter.contains {
            None => nullish_test(&filter.field_name),
            Some(needle) => text_test(
                &filter.field_name,
                TextTest::contains(needle, self.options.case_sensitive)?,
            ),
        }
    }

    fn date_range(&mut self, filter: &DateRange) -> Result<Test> {
        range_test(
            &filter.field_name,
            filter.min.clone().map(Value::from),
            filter.max.clone().map(Value::from),
        )
    }

    fn double_range(&mut self, filter: &DoubleRange) -> Result<Test> {
        range_test(
            &filter.field_name,
            filter.min.map(Value::from),
            filter.max.map(Value::from),
        )
    }

    fn like(&mut self, filter: &LikeFilter) -> Result<Test> {
        match &filter.like {
            None => nullish_test(&filter.field_name),
            Some(pattern) => text_test(
                &filter.field_name,
                TextTest::like(pattern, self.options.case_sensitive)?,
            ),
        }
    }

    fn long_enum(&mut self, filter: &LongEnum) -> Result<Test> {
        let values: Option<Vec<Value>> = filter
            .values
            .as_ref()
            .map(|values| values.iter().copied().map(Value::from).collect());
        enum_test(&filter.field_name, values)
    }

    fn long_range(&mut self, filter: &LongRange) -> Result<Test> {
        range_test(
            &filter.field_name,
            filter.min.map(Value::from),
            filter.max.map(Value::from),
        )
    }

    fn string_enum(&mut self, filter: &StringEnum) -> Result<Test> {
        let values: Option<Vec<Value>> = filter
            .values
            .as_ref()
            .map(|values| values.iter().cloned().map(Value::from).collect());
        enum_test(&filter.field_name, values)
    }

    fn string(&mut self, filter: &StringFilter) -> Result<Test> {
        match &filter.value {
            None => nullish_test(&filter.field_name),
            Some(value) => text_test(
                &filter.field_name,
                TextTest::equals(value, self.options.case_sensitive)?,
            ),
        }
    }

    fn string_map(&mut self, filter: &StringMapFilter) -> Result<Test> {
        let key = filter.key.clone();
        let value_test = filter
            .value
            .as_deref()
            .map(|value| TextTest::equals(value, self.options.case_sensitive))
            .transpose()?;

        element_test(&filter.field_name, move |value| {
            let Some(Value::Object(map)) = value else {
                return false;
            };
            match (&key, &value_test) {
                (None, None) => !map.is_empty(),
                (None, Some(test)) => map.values().any(|entry| test.matches(entry)),
                (Some(key), None) => map.get(key).is_some_and(|entry| !entry.is_null()),
                (Some(key), Some(test)) => map
                    .get(key)
                    .is_some_and(|entry| !entry.is_null() && test.matches(entry)),
            }
        })
    }

    fn string_range(&mut self, filter: &StringRange) -> Result<Test> {
        range_test(
            &filter.field_name,
            filter.min.clone().map(Value::from),
            filter.max.clone().map(Value::from),
        )
    }

    fn null(&mut self, filter: &NullFilter) -> Result<Test> {
        let is_null = filter.is_null;
        field_test(&filter.field_name, move |resolved| {
            resolved.is_nullish() == is_null
        })
    }

    fn and_op(&mut self, filter: &LogOpFilter) -> Result<Test> {
        let children = self.children(filter)?;
        Ok(Box::new(move |record: &Value| {
            children.iter().all(|child| child(record))
        }))
    }

    fn or_op(&mut self, filter: &LogOpFilter) -> Result<Test> {
        let children = self.children(filter)?;
        Ok(Box::new(move |record: &Value| {
            children.iter().any(|child| child(record))
        }))
    }

    fn nand_op(&mut self, filter: &LogOpFilter) -> Result<Test> {
        let children = self.children(filter)?;
        Ok(Box::new(move |record: &Value| {
            children.iter().any(|child| !child(record))
        }))
    }

    fn nor_op(&mut self, filter: &LogOpFilter) -> Result<Test> {
        let children = self.children(filter)?;
        Ok(Box::new(move |record: &Value| {
            !children.iter().any(|child| child(record))
        }))
    }
}
