//! The filter tree.
//!
//! A [`Filter`] is plain data: a closed set of node shapes, tagged by `type`
//! on the wire. It has no matching behavior of its own; interpreters such as
//! [`compile`](crate::compile) and [`Describer`](crate::Describer) walk it
//! through the [`FilterVisitor`](crate::FilterVisitor) contract.
//!
//! # Wire format
//!
//! ```json
//! { "type": "logOp", "operation": "and", "filters": [
//!     { "type": "longRange", "fieldName": "year", "min": 1990 },
//!     { "type": "like", "fieldName": "abridged_cast[*].name", "like": "%Ford%" }
//! ] }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, SiftError};

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    #[serde(rename = "boolean")]
    Boolean(BooleanFilter),
    #[serde(rename = "containsString")]
    ContainsString(ContainsStringFilter),
    #[serde(rename = "dateRange")]
    DateRange(DateRange),
    #[serde(rename = "doubleRange")]
    DoubleRange(DoubleRange),
    #[serde(rename = "like")]
    Like(LikeFilter),
    #[serde(rename = "logOp")]
    LogOp(LogOpFilter),
    #[serde(rename = "longEnum")]
    LongEnum(LongEnum),
    #[serde(rename = "longRange")]
    LongRange(LongRange),
    #[serde(rename = "stringEnum")]
    StringEnum(StringEnum),
    #[serde(rename = "string")]
    String(StringFilter),
    #[serde(rename = "stringMap")]
    StringMap(StringMapFilter),
    #[serde(rename = "stringRange")]
    StringRange(StringRange),
    #[serde(rename = "null")]
    Null(NullFilter),
}

/// The `type` discriminator vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    Boolean,
    ContainsString,
    DateRange,
    DoubleRange,
    Like,
    LogOp,
    LongEnum,
    LongRange,
    StringEnum,
    String,
    StringMap,
    StringRange,
    Null,
}

impl FilterType {
    /// Every tag, in wire order.
    pub const ALL: [FilterType; 13] = [
        FilterType::Boolean,
        FilterType::ContainsString,
        FilterType::DateRange,
        FilterType::DoubleRange,
        FilterType::Like,
        FilterType::LogOp,
        FilterType::LongEnum,
        FilterType::LongRange,
        FilterType::StringEnum,
        FilterType::String,
        FilterType::StringMap,
        FilterType::StringRange,
        FilterType::Null,
    ];

    /// Returns the wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Boolean => "boolean",
            FilterType::ContainsString => "containsString",
            FilterType::DateRange => "dateRange",
            FilterType::DoubleRange => "doubleRange",
            FilterType::Like => "like",
            FilterType::LogOp => "logOp",
            FilterType::LongEnum => "longEnum",
            FilterType::LongRange => "longRange",
            FilterType::StringEnum => "stringEnum",
            FilterType::String => "string",
            FilterType::StringMap => "stringMap",
            FilterType::StringRange => "stringRange",
            FilterType::Null => "null",
        }
    }
}

impl FromStr for FilterType {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        FilterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SiftError::UnknownFilterType(s.to_string()))
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operation of a `logOp` node. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogOperation {
    And,
    Or,
    Nand,
    Nor,
}

impl LogOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            LogOperation::And => "and",
            LogOperation::Or => "or",
            LogOperation::Nand => "nand",
            LogOperation::Nor => "nor",
        }
    }
}

impl FromStr for LogOperation {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(LogOperation::And),
            "or" => Ok(LogOperation::Or),
            "nand" => Ok(LogOperation::Nand),
            "nor" => Ok(LogOperation::Nor),
            _ => Err(SiftError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for LogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// `boolean`: the field coerced to a boolean equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanFilter {
    pub field_name: String,
    pub value: bool,
}

/// `string`: the field equals `value`. A missing `value` matches null fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `containsString`: the field contains `contains` as a substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsStringFilter {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

/// `like`: the field matches a `%`-wildcard pattern, anchored at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeFilter {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,
}

/// Range filter over an inclusive `[min, max]` interval.
///
/// With neither bound the field only has to be truthy; with equal bounds the
/// filter is an equality test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter<T> {
    pub field_name: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

/// `longRange` payload.
pub type LongRange = RangeFilter<i64>;
/// `doubleRange` payload.
pub type DoubleRange = RangeFilter<f64>;
/// `stringRange` payload. Always compared case-sensitively.
pub type StringRange = RangeFilter<String>;
/// `dateRange` payload. Bounds are ISO-8601 text, compared lexicographically.
pub type DateRange = RangeFilter<String>;

/// Enum filter: the field is one of `values`. Without `values` the field must
/// be falsy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumFilter<T> {
    pub field_name: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<T>>,
}

/// `longEnum` payload.
pub type LongEnum = EnumFilter<i64>;
/// `stringEnum` payload. Always compared case-sensitively.
pub type StringEnum = EnumFilter<String>;

/// `stringMap`: matches entries of a dictionary-valued field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringMapFilter {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `null`: the field is null or missing (`is_null`), or present (`!is_null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullFilter {
    pub field_name: String,
    pub is_null: bool,
}

/// `logOp`: combines child filters. The node owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOpFilter {
    pub operation: LogOperation,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl LogOpFilter {
    pub fn new(operation: LogOperation, filters: Vec<Filter>) -> Self {
        LogOpFilter {
            operation,
            filters,
        }
    }
}

impl Filter {
    // ========================================================================
    // Parsing
    // ========================================================================

    /// Builds a filter from a JSON literal.
    ///
    /// Unknown `type` tags, anywhere in the tree, are reported as
    /// [`SiftError::UnknownFilterType`] rather than a generic shape error.
    pub fn from_json(literal: &Value) -> Result<Self> {
        check_tags(literal)?;
        Ok(Filter::deserialize(literal)?)
    }

    /// Parses a filter from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let literal: Value = serde_json::from_str(text)?;
        Filter::from_json(&literal)
    }

    /// Returns the wire literal for this filter.
    pub fn to_json(&self) -> Value {
        // Filters are plain data with string keys; serialization cannot fail
        // short of a non-finite float, which serde_json writes as null.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::LogOp(LogOpFilter::new(LogOperation::And, filters))
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::LogOp(LogOpFilter::new(LogOperation::Or, filters))
    }

    pub fn nand(filters: Vec<Filter>) -> Self {
        Filter::LogOp(LogOpFilter::new(LogOperation::Nand, filters))
    }

    pub fn nor(filters: Vec<Filter>) -> Self {
        Filter::LogOp(LogOpFilter::new(LogOperation::Nor, filters))
    }

    pub fn boolean(field_name: impl Into<String>, value: bool) -> Self {
        Filter::Boolean(BooleanFilter {
            field_name: field_name.into(),
            value,
        })
    }

    pub fn string(field_name: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::String(StringFilter {
            field_name: field_name.into(),
            value: Some(value.into()),
        })
    }

    pub fn contains(field_name: impl Into<String>, contains: impl Into<String>) -> Self {
        Filter::ContainsString(ContainsStringFilter {
            field_name: field_name.into(),
            contains: Some(contains.into()),
        })
    }

    pub fn like(field_name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Like(LikeFilter {
            field_name: field_name.into(),
            like: Some(pattern.into()),
        })
    }

    pub fn long_range(field_name: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Self {
        Filter::LongRange(RangeFilter {
            field_name: field_name.into(),
            min,
            max,
        })
    }

    pub fn double_range(field_name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Filter::DoubleRange(RangeFilter {
            field_name: field_name.into(),
            min,
            max,
        })
    }

    pub fn string_range(
        field_name: impl Into<String>,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Self {
        Filter::StringRange(RangeFilter {
            field_name: field_name.into(),
            min: min.map(str::to_string),
            max: max.map(str::to_string),
        })
    }

    pub fn date_range(field_name: impl Into<String>, min: Option<&str>, max: Option<&str>) -> Self {
        Filter::DateRange(RangeFilter {
            field_name: field_name.into(),
            min: min.map(str::to_string),
            max: max.map(str::to_string),
        })
    }

    pub fn long_enum<I>(field_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Filter::LongEnum(EnumFilter {
            field_name: field_name.into(),
            values: Some(values.into_iter().collect()),
        })
    }

    pub fn string_enum<I, S>(field_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::StringEnum(EnumFilter {
            field_name: field_name.into(),
            values: Some(values.into_iter().map(Into::into).collect()),
        })
    }

    pub fn string_map(
        field_name: impl Into<String>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Self {
        Filter::StringMap(StringMapFilter {
            field_name: field_name.into(),
            key: key.map(str::to_string),
            value: value.map(str::to_string),
        })
    }

    pub fn null(field_name: impl Into<String>, is_null: bool) -> Self {
        Filter::Null(NullFilter {
            field_name: field_name.into(),
            is_null,
        })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the discriminator tag.
    pub fn filter_type(&self) -> FilterType {
        match self {
            Filter::Boolean(_) => FilterType::Boolean,
            Filter::ContainsString(_) => FilterType::ContainsString,
            Filter::DateRange(_) => FilterType::DateRange,
            Filter::DoubleRange(_) => FilterType::DoubleRange,
            Filter::Like(_) => FilterType::Like,
            Filter::LogOp(_) => FilterType::LogOp,
            Filter::LongEnum(_) => FilterType::LongEnum,
            Filter::LongRange(_) => FilterType::LongRange,
            Filter::StringEnum(_) => FilterType::StringEnum,
            Filter::String(_) => FilterType::String,
            Filter::StringMap(_) => FilterType::StringMap,
            Filter::StringRange(_) => FilterType::StringRange,
            Filter::Null(_) => FilterType::Null,
        }
    }

    /// Returns the field path, or `None` for `logOp` nodes.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Filter::Boolean(f) => Some(&f.field_name),
            Filter::ContainsString(f) => Some(&f.field_name),
            Filter::DateRange(f) => Some(&f.field_name),
            Filter::DoubleRange(f) => Some(&f.field_name),
            Filter::Like(f) => Some(&f.field_name),
            Filter::LogOp(_) => None,
            Filter::LongEnum(f) => Some(&f.field_name),
            Filter::LongRange(f) => Some(&f.field_name),
            Filter::StringEnum(f) => Some(&f.field_name),
            Filter::String(f) => Some(&f.field_name),
            Filter::StringMap(f) => Some(&f.field_name),
            Filter::StringRange(f) => Some(&f.field_name),
            Filter::Null(f) => Some(&f.field_name),
        }
    }

    /// Returns `true` for an `and`-typed `logOp` node.
    pub fn is_and(&self) -> bool {
        matches!(self, Filter::LogOp(op) if op.operation == LogOperation::And)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::visitor::FilterVisitor;
        f.write_str(&crate::visitor::Describer.visit(self))
    }
}

pub(crate) fn check_tags(literal: &Value) -> Result<()> {
    let Value::Object(map) = literal else {
        return Ok(());
    };
    if let Some(Value::String(tag)) = map.get("type") {
        let filter_type: FilterType = tag.parse()?;
        if filter_type == FilterType::LogOp {
            if let Some(Value::String(operation)) = map.get("operation") {
                operation.parse::<LogOperation>()?;
            }
            if let Some(Value::Array(children)) = map.get("filters") {
                children.iter().try_for_each(check_tags)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_field_filters() {
        let filter = Filter::from_json(&json!({
            "type": "longRange",
            "fieldName": "ratings.critics_score",
            "min": 70,
            "max": 88
        }))
        .unwrap();
        assert_eq!(
            filter,
            Filter::long_range("ratings.critics_score", Some(70), Some(88))
        );
        assert_eq!(filter.filter_type(), FilterType::LongRange);
        assert_eq!(filter.field_name(), Some("ratings.critics_score"));
    }

    #[test]
    fn parses_nested_log_op() {
        let filter = Filter::from_json(&json!({
            "type": "logOp",
            "operation": "AND",
            "filters": [
                { "type": "null", "fieldName": "a", "isNull": true },
                { "type": "stringEnum", "fieldName": "mpaa_rating", "values": ["PG", "G"] }
            ]
        }))
        .unwrap();

        assert!(filter.is_and());
        assert_eq!(filter.field_name(), None);
        let Filter::LogOp(op) = &filter else {
            panic!("expected logOp");
        };
        assert_eq!(op.filters.len(), 2);
        assert_eq!(op.filters[0], Filter::null("a", true));
    }

    #[test]
    fn optional_members_default_to_none() {
        let filter =
            Filter::from_json(&json!({ "type": "stringEnum", "fieldName": "x" })).unwrap();
        assert_eq!(
            filter,
            Filter::StringEnum(EnumFilter {
                field_name: "x".into(),
                values: None
            })
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Filter::from_json(&json!({ "type": "regex", "fieldName": "x" })).unwrap_err();
        assert!(matches!(err, SiftError::UnknownFilterType(t) if t == "regex"));

        let nested = json!({
            "type": "logOp",
            "operation": "or",
            "filters": [{ "type": "fuzzy", "fieldName": "x" }]
        });
        assert!(matches!(
            Filter::from_json(&nested),
            Err(SiftError::UnknownFilterType(_))
        ));
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let err = Filter::from_json(&json!({ "type": "logOp", "operation": "xor", "filters": [] }))
            .unwrap_err();
        assert!(matches!(err, SiftError::UnknownOperation(op) if op == "xor"));
    }

    #[test]
    fn shape_errors_surface_as_invalid_filter() {
        let err = Filter::from_json(&json!({ "type": "boolean", "fieldName": "x" })).unwrap_err();
        assert!(matches!(err, SiftError::InvalidFilter(_)));
    }

    #[test]
    fn to_json_uses_wire_names() {
        let filter = Filter::or(vec![Filter::null("a", false), Filter::like("b", "%x%")]);
        assert_eq!(
            filter.to_json(),
            json!({
                "type": "logOp",
                "operation": "or",
                "filters": [
                    { "type": "null", "fieldName": "a", "isNull": false },
                    { "type": "like", "fieldName": "b", "like": "%x%" }
                ]
            })
        );
    }

    #[test]
    fn operation_parsing() {
        assert_eq!("Nand".parse::<LogOperation>().unwrap(), LogOperation::Nand);
        assert_eq!("NOR".parse::<LogOperation>().unwrap(), LogOperation::Nor);
        assert!("not".parse::<LogOperation>().is_err());
    }

    #[test]
    fn filter_type_vocabulary() {
        for t in FilterType::ALL {
            assert_eq!(t.as_str().parse::<FilterType>().unwrap(), t);
        }
        assert!("String".parse::<FilterType>().is_err());
    }

    #[test]
    fn from_json_str_parses_text() {
        let filter =
            Filter::from_json_str(r#"{"type":"boolean","fieldName":"done","value":true}"#).unwrap();
        assert_eq!(filter, Filter::boolean("done", true));
    }
}
