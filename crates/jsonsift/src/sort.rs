//! Sort specifications.
//!
//! A [`SortOrder`] is an ordered list of [`SortField`]s: the first field is
//! the primary key, later fields break ties. Each field has a compact text
//! encoding, `+name` or `name` for ascending and `-name` for descending:
//!
//! ```
//! use jsonsift::{SortField, SortOrder};
//!
//! let order: SortOrder = "-rating,+date,id".parse().unwrap();
//! assert_eq!(order.fields().len(), 3);
//! assert!(!order.fields()[0].ascending);
//! assert_eq!(order.to_string(), "-rating,+date,+id");
//!
//! let field: SortField = "rating".parse().unwrap();
//! assert_eq!(serde_json::to_value(&field).unwrap(), "rating");
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SiftError};

/// One sort key: a field path and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortField {
    /// Field path, see [`PathExpression`](crate::PathExpression).
    pub name: String,
    /// `true` for ascending (smallest first).
    pub ascending: bool,
}

impl SortField {
    /// Creates an ascending sort field.
    pub fn asc(name: impl Into<String>) -> Self {
        SortField {
            name: name.into(),
            ascending: true,
        }
    }

    /// Creates a descending sort field.
    pub fn desc(name: impl Into<String>) -> Self {
        SortField {
            name: name.into(),
            ascending: false,
        }
    }

    /// Applies this field's direction to an ascending ordering.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }

    /// Compact encoding without the optional `+`: `name` or `-name`.
    pub fn to_json(&self) -> String {
        if self.ascending {
            self.name.clone()
        } else {
            format!("-{}", self.name)
        }
    }
}

impl FromStr for SortField {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (ascending, name) = match trimmed.as_bytes().first() {
            Some(b'-') => (false, &trimmed[1..]),
            Some(b'+') => (true, &trimmed[1..]),
            _ => (true, trimmed),
        };
        if name.is_empty() {
            return Err(SiftError::InvalidSortField(s.to_string()));
        }
        Ok(SortField {
            name: name.to_string(),
            ascending,
        })
    }
}

/// Explicit encoding: `+name` or `-name`.
impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.ascending { '+' } else { '-' };
        write!(f, "{sign}{}", self.name)
    }
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_json())
    }
}

impl<'de> Deserialize<'de> for SortField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered list of sort fields, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortOrder {
    fields: Vec<SortField>,
}

impl SortOrder {
    /// Creates an empty sort order.
    pub fn new() -> Self {
        SortOrder::default()
    }

    /// Parses a list of encoded fields, e.g. `["-rating", "+date", "id"]`.
    pub fn from_encoded<I, S>(encoded: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = encoded
            .into_iter()
            .map(|field| field.as_ref().parse())
            .collect::<Result<Vec<SortField>>>()?;
        Ok(SortOrder { fields })
    }

    /// Appends a field with lower priority than all existing ones.
    pub fn push(&mut self, field: SortField) {
        self.fields.push(field);
    }

    /// Adds an ascending field.
    pub fn asc(mut self, name: impl Into<String>) -> Self {
        self.push(SortField::asc(name));
        self
    }

    /// Adds a descending field.
    pub fn desc(mut self, name: impl Into<String>) -> Self {
        self.push(SortField::desc(name));
        self
    }

    /// Appends all of `other`'s fields after this order's fields.
    pub fn extend(&mut self, other: SortOrder) {
        self.fields.extend(other.fields);
    }

    /// Removes later fields that repeat an earlier field name.
    ///
    /// The first occurrence wins, so priority is preserved.
    pub fn dedup_by_name(&mut self) {
        let mut seen = HashSet::new();
        self.fields.retain(|field| seen.insert(field.name.clone()));
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl From<Vec<SortField>> for SortOrder {
    fn from(fields: Vec<SortField>) -> Self {
        SortOrder { fields }
    }
}

impl FromIterator<SortField> for SortOrder {
    fn from_iter<I: IntoIterator<Item = SortField>>(iter: I) -> Self {
        SortOrder {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Parses a comma-joined encoding. Empty entries are skipped.
impl FromStr for SortOrder {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        SortOrder::from_encoded(s.split(',').filter(|part| !part.trim().is_empty()))
    }
}

/// Comma-joined explicit encoding, e.g. `-rating,+date`.
impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Anything a comparator can be compiled from.
///
/// ```
/// use jsonsift::{SortOrder, SortSpec};
///
/// let from_field = SortSpec::from("-title");
/// let from_list = SortSpec::from(vec!["-year".to_string(), "title".to_string()]);
/// let from_order = SortSpec::from(SortOrder::new().desc("year"));
///
/// assert_eq!(from_field.into_sort_order().unwrap().to_string(), "-title");
/// assert_eq!(from_list.into_sort_order().unwrap().to_string(), "-year,+title");
/// assert_eq!(from_order.into_sort_order().unwrap().to_string(), "-year");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    /// A single field, optionally prefixed with `+` or `-`.
    Single(String),
    /// Encoded sort fields in priority order.
    Encoded(Vec<String>),
    /// An already-built sort order.
    Order(SortOrder),
}

impl SortSpec {
    /// Normalizes to a [`SortOrder`].
    pub fn into_sort_order(self) -> Result<SortOrder> {
        match self {
            SortSpec::Single(field) => Ok(SortOrder::from(vec![field.parse::<SortField>()?])),
            SortSpec::Encoded(encoded) => SortOrder::from_encoded(encoded),
            SortSpec::Order(order) => Ok(order),
        }
    }
}

impl From<&str> for SortSpec {
    fn from(field: &str) -> Self {
        SortSpec::Single(field.to_string())
    }
}

impl From<String> for SortSpec {
    fn from(field: String) -> Self {
        SortSpec::Single(field)
    }
}

impl From<Vec<String>> for SortSpec {
    fn from(encoded: Vec<String>) -> Self {
        SortSpec::Encoded(encoded)
    }
}

impl From<&[&str]> for SortSpec {
    fn from(encoded: &[&str]) -> Self {
        SortSpec::Encoded(encoded.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SortSpec {
    fn from(encoded: [&str; N]) -> Self {
        SortSpec::Encoded(encoded.iter().map(|s| s.to_string()).collect())
    }
}

impl From<SortOrder> for SortSpec {
    fn from(order: SortOrder) -> Self {
        SortSpec::Order(order)
    }
}

impl From<&SortOrder> for SortSpec {
    fn from(order: &SortOrder) -> Self {
        SortSpec::Order(order.clone())
    }
}
