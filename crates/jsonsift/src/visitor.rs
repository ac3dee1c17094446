//! Double dispatch over the filter tree.
//!
//! [`FilterVisitor`] is the contract every filter interpreter implements:
//! one handler per node type, plus one per logical operation. The provided
//! [`visit`](FilterVisitor::visit) routes a node to its handler and the
//! provided [`log_op`](FilterVisitor::log_op) routes a `logOp` node by its
//! operation. Both are exhaustive matches, so adding a node type is a compile
//! error in every interpreter rather than a runtime lookup failure.
//!
//! Two interpreters ship with the crate: the predicate compiler
//! ([`compile`](crate::compile)) and [`Describer`], which renders a filter as
//! a readable expression.

use crate::filter::{
    BooleanFilter, ContainsStringFilter, DateRange, DoubleRange, Filter, LikeFilter,
    LogOpFilter, LogOperation, LongEnum, LongRange, NullFilter, StringEnum, StringFilter,
    StringMapFilter, StringRange,
};

/// An interpreter over [`Filter`] trees.
pub trait FilterVisitor {
    /// What each handler produces.
    type Output;

    fn boolean(&mut self, filter: &BooleanFilter) -> Self::Output;
    fn contains_string(&mut self, filter: &ContainsStringFilter) -> Self::Output;
    fn date_range(&mut self, filter: &DateRange) -> Self::Output;
    fn double_range(&mut self, filter: &DoubleRange) -> Self::Output;
    fn like(&mut self, filter: &LikeFilter) -> Self::Output;
    fn long_enum(&mut self, filter: &LongEnum) -> Self::Output;
    fn long_range(&mut self, filter: &LongRange) -> Self::Output;
    fn string_enum(&mut self, filter: &StringEnum) -> Self::Output;
    fn string(&mut self, filter: &StringFilter) -> Self::Output;
    fn string_map(&mut self, filter: &StringMapFilter) -> Self::Output;
    fn string_range(&mut self, filter: &StringRange) -> Self::Output;
    fn null(&mut self, filter: &NullFilter) -> Self::Output;

    fn and_op(&mut self, filter: &LogOpFilter) -> Self::Output;
    fn or_op(&mut self, filter: &LogOpFilter) -> Self::Output;
    fn nand_op(&mut self, filter: &LogOpFilter) -> Self::Output;
    fn nor_op(&mut self, filter: &LogOpFilter) -> Self::Output;

    /// Routes a `logOp` node to the handler for its operation.
    fn log_op(&mut self, filter: &LogOpFilter) -> Self::Output {
        match filter.operation {
            LogOperation::And => self.and_op(filter),
            LogOperation::Or => self.or_op(filter),
            LogOperation::Nand => self.nand_op(filter),
            LogOperation::Nor => self.nor_op(filter),
        }
    }

    /// Routes a node to the handler for its type.
    fn visit(&mut self, filter: &Filter) -> Self::Output {
        match filter {
            Filter::Boolean(f) => self.boolean(f),
            Filter::ContainsString(f) => self.contains_string(f),
            Filter::DateRange(f) => self.date_range(f),
            Filter::DoubleRange(f) => self.double_range(f),
            Filter::Like(f) => self.like(f),
            Filter::LogOp(f) => self.log_op(f),
            Filter::LongEnum(f) => self.long_enum(f),
            Filter::LongRange(f) => self.long_range(f),
            Filter::StringEnum(f) => self.string_enum(f),
            Filter::String(f) => self.string(f),
            Filter::StringMap(f) => self.string_map(f),
            Filter::StringRange(f) => self.string_range(f),
            Filter::Null(f) => self.null(f),
        }
    }
}

/// Renders a filter as a readable expression.
///
/// ```
/// use jsonsift::Filter;
///
/// let filter = Filter::and(vec![
///     Filter::string("title", "Up"),
///     Filter::long_range("year", Some(2000), None),
/// ]);
/// assert_eq!(filter.to_string(), "(title = 'Up' AND year >= 2000)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Describer;

impl Describer {
    fn range<T: std::fmt::Display>(field: &str, min: Option<&T>, max: Option<&T>) -> String {
        match (min, max) {
            (None, None) => format!("{field} IS SET"),
            (Some(min), Some(max)) if min.to_string() == max.to_string() => {
                format!("{field} = {min}")
            }
            (Some(min), None) => format!("{field} >= {min}"),
            (None, Some(max)) => format!("{field} <= {max}"),
            (Some(min), Some(max)) => format!("{field} BETWEEN {min} AND {max}"),
        }
    }

    fn quoted_range(field: &str, min: Option<&String>, max: Option<&String>) -> String {
        let min = min.map(|m| quote(m));
        let max = max.map(|m| quote(m));
        Describer::range(field, min.as_ref(), max.as_ref())
    }

    fn list<T: std::fmt::Display>(field: &str, values: Option<&Vec<T>>) -> String {
        match values {
            Some(values) => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("{field} IN ({})", items.join(", "))
            }
            None => format!("{field} IS NOT SET"),
        }
    }

    fn join(&mut self, filter: &LogOpFilter, keyword: &str, empty: &str) -> String {
        if filter.filters.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = filter.filters.iter().map(|f| self.visit(f)).collect();
        format!("({})", parts.join(&format!(" {keyword} ")))
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "\\'"))
}

impl FilterVisitor for Describer {
    type Output = String;

    fn boolean(&mut self, filter: &BooleanFilter) -> String {
        format!("{} IS {}", filter.field_name, filter.value)
    }

    fn contains_string(&mut self, filter: &ContainsStringFilter) -> String {
        match &filter.contains {
            Some(needle) => format!("{} CONTAINS {}", filter.field_name, quote(needle)),
            None => format!("{} IS NULL", filter.field_name),
        }
    }

    fn date_range(&mut self, filter: &DateRange) -> String {
        Describer::quoted_range(&filter.field_name, filter.min.as_ref(), filter.max.as_ref())
    }

    fn double_range(&mut self, filter: &DoubleRange) -> String {
        Describer::range(&filter.field_name, filter.min.as_ref(), filter.max.as_ref())
    }

    fn like(&mut self, filter: &LikeFilter) -> String {
        match &filter.like {
            Some(pattern) => format!("{} LIKE {}", filter.field_name, quote(pattern)),
            None => format!("{} IS NULL", filter.field_name),
        }
    }

    fn long_enum(&mut self, filter: &LongEnum) -> String {
        Describer::list(&filter.field_name, filter.values.as_ref())
    }

    fn long_range(&mut self, filter: &LongRange) -> String {
        Describer::range(&filter.field_name, filter.min.as_ref(), filter.max.as_ref())
    }

    fn string_enum(&mut self, filter: &StringEnum) -> String {
        let quoted = filter
            .values
            .as_ref()
            .map(|values| values.iter().map(|v| quote(v)).collect::<Vec<_>>());
        Describer::list(&filter.field_name, quoted.as_ref())
    }

    fn string(&mut self, filter: &StringFilter) -> String {
        match &filter.value {
            Some(value) => format!("{} = {}", filter.field_name, quote(value)),
            None => format!("{} IS NULL", filter.field_name),
        }
    }

    fn string_map(&mut self, filter: &StringMapFilter) -> String {
        match (&filter.key, &filter.value) {
            (None, None) => format!("{} IS NOT EMPTY", filter.field_name),
            (None, Some(value)) => format!("ANY {} = {}", filter.field_name, quote(value)),
            (Some(key), None) => format!("{}[{}] IS SET", filter.field_name, quote(key)),
            (Some(key), Some(value)) => {
                format!("{}[{}] = {}", filter.field_name, quote(key), quote(value))
            }
        }
    }

    fn string_range(&mut self, filter: &StringRange) -> String {
        Describer::quoted_range(&filter.field_name, filter.min.as_ref(), filter.max.as_ref())
    }

    fn null(&mut self, filter: &NullFilter) -> String {
        if filter.is_null {
            format!("{} IS NULL", filter.field_name)
        } else {
            format!("{} IS NOT NULL", filter.field_name)
        }
    }

    fn and_op(&mut self, filter: &LogOpFilter) -> String {
        self.join(filter, "AND", "TRUE")
    }

    fn or_op(&mut self, filter: &LogOpFilter) -> String {
        self.join(filter, "OR", "FALSE")
    }

    fn nand_op(&mut self, filter: &LogOpFilter) -> String {
        if filter.filters.is_empty() {
            return "FALSE".to_string();
        }
        format!("NOT {}", self.join(filter, "AND", "TRUE"))
    }

    fn nor_op(&mut self, filter: &LogOpFilter) -> String {
        if filter.filters.is_empty() {
            return "TRUE".to_string();
        }
        format!("NOT {}", self.join(filter, "OR", "FALSE"))
    }
}
