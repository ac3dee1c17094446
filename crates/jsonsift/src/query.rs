//! Query windows.
//!
//! A [`QueryWindow`] bundles everything one logical query asks for: a filter
//! tree, a sort order, a paging window, and a field selection. Windows built
//! by different parts of a program can be combined with
//! [`merge`](QueryWindow::merge) and canonicalized with
//! [`optimize`](QueryWindow::optimize) before they are applied or sent on.
//!
//! # Example
//!
//! ```
//! use jsonsift::{CompileOptions, Filter, QueryWindow, SortOrder};
//! use serde_json::json;
//!
//! let mut window = QueryWindow::new()
//!     .filter(Filter::long_range("year", Some(2000), None))
//!     .offset(10)
//!     .limit(5);
//! window.merge(
//!     QueryWindow::new()
//!         .filter(Filter::boolean("released", true))
//!         .sort_by(SortOrder::new().desc("year"))
//!         .limit(20),
//! );
//! window.optimize();
//!
//! assert_eq!(window.min(), 10);
//! assert_eq!(window.max(), Some(15));
//!
//! let records = vec![json!({ "year": 2004, "released": true })];
//! let page = window.apply(&records, CompileOptions::default()).unwrap();
//! assert!(page.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compare::compile_sort;
use crate::error::Result;
use crate::filter::{check_tags, Filter, LogOperation};
use crate::options::CompileOptions;
use crate::path::{insert_at, PathExpression, Resolved};
use crate::predicate::compile;
use crate::sort::SortOrder;

/// Filter, sort order, paging window, and field selection for one query.
///
/// Paging is stored as `offset`/`limit` and exposed as the half-open
/// interval `[min, max)`, where `max` is `None` when the window is
/// unbounded. Members are owned, so a clone shares nothing with the
/// original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(default, skip_serializing_if = "is_zero")]
    offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "SortOrder::is_empty")]
    sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fields: Vec<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl QueryWindow {
    /// Creates an empty window: no filter, no order, unbounded.
    pub fn new() -> Self {
        QueryWindow::default()
    }

    /// Reads a window from its JSON form.
    ///
    /// Unlike plain `serde_json::from_value`, an unknown filter `type` or
    /// `operation` anywhere in the `filter` member is reported as
    /// [`SiftError::UnknownFilterType`] or [`SiftError::UnknownOperation`].
    ///
    /// [`SiftError::UnknownFilterType`]: crate::SiftError::UnknownFilterType
    /// [`SiftError::UnknownOperation`]: crate::SiftError::UnknownOperation
    pub fn from_json(literal: &Value) -> Result<Self> {
        if let Some(filter) = literal.get("filter") {
            check_tags(filter)?;
        }
        Ok(QueryWindow::deserialize(literal)?)
    }

    /// Reads a window from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let literal: Value = serde_json::from_str(text)?;
        QueryWindow::from_json(&literal)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Sets the filter, replacing any existing one.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the sort order, replacing any existing one.
    pub fn sort_by(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Adds a field to the selection.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Sets the maximum number of records.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of records to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = n;
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn get_filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn get_sort_order(&self) -> &SortOrder {
        &self.sort_order
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` if the window constrains nothing.
    pub fn is_empty(&self) -> bool {
        self == &QueryWindow::default()
    }

    // ========================================================================
    // Window bounds
    // ========================================================================

    /// Inclusive lower bound of the window.
    pub fn min(&self) -> usize {
        self.offset
    }

    /// Exclusive upper bound of the window, `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        self.limit.map(|limit| self.offset.saturating_add(limit))
    }

    /// Moves the lower bound, keeping the upper bound where it is.
    pub fn set_min(&mut self, min: usize) {
        let max = self.max();
        self.offset = min;
        self.limit = max.map(|max| max.saturating_sub(min));
    }

    /// Moves the upper bound, keeping the lower bound where it is.
    pub fn set_max(&mut self, max: Option<usize>) {
        self.limit = max.map(|max| max.saturating_sub(self.offset));
    }

    // ========================================================================
    // Combination
    // ========================================================================

    /// Combines `other` into this window.
    ///
    /// The paging windows are intersected. Both filters must match, so they
    /// are wrapped in a new `and` node when both are present. `other`'s sort
    /// fields break ties after this window's, and the field selections are
    /// concatenated.
    pub fn merge(&mut self, other: QueryWindow) -> &mut Self {
        let min = self.min().max(other.min());
        let max = match (self.max(), other.max()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.offset = min;
        self.limit = max.map(|max| max.saturating_sub(min));

        self.filter = match (self.filter.take(), other.filter) {
            (Some(ours), Some(theirs)) => Some(Filter::and(vec![ours, theirs])),
            (ours, theirs) => ours.or(theirs),
        };
        self.sort_order.extend(other.sort_order);
        self.fields.extend(other.fields);

        log::debug!("merged query window: {}", self.to_query_params());
        self
    }

    /// Canonicalizes the window in place.
    ///
    /// Nested `and` nodes are spliced into their `and` parents at every
    /// depth, repeated sort fields are dropped (first one wins), and the
    /// field selection becomes sorted and duplicate-free. Running it twice
    /// changes nothing the second time.
    pub fn optimize(&mut self) -> &mut Self {
        if let Some(filter) = self.filter.as_mut() {
            flatten_and(filter);
        }
        self.sort_order.dedup_by_name();
        self.fields.sort();
        self.fields.dedup();
        log::debug!("optimized query window: {}", self.to_query_params());
        self
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Filters, sorts, and pages a collection.
    ///
    /// The filter and sort order are compiled once. Sorting is stable, so
    /// records that compare equal keep their input order.
    pub fn apply<'a>(
        &self,
        records: &'a [Value],
        options: CompileOptions,
    ) -> Result<Vec<&'a Value>> {
        let mut results = match &self.filter {
            Some(filter) => compile(filter, options)?.filter(records),
            None => records.iter().collect(),
        };
        if !self.sort_order.is_empty() {
            compile_sort(&self.sort_order, options)?.sort_refs(&mut results);
        }
        log::trace!(
            "{} of {} records matched, taking [{}, {:?})",
            results.len(),
            records.len(),
            self.min(),
            self.max()
        );
        Ok(results
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect())
    }

    /// Projects a record to the selected fields.
    ///
    /// Plain member paths such as `ratings.critics_score` rebuild the nested
    /// objects they pass through. Paths with indices or wildcards are stored
    /// under their own text. Fields missing from the record are left out.
    /// With no selection the record is returned unchanged.
    pub fn select(&self, record: &Value) -> Result<Value> {
        if self.fields.is_empty() {
            return Ok(record.clone());
        }
        let mut projected = Map::new();
        for field in &self.fields {
            let path = PathExpression::parse(field)?;
            let resolved = path.evaluate(record);
            if matches!(resolved, Resolved::Missing) {
                continue;
            }
            match path.member_names() {
                Some(names) if !names.is_empty() => {
                    insert_at(&mut projected, &names, resolved.to_value())
                }
                _ => {
                    projected.insert(field.clone(), resolved.to_value());
                }
            }
        }
        Ok(Value::Object(projected))
    }

    // ========================================================================
    // Wire format
    // ========================================================================

    /// Formats the window as a URL query string.
    ///
    /// Emits `limit`, `offset` (when non-zero), `sortOrder`, `filter` as
    /// JSON, and one `field` pair per selected field, joined with `&`. An
    /// empty window yields an empty string.
    ///
    /// ```
    /// use jsonsift::{QueryWindow, SortOrder};
    ///
    /// let window = QueryWindow::new()
    ///     .limit(5)
    ///     .sort_by(SortOrder::new().desc("year"))
    ///     .field("title");
    /// assert_eq!(window.to_query_params(), "limit=5&sortOrder=-year&field=title");
    /// assert_eq!(QueryWindow::new().to_query_params(), "");
    /// ```
    pub fn to_query_params(&self) -> String {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if self.offset > 0 {
            params.push(format!("offset={}", self.offset));
        }
        if !self.sort_order.is_empty() {
            let order = self.sort_order.to_string();
            params.push(format!("sortOrder={}", urlencoding::encode(&order)));
        }
        if let Some(filter) = &self.filter {
            let json = filter.to_json().to_string();
            params.push(format!("filter={}", urlencoding::encode(&json)));
        }
        for field in &self.fields {
            params.push(format!("field={}", urlencoding::encode(field)));
        }
        params.join("&")
    }
}

/// Splices `and` children into `and` parents, bottom-up.
fn flatten_and(filter: &mut Filter) {
    let Filter::LogOp(node) = filter else {
        return;
    };
    for child in &mut node.filters {
        flatten_and(child);
    }
    if node.operation != LogOperation::And {
        return;
    }
    let children = std::mem::take(&mut node.filters);
    for child in children {
        match child {
            Filter::LogOp(inner) if inner.operation == LogOperation::And => {
                node.filters.extend(inner.filters)
            }
            other => node.filters.push(other),
        }
    }
}
