//! Jsonsift - Declarative filtering, sorting, and paging for JSON records.
//!
//! Jsonsift lets a caller describe a query as plain data and compile it into
//! reusable closures that run in memory over [`serde_json::Value`] records:
//!
//! - A [`Filter`] tree (`string`, `like`, `longRange`, `logOp`, ...) compiles
//!   to a [`Predicate`]
//! - A sort specification (`["-rating", "title"]`) compiles to a
//!   [`Comparator`]
//! - Field paths reach into nested objects and fan out over arrays
//!   (`ratings.critics_score`, `abridged_cast[*].name`)
//! - A [`QueryWindow`] bundles filter, sort, paging, and field selection, and
//!   can merge and canonicalize partial queries
//!
//! # Quick Start
//!
//! ```rust
//! use jsonsift::{compile, compile_sort, CompileOptions, Filter};
//! use serde_json::json;
//!
//! let movies = vec![
//!     json!({ "title": "Heat", "year": 1995, "abridged_cast": [{ "name": "Al Pacino" }] }),
//!     json!({ "title": "Witness", "year": 1985, "abridged_cast": [{ "name": "Harrison Ford" }] }),
//!     json!({ "title": "Air Force One", "year": 1997, "abridged_cast": [{ "name": "Harrison Ford" }] }),
//! ];
//!
//! // Filters are plain data, usually read from JSON
//! let filter = Filter::from_json(&json!({
//!     "type": "like",
//!     "fieldName": "abridged_cast[*].name",
//!     "like": "%ford%"
//! }))
//! .unwrap();
//!
//! let predicate = compile(&filter, CompileOptions::default()).unwrap();
//! let mut results = predicate.filter(&movies);
//!
//! let comparator = compile_sort("-year", CompileOptions::default()).unwrap();
//! comparator.sort_refs(&mut results);
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0]["title"], "Air Force One");
//! ```
//!
//! # Filter Types
//!
//! | Type | Matches when |
//! |------|--------------|
//! | `boolean` | the field's truthiness equals `value` |
//! | `string` | the field equals `value` |
//! | `containsString` | the field contains `contains` |
//! | `like` | the field matches the `%` wildcard pattern in `like` |
//! | `longRange`, `doubleRange`, `stringRange`, `dateRange` | the field lies in `[min, max]` |
//! | `longEnum`, `stringEnum` | the field is one of `values` |
//! | `stringMap` | the object field has a matching `key` and/or `value` |
//! | `null` | the field is null or missing (`isNull`), or present |
//! | `logOp` | `and`, `or`, `nand`, `nor` over child `filters` |
//!
//! Text tests ignore case unless [`CompileOptions::case_sensitive`] is used.
//!
//! # Custom Interpreters
//!
//! Compilation is one implementation of [`FilterVisitor`]. Other
//! interpreters (translators to a backend query language, analyzers) implement
//! the same trait; [`Describer`] renders a filter as readable text:
//!
//! ```rust
//! use jsonsift::Filter;
//!
//! let filter = Filter::and(vec![
//!     Filter::string("title", "Up"),
//!     Filter::long_range("year", Some(2000), None),
//! ]);
//! assert_eq!(filter.to_string(), "(title = 'Up' AND year >= 2000)");
//! ```

mod compare;
mod error;
mod filter;
mod options;
mod path;
mod predicate;
mod query;
mod sort;
mod value;
mod visitor;

// Re-export public API
pub use compare::{compare_resolved, compile_sort, Comparator};
pub use error::{Result, SiftError};
pub use filter::{
    BooleanFilter, ContainsStringFilter, DateRange, DoubleRange, EnumFilter, Filter, FilterType,
    LikeFilter, LogOpFilter, LogOperation, LongEnum, LongRange, NullFilter, RangeFilter,
    StringEnum, StringFilter, StringMapFilter, StringRange,
};
pub use options::CompileOptions;
pub use path::{PathExpression, Resolved};
pub use predicate::{compile, Predicate};
pub use query::QueryWindow;
pub use sort::{SortField, SortOrder, SortSpec};
pub use value::{is_nullish, is_truthy};
pub use visitor::{Describer, FilterVisitor};
