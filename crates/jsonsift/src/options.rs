//! Compile-time options shared by the predicate and comparator compilers.

use serde::{Deserialize, Serialize};

/// Options for [`compile`](crate::compile) and
/// [`compile_sort`](crate::compile_sort).
///
/// Deserializes from the same JSON shape clients send alongside a filter:
///
/// ```
/// use jsonsift::CompileOptions;
///
/// let options: CompileOptions = serde_json::from_str(r#"{"casesensitive": true}"#).unwrap();
/// assert!(options.case_sensitive);
/// assert!(!CompileOptions::default().case_sensitive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Whether text comparisons respect case. Defaults to `false`.
    ///
    /// `stringEnum` and `stringRange` filters ignore this and always compare
    /// case-sensitively.
    #[serde(rename = "casesensitive", default)]
    pub case_sensitive: bool,
}

impl CompileOptions {
    /// Creates the default options (case-insensitive).
    pub fn new() -> Self {
        CompileOptions::default()
    }

    /// Options with case-sensitive text comparisons.
    pub fn case_sensitive() -> Self {
        CompileOptions {
            case_sensitive: true,
        }
    }

    /// Options with case-insensitive text comparisons.
    pub fn case_insensitive() -> Self {
        CompileOptions {
            case_sensitive: false,
        }
    }
}
