use std::collections::BTreeSet;

use crate::http::canonical_header_name;

/// The header names attached to a `no-cache` or `private` directive.
///
/// Names are stored in canonical casing, so membership is case-insensitive.
///
/// ```
/// use httpcache::control::ResponseDirectives;
///
/// let cd = ResponseDirectives::parse("private=set-cookie").unwrap();
/// let names = cd.private_fields().unwrap();
/// assert!(names.contains("SET-COOKIE"));
/// assert!(names.contains("Set-Cookie"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNames {
    names: BTreeSet<String>,
}

impl FieldNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every non-empty name from a comma-separated list.
    pub(crate) fn extend_from_list(&mut self, list: &str) {
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            self.names.insert(canonical_header_name(name));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&canonical_header_name(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over the canonical names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
