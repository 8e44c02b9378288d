//! Wildcard index path patterns
//!
//! `$**` covers the whole document; `<prefix>.$**` covers the subtree under
//! `<prefix>`. The whole-document form may carry a path projection that
//! includes or excludes path prefixes.

use std::fmt;

use crate::document::{Document, FieldPath, Value};

use super::errors::{KeyGenError, KeyGenResult};

/// The wildcard component
pub const WILDCARD: &str = "$**";

const ID_FIELD: &str = "_id";

/// Which paths under the pattern are indexed
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathFilter {
    /// Only paths under one of these prefixes
    Include(Vec<FieldPath>),
    /// Every path except those under one of these prefixes
    Exclude(Vec<FieldPath>),
}

/// How the key walker treats one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathScope {
    /// Not indexed, not descended
    Skip,
    /// Indexed, with everything below it
    Index,
    /// Some descendants are filtered; scalars at this path are indexed only
    /// if `index_scalars`
    Descend { index_scalars: bool },
}

/// Parsed wildcard key pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    prefix: Option<FieldPath>,
    filter: PathFilter,
}

impl WildcardPattern {
    /// Parses `$**` or `<prefix>.$**`.
    pub fn parse(pattern: &str) -> KeyGenResult<Self> {
        let parts: Vec<&str> = pattern.split('.').collect();
        let Some((last, prefix)) = parts.split_last() else {
            return Err(KeyGenError::invalid_pattern(pattern, "empty pattern"));
        };

        if *last != WILDCARD {
            return Err(KeyGenError::invalid_pattern(
                pattern,
                format!("pattern must end with '{WILDCARD}'"),
            ));
        }
        for part in prefix {
            if part.is_empty() {
                return Err(KeyGenError::invalid_pattern(pattern, "empty path component"));
            }
            if part.contains(WILDCARD) {
                return Err(KeyGenError::invalid_pattern(
                    pattern,
                    "only one wildcard component is permitted",
                ));
            }
            if part.starts_with('$') {
                return Err(KeyGenError::invalid_pattern(
                    pattern,
                    format!("prefix component '{part}' cannot start with '$'"),
                ));
            }
        }

        if prefix.is_empty() {
            return Ok(Self::whole_document());
        }

        let prefix = FieldPath::from_parts(prefix.iter().copied());
        Ok(Self {
            filter: PathFilter::Include(vec![prefix.clone()]),
            prefix: Some(prefix),
        })
    }

    /// `$**` with the default projection: everything but the top-level `_id`.
    pub fn whole_document() -> Self {
        Self {
            prefix: None,
            filter: PathFilter::Exclude(vec![FieldPath::from_parts([ID_FIELD])]),
        }
    }

    /// Restricts a whole-document pattern with a path projection such as
    /// `{"a": 1, "b.c": 1}` or `{"a": 0}`.
    ///
    /// `_id` stays excluded unless the projection names it with a true
    /// value. An empty projection keeps the default.
    pub fn with_projection(self, projection: &Document) -> KeyGenResult<Self> {
        let pattern = self.to_string();
        if self.prefix.is_some() {
            return Err(KeyGenError::invalid_pattern(
                &pattern,
                "a path projection requires the whole-document pattern",
            ));
        }
        if projection.is_empty() {
            return Ok(self);
        }

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut id_included = false;

        for (key, value) in projection.iter() {
            let flag = match value {
                Value::Bool(b) => *b,
                v if v.is_number() => v.as_f64() != Some(0.0),
                other => {
                    return Err(KeyGenError::invalid_pattern(
                        &pattern,
                        format!(
                            "projection value for '{key}' must be 0/1, got {}",
                            other.type_name()
                        ),
                    ))
                }
            };
            let path = FieldPath::parse(key)
                .map_err(|e| KeyGenError::invalid_pattern(&pattern, e.to_string()))?;

            if key == ID_FIELD {
                id_included = flag;
            } else if flag {
                included.push(path);
            } else {
                excluded.push(path);
            }
        }

        if !included.is_empty() && !excluded.is_empty() {
            return Err(KeyGenError::invalid_pattern(
                &pattern,
                "cannot mix inclusion and exclusion in a path projection",
            ));
        }

        let id_path = FieldPath::from_parts([ID_FIELD]);
        let filter = if !included.is_empty() || (excluded.is_empty() && id_included) {
            if id_included {
                included.push(id_path);
            }
            PathFilter::Include(included)
        } else {
            if !id_included {
                excluded.push(id_path);
            }
            PathFilter::Exclude(excluded)
        };

        Ok(Self {
            prefix: None,
            filter,
        })
    }

    /// Subtree root, or `None` for the whole-document pattern
    pub fn prefix(&self) -> Option<&FieldPath> {
        self.prefix.as_ref()
    }

    pub(crate) fn scope(&self, path: &FieldPath) -> PathScope {
        match &self.filter {
            PathFilter::Include(roots) => {
                if roots.iter().any(|r| path.starts_with(r)) {
                    PathScope::Index
                } else if roots.iter().any(|r| r.starts_with(path)) {
                    PathScope::Descend {
                        index_scalars: false,
                    }
                } else {
                    PathScope::Skip
                }
            }
            PathFilter::Exclude(roots) => {
                if roots.iter().any(|r| path.starts_with(r)) {
                    PathScope::Skip
                } else if roots.iter().any(|r| r.starts_with(path)) {
                    PathScope::Descend {
                        index_scalars: true,
                    }
                } else {
                    PathScope::Index
                }
            }
        }
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}.{WILDCARD}"),
            None => write!(f, "{WILDCARD}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_whole_document() {
        let p = WildcardPattern::parse("$**").unwrap();
        assert!(p.prefix().is_none());
        assert_eq!(p.to_string(), "$**");
    }

    #[test]
    fn test_parse_prefixed() {
        let p = WildcardPattern::parse("a.b.$**").unwrap();
        assert_eq!(p.prefix(), Some(&path("a.b")));
        assert_eq!(p.to_string(), "a.b.$**");
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        for bad in ["a", "a.$**.b", "$**.$**", "a..$**", "$a.$**", "", "a.b$**"] {
            let err = WildcardPattern::parse(bad).unwrap_err();
            assert_eq!(err.code(), "DQ_INVALID_WILDCARD_PATTERN", "pattern {bad:?}");
        }
    }

    #[test]
    fn test_default_scope_skips_top_level_id() {
        let p = WildcardPattern::whole_document();
        assert_eq!(p.scope(&path("_id")), PathScope::Skip);
        assert_eq!(p.scope(&path("a._id")), PathScope::Index);
        assert_eq!(p.scope(&path("a")), PathScope::Index);
    }

    #[test]
    fn test_prefix_scope() {
        let p = WildcardPattern::parse("a.b.$**").unwrap();
        assert_eq!(
            p.scope(&path("a")),
            PathScope::Descend {
                index_scalars: false
            }
        );
        assert_eq!(p.scope(&path("a.b")), PathScope::Index);
        assert_eq!(p.scope(&path("a.b.c")), PathScope::Index);
        assert_eq!(p.scope(&path("a.c")), PathScope::Skip);
        assert_eq!(p.scope(&path("z")), PathScope::Skip);
    }

    #[test]
    fn test_exclusion_projection_scope() {
        let proj = Document::try_from(json!({"a.b": 0})).unwrap();
        let p = WildcardPattern::whole_document().with_projection(&proj).unwrap();
        assert_eq!(
            p.scope(&path("a")),
            PathScope::Descend {
                index_scalars: true
            }
        );
        assert_eq!(p.scope(&path("a.b")), PathScope::Skip);
        assert_eq!(p.scope(&path("a.c")), PathScope::Index);
        assert_eq!(p.scope(&path("_id")), PathScope::Skip);
    }

    #[test]
    fn test_inclusion_projection_can_include_id() {
        let proj = Document::try_from(json!({"a": 1, "_id": 1})).unwrap();
        let p = WildcardPattern::whole_document().with_projection(&proj).unwrap();
        assert_eq!(p.scope(&path("_id")), PathScope::Index);
        assert_eq!(p.scope(&path("b")), PathScope::Skip);
    }

    #[test]
    fn test_projection_rejects_mixing() {
        let proj = Document::try_from(json!({"a": 1, "b": 0})).unwrap();
        assert!(WildcardPattern::whole_document().with_projection(&proj).is_err());
    }

    #[test]
    fn test_projection_rejected_on_prefixed_pattern() {
        let proj = Document::try_from(json!({"a": 1})).unwrap();
        let p = WildcardPattern::parse("x.$**").unwrap();
        assert!(p.with_projection(&proj).is_err());
    }
}
