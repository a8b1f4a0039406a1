//! Backend-agnostic filter specification and its translation into a
//! conjunctive predicate both retrieval backends can consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::DocId;

/// Structured filter specification attached to a search request.
///
/// Every field is optional; absent fields are simply omitted from the
/// translated predicate. `meta` uses a sorted map so the emitted clause
/// order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Require this field to exist on matching documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_field: Option<String>,
    /// Inclusive lower bound on document creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on document creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    /// Equality constraints on nested metadata fields (`meta.<key> = value`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
    /// Identifier allow-list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<DocId>>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.require_field.is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
            && self.meta.as_ref().is_none_or(|m| m.is_empty())
            && self.ids.as_ref().is_none_or(|ids| ids.is_empty())
    }
}

/// One conjunct of a translated filter predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterClause {
    /// The named field must exist
    Exists { field: String },
    /// `created_at >= bound` (inclusive)
    CreatedAfter(DateTime<Utc>),
    /// `created_at <= bound` (inclusive)
    CreatedBefore(DateTime<Utc>),
    /// Nested metadata field equals the value; `path` is the full field
    /// path, e.g. `meta.source`
    MetaEquals {
        path: String,
        value: serde_json::Value,
    },
    /// Document id must be in this set
    IdIn(Vec<DocId>),
}

/// A conjunction of filter clauses, consumable verbatim by both retrieval
/// backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterPredicate {
    pub clauses: Vec<FilterClause>,
}

impl FilterPredicate {
    /// Translate a filter specification into a conjunctive predicate.
    ///
    /// Pure function: no error conditions, absent fields produce no clause.
    pub fn translate(filter: &SearchFilter) -> Self {
        let mut clauses = Vec::new();

        if let Some(field) = &filter.require_field {
            clauses.push(FilterClause::Exists {
                field: field.clone(),
            });
        }
        if let Some(after) = filter.created_after {
            clauses.push(FilterClause::CreatedAfter(after));
        }
        if let Some(before) = filter.created_before {
            clauses.push(FilterClause::CreatedBefore(before));
        }
        if let Some(meta) = &filter.meta {
            for (key, value) in meta {
                clauses.push(FilterClause::MetaEquals {
                    path: format!("meta.{}", key),
                    value: value.clone(),
                });
            }
        }
        if let Some(ids) = &filter.ids {
            if !ids.is_empty() {
                clauses.push(FilterClause::IdIn(ids.clone()));
            }
        }

        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_filter_translates_to_empty_predicate() {
        let predicate = FilterPredicate::translate(&SearchFilter::default());
        assert!(predicate.is_empty());
    }

    #[test]
    fn date_bounds_are_inclusive_clauses() {
        let after = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let filter = SearchFilter {
            created_after: Some(after),
            created_before: Some(before),
            ..Default::default()
        };

        let predicate = FilterPredicate::translate(&filter);
        assert_eq!(predicate.clauses.len(), 2);
        assert_eq!(predicate.clauses[0], FilterClause::CreatedAfter(after));
        assert_eq!(predicate.clauses[1], FilterClause::CreatedBefore(before));
    }

    #[test]
    fn meta_constraints_become_prefixed_paths() {
        let mut meta = BTreeMap::new();
        meta.insert("source".to_string(), serde_json::json!("docs"));
        meta.insert("tag".to_string(), serde_json::json!("finance"));
        let filter = SearchFilter {
            meta: Some(meta),
            ..Default::default()
        };

        let predicate = FilterPredicate::translate(&filter);
        assert_eq!(
            predicate.clauses,
            vec![
                FilterClause::MetaEquals {
                    path: "meta.source".to_string(),
                    value: serde_json::json!("docs"),
                },
                FilterClause::MetaEquals {
                    path: "meta.tag".to_string(),
                    value: serde_json::json!("finance"),
                },
            ]
        );
    }

    #[test]
    fn id_allow_list_translates_to_id_in_clause() {
        let filter = SearchFilter {
            ids: Some(vec!["a".to_string(), "b".to_string()]),
            ..Default::default()
        };

        let predicate = FilterPredicate::translate(&filter);
        assert_eq!(
            predicate.clauses,
            vec![FilterClause::IdIn(vec!["a".to_string(), "b".to_string()])]
        );
    }

    #[test]
    fn empty_id_list_produces_no_clause() {
        let filter = SearchFilter {
            ids: Some(Vec::new()),
            ..Default::default()
        };
        assert!(FilterPredicate::translate(&filter).is_empty());
    }

    #[test]
    fn require_field_translates_to_exists_clause() {
        let filter = SearchFilter {
            require_field: Some("title".to_string()),
            ..Default::default()
        };
        let predicate = FilterPredicate::translate(&filter);
        assert_eq!(
            predicate.clauses,
            vec![FilterClause::Exists {
                field: "title".to_string()
            }]
        );
    }

    #[test]
    fn translation_is_deterministic() {
        let mut meta = BTreeMap::new();
        meta.insert("b".to_string(), serde_json::json!(2));
        meta.insert("a".to_string(), serde_json::json!(1));
        let filter = SearchFilter {
            require_field: Some("title".to_string()),
            meta: Some(meta),
            ids: Some(vec!["x".to_string()]),
            ..Default::default()
        };

        let first = FilterPredicate::translate(&filter);
        let second = FilterPredicate::translate(&filter);
        assert_eq!(first, second);
    }
}
