//! Side-table of engagement counters carried over from the previous host.
//!
//! The persisted object maps deck keys to counters, plus one `_meta` entry whose
//! `capturedAt` applies to every deck in the table.

use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::schema::LegacyStats;

const META_KEY: &str = "_meta";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyStatsTable {
    captured_at: Option<String>,
    entries: Map<String, Value>,
}

impl LegacyStatsTable {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut entries) = value else {
            return Err(anyhow!("legacy stats must be a JSON object"));
        };

        let captured_at = entries
            .remove(META_KEY)
            .as_ref()
            .and_then(|meta| meta.get("capturedAt"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            captured_at,
            entries,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Stats for `key`, or `None` when there is no entry or the entry has no numeric `views`.
    ///
    /// Counters keep the number exactly as stored. A missing `likes` or `downloads` reads as 0.
    pub fn lookup(&self, key: &str) -> Option<LegacyStats> {
        let entry = self.entries.get(key)?.as_object()?;
        let views = match entry.get("views")? {
            Value::Number(views) => views.clone(),
            _ => return None,
        };
        let counter = |name: &str| match entry.get(name) {
            Some(Value::Number(n)) => n.clone(),
            None | Some(Value::Null) => Number::from(0u64),
            Some(other) => {
                tracing::warn!("legacy stats for '{key}' has non-numeric {name}: {other}");
                Number::from(0u64)
            }
        };

        Some(LegacyStats {
            likes: counter("likes"),
            views,
            downloads: counter("downloads"),
            privacy: entry
                .get("privacy")
                .and_then(Value::as_str)
                .map(str::to_string),
            captured_at: self.captured_at.clone(),
        })
    }

    pub fn captured_at(&self) -> Option<&str> {
        self.captured_at.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Persisted shapes, used for schema export.

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsMeta {
    pub captured_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LegacyStatsEntry {
    pub likes: Number,
    pub views: Number,
    pub downloads: Number,
    pub privacy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LegacyStatsDocument {
    #[serde(rename = "_meta")]
    pub meta: Option<StatsMeta>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, LegacyStatsEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn table() -> LegacyStatsTable {
        LegacyStatsTable::from_value(json!({
            "_meta": { "capturedAt": "2025-01-01T00:00:00Z" },
            "intro-to-rust": { "likes": 1, "views": 10, "downloads": 2 },
            "private-deck": { "likes": 0, "views": 4, "downloads": 0, "privacy": "private" },
            "no-views": { "likes": 3, "downloads": 1 },
            "text-views": { "views": "many" },
            "just-views": { "views": 7 },
            "float-views": { "likes": 3.0, "views": 10.0, "downloads": 2.5 },
            "text-likes": { "likes": "lots", "views": 5 },
            "not-an-object": 12
        }))
        .unwrap()
    }

    #[test]
    fn lookup_broadcasts_shared_captured_at() {
        let stats = table().lookup("intro-to-rust").unwrap();
        assert_eq!(
            stats,
            LegacyStats {
                likes: Number::from(1u64),
                views: Number::from(10u64),
                downloads: Number::from(2u64),
                privacy: None,
                captured_at: Some("2025-01-01T00:00:00Z".to_string()),
            }
        );
    }

    #[test]
    fn lookup_copies_privacy() {
        let stats = table().lookup("private-deck").unwrap();
        assert_eq!(stats.privacy.as_deref(), Some("private"));
    }

    #[test]
    fn entries_without_numeric_views_are_ignored() {
        let table = table();
        assert_eq!(table.lookup("no-views"), None);
        assert_eq!(table.lookup("text-views"), None);
        assert_eq!(table.lookup("not-an-object"), None);
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let stats = table().lookup("just-views").unwrap();
        assert_eq!(stats.likes, Number::from(0u64));
        assert_eq!(stats.views, Number::from(7u64));
        assert_eq!(stats.downloads, Number::from(0u64));
    }

    #[test]
    fn float_counters_are_kept_as_stored() {
        let stats = table().lookup("float-views").unwrap();
        assert_eq!(stats.views.as_f64(), Some(10.0));
        assert_eq!(stats.likes.as_f64(), Some(3.0));
        assert_eq!(stats.downloads.as_f64(), Some(2.5));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["likes"], json!(3.0));
    }

    #[test]
    fn non_numeric_counter_reads_as_zero() {
        let stats = table().lookup("text-likes").unwrap();
        assert_eq!(stats.likes, Number::from(0u64));
        assert_eq!(stats.views, Number::from(5u64));
    }

    #[test]
    fn meta_is_not_a_deck_key() {
        let table = table();
        assert_eq!(table.lookup(META_KEY), None);
        assert_eq!(table.len(), 8);
        assert_eq!(table.captured_at(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn table_without_meta_has_no_captured_at() {
        let table = LegacyStatsTable::from_json_str(r#"{"a": {"views": 1}}"#).unwrap();
        assert_eq!(table.captured_at(), None);
        assert_eq!(table.lookup("a").unwrap().captured_at, None);
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(LegacyStatsTable::from_json_str("[1, 2]").is_err());
    }
}
