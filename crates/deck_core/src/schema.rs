use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    #[default]
    Organic,
    #[serde(rename = "AI")]
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeckAssets {
    pub pdf: String,   // e.g. "/decks/intro-to-rust.pdf"
    pub cover: String, // cover image rendered from the first page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pptx: Option<String>, // original-format upload, when kept
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeckSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slideshare_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// One persisted deck, as written by hand or by the import scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    /// Empty for records that predate mandatory slugs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<u32>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>, // lowercase, kept in authored order
    #[serde(default)]
    pub language: String, // two-letter code, not validated here
    #[serde(default)]
    pub category: Category,
    pub assets: DeckAssets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DeckSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>, // ISO-8601 with Z offset, parsed by the loader
}

/// Historical counters from the previous host, attached in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStats {
    pub likes: Number, // integer or float, kept as stored
    pub views: Number,
    pub downloads: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>, // shared `_meta.capturedAt` of the table
}

/// A record as handed out by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(flatten)]
    pub record: DeckRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_stats: Option<LegacyStats>,
}

/// Loader input: a parsed record plus the identifier derived from where it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckInput {
    pub record: DeckRecord,
    pub origin_stem: Option<String>, // e.g. "intro-to-rust" for decks/intro-to-rust.json
}

impl DeckInput {
    pub fn new(record: DeckRecord) -> Self {
        Self {
            record,
            origin_stem: None,
        }
    }

    pub fn with_origin(record: DeckRecord, origin_stem: impl Into<String>) -> Self {
        Self {
            record,
            origin_stem: Some(origin_stem.into()),
        }
    }
}

impl Deck {
    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    pub fn display_title(&self) -> &str {
        if self.record.title.trim().is_empty() {
            &self.record.slug
        } else {
            &self.record.title
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
