//! The deck catalog: every record merged with its legacy stats, newest first.
//!
//! A [`Catalog`] is an immutable snapshot built once from already-parsed inputs.
//! Nothing here performs I/O; see [`crate::store`] for reading inputs from disk.

use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::{CatalogError, Issue, Result};
use crate::schema::{Deck, DeckInput, DeckRecord};
use crate::stats::LegacyStatsTable;

static GLOBAL: OnceCell<Catalog> = OnceCell::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail the load on any integrity issue instead of reporting it.
    pub strict: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    decks: Vec<Deck>,
    issues: Vec<Issue>,
}

/// Key used to match a record against the legacy stats table.
///
/// The record's own slug wins; records stored before slugs were mandatory fall back
/// to the identifier of their storage location.
pub fn resolve_key<'a>(record: &'a DeckRecord, origin_stem: Option<&'a str>) -> Option<&'a str> {
    if !record.slug.is_empty() {
        return Some(record.slug.as_str());
    }
    origin_stem.filter(|stem| !stem.is_empty())
}

/// Parses an `uploadedAt` value. Full RFC 3339 timestamps are expected; bare
/// `YYYY-MM-DD` dates are read as midnight UTC.
pub fn parse_uploaded_at(value: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(ts);
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

impl Catalog {
    pub fn load(
        inputs: Vec<DeckInput>,
        legacy: &LegacyStatsTable,
        options: &LoadOptions,
    ) -> Result<Self> {
        let mut issues = Vec::new();
        let mut enriched = 0usize;
        let mut keyed: Vec<(Option<OffsetDateTime>, Deck)> = Vec::with_capacity(inputs.len());

        for DeckInput {
            record,
            origin_stem,
        } in inputs
        {
            let key = resolve_key(&record, origin_stem.as_deref());
            let label = key.unwrap_or("(unnamed)").to_string();

            if record.slug.is_empty() {
                issues.push(Issue::MissingSlug {
                    origin: origin_stem.clone().unwrap_or_else(|| label.clone()),
                });
            }

            let legacy_stats = key.and_then(|key| legacy.lookup(key));
            if legacy_stats.is_some() {
                enriched += 1;
            }

            let uploaded = match record.uploaded_at.as_deref() {
                None => None,
                Some(value) => {
                    let parsed = parse_uploaded_at(value);
                    if parsed.is_none() {
                        issues.push(Issue::MalformedTimestamp {
                            slug: label.clone(),
                            value: value.to_string(),
                        });
                    }
                    parsed
                }
            };

            keyed.push((
                uploaded,
                Deck {
                    record,
                    legacy_stats,
                },
            ));
        }

        // `sort_by` is stable: equal keys keep input order.
        keyed.sort_by(|(a, _), (b, _)| newest_first(a.as_ref(), b.as_ref()));
        let decks: Vec<Deck> = keyed.into_iter().map(|(_, deck)| deck).collect();

        issues.extend(find_duplicates(&decks));

        for issue in &issues {
            tracing::warn!("{issue}");
        }
        tracing::debug!(
            decks = decks.len(),
            enriched,
            "merged legacy stats into catalog"
        );

        if options.strict && !issues.is_empty() {
            return Err(CatalogError::Integrity(issues));
        }

        Ok(Self { decks, issues })
    }

    /// All decks, most recently uploaded first; undated decks last.
    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// First deck in catalog order with exactly this slug.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Deck> {
        if slug.is_empty() {
            return None;
        }
        self.decks.iter().find(|deck| deck.record.slug == slug)
    }

    pub fn find_by_short_id(&self, short_id: u32) -> Option<&Deck> {
        if short_id == 0 {
            return None;
        }
        self.decks
            .iter()
            .find(|deck| deck.record.short_id == Some(short_id))
    }

    /// Every tag used by any deck, deduplicated and sorted ascending.
    pub fn all_tags(&self) -> Vec<String> {
        self.decks
            .iter()
            .flat_map(|deck| deck.record.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn newest_first(a: Option<&OffsetDateTime>, b: Option<&OffsetDateTime>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b.cmp(a),
    }
}

fn find_duplicates(decks: &[Deck]) -> Vec<Issue> {
    let mut slug_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut short_ids: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    let mut issues = Vec::new();

    for deck in decks {
        let record = &deck.record;
        if !record.slug.is_empty() {
            *slug_counts.entry(record.slug.as_str()).or_insert(0) += 1;
        }
        match record.short_id {
            Some(0) => issues.push(Issue::ZeroShortId {
                slug: record.slug.clone(),
            }),
            Some(id) => short_ids.entry(id).or_default().push(record.slug.clone()),
            None => {}
        }
    }

    issues.extend(
        slug_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(slug, count)| Issue::DuplicateSlug {
                slug: slug.to_string(),
                count,
            }),
    );
    issues.extend(
        short_ids
            .into_iter()
            .filter(|(_, slugs)| slugs.len() > 1)
            .map(|(short_id, slugs)| Issue::DuplicateShortId { short_id, slugs }),
    );
    issues
}

/// Installs the process-wide catalog. Can succeed once per process.
pub fn install_global(catalog: Catalog) -> Result<&'static Catalog> {
    GLOBAL
        .try_insert(catalog)
        .map_err(|_| CatalogError::AlreadyInstalled)
}

/// The catalog passed to [`install_global`], if any.
pub fn global() -> Option<&'static Catalog> {
    GLOBAL.get()
}
