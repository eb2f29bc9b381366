use thiserror::Error;

/// Integrity problem found in one load of the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    #[error("deck '{slug}' has an unparseable uploadedAt '{value}'; treated as undated")]
    MalformedTimestamp { slug: String, value: String },

    #[error("slug '{slug}' is used by {count} decks")]
    DuplicateSlug { slug: String, count: usize },

    #[error("shortId {short_id} is used by decks {}", .slugs.join(", "))]
    DuplicateShortId { short_id: u32, slugs: Vec<String> },

    #[error("deck '{slug}' has shortId 0; short IDs start at 1")]
    ZeroShortId { slug: String },

    #[error("deck stored as '{origin}' has no slug")]
    MissingSlug { origin: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog failed integrity checks with {} issue(s)", .0.len())]
    Integrity(Vec<Issue>),

    #[error("a global catalog has already been installed")]
    AlreadyInstalled,
}

pub type Result<T> = std::result::Result<T, CatalogError>;
