pub mod catalog;
pub mod config;
pub mod error;
pub mod schema;
pub mod stats;
pub mod store;

pub use catalog::{Catalog, LoadOptions};
pub use error::{CatalogError, Issue};
pub use schema::{Deck, DeckInput, DeckRecord};
pub use stats::LegacyStatsTable;
