// Witness Rollup - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod vocabulary;  // Titles, suffixes, places, and other non-name tokens
pub mod normalizer;  // Raw witness name → canonical key
pub mod exclusion;   // Which identities are genuine witnesses
pub mod aggregator;  // Fold hearings into identities, filter, sort
pub mod query;       // Filtering and paging over a rollup
pub mod hearing;     // Typed hearing records
pub mod ingest;      // Delimited files and legislator lists
pub mod db;          // SQLite hearing store
pub mod config;
pub mod error;

// Re-export commonly used types
pub use aggregator::{
    Aggregator, HearingRef, NormalizedIdentity, Rollup, RollupEngine, RollupStats,
    identity_id, sort_identities,
};
pub use config::{RollupConfig, DEFAULT_MAX_APPEARANCES};
pub use db::{
    ImportSummary, StoreCounts,
    open_database, setup_database, insert_hearings, load_hearings, verify_count,
};
pub use error::{Error, Result};
pub use exclusion::{ExclusionDecision, ExclusionFilter, ExclusionReason, ExclusionSet};
pub use hearing::{Chamber, HearingRecord, RawHearingRow, WitnessAppearance};
pub use ingest::{
    ColumnMap, load_exclusion_list, load_hearings_csv, load_hearings_csv_path,
    parse_exclusion_list,
};
pub use normalizer::{NameNormalizer, key_variants, normalize_name};
pub use query::WitnessQuery;
pub use vocabulary::{Vocabulary, VocabularyOverrides};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
