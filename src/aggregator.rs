// 🧮 Aggregator - Fold hearing appearances into one record per person
//
// "Dr. Jane A. Doe" (house) + "Jane Doe" (senate) → one identity,
// key "jane doe", 2 hearings, chambers {house, senate}, display "Dr. Jane A. Doe"
//
// An identity's appearance_count is the number of DISTINCT hearing ids that
// contributed a matching raw name. Repeats inside one hearing never count twice.

use crate::config::RollupConfig;
use crate::error::Result;
use crate::exclusion::{ExclusionDecision, ExclusionFilter, ExclusionReason, ExclusionSet};
use crate::hearing::{Chamber, HearingRecord};
use crate::normalizer::NameNormalizer;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// HEARING REFERENCE
// ============================================================================

/// The parts of a hearing a witness listing needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingRef {
    pub hearing_id: String,
    pub chamber: Chamber,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committee: Option<String>,
}

impl From<&HearingRecord> for HearingRef {
    fn from(hearing: &HearingRecord) -> Self {
        HearingRef {
            hearing_id: hearing.id.clone(),
            chamber: hearing.chamber,
            title: hearing.title.clone(),
            date: hearing.date.clone(),
            committee: hearing.committee.clone(),
        }
    }
}

// ============================================================================
// NORMALIZED IDENTITY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    /// Stable id derived from the key (UUID v5), same on every run
    pub id: String,

    /// Canonical comparison key
    pub key: String,

    /// Longest raw name seen across counted hearings
    pub display_name: String,

    /// Distinct raw spellings, in first-seen order
    pub aliases: Vec<String>,

    pub chambers: BTreeSet<Chamber>,
    pub hearings: Vec<HearingRef>,
    pub appearance_count: usize,
}

impl NormalizedIdentity {
    /// Seed an identity from its first raw name (no hearings yet)
    pub fn new(key: String, raw_name: &str, chamber: Chamber) -> Self {
        let raw_name = raw_name.trim().to_string();
        let mut chambers = BTreeSet::new();
        chambers.insert(chamber);

        NormalizedIdentity {
            id: identity_id(&key),
            key,
            display_name: raw_name.clone(),
            aliases: vec![raw_name],
            chambers,
            hearings: Vec::new(),
            appearance_count: 0,
        }
    }

    /// True when this identity already counts the given hearing
    pub fn has_hearing(&self, hearing_id: &str) -> bool {
        self.hearings.iter().any(|h| h.hearing_id == hearing_id)
    }

    fn add_alias(&mut self, raw_name: &str) {
        let raw_name = raw_name.trim();
        if !self.aliases.iter().any(|a| a == raw_name) {
            self.aliases.push(raw_name.to_string());
        }
    }

    /// Fold one counted hearing into this identity
    fn record_hearing(&mut self, hearing: &HearingRecord, raw_name: &str) {
        let raw_name = raw_name.trim();

        self.hearings.push(HearingRef::from(hearing));
        self.chambers.insert(hearing.chamber);
        self.appearance_count += 1;

        // Fuller names win; ties keep the existing one
        if raw_name.chars().count() > self.display_name.chars().count() {
            self.display_name = raw_name.to_string();
        }
    }
}

/// Deterministic identity id for a normalization key
pub fn identity_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

// ============================================================================
// ROLLUP RESULT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupStats {
    pub hearings_processed: usize,
    pub appearances_seen: usize,
    pub identities_considered: usize,
    pub witnesses_included: usize,
    pub max_appearances: usize,
    pub excluded: BTreeMap<ExclusionReason, usize>,
}

impl RollupStats {
    pub fn excluded_total(&self) -> usize {
        self.excluded.values().sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} hearings, {} appearances, {} identities → {} witnesses ({} excluded)",
            self.hearings_processed,
            self.appearances_seen,
            self.identities_considered,
            self.witnesses_included,
            self.excluded_total()
        )
    }
}

/// Sorted surviving witnesses plus the numbers behind them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollup {
    pub witnesses: Vec<NormalizedIdentity>,
    pub stats: RollupStats,
}

impl Rollup {
    pub fn find_by_id(&self, id: &str) -> Option<&NormalizedIdentity> {
        self.witnesses.iter().find(|w| w.id == id)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&NormalizedIdentity> {
        self.witnesses.iter().find(|w| w.key == key)
    }

    /// Surviving witnesses who appeared at one hearing
    pub fn witnesses_for_hearing(&self, hearing_id: &str) -> Vec<&NormalizedIdentity> {
        self.witnesses
            .iter()
            .filter(|w| w.has_hearing(hearing_id))
            .collect()
    }
}

/// Descending appearance count, then case-insensitive display name.
/// Stable, so remaining ties keep insertion order.
pub fn sort_identities(identities: &mut [NormalizedIdentity]) {
    identities.sort_by(|a, b| {
        b.appearance_count
            .cmp(&a.appearance_count)
            .then_with(|| {
                a.display_name
                    .to_lowercase()
                    .cmp(&b.display_name.to_lowercase())
            })
    });
}

// ============================================================================
// AGGREGATOR (one session per load)
// ============================================================================

pub struct Aggregator<'a> {
    normalizer: &'a NameNormalizer,

    /// Identities in first-seen order
    identities: Vec<NormalizedIdentity>,

    /// key → position in `identities`
    index: HashMap<String, usize>,

    hearing_ids: HashSet<String>,
    appearances_seen: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(normalizer: &'a NameNormalizer) -> Self {
        Aggregator {
            normalizer,
            identities: Vec::new(),
            index: HashMap::new(),
            hearing_ids: HashSet::new(),
            appearances_seen: 0,
        }
    }

    /// Fold every witness appearance of one hearing
    pub fn fold_hearing(&mut self, hearing: &HearingRecord) {
        self.hearing_ids.insert(hearing.id.clone());

        for appearance in &hearing.witnesses {
            self.appearances_seen += 1;
            let key = self.normalizer.normalize(&appearance.name);

            let position = match self.index.get(&key) {
                Some(&position) => position,
                None => {
                    let position = self.identities.len();
                    self.identities.push(NormalizedIdentity::new(
                        key.clone(),
                        &appearance.name,
                        hearing.chamber,
                    ));
                    self.index.insert(key, position);
                    position
                }
            };

            let identity = &mut self.identities[position];
            identity.add_alias(&appearance.name);

            // Same hearing id already counted (a repeat inside this hearing
            // or a duplicated hearing row): nothing more to fold
            if identity.has_hearing(&hearing.id) {
                continue;
            }
            identity.record_hearing(hearing, &appearance.name);
        }
    }

    pub fn fold_all(&mut self, hearings: &[HearingRecord]) {
        for hearing in hearings {
            self.fold_hearing(hearing);
        }
    }

    /// Every identity folded so far, excluded ones included
    pub fn identities(&self) -> &[NormalizedIdentity] {
        &self.identities
    }

    pub fn get(&self, key: &str) -> Option<&NormalizedIdentity> {
        self.index.get(key).map(|&i| &self.identities[i])
    }

    /// Distinct hearing ids folded so far
    pub fn hearing_count(&self) -> usize {
        self.hearing_ids.len()
    }

    /// Apply the filter, drop excluded identities, and sort the rest
    pub fn finish(self, filter: &ExclusionFilter<'_>) -> Rollup {
        let mut stats = RollupStats {
            hearings_processed: self.hearing_ids.len(),
            appearances_seen: self.appearances_seen,
            identities_considered: self.identities.len(),
            max_appearances: filter.max_appearances(),
            ..Default::default()
        };

        let mut witnesses = Vec::with_capacity(self.identities.len());
        for identity in self.identities {
            match filter.evaluate(&identity) {
                ExclusionDecision::Include => witnesses.push(identity),
                ExclusionDecision::Exclude(reason) => {
                    debug!(key = %identity.key, display = %identity.display_name, %reason, "excluded");
                    *stats.excluded.entry(reason).or_insert(0) += 1;
                }
            }
        }

        sort_identities(&mut witnesses);
        stats.witnesses_included = witnesses.len();

        info!(
            hearings = stats.hearings_processed,
            witnesses = stats.witnesses_included,
            excluded = stats.excluded_total(),
            "rollup complete"
        );

        Rollup { witnesses, stats }
    }
}

// ============================================================================
// ROLLUP ENGINE (config + normalizer, reusable across loads)
// ============================================================================

pub struct RollupEngine {
    config: RollupConfig,
    normalizer: NameNormalizer,
}

impl RollupEngine {
    pub fn new(config: RollupConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = NameNormalizer::new(Vocabulary::with_overrides(&config.vocabulary));
        Ok(RollupEngine { config, normalizer })
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Exclusion set built with this engine's vocabulary
    pub fn exclusion_set<I, S>(&self, names: I) -> ExclusionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExclusionSet::from_names(&self.normalizer, names)
    }

    /// One full pass: fold, filter, sort
    pub fn run(&self, hearings: &[HearingRecord], excluded: &ExclusionSet) -> Rollup {
        let mut aggregator = Aggregator::new(&self.normalizer);
        aggregator.fold_all(hearings);

        let ceiling = self.config.effective_ceiling(aggregator.hearing_count());
        let filter = ExclusionFilter::new(ceiling, &self.normalizer, excluded);
        aggregator.finish(&filter)
    }
}

impl Default for RollupEngine {
    fn default() -> Self {
        RollupEngine {
            config: RollupConfig::default(),
            normalizer: NameNormalizer::default(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
