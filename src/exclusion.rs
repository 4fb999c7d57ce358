// 🚫 Exclusion Filter - Decide which identities are genuine witnesses
//
// Rules, in order (first failure wins):
// 1. Appearance count within the ceiling
// 2. At least a first and last name, each longer than one character
// 3. No scraping-boilerplate tokens
// 4. No party/state marker on any raw alias
// 5. Not in the externally supplied exclusion set

use crate::aggregator::NormalizedIdentity;
use crate::normalizer::{has_party_marker, key_variants, NameNormalizer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// EXCLUSION SET
// ============================================================================

/// Normalized keys of people to leave out (e.g. sitting legislators)
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    keys: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        ExclusionSet {
            keys: HashSet::new(),
        }
    }

    /// Normalize raw names the same way witness names are normalized.
    /// Names that normalize to nothing are ignored.
    pub fn from_names<I, S>(normalizer: &NameNormalizer, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ExclusionSet::new();
        for name in names {
            set.insert_key(&normalizer.normalize(name.as_ref()));
        }
        set
    }

    fn insert_key(&mut self, key: &str) {
        self.keys.extend(key_variants(key));
    }

    /// True when any punctuation variant of `key` is excluded
    pub fn contains(&self, key: &str) -> bool {
        key_variants(key).iter().any(|variant| self.keys.contains(variant))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    TooManyAppearances,
    MalformedName,
    NonNameFragment,
    PartyAffiliation,
    ExcludedIdentity,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::TooManyAppearances => "too_many_appearances",
            ExclusionReason::MalformedName => "malformed_name",
            ExclusionReason::NonNameFragment => "non_name_fragment",
            ExclusionReason::PartyAffiliation => "party_affiliation",
            ExclusionReason::ExcludedIdentity => "excluded_identity",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionDecision {
    Include,
    Exclude(ExclusionReason),
}

impl ExclusionDecision {
    pub fn is_included(&self) -> bool {
        matches!(self, ExclusionDecision::Include)
    }
}

// ============================================================================
// FILTER
// ============================================================================

pub struct ExclusionFilter<'a> {
    max_appearances: usize,
    normalizer: &'a NameNormalizer,
    excluded: &'a ExclusionSet,
}

impl<'a> ExclusionFilter<'a> {
    pub fn new(
        max_appearances: usize,
        normalizer: &'a NameNormalizer,
        excluded: &'a ExclusionSet,
    ) -> Self {
        ExclusionFilter {
            max_appearances,
            normalizer,
            excluded,
        }
    }

    pub fn max_appearances(&self) -> usize {
        self.max_appearances
    }

    pub fn evaluate(&self, identity: &NormalizedIdentity) -> ExclusionDecision {
        match self.first_failing_rule(identity) {
            Some(reason) => ExclusionDecision::Exclude(reason),
            None => ExclusionDecision::Include,
        }
    }

    pub fn is_included(&self, identity: &NormalizedIdentity) -> bool {
        self.evaluate(identity).is_included()
    }

    fn first_failing_rule(&self, identity: &NormalizedIdentity) -> Option<ExclusionReason> {
        let vocabulary = self.normalizer.vocabulary();
        let tokens: Vec<&str> = identity.key.split_whitespace().collect();

        // Rule 1: ceiling
        if identity.appearance_count > self.max_appearances {
            return Some(ExclusionReason::TooManyAppearances);
        }

        // Rule 2: first + last name
        let well_formed = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) if tokens.len() >= 2 => {
                first.chars().count() > 1 && last.chars().count() > 1
            }
            _ => false,
        };
        if !well_formed {
            return Some(ExclusionReason::MalformedName);
        }

        // Rule 3: scraping boilerplate
        if tokens.iter().any(|t| vocabulary.is_non_name(t)) {
            return Some(ExclusionReason::NonNameFragment);
        }

        // Rule 4: party/state markers on any raw spelling
        let raw_marked = has_party_marker(&identity.display_name)
            || identity.aliases.iter().any(|alias| has_party_marker(alias));
        if raw_marked {
            return Some(ExclusionReason::PartyAffiliation);
        }

        // Rule 5: external exclusion set
        if self.excluded.contains(&identity.key) {
            return Some(ExclusionReason::ExcludedIdentity);
        }

        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
