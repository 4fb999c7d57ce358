// 🔎 Witness Query - Filtering and paging over a finished rollup
// Used by the CLI report and the API server; never changes the rollup itself.

use crate::aggregator::NormalizedIdentity;
use crate::hearing::Chamber;
use crate::normalizer::NameNormalizer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WitnessQuery {
    /// Only witnesses who appeared in this chamber
    pub chamber: Option<Chamber>,

    /// Free text matched against key and display name
    #[serde(alias = "q")]
    pub search: Option<String>,

    /// Substring of any of the witness's hearing committees
    pub committee: Option<String>,

    pub min_hearings: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl WitnessQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chamber(mut self, chamber: Chamber) -> Self {
        self.chamber = Some(chamber);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn committee(mut self, committee: impl Into<String>) -> Self {
        self.committee = Some(committee.into());
        self
    }

    pub fn min_hearings(mut self, min: usize) -> Self {
        self.min_hearings = min;
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Matching witnesses, in rollup order, after offset/limit
    pub fn apply<'a>(
        &self,
        witnesses: &'a [NormalizedIdentity],
        normalizer: &NameNormalizer,
    ) -> Vec<&'a NormalizedIdentity> {
        let search = self.search.as_deref().map(|s| SearchText::new(s, normalizer));
        let committee = self
            .committee
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        witnesses
            .iter()
            .filter(|w| w.appearance_count >= self.min_hearings)
            .filter(|w| self.chamber.map_or(true, |c| w.chambers.contains(&c)))
            .filter(|w| search.as_ref().map_or(true, |s| s.matches(w)))
            .filter(|w| {
                committee.as_ref().map_or(true, |c| {
                    w.hearings.iter().any(|h| {
                        h.committee
                            .as_deref()
                            .map_or(false, |name| name.to_lowercase().contains(c.as_str()))
                    })
                })
            })
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Search text in both raw-lowercase and normalized form, so "Dr. Doe"
/// finds "jane doe" and "o'neil" finds "O'Neil"
struct SearchText {
    lowered: String,
    key: String,
}

impl SearchText {
    fn new(text: &str, normalizer: &NameNormalizer) -> Self {
        SearchText {
            lowered: text.trim().to_lowercase(),
            key: normalizer.normalize(text),
        }
    }

    fn matches(&self, witness: &NormalizedIdentity) -> bool {
        if self.lowered.is_empty() {
            return true;
        }
        witness.display_name.to_lowercase().contains(&self.lowered)
            || (!self.key.is_empty() && witness.key.contains(&self.key))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RollupEngine;
    use crate::exclusion::ExclusionSet;
    use crate::hearing::HearingRecord;

    fn sample() -> (RollupEngine, Vec<NormalizedIdentity>) {
        let engine = RollupEngine::default();
        let hearings = vec![
            HearingRecord::new("1", Chamber::House, "Energy")
                .with_committee("Energy and Commerce")
                .with_witness("Dr. Jane A. Doe")
                .with_witness("Alan Turing"),
            HearingRecord::new("2", Chamber::Senate, "Banking")
                .with_committee("Banking, Housing, and Urban Affairs")
                .with_witness("Jane Doe")
                .with_witness("Grace Hopper"),
            HearingRecord::new("3", Chamber::Senate, "Armed Services")
                .with_witness("Grace Hopper"),
        ];
        let rollup = engine.run(&hearings, &ExclusionSet::new());
        (engine, rollup.witnesses)
    }

    fn names(witnesses: Vec<&NormalizedIdentity>) -> Vec<String> {
        witnesses.iter().map(|w| w.key.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let (engine, witnesses) = sample();
        let result = WitnessQuery::new().apply(&witnesses, engine.normalizer());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_filter_by_chamber_and_min_hearings() {
        let (engine, witnesses) = sample();

        let house = WitnessQuery::new().chamber(Chamber::House).apply(&witnesses, engine.normalizer());
        assert_eq!(names(house), vec!["jane doe", "alan turing"]);

        let repeat = WitnessQuery::new().min_hearings(2).apply(&witnesses, engine.normalizer());
        assert_eq!(names(repeat), vec!["jane doe", "grace hopper"]);
    }

    #[test]
    fn test_search_uses_normalized_form() {
        let (engine, witnesses) = sample();

        let result = WitnessQuery::new().search("Dr. Doe").apply(&witnesses, engine.normalizer());
        assert_eq!(names(result), vec!["jane doe"]);

        let result = WitnessQuery::new().search("TURING").apply(&witnesses, engine.normalizer());
        assert_eq!(names(result), vec!["alan turing"]);
    }

    #[test]
    fn test_filter_by_committee() {
        let (engine, witnesses) = sample();
        let result = WitnessQuery::new().committee("banking").apply(&witnesses, engine.normalizer());
        assert_eq!(names(result), vec!["jane doe", "grace hopper"]);
    }

    #[test]
    fn test_paging() {
        let (engine, witnesses) = sample();
        // Rollup order: jane doe, grace hopper, alan turing
        let result = WitnessQuery::new().page(1, 1).apply(&witnesses, engine.normalizer());
        assert_eq!(names(result), vec!["grace hopper"]);
    }
}
