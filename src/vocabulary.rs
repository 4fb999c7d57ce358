// 📚 Vocabulary - Closed token sets used by name normalization
// Every set is plain data so it can be extended from config and tested on its own.
//
// All entries are lowercase, accent-free, and punctuation-free, matching the
// token shape the normalizer produces.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// DEFAULT ENUMERATIONS
// ============================================================================

/// Honorifics, offices, and roles that precede or decorate a person's name
pub const TITLES: &[&str] = &[
    // Courtesy titles
    "mr", "mrs", "ms", "mx", "miss", "sir", "dame", "the",
    "hon", "honorable", "honourable",
    // Academic / medical
    "dr", "doctor", "prof", "professor",
    // Legislative
    "senator", "sen", "representative", "rep", "congressman", "congresswoman",
    "congressmember", "congressperson", "delegate", "resident",
    "commissioner", "chair", "chairman", "chairwoman", "chairperson", "cochair",
    "vice", "ranking", "member", "leader", "speaker", "whip",
    // Executive / judicial
    "secretary", "ambassador", "amb", "judge", "justice", "governor", "gov",
    "mayor",
    // Clergy
    "rev", "reverend", "father", "fr", "sister", "rabbi", "imam", "pastor",
    "bishop", "cardinal", "msgr",
    // Military
    "gen", "general", "lt", "ltg", "lieutenant", "col", "colonel", "maj",
    "major", "capt", "captain", "cmdr", "commander", "adm", "admiral", "sgt",
    "sergeant", "ret", "retired",
];

/// Generational suffixes and post-nominal letters
pub const SUFFIXES: &[&str] = &[
    "jr", "junior", "sr", "senior", "ii", "iii", "iv", "v",
    "esq", "esquire", "phd", "md", "jd", "mba", "cpa", "dds", "rn",
    "ret", "retired",
    // "Ph.D." splits into "ph" + "d"
    "ph",
];

/// Tokens that introduce a trailing location phrase ("Jane Doe of Ohio")
pub const LOCATION_INTRODUCERS: &[&str] = &["of", "for", "from"];

/// Places and directions that may follow a location introducer.
/// Multi-word entries are matched as whole phrases.
pub const LOCATION_PHRASES: &[&str] = &[
    // States
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado",
    "connecticut", "delaware", "florida", "georgia", "hawaii", "idaho",
    "illinois", "indiana", "iowa", "kansas", "kentucky", "louisiana", "maine",
    "maryland", "massachusetts", "michigan", "minnesota", "mississippi",
    "missouri", "montana", "nebraska", "nevada", "new hampshire", "new jersey",
    "new mexico", "new york", "north carolina", "north dakota", "ohio",
    "oklahoma", "oregon", "pennsylvania", "rhode island", "south carolina",
    "south dakota", "tennessee", "texas", "utah", "vermont", "virginia",
    "washington", "west virginia", "wisconsin", "wyoming",
    // Federal district and territories
    "district of columbia", "d c", "dc", "puerto rico", "guam",
    "american samoa", "virgin islands", "us virgin islands",
    "northern mariana islands", "mariana islands",
    // The country itself
    "united states of america", "united states", "u s", "us", "usa", "america",
    // Compass directions and regions
    "north", "south", "east", "west", "northern", "southern", "eastern",
    "western", "central", "northeast", "northwest", "southeast", "southwest",
    "northeastern", "northwestern", "southeastern", "southwestern", "midwest",
    "midwestern",
    // Seat designations
    "at large", "at-large",
];

/// Connective words allowed inside a location phrase but not counted as a place
pub const LOCATION_FILLERS: &[&str] = &[
    "the", "of", "and", "state", "commonwealth", "territory", "district",
];

/// Scraping boilerplate that never appears in a real person's name.
/// Words that double as surnames ("page", "record") belong in config.
pub const NON_NAME_TOKENS: &[&str] = &[
    "transcript", "transcripts", "testimony", "testimonies", "click",
    "available", "here", "hearing", "hearings", "download", "downloads", "pdf",
    "statement", "statements", "video", "webcast", "submitted", "remarks",
    "witness", "witnesses", "questions", "responses", "qfr", "qfrs",
    "committee", "subcommittee", "agenda", "memorandum", "tbd", "tba",
];

// ============================================================================
// OVERRIDES (from config)
// ============================================================================

/// Additional entries merged into the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyOverrides {
    pub extra_titles: Vec<String>,
    pub extra_suffixes: Vec<String>,
    pub extra_location_phrases: Vec<String>,
    pub extra_non_name_tokens: Vec<String>,
}

// ============================================================================
// VOCABULARY
// ============================================================================

#[derive(Debug, Clone)]
pub struct Vocabulary {
    titles: HashSet<String>,
    suffixes: HashSet<String>,
    introducers: HashSet<String>,
    fillers: HashSet<String>,
    non_name: HashSet<String>,
    /// Location phrases split into tokens, longest first
    location_phrases: Vec<Vec<String>>,
}

fn to_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn phrase_tokens(phrase: &str) -> Vec<String> {
    phrase
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

impl Vocabulary {
    /// Build the default vocabulary
    pub fn with_defaults() -> Self {
        let mut vocabulary = Vocabulary {
            titles: to_set(TITLES),
            suffixes: to_set(SUFFIXES),
            introducers: to_set(LOCATION_INTRODUCERS),
            fillers: to_set(LOCATION_FILLERS),
            non_name: to_set(NON_NAME_TOKENS),
            location_phrases: Vec::new(),
        };
        for phrase in LOCATION_PHRASES {
            vocabulary.add_location_phrase(phrase);
        }
        vocabulary
    }

    /// Build the default vocabulary plus configured extras
    pub fn with_overrides(overrides: &VocabularyOverrides) -> Self {
        let mut vocabulary = Self::with_defaults();
        vocabulary.extend(overrides);
        vocabulary
    }

    pub fn extend(&mut self, overrides: &VocabularyOverrides) {
        let lower = |s: &String| s.trim().to_lowercase();
        self.titles.extend(overrides.extra_titles.iter().map(lower));
        self.suffixes.extend(overrides.extra_suffixes.iter().map(lower));
        self.non_name
            .extend(overrides.extra_non_name_tokens.iter().map(lower));
        for phrase in &overrides.extra_location_phrases {
            self.add_location_phrase(phrase);
        }
    }

    fn add_location_phrase(&mut self, phrase: &str) {
        let tokens = phrase_tokens(phrase);
        if tokens.is_empty() || self.location_phrases.contains(&tokens) {
            return;
        }
        self.location_phrases.push(tokens);
        // Longest phrases win ("west virginia" before "west")
        self.location_phrases
            .sort_by(|a, b| b.len().cmp(&a.len()));
    }

    pub fn is_title(&self, token: &str) -> bool {
        if self.titles.contains(token) {
            return true;
        }
        // "vice-chair", "co-chair"
        token.contains('-')
            && token
                .split('-')
                .all(|part| part == "co" || self.titles.contains(part))
    }

    pub fn is_suffix(&self, token: &str) -> bool {
        self.suffixes.contains(token)
    }

    pub fn is_location_introducer(&self, token: &str) -> bool {
        self.introducers.contains(token)
    }

    pub fn is_non_name(&self, token: &str) -> bool {
        self.non_name.contains(token)
    }

    /// True when `tokens` is made only of location phrases and fillers,
    /// with at least one real place among them.
    pub fn is_location_phrase(&self, tokens: &[String]) -> bool {
        let mut pos = 0;
        let mut saw_place = false;

        'scan: while pos < tokens.len() {
            for phrase in &self.location_phrases {
                let end = pos + phrase.len();
                if end <= tokens.len() && tokens[pos..end] == phrase[..] {
                    pos = end;
                    saw_place = true;
                    continue 'scan;
                }
            }

            if self.fillers.contains(&tokens[pos]) {
                pos += 1;
                continue;
            }

            return false;
        }

        saw_place
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_default_sets_are_normalized() {
        // Every entry must already look like a normalizer token
        for entry in TITLES.iter().chain(SUFFIXES).chain(NON_NAME_TOKENS) {
            assert_eq!(*entry, entry.to_lowercase());
            assert!(!entry.contains('.'), "{} has punctuation", entry);
        }
    }

    #[test]
    fn test_title_and_suffix_lookup() {
        let vocabulary = Vocabulary::with_defaults();

        assert!(vocabulary.is_title("senator"));
        assert!(vocabulary.is_title("vice-chair"));
        assert!(vocabulary.is_title("co-chair"));
        assert!(!vocabulary.is_title("jane"));
        assert!(vocabulary.is_suffix("iii"));
        assert!(!vocabulary.is_suffix("doe"));
    }

    #[test]
    fn test_location_phrase_multiword() {
        let vocabulary = Vocabulary::with_defaults();

        assert!(vocabulary.is_location_phrase(&tokens("west virginia")));
        assert!(vocabulary.is_location_phrase(&tokens("the district of columbia")));
        assert!(vocabulary.is_location_phrase(&tokens("the commonwealth of virginia")));
        assert!(vocabulary.is_location_phrase(&tokens("the united states")));
        assert!(vocabulary.is_location_phrase(&tokens("at large")));
    }

    #[test]
    fn test_location_phrase_rejects_non_places() {
        let vocabulary = Vocabulary::with_defaults();

        assert!(!vocabulary.is_location_phrase(&tokens("the university of texas")));
        assert!(!vocabulary.is_location_phrase(&tokens("the state")));
        assert!(!vocabulary.is_location_phrase(&[]));
    }

    #[test]
    fn test_surnames_are_not_boilerplate() {
        let vocabulary = Vocabulary::with_defaults();

        for surname in ["page", "record", "link", "watch", "view", "notice"] {
            assert!(!vocabulary.is_non_name(surname), "{}", surname);
        }
        assert!(vocabulary.is_non_name("transcript"));
    }

    #[test]
    fn test_overrides_extend_defaults() {
        let overrides = VocabularyOverrides {
            extra_titles: vec!["Chancellor".to_string()],
            extra_suffixes: vec![],
            extra_location_phrases: vec!["Cook County".to_string()],
            extra_non_name_tokens: vec!["livestream".to_string()],
        };
        let vocabulary = Vocabulary::with_overrides(&overrides);

        assert!(vocabulary.is_title("chancellor"));
        assert!(vocabulary.is_non_name("livestream"));
        assert!(vocabulary.is_location_phrase(&tokens("cook county")));
        // Defaults are still there
        assert!(vocabulary.is_title("senator"));
    }
}
