// 🔤 Name Normalizer - Raw witness string → canonical identity key
//
// Problem solved:
// - "Hon. Jane Doe (D-CA)", "Jane Doe", "Jane Doe of California" → "jane doe"
// - Party/state annotations are removed before tokenizing
// - Leading titles, trailing suffixes, initials, and trailing location
//   phrases are dropped
//
// The key is a pure function of the input string.

use crate::vocabulary::Vocabulary;
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// PARTY / STATE PATTERNS
// ============================================================================

/// "(R-OK)", "(D-CA-12)", "(Rep.-TX)", "(Republican - Texas)", "(I-VT-AL)"
const PARTY_ANNOTATION_PATTERN: &str = r"(?i)\(\s*(?:r|d|i|rep|dem|ind|republican|democrat|democratic|independent)\.?\s*[-–—,/]\s*[a-z][a-z. ]*?(?:\s*[-–—]\s*(?:\d{1,2}|al|at[- ]large))?\s*\)";

/// Bare "R-TX" / "D-NY-14" outside parentheses (uppercase only)
const PARTY_CODE_PATTERN: &str = r"\b[RDI]\s?[-–—]\s?[A-Z]{2}\b(?:[-–—]\d{1,2}\b)?";

fn party_annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PARTY_ANNOTATION_PATTERN).expect("party annotation pattern"))
}

fn party_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PARTY_CODE_PATTERN).expect("party code pattern"))
}

/// True when the raw string carries a party-letter/state marker
pub fn has_party_marker(raw: &str) -> bool {
    party_annotation_re().is_match(raw) || party_code_re().is_match(raw)
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    vocabulary: Vocabulary,
}

impl NameNormalizer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        NameNormalizer { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Canonical key: surviving tokens joined by single spaces
    pub fn normalize(&self, raw: &str) -> String {
        self.tokens(raw).join(" ")
    }

    /// Surviving name tokens, in order
    pub fn tokens(&self, raw: &str) -> Vec<String> {
        let stripped = strip_party_markers(raw);
        let folded = fold_name_chars(&stripped);

        let mut tokens: Vec<String> = folded
            .split_whitespace()
            .map(|t| t.trim_matches(|c| c == '-' || c == '\''))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        self.strip_trailing_location(&mut tokens);
        self.strip_titles_and_suffixes(&mut tokens);

        tokens.retain(|t| t.chars().count() > 1);

        tokens
    }

    /// Titles only come off the front ("Vice Chair Jane Doe"), suffixes and
    /// stray initials only off the back ("Jane Doe, Ph.D."). "Rob Bishop"
    /// and "John Major" keep their surnames.
    fn strip_titles_and_suffixes(&self, tokens: &mut Vec<String>) {
        let leading = tokens
            .iter()
            .take_while(|t| self.vocabulary.is_title(t))
            .count();
        tokens.drain(..leading);

        while tokens
            .last()
            .map_or(false, |t| t.chars().count() == 1 || self.vocabulary.is_suffix(t))
        {
            tokens.pop();
        }
    }

    /// Drop "of/for/from <places>" from the end of the token list.
    /// The earliest introducer whose whole tail is a location wins.
    fn strip_trailing_location(&self, tokens: &mut Vec<String>) {
        // Position 0 is never an introducer: "Of Counsel ..." keeps its name
        let cut = (1..tokens.len()).find(|&i| {
            self.vocabulary.is_location_introducer(&tokens[i])
                && self.vocabulary.is_location_phrase(&tokens[i + 1..])
        });

        if let Some(i) = cut {
            tokens.truncate(i);
        }
    }
}

/// Normalize with the default vocabulary
pub fn normalize_name(raw: &str) -> String {
    static DEFAULT: OnceLock<NameNormalizer> = OnceLock::new();
    DEFAULT.get_or_init(NameNormalizer::default).normalize(raw)
}

/// Punctuation variants of a key used for exclusion lookups:
/// the key itself, hyphens as spaces, apostrophes removed, and both.
pub fn key_variants(key: &str) -> Vec<String> {
    let collapse = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ");

    let dehyphenated = collapse(key.replace('-', " "));
    let candidates = [
        key.to_string(),
        dehyphenated.clone(),
        collapse(key.replace('\'', "")),
        collapse(dehyphenated.replace('\'', "")),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

// ============================================================================
// HELPERS
// ============================================================================

fn strip_party_markers(raw: &str) -> String {
    let without_annotation = party_annotation_re().replace_all(raw, " ");
    party_code_re()
        .replace_all(&without_annotation, " ")
        .into_owned()
}

/// Decompose accents, lowercase, and blank out everything that is not a
/// letter, hyphen, or apostrophe.
fn fold_name_chars(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`' => '\'',
            '\u{2010}' | '\u{2011}' | '\u{2013}' => '-',
            c if c.is_alphabetic() || c == '-' || c == '\'' => c,
            _ => ' ',
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
