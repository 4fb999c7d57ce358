// 🏛️ Hearing Records - Typed input for the witness rollup
// Rows from the store or a delimited file are validated here, once, and are
// immutable afterwards.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CHAMBER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chamber::House => "house",
            Chamber::Senate => "senate",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chamber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "house" | "h" => Ok(Chamber::House),
            "senate" | "s" => Ok(Chamber::Senate),
            _ => Err(Error::UnknownChamber(s.to_string())),
        }
    }
}

// ============================================================================
// WITNESS APPEARANCE
// ============================================================================

/// One raw witness entry attached to a hearing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessAppearance {
    /// Name exactly as scraped
    pub name: String,

    /// Raw title/role line, when the source has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl WitnessAppearance {
    pub fn new(name: impl Into<String>) -> Self {
        WitnessAppearance {
            name: name.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

// ============================================================================
// HEARING RECORD
// ============================================================================

/// One committee hearing with its witness list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HearingRecord {
    pub id: String,
    pub chamber: Chamber,
    pub title: String,

    /// ISO date when the source date parsed, the trimmed original otherwise
    pub date: Option<String>,
    pub committee: Option<String>,
    pub tags: Vec<String>,
    pub witnesses: Vec<WitnessAppearance>,
}

impl HearingRecord {
    /// Create a hearing with no optional fields set
    pub fn new(id: impl Into<String>, chamber: Chamber, title: impl Into<String>) -> Self {
        HearingRecord {
            id: id.into(),
            chamber,
            title: title.into(),
            date: None,
            committee: None,
            tags: Vec::new(),
            witnesses: Vec::new(),
        }
    }

    /// Builder pattern: set date (normalized to ISO when possible)
    pub fn with_date(mut self, date: &str) -> Self {
        self.date = normalize_date(date);
        self
    }

    /// Builder pattern: set committee
    pub fn with_committee(mut self, committee: impl Into<String>) -> Self {
        self.committee = Some(committee.into());
        self
    }

    /// Builder pattern: add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder pattern: add a witness by raw name
    pub fn with_witness(mut self, name: impl Into<String>) -> Self {
        self.witnesses.push(WitnessAppearance::new(name));
        self
    }

    /// Builder pattern: add a full witness appearance
    pub fn with_appearance(mut self, appearance: WitnessAppearance) -> Self {
        self.witnesses.push(appearance);
        self
    }

    /// Content hash for idempotent import.
    /// Identifies the hearing itself, so witness lists are not part of it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.chamber,
            self.id,
            self.title,
            self.date.as_deref().unwrap_or("")
        ));
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// RAW ROW → RECORD
// ============================================================================

/// Loosely-typed hearing row as read from a store or file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHearingRow {
    pub id: Option<String>,
    pub chamber: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub committee: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub witnesses: Vec<WitnessAppearance>,
}

impl TryFrom<RawHearingRow> for HearingRecord {
    type Error = Error;

    fn try_from(row: RawHearingRow) -> Result<Self> {
        let id = clean_str(row.id.as_deref()).ok_or(Error::EmptyIdentifier)?;

        let chamber = match clean_str(row.chamber.as_deref()) {
            Some(c) => c.parse::<Chamber>()?,
            None => {
                return Err(Error::MissingField {
                    hearing_id: id,
                    field: "chamber",
                })
            }
        };

        Ok(HearingRecord {
            title: clean_str(row.title.as_deref()).unwrap_or_default(),
            date: row.date.as_deref().and_then(normalize_date),
            committee: clean_str(row.committee.as_deref()),
            tags: row
                .tags
                .iter()
                .filter_map(|t| clean_str(Some(t.as_str())))
                .collect(),
            witnesses: row
                .witnesses
                .into_iter()
                .filter(|w| !w.name.trim().is_empty())
                .collect(),
            id,
            chamber,
        })
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Trim and collapse internal whitespace; blank becomes None
pub fn clean_str(value: Option<&str>) -> Option<String> {
    let collapsed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Convert a source date to ISO `YYYY-MM-DD` when the format is known.
/// Unknown formats come back trimmed but otherwise unchanged.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    Some(raw.to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chamber_parse() {
        assert_eq!("House".parse::<Chamber>().unwrap(), Chamber::House);
        assert_eq!(" senate ".parse::<Chamber>().unwrap(), Chamber::Senate);
        assert_eq!("S".parse::<Chamber>().unwrap(), Chamber::Senate);
        assert!("joint".parse::<Chamber>().is_err());
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("2024-03-05"), Some("2024-03-05".to_string()));
        assert_eq!(normalize_date("3/5/24"), Some("2024-03-05".to_string()));
        assert_eq!(normalize_date("03/05/2024"), Some("2024-03-05".to_string()));
        assert_eq!(normalize_date("  "), None);
        // Unknown format kept as-is
        assert_eq!(normalize_date("March 5, 2024"), Some("March 5, 2024".to_string()));
    }

    #[test]
    fn test_fingerprint_stable_and_ignores_witnesses() {
        let a = HearingRecord::new("42", Chamber::House, "Oversight").with_date("2024-01-02");
        let b = a.clone().with_witness("Jane Doe");

        assert_eq!(a.fingerprint(), a.fingerprint());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let other_chamber = HearingRecord::new("42", Chamber::Senate, "Oversight").with_date("2024-01-02");
        assert_ne!(a.fingerprint(), other_chamber.fingerprint());
    }

    #[test]
    fn test_raw_row_validation() {
        let row = RawHearingRow {
            id: Some(" 17 ".to_string()),
            chamber: Some("SENATE".to_string()),
            title: Some("  Budget   Review ".to_string()),
            date: Some("1/2/2023".to_string()),
            committee: Some("".to_string()),
            tags: vec!["budget".to_string(), " ".to_string()],
            witnesses: vec![WitnessAppearance::new("Jane Doe"), WitnessAppearance::new("  ")],
        };

        let record = HearingRecord::try_from(row).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.chamber, Chamber::Senate);
        assert_eq!(record.title, "Budget Review");
        assert_eq!(record.date.as_deref(), Some("2023-01-02"));
        assert_eq!(record.committee, None);
        assert_eq!(record.tags, vec!["budget".to_string()]);
        assert_eq!(record.witnesses.len(), 1);
    }

    #[test]
    fn test_raw_row_rejects_bad_input() {
        let no_id = RawHearingRow {
            chamber: Some("house".to_string()),
            ..Default::default()
        };
        assert!(matches!(HearingRecord::try_from(no_id), Err(Error::EmptyIdentifier)));

        let no_chamber = RawHearingRow {
            id: Some("1".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HearingRecord::try_from(no_chamber),
            Err(Error::MissingField { field: "chamber", .. })
        ));

        let bad_chamber = RawHearingRow {
            id: Some("1".to_string()),
            chamber: Some("joint".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HearingRecord::try_from(bad_chamber),
            Err(Error::UnknownChamber(_))
        ));
    }
}
