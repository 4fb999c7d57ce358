// 📥 Ingestion - Delimited hearing exports and legislator lists → typed records
//
// Committee exports have no fixed header layout, so columns are found by
// keyword, exact headers first and then substrings. Witness cells hold
// several names separated by newlines, semicolons, pipes, or commas.

use crate::hearing::{clean_str, Chamber, HearingRecord, RawHearingRow, WitnessAppearance};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

// ============================================================================
// COLUMN DETECTION
// ============================================================================

/// Header keywords per field, most specific first
const TITLE_KEYS: &[&str] = &["title", "hearing title", "hearing_title"];
const DATE_KEYS: &[&str] = &["date", "hearing date", "hearing_date"];
// A bare "name" column is the witness list in Senate exports
const WITNESS_KEYS: &[&str] = &["witnesses", "witness", "witness list", "witness_list", "witness name", "name"];
const WITNESS_TITLE_KEYS: &[&str] = &["witness title", "witness_title", "witness titles"];
const TAG_KEYS: &[&str] = &["tags", "topics", "subject"];
const COMMITTEE_KEYS: &[&str] = &["committee", "senate committee", "house committee", "committee_name"];
const ID_KEYS: &[&str] = &["id", "hearing id", "hearing_id", "event id", "event_id"];
const CHAMBER_KEYS: &[&str] = &["chamber"];

/// Substring fallbacks when no header matches exactly
const TITLE_FRAGMENTS: &[&str] = &["title", "hearing"];
const TAG_FRAGMENTS: &[&str] = &["tag", "topic"];

/// Column positions found in a header row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    pub title: Option<usize>,
    pub date: Option<usize>,
    pub witnesses: Option<usize>,
    pub witness_titles: Option<usize>,
    pub tags: Option<usize>,
    pub committee: Option<usize>,
    pub id: Option<usize>,
    pub chamber: Option<usize>,
}

impl ColumnMap {
    pub fn detect<'h, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'h str>,
    {
        let lowered: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let find = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lowered.iter().position(|h| h == key))
        };

        // First header containing a fragment that no other field claimed
        let find_fragment = |fragments: &[&str], taken: &[Option<usize>]| {
            fragments.iter().find_map(|fragment| {
                lowered
                    .iter()
                    .enumerate()
                    .find(|(i, h)| h.contains(*fragment) && !taken.contains(&Some(*i)))
                    .map(|(i, _)| i)
            })
        };

        let mut map = ColumnMap {
            title: find(TITLE_KEYS),
            date: find(DATE_KEYS),
            witnesses: find(WITNESS_KEYS),
            witness_titles: find(WITNESS_TITLE_KEYS),
            tags: find(TAG_KEYS),
            committee: find(COMMITTEE_KEYS),
            id: find(ID_KEYS),
            chamber: find(CHAMBER_KEYS),
        };

        let taken = [
            map.date,
            map.witnesses,
            map.witness_titles,
            map.committee,
            map.id,
            map.chamber,
        ];
        if map.title.is_none() {
            map.title = find_fragment(TITLE_FRAGMENTS, &taken);
        }
        if map.tags.is_none() {
            let mut claimed = taken.to_vec();
            claimed.push(map.title);
            map.tags = find_fragment(TAG_FRAGMENTS, &claimed);
        }

        map
    }
}

// ============================================================================
// CELL SPLITTING
// ============================================================================

fn multi_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\r\n|\n|;|\||,)+").expect("multi-value split pattern"))
}

// Titles such as "CEO, Acme Corp" keep their commas
fn title_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\r\n|\n|;|\|)+").expect("title split pattern"))
}

/// Split a multi-name cell; pieces are whitespace-collapsed, blanks dropped
pub fn split_multi(cell: &str) -> Vec<String> {
    multi_value_re()
        .split(cell)
        .filter_map(|piece| clean_str(Some(piece)))
        .collect()
}

/// Split a witness-title cell on newlines, semicolons, and pipes only
pub fn split_titles(cell: &str) -> Vec<String> {
    title_value_re()
        .split(cell)
        .filter_map(|piece| clean_str(Some(piece)))
        .collect()
}

// ============================================================================
// DELIMITED FILE LOADING
// ============================================================================

/// Load hearings from any CSV reader.
/// `default_chamber` applies when the file has no chamber column.
pub fn load_hearings_csv<R: Read>(reader: R, default_chamber: Chamber) -> Result<Vec<HearingRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let columns = ColumnMap::detect(headers.iter());

    let witness_column = columns
        .witnesses
        .context("CSV has no witness column")?;

    let mut hearings = Vec::new();
    let mut skipped = 0;

    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read CSV row {}", index + 1))?;
        let cell = |column: Option<usize>| column.and_then(|c| record.get(c));
        let row_number = index + 1;

        let names = split_multi(record.get(witness_column).unwrap_or(""));
        if names.is_empty() {
            skipped += 1;
            continue;
        }

        // Titles are only trusted when they line up one-to-one with names
        let mut titles = cell(columns.witness_titles).map(split_titles).unwrap_or_default();
        if !titles.is_empty() && titles.len() != names.len() {
            debug!(row = row_number, names = names.len(), titles = titles.len(), "witness titles dropped");
            titles.clear();
        }
        let witnesses = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| WitnessAppearance {
                name,
                title: titles.get(i).cloned(),
            })
            .collect();

        let chamber = match cell(columns.chamber).and_then(|c| clean_str(Some(c))) {
            Some(c) => c,
            None => default_chamber.to_string(),
        };

        let id = match cell(columns.id).and_then(|c| clean_str(Some(c))) {
            Some(id) => id,
            None => format!("{}-{}", chamber.to_lowercase(), row_number),
        };

        let row = RawHearingRow {
            id: Some(id),
            chamber: Some(chamber),
            title: cell(columns.title).map(str::to_string),
            date: cell(columns.date).map(str::to_string),
            committee: cell(columns.committee).map(str::to_string),
            tags: cell(columns.tags).map(split_multi).unwrap_or_default(),
            witnesses,
        };

        let hearing = HearingRecord::try_from(row)
            .with_context(|| format!("Invalid hearing at CSV row {}", row_number))?;
        hearings.push(hearing);
    }

    if skipped > 0 {
        warn!(skipped, "rows without witnesses skipped");
    }
    info!(hearings = hearings.len(), "loaded hearings from CSV");

    Ok(hearings)
}

/// Load hearings from a CSV file on disk
pub fn load_hearings_csv_path(path: &Path, default_chamber: Chamber) -> Result<Vec<HearingRecord>> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    load_hearings_csv(file, default_chamber)
}

// ============================================================================
// EXCLUSION LIST LOADING
// ============================================================================

#[derive(Deserialize)]
struct NamedEntry {
    #[serde(alias = "full_name")]
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NameEntry {
    Plain(String),
    Named(NamedEntry),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExclusionDocument {
    List(Vec<NameEntry>),
    Wrapped {
        #[serde(alias = "legislators", alias = "members")]
        names: Vec<NameEntry>,
    },
}

/// Parse a legislator list: `["A", ...]`, `[{"name": "A"}, ...]`,
/// or `{"names"|"legislators": [...]}`
pub fn parse_exclusion_list(json: &str) -> Result<Vec<String>> {
    let document: ExclusionDocument =
        serde_json::from_str(json).context("Failed to parse exclusion list JSON")?;

    let entries = match document {
        ExclusionDocument::List(entries) => entries,
        ExclusionDocument::Wrapped { names } => names,
    };

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            NameEntry::Plain(name) => name,
            NameEntry::Named(named) => named.name,
        })
        .collect())
}

/// Read a legislator list from disk
pub fn load_exclusion_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read exclusion list: {:?}", path))?;
    let names = parse_exclusion_list(&content)?;
    info!(names = names.len(), "loaded exclusion list");
    Ok(names)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_column_detection() {
        let columns = ColumnMap::detect(["Hearing Title", "Date", "Witnesses", "Committee", "Tags"]);

        assert_eq!(columns.title, Some(0));
        assert_eq!(columns.date, Some(1));
        assert_eq!(columns.witnesses, Some(2));
        assert_eq!(columns.committee, Some(3));
        assert_eq!(columns.tags, Some(4));
        assert_eq!(columns.id, None);
        assert_eq!(columns.chamber, None);
    }

    #[test]
    fn test_explicit_witness_header_beats_name() {
        let columns = ColumnMap::detect(["Witness Name", "Name"]);
        assert_eq!(columns.witnesses, Some(0));
        assert_eq!(columns.title, None);
    }

    #[test]
    fn test_senate_export_headers() {
        let columns = ColumnMap::detect(["Hearing", "Date", "Name", "Topic Tags"]);

        assert_eq!(columns.witnesses, Some(2));
        assert_eq!(columns.title, Some(0));
        assert_eq!(columns.date, Some(1));
        assert_eq!(columns.tags, Some(3));
    }

    #[test]
    fn test_title_fragment_skips_witness_title_column() {
        let columns = ColumnMap::detect(["Witnesses", "Witness Title", "Full Hearing Title"]);

        assert_eq!(columns.witness_titles, Some(1));
        assert_eq!(columns.title, Some(2));
    }

    #[test]
    fn test_load_senate_export_with_name_column() {
        let data = "Hearing,Date,Name\nBudget Review,3/5/24,Jane Doe\n";

        let hearings = load_hearings_csv(data.as_bytes(), Chamber::Senate).unwrap();
        assert_eq!(hearings.len(), 1);
        assert_eq!(hearings[0].title, "Budget Review");
        assert_eq!(hearings[0].date.as_deref(), Some("2024-03-05"));
        assert_eq!(hearings[0].witnesses[0].name, "Jane Doe");
    }

    #[test]
    fn test_witness_titles_keep_commas() {
        let data = "title,witnesses,witness title\n\
                    Oversight,\"Jane Doe; John Smith\",\"CEO, Acme Corp; Professor\"\n";

        let hearings = load_hearings_csv(data.as_bytes(), Chamber::House).unwrap();
        let witnesses = &hearings[0].witnesses;
        assert_eq!(witnesses[0].title.as_deref(), Some("CEO, Acme Corp"));
        assert_eq!(witnesses[1].title.as_deref(), Some("Professor"));
    }

    #[test]
    fn test_misaligned_witness_titles_are_dropped() {
        // ", Jr." splits off as its own piece, so names and titles no longer line up
        let data = "title,witnesses,witness title\n\
                    Oversight,\"John Smith, Jr.; Jane Doe\",\"Mayor; Professor\"\n";

        let hearings = load_hearings_csv(data.as_bytes(), Chamber::House).unwrap();
        let witnesses = &hearings[0].witnesses;
        assert_eq!(witnesses.len(), 3);
        assert!(witnesses.iter().all(|w| w.title.is_none()));
    }

    #[test]
    fn test_split_multi() {
        assert_eq!(
            split_multi("Jane Doe\nJohn  Smith; Alan Turing | Grace Hopper"),
            vec!["Jane Doe", "John Smith", "Alan Turing", "Grace Hopper"]
        );
        assert_eq!(split_multi("Jane Doe, Jr."), vec!["Jane Doe", "Jr."]);
        assert!(split_multi(" ;\n, ").is_empty());
    }

    #[test]
    fn test_load_senate_csv() {
        let data = "Title,Date,Witnesses,Committee,Tags\n\
                    Budget Review,3/5/24,\"Dr. Jane A. Doe\nJohn Smith\",Budget,\"fiscal; oversight\"\n\
                    Empty Panel,3/6/24,,Budget,\n\
                    Energy Outlook,2024-04-01,Grace Hopper,Energy,\n";

        let hearings = load_hearings_csv(data.as_bytes(), Chamber::Senate).unwrap();

        assert_eq!(hearings.len(), 2);
        let first = &hearings[0];
        assert_eq!(first.id, "senate-1");
        assert_eq!(first.chamber, Chamber::Senate);
        assert_eq!(first.title, "Budget Review");
        assert_eq!(first.date.as_deref(), Some("2024-03-05"));
        assert_eq!(first.committee.as_deref(), Some("Budget"));
        assert_eq!(first.tags, vec!["fiscal", "oversight"]);
        assert_eq!(first.witnesses.len(), 2);
        assert_eq!(first.witnesses[0].name, "Dr. Jane A. Doe");

        // Row numbers are kept even when a row is skipped
        assert_eq!(hearings[1].id, "senate-3");
    }

    #[test]
    fn test_load_csv_with_chamber_and_id_columns() {
        let data = "id,chamber,title,witness,witness title\n\
                    118-77,house,Oversight,\"Jane Doe; John Smith\",\"CEO; Professor\"\n";

        let hearings = load_hearings_csv(data.as_bytes(), Chamber::Senate).unwrap();

        assert_eq!(hearings[0].id, "118-77");
        assert_eq!(hearings[0].chamber, Chamber::House);
        assert_eq!(hearings[0].witnesses[1].title.as_deref(), Some("Professor"));
    }

    #[test]
    fn test_load_csv_requires_witness_column() {
        let data = "title,date\nOversight,2024-01-01\n";
        assert!(load_hearings_csv(data.as_bytes(), Chamber::House).is_err());
    }

    #[test]
    fn test_load_csv_rejects_bad_chamber() {
        let data = "chamber,title,witnesses\njoint,Oversight,Jane Doe\n";
        assert!(load_hearings_csv(data.as_bytes(), Chamber::House).is_err());
    }

    #[test]
    fn test_parse_exclusion_list_shapes() {
        assert_eq!(
            parse_exclusion_list(r#"["John Smith", "Jane Roe"]"#).unwrap(),
            vec!["John Smith", "Jane Roe"]
        );
        assert_eq!(
            parse_exclusion_list(r#"[{"name": "John Smith"}, {"full_name": "Jane Roe"}]"#).unwrap(),
            vec!["John Smith", "Jane Roe"]
        );
        assert_eq!(
            parse_exclusion_list(r#"{"legislators": ["John Smith"]}"#).unwrap(),
            vec!["John Smith"]
        );
        assert!(parse_exclusion_list(r#"[]"#).unwrap().is_empty());
        assert!(parse_exclusion_list("not json").is_err());
    }

    #[test]
    fn test_load_exclusion_list_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"names": ["Sen. John Smith"]}}"#).unwrap();

        let names = load_exclusion_list(file.path()).unwrap();
        assert_eq!(names, vec!["Sen. John Smith"]);
    }
}
