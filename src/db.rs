use crate::hearing::{HearingRecord, RawHearingRow, WitnessAppearance};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Row counts for a quick sanity check after import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub hearings: i64,
    pub witnesses: i64,
}

/// Open (or create) a hearing store and make sure the schema exists
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // ==========================================================================
    // Hearings Table (one row per source hearing, fingerprint for idempotency)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS hearings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT UNIQUE NOT NULL,
            chamber TEXT NOT NULL,
            source_hearing_id TEXT NOT NULL,
            title TEXT NOT NULL,
            date TEXT,
            committee TEXT,
            tags TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Witnesses Table (raw names, in source order)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS witnesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hearing_id INTEGER NOT NULL REFERENCES hearings(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            title TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_hearings_chamber ON hearings(chamber)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_witnesses_hearing ON witnesses(hearing_id)",
        [],
    )?;

    Ok(())
}

/// Insert hearings and their witnesses. Hearings already in the store
/// (same fingerprint) are counted as duplicates and left untouched.
pub fn insert_hearings(conn: &Connection, hearings: &[HearingRecord]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    // unchecked_transaction works on a shared connection
    let tx = conn.unchecked_transaction()?;

    for hearing in hearings {
        let tags = serde_json::to_string(&hearing.tags)?;

        let result = tx.execute(
            "INSERT INTO hearings (fingerprint, chamber, source_hearing_id, title, date, committee, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                hearing.fingerprint(),
                hearing.chamber.as_str(),
                hearing.id,
                hearing.title,
                hearing.date,
                hearing.committee,
                tags,
            ],
        );

        match result {
            Ok(_) => {
                let row_id = tx.last_insert_rowid();
                for witness in &hearing.witnesses {
                    tx.execute(
                        "INSERT INTO witnesses (hearing_id, name, title) VALUES (?1, ?2, ?3)",
                        params![row_id, witness.name, witness.title],
                    )?;
                }
                summary.inserted += 1;
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                debug!(hearing = %hearing.id, chamber = %hearing.chamber, "duplicate hearing skipped");
                summary.duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit()?;

    info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        "hearing import finished"
    );

    Ok(summary)
}

/// All stored hearings, in import order, with witnesses in source order
pub fn load_hearings(conn: &Connection) -> Result<Vec<HearingRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, chamber, source_hearing_id, title, date, committee, tags
         FROM hearings
         ORDER BY id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            let row_id: i64 = row.get(0)?;
            let tags_json: Option<String> = row.get(6)?;
            let tags: Vec<String> = tags_json
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default();

            Ok((
                row_id,
                RawHearingRow {
                    chamber: row.get(1)?,
                    id: row.get(2)?,
                    title: row.get(3)?,
                    date: row.get(4)?,
                    committee: row.get(5)?,
                    tags,
                    witnesses: Vec::new(),
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut witness_stmt = conn.prepare(
        "SELECT name, title FROM witnesses WHERE hearing_id = ?1 ORDER BY id",
    )?;

    let mut hearings = Vec::with_capacity(rows.len());
    for (row_id, mut raw) in rows {
        raw.witnesses = witness_stmt
            .query_map(params![row_id], |row| {
                Ok(WitnessAppearance {
                    name: row.get(0)?,
                    title: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let hearing = HearingRecord::try_from(raw)
            .with_context(|| format!("Invalid hearing row {} in store", row_id))?;
        hearings.push(hearing);
    }

    Ok(hearings)
}

pub fn verify_count(conn: &Connection) -> Result<StoreCounts> {
    let hearings: i64 = conn.query_row("SELECT COUNT(*) FROM hearings", [], |row| row.get(0))?;
    let witnesses: i64 = conn.query_row("SELECT COUNT(*) FROM witnesses", [], |row| row.get(0))?;

    Ok(StoreCounts { hearings, witnesses })
}
