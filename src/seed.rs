use std::path::{Path, PathBuf};

use csv::{Reader, StringRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::SeedError;
use crate::planning::intent::PaintIntent;
use crate::planning::time_utils::parse_time;
use crate::planning::types::{Analyst, Cluster, ShiftConcept, Team};
use crate::remote::MemoryStore;

/// One line of `assignments.csv`, times as typed (`HH:MM` or empty)
#[derive(Debug, Deserialize)]
struct AssignmentRow {
    analyst_id: i64,
    date: chrono::NaiveDate,
    concept_id: i64,
    cluster_id: Option<i64>,
    start_time: Option<String>,
    end_time: Option<String>,
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1" || lower == "si" || lower == "sí"
}

#[derive(Debug, Deserialize)]
struct ConceptRow {
    id: i64,
    code: String,
    #[serde(default)]
    name: String,
    is_workable: String,
}

#[derive(Debug, Deserialize)]
struct AnalystRow {
    id: i64,
    name: String,
    team_id: Option<i64>,
}

/// Reads every row of a CSV file with headers into `T`
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<(u64, T)>, SeedError> {
    let csv_error = |source| SeedError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = Reader::from_path(path).map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut record = StringRecord::new();
    let mut rows = Vec::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |p| p.line());
        let row: T = record.deserialize(Some(&headers)).map_err(csv_error)?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn without_lines<T>(rows: Vec<(u64, T)>) -> Vec<T> {
    rows.into_iter().map(|(_, row)| row).collect()
}

fn parse_optional_time(
    raw: Option<&str>,
    path: &Path,
    line: u64,
) -> Result<Option<chrono::NaiveTime>, SeedError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_time(text).map(Some).ok_or_else(|| SeedError::InvalidRow {
            path: path.to_path_buf(),
            line,
            message: format!("invalid time `{text}`"),
        }),
    }
}

/// Loads reference data, analysts and (optionally) assignments from a
/// directory of CSV files into a fresh [`MemoryStore`].
///
/// Expected files: `teams.csv`, `concepts.csv`, `clusters.csv`,
/// `analysts.csv` and, if present, `assignments.csv`. Assignment rows go
/// through the same validation as remote writes.
pub fn load_seed<P: AsRef<Path>>(dir: P) -> Result<MemoryStore, SeedError> {
    let dir = dir.as_ref();
    let file = |name: &str| -> PathBuf { dir.join(name) };

    let teams: Vec<Team> = without_lines(read_rows(&file("teams.csv"))?);
    let clusters: Vec<Cluster> = without_lines(read_rows(&file("clusters.csv"))?);
    let concepts: Vec<ShiftConcept> = without_lines(read_rows::<ConceptRow>(&file("concepts.csv"))?)
        .into_iter()
        .map(|row| ShiftConcept {
            id: row.id,
            code: row.code.trim().to_string(),
            name: row.name,
            is_workable: parse_bool(&row.is_workable),
        })
        .collect();
    let analysts: Vec<Analyst> = without_lines(read_rows::<AnalystRow>(&file("analysts.csv"))?)
        .into_iter()
        .map(|row| Analyst {
            id: row.id,
            name: row.name,
            team_id: row.team_id,
        })
        .collect();

    info!(
        teams = teams.len(),
        concepts = concepts.len(),
        clusters = clusters.len(),
        analysts = analysts.len(),
        "seed catalog loaded"
    );
    let store = MemoryStore::new(teams, concepts, clusters, analysts);

    let assignments_path = file("assignments.csv");
    if assignments_path.exists() {
        for (line, row) in read_rows::<AssignmentRow>(&assignments_path)? {
            let write = PaintIntent {
                analyst_id: row.analyst_id,
                date: row.date,
                concept_id: row.concept_id,
                cluster_id: row.cluster_id,
                start_time: parse_optional_time(row.start_time.as_deref(), &assignments_path, line)?,
                end_time: parse_optional_time(row.end_time.as_deref(), &assignments_path, line)?,
            };
            store.upsert(&write).map_err(|err| SeedError::InvalidRow {
                path: assignments_path.clone(),
                line,
                message: err.to_string(),
            })?;
        }
        info!(assignments = store.assignment_count(), "seed assignments loaded");
    }

    Ok(store)
}
