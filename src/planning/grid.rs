use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::store::AssignmentStore;
use super::time_utils::{format_window, weekday_label, ViewWindow};
use super::types::{Analyst, AnalystId, AssignmentKey, ShiftAssignment, ShiftConcept};

/// Status color of a painted cell, derived from the concept code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Neutral,
    Info,
    Danger,
    Success,
}

impl StatusColor {
    pub fn for_concept(concept: &ShiftConcept) -> Self {
        match concept.code.trim().to_uppercase().as_str() {
            "OFF" => StatusColor::Neutral,
            "VAC" => StatusColor::Info,
            "LIC" => StatusColor::Danger,
            _ => StatusColor::Success,
        }
    }
}

/// Visual encoding of a painted cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellVisual {
    pub code: String,
    pub status: StatusColor,
    /// Left-edge accent (cluster color)
    pub accent: Option<String>,
    /// Faint background derived from the cluster color
    pub fill: Option<String>,
    pub cluster_name: Option<String>,
    pub time_label: Option<String>,
}

impl CellVisual {
    fn for_assignment(assignment: &ShiftAssignment) -> Self {
        let cluster = assignment.cluster.as_ref();
        let time_label = if assignment.concept.is_workable {
            assignment
                .time_window()
                .map(|(start, end)| format_window(start, end))
        } else {
            None
        };
        Self {
            code: assignment.concept.code.clone(),
            status: StatusColor::for_concept(&assignment.concept),
            accent: cluster.map(|c| c.color.clone()),
            fill: cluster.and_then(|c| faint_fill(&c.color)),
            cluster_name: cluster.map(|c| c.name.clone()),
            time_label,
        }
    }

    /// Compact text form: `T1 08:00–18:00 [Norte]`
    pub fn label(&self) -> String {
        let mut label = self.code.clone();
        if let Some(time) = &self.time_label {
            label.push(' ');
            label.push_str(time);
        }
        if let Some(cluster) = &self.cluster_name {
            label.push_str(&format!(" [{cluster}]"));
        }
        label
    }
}

/// `#RRGGBB` plus a low alpha byte; other color notations get no fill
fn faint_fill(color: &str) -> Option<String> {
    let hex = color.strip_prefix('#')?;
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(format!("#{hex}22"))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHeader {
    pub date: NaiveDate,
    pub weekday: &'static str,
    /// `dd/mm`
    pub label: String,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub analyst_id: AnalystId,
    pub date: NaiveDate,
    /// `None` renders the empty placeholder
    pub visual: Option<CellVisual>,
    #[serde(skip)]
    pub assignment: Option<ShiftAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub analyst: Analyst,
    pub cells: Vec<GridCell>,
}

/// A click on a cell, resolved against the rendered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellClick {
    pub key: AssignmentKey,
    pub current: Option<ShiftAssignment>,
}

/// Analyst x day matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridView {
    pub days: Vec<DayHeader>,
    pub rows: Vec<GridRow>,
}

impl GridView {
    pub fn cell(&self, analyst_id: AnalystId, date: NaiveDate) -> Option<&GridCell> {
        self.rows
            .iter()
            .find(|row| row.analyst.id == analyst_id)?
            .cells
            .iter()
            .find(|cell| cell.date == date)
    }

    /// Resolves a click; `None` when the cell is not part of this view
    pub fn click(&self, analyst_id: AnalystId, date: NaiveDate) -> Option<CellClick> {
        self.cell(analyst_id, date).map(|cell| CellClick {
            key: AssignmentKey::new(cell.analyst_id, cell.date),
            current: cell.assignment.clone(),
        })
    }
}

/// Renders the matrix for `analysts` over `window`. Rows keep the analyst
/// order given; columns follow the window.
pub fn render_grid(analysts: &[Analyst], store: &AssignmentStore, window: &ViewWindow) -> GridView {
    let dates = window.dates();
    let days = dates
        .iter()
        .map(|date| DayHeader {
            date: *date,
            weekday: weekday_label(date.weekday()),
            label: date.format("%d/%m").to_string(),
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        })
        .collect();

    let rows = analysts
        .iter()
        .map(|analyst| GridRow {
            analyst: analyst.clone(),
            cells: dates
                .iter()
                .map(|date| {
                    let assignment = store.get(analyst.id, *date).cloned();
                    GridCell {
                        analyst_id: analyst.id,
                        date: *date,
                        visual: assignment.as_ref().map(CellVisual::for_assignment),
                        assignment,
                    }
                })
                .collect(),
        })
        .collect();

    GridView { days, rows }
}

/// Per-day totals of a rendered view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCoverage {
    pub date: NaiveDate,
    pub by_concept: BTreeMap<String, u32>,
    pub by_cluster: BTreeMap<String, u32>,
    pub workable: u32,
    pub empty: u32,
}

/// Counts painted cells per day by concept code and by cluster
pub fn coverage(grid: &GridView) -> Vec<DayCoverage> {
    grid.days
        .iter()
        .enumerate()
        .map(|(column, day)| {
            let mut stats = DayCoverage {
                date: day.date,
                by_concept: BTreeMap::new(),
                by_cluster: BTreeMap::new(),
                workable: 0,
                empty: 0,
            };
            for row in &grid.rows {
                match row.cells.get(column).and_then(|c| c.assignment.as_ref()) {
                    Some(assignment) => {
                        *stats.by_concept.entry(assignment.concept.code.clone()).or_insert(0) += 1;
                        if let Some(cluster) = &assignment.cluster {
                            *stats.by_cluster.entry(cluster.name.clone()).or_insert(0) += 1;
                        }
                        if assignment.concept.is_workable {
                            stats.workable += 1;
                        }
                    }
                    None => stats.empty += 1,
                }
            }
            stats
        })
        .collect()
}
