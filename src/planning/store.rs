use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use super::time_utils::ViewWindow;
use super::types::{Analyst, AnalystId, AssignmentKey, ShiftAssignment};

/// Client-side projection of the assignments currently on screen.
///
/// Keyed by `(analyst, date)`, so a key holds at most one assignment. The
/// store remembers the analyst set and window it was loaded for; rows
/// outside that scope never enter through [`AssignmentStore::load`].
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    analysts: BTreeSet<AnalystId>,
    window: Option<ViewWindow>,
    entries: HashMap<AssignmentKey, ShiftAssignment>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a range query result, replacing everything.
    /// Later rows win when the query returns a key twice.
    pub fn load(analysts: &[Analyst], window: &ViewWindow, rows: Vec<ShiftAssignment>) -> Self {
        let analyst_ids: BTreeSet<AnalystId> = analysts.iter().map(|a| a.id).collect();
        let mut entries = HashMap::new();
        for row in rows {
            if analyst_ids.contains(&row.analyst_id) && window.contains(row.date) {
                entries.insert(row.key(), row);
            }
        }
        Self {
            analysts: analyst_ids,
            window: Some(*window),
            entries,
        }
    }

    /// Whether `key` belongs to the analyst set and window of the last load
    pub fn covers(&self, key: &AssignmentKey) -> bool {
        self.analysts.contains(&key.analyst_id)
            && self.window.is_some_and(|w| w.contains(key.date))
    }

    pub fn window(&self) -> Option<&ViewWindow> {
        self.window.as_ref()
    }

    /// Replaces the entry at the assignment's key, returning the old one
    pub fn upsert(&mut self, assignment: ShiftAssignment) -> Option<ShiftAssignment> {
        self.entries.insert(assignment.key(), assignment)
    }

    /// Removes the entry at the key; absent keys are a no-op
    pub fn remove(&mut self, analyst_id: AnalystId, date: NaiveDate) -> Option<ShiftAssignment> {
        self.entries.remove(&AssignmentKey::new(analyst_id, date))
    }

    pub fn get(&self, analyst_id: AnalystId, date: NaiveDate) -> Option<&ShiftAssignment> {
        self.entries.get(&AssignmentKey::new(analyst_id, date))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShiftAssignment> {
        self.entries.values()
    }
}
