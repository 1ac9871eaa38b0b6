//! Tool selection and cell-click resolution.
//!
//! [`InteractionState`] is an immutable value: every transition returns a new
//! state, and [`resolve_click`] turns a click into a [`WriteIntent`] without
//! touching the store or the network.

use super::intent::{PaintIntent, WriteIntent};
use super::policy::{AutoFill, DefaultWindowPolicy};
use super::time_utils::parse_time;
use super::types::{AssignmentKey, ClusterId, ShiftAssignment, ShiftConcept};
use crate::error::ValidationError;

/// The active brush
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    None,
    Concept(ShiftConcept),
    Eraser,
}

/// User actions on the toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolEvent {
    SelectConcept(ShiftConcept),
    SelectEraser,
    SelectCluster(Option<ClusterId>),
    SetStartTime(String),
    SetEndTime(String),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    tool: Tool,
    start_time: String,
    end_time: String,
    cluster_id: Option<ClusterId>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn active_concept(&self) -> Option<&ShiftConcept> {
        match &self.tool {
            Tool::Concept(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn is_eraser(&self) -> bool {
        matches!(self.tool, Tool::Eraser)
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        self.cluster_id
    }

    /// The cluster selector is only enabled for workable concepts
    pub fn cluster_enabled(&self) -> bool {
        self.active_concept().is_some_and(|c| c.is_workable)
    }

    /// Applies one toolbar event, returning the next state
    pub fn apply(&self, event: ToolEvent, policy: &DefaultWindowPolicy) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        match event {
            ToolEvent::SelectConcept(concept) => {
                match policy.resolve(&concept) {
                    AutoFill::Window { start, end } => {
                        next.start_time = start;
                        next.end_time = end;
                    }
                    AutoFill::Clear => {
                        next.start_time.clear();
                        next.end_time.clear();
                    }
                    AutoFill::Keep => {}
                }
                if !concept.is_workable {
                    next.cluster_id = None;
                }
                next.tool = Tool::Concept(concept);
            }
            ToolEvent::SelectEraser => next.tool = Tool::Eraser,
            ToolEvent::SelectCluster(cluster_id) => {
                if cluster_id.is_some() && !self.cluster_enabled() {
                    return Err(ValidationError::ClusterNotAllowed);
                }
                next.cluster_id = cluster_id;
            }
            ToolEvent::SetStartTime(value) => next.start_time = value,
            ToolEvent::SetEndTime(value) => next.end_time = value,
            ToolEvent::Reset => next = Self::default(),
        }
        Ok(next)
    }
}

/// Result of clicking a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing to do (eraser on an empty cell)
    Ignored,
    Write(WriteIntent),
}

/// Turns a click on `key` into a write intent given the cell's current
/// assignment. Painting an occupied cell replaces it wholesale.
pub fn resolve_click(
    state: &InteractionState,
    key: AssignmentKey,
    current: Option<&ShiftAssignment>,
) -> Result<ClickOutcome, ValidationError> {
    let concept = match &state.tool {
        Tool::Eraser => {
            return Ok(match current {
                Some(_) => ClickOutcome::Write(WriteIntent::Erase(key)),
                None => ClickOutcome::Ignored,
            });
        }
        Tool::None => return Err(ValidationError::NoToolSelected),
        Tool::Concept(concept) => concept,
    };

    if !concept.is_workable {
        return Ok(ClickOutcome::Write(WriteIntent::Paint(PaintIntent {
            analyst_id: key.analyst_id,
            date: key.date,
            concept_id: concept.id,
            cluster_id: None,
            start_time: None,
            end_time: None,
        })));
    }

    let (start_raw, end_raw) = (state.start_time.trim(), state.end_time.trim());
    if start_raw.is_empty() || end_raw.is_empty() {
        return Err(ValidationError::MissingTimeWindow);
    }
    let start = parse_time(start_raw).ok_or_else(|| ValidationError::InvalidTime(start_raw.to_string()))?;
    let end = parse_time(end_raw).ok_or_else(|| ValidationError::InvalidTime(end_raw.to_string()))?;
    if start >= end {
        return Err(ValidationError::InvertedWindow {
            start: start_raw.to_string(),
            end: end_raw.to_string(),
        });
    }

    Ok(ClickOutcome::Write(WriteIntent::Paint(PaintIntent {
        analyst_id: key.analyst_id,
        date: key.date,
        concept_id: concept.id,
        cluster_id: state.cluster_id,
        start_time: Some(start),
        end_time: Some(end),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::types::fixtures::*;
    use pretty_assertions::assert_eq;

    fn apply_all(events: Vec<ToolEvent>) -> InteractionState {
        let policy = DefaultWindowPolicy::standard();
        events
            .into_iter()
            .fold(InteractionState::new(), |state, event| state.apply(event, &policy).unwrap())
    }

    fn key(analyst_id: i64, d: u32) -> AssignmentKey {
        AssignmentKey::new(analyst_id, date(2024, 3, d))
    }

    #[test]
    fn eraser_and_concept_exclude_each_other() {
        let state = apply_all(vec![ToolEvent::SelectConcept(t1()), ToolEvent::SelectEraser]);
        assert!(state.is_eraser());
        assert_eq!(state.active_concept(), None);

        let state = apply_all(vec![ToolEvent::SelectEraser, ToolEvent::SelectConcept(t2())]);
        assert!(!state.is_eraser());
        assert_eq!(state.active_concept(), Some(&t2()));
    }

    #[test]
    fn selecting_concepts_auto_fills_times() {
        let state = apply_all(vec![ToolEvent::SelectConcept(t1())]);
        assert_eq!((state.start_time(), state.end_time()), ("08:00", "18:00"));

        let state = apply_all(vec![ToolEvent::SelectConcept(t2())]);
        assert_eq!((state.start_time(), state.end_time()), ("12:00", "22:00"));

        let state = apply_all(vec![ToolEvent::SelectConcept(t1()), ToolEvent::SelectConcept(off())]);
        assert_eq!((state.start_time(), state.end_time()), ("", ""));
    }

    #[test]
    fn unknown_codes_keep_manual_times() {
        let state = apply_all(vec![
            ToolEvent::SetStartTime("06:00".into()),
            ToolEvent::SetEndTime("14:00".into()),
            ToolEvent::SelectConcept(concept(8, "T3", true)),
        ]);
        assert_eq!((state.start_time(), state.end_time()), ("06:00", "14:00"));
    }

    #[test]
    fn cluster_requires_a_workable_concept() {
        let policy = DefaultWindowPolicy::standard();
        let empty = InteractionState::new();
        assert_eq!(
            empty.apply(ToolEvent::SelectCluster(Some(3)), &policy),
            Err(ValidationError::ClusterNotAllowed)
        );

        let off_state = apply_all(vec![ToolEvent::SelectConcept(off())]);
        assert!(!off_state.cluster_enabled());
        assert_eq!(
            off_state.apply(ToolEvent::SelectCluster(Some(3)), &policy),
            Err(ValidationError::ClusterNotAllowed)
        );

        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SelectCluster(Some(3)),
            ToolEvent::SelectConcept(off()),
        ]);
        assert_eq!(state.cluster_id(), None);
    }

    #[test]
    fn eraser_on_empty_cell_is_ignored() {
        let state = apply_all(vec![ToolEvent::SelectEraser]);
        assert_eq!(resolve_click(&state, key(5, 10), None), Ok(ClickOutcome::Ignored));

        let current = day_off(5, date(2024, 3, 10));
        assert_eq!(
            resolve_click(&state, key(5, 10), Some(&current)),
            Ok(ClickOutcome::Write(WriteIntent::Erase(key(5, 10))))
        );
    }

    #[test]
    fn click_without_tool_is_rejected() {
        assert_eq!(
            resolve_click(&InteractionState::new(), key(1, 10), None),
            Err(ValidationError::NoToolSelected)
        );
    }

    #[test]
    fn workable_paint_needs_both_times() {
        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SetEndTime(String::new()),
        ]);
        assert_eq!(
            resolve_click(&state, key(1, 10), None),
            Err(ValidationError::MissingTimeWindow)
        );

        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SetStartTime("19:00".into()),
        ]);
        assert!(matches!(
            resolve_click(&state, key(1, 10), None),
            Err(ValidationError::InvertedWindow { .. })
        ));

        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SetStartTime("8am".into()),
        ]);
        assert_eq!(
            resolve_click(&state, key(1, 10), None),
            Err(ValidationError::InvalidTime("8am".into()))
        );

        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SetStartTime("08:00:10".into()),
            ToolEvent::SetEndTime("08:00:50".into()),
        ]);
        assert_eq!(
            resolve_click(&state, key(1, 10), None),
            Err(ValidationError::InvalidTime("08:00:10".into()))
        );
    }

    #[test]
    fn paint_carries_cluster_and_times_for_workable_concepts() {
        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SelectCluster(Some(3)),
        ]);
        let outcome = resolve_click(&state, key(7, 11), None).unwrap();
        assert_eq!(
            outcome,
            ClickOutcome::Write(WriteIntent::Paint(PaintIntent {
                analyst_id: 7,
                date: date(2024, 3, 11),
                concept_id: t1().id,
                cluster_id: Some(3),
                start_time: Some(time(8, 0)),
                end_time: Some(time(18, 0)),
            }))
        );
    }

    #[test]
    fn non_workable_paint_strips_everything() {
        let state = apply_all(vec![
            ToolEvent::SetStartTime("09:00".into()),
            ToolEvent::SelectConcept(off()),
            ToolEvent::SetEndTime("17:00".into()),
        ]);
        let mut current = workable(7, date(2024, 3, 11), t2());
        current.cluster = Some(cluster(1, "#00aa00"));
        let outcome = resolve_click(&state, key(7, 11), Some(&current)).unwrap();
        assert_eq!(
            outcome,
            ClickOutcome::Write(WriteIntent::Paint(PaintIntent {
                analyst_id: 7,
                date: date(2024, 3, 11),
                concept_id: off().id,
                cluster_id: None,
                start_time: None,
                end_time: None,
            }))
        );
    }

    #[test]
    fn reset_clears_everything() {
        let state = apply_all(vec![
            ToolEvent::SelectConcept(t1()),
            ToolEvent::SelectCluster(Some(2)),
            ToolEvent::Reset,
        ]);
        assert_eq!(state, InteractionState::new());
    }
}
