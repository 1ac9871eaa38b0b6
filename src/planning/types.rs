use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time_utils::{hhmm, is_whole_minute};
use crate::error::InvariantError;

pub type AnalystId = i64;
pub type TeamId = i64;
pub type ConceptId = i64;
pub type ClusterId = i64;

/// An analyst shown as one row of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analyst {
    pub id: AnalystId,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// A reusable shift type ("T1", "T2", "OFF", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftConcept {
    pub id: ConceptId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub is_workable: bool,
}

/// Coverage grouping attachable to workable shifts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
    pub color: String,
}

/// Natural key of a shift assignment: one analyst on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentKey {
    pub analyst_id: AnalystId,
    pub date: NaiveDate,
}

impl AssignmentKey {
    pub fn new(analyst_id: AnalystId, date: NaiveDate) -> Self {
        Self { analyst_id, date }
    }
}

/// A concrete shift ("turno") as persisted by the remote store, with concept
/// and cluster resolved to full objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub analyst_id: AnalystId,
    pub date: NaiveDate,
    pub concept: ShiftConcept,
    #[serde(default)]
    pub cluster: Option<Cluster>,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
}

impl ShiftAssignment {
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey::new(self.analyst_id, self.date)
    }

    pub fn concept_id(&self) -> ConceptId {
        self.concept.id
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        self.cluster.as_ref().map(|c| c.id)
    }

    /// Start and end when both are present
    pub fn time_window(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((self.start_time?, self.end_time?))
    }

    /// Checks the workable/non-workable attribute rules
    pub fn validate(&self) -> Result<(), InvariantError> {
        let code = || self.concept.code.clone();
        for time in [self.start_time, self.end_time].into_iter().flatten() {
            if !is_whole_minute(time) {
                return Err(InvariantError::SubMinuteTime(time));
            }
        }
        if self.concept.is_workable {
            match (self.start_time, self.end_time) {
                (Some(start), Some(end)) if start < end => Ok(()),
                (Some(start), Some(end)) => Err(InvariantError::InvertedWindow { start, end }),
                _ => Err(InvariantError::MissingTimes { code: code() }),
            }
        } else if self.cluster.is_some() {
            Err(InvariantError::ClusterOnNonWorkable { code: code() })
        } else if self.start_time.is_some() || self.end_time.is_some() {
            Err(InvariantError::TimesOnNonWorkable { code: code() })
        } else {
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn workable_shift_needs_an_ordered_window() {
        let mut shift = workable(7, date(2024, 3, 11), t1());
        assert!(shift.validate().is_ok());

        shift.end_time = None;
        assert!(matches!(
            shift.validate(),
            Err(InvariantError::MissingTimes { .. })
        ));

        shift.end_time = Some(time(8, 0));
        assert!(matches!(
            shift.validate(),
            Err(InvariantError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn non_workable_shift_carries_nothing() {
        let mut shift = day_off(5, date(2024, 3, 10));
        assert!(shift.validate().is_ok());

        shift.cluster = Some(cluster(1, "#ff0000"));
        assert!(matches!(
            shift.validate(),
            Err(InvariantError::ClusterOnNonWorkable { .. })
        ));

        shift.cluster = None;
        shift.start_time = Some(time(9, 0));
        assert!(matches!(
            shift.validate(),
            Err(InvariantError::TimesOnNonWorkable { .. })
        ));
    }

    #[test]
    fn assignment_json_uses_camel_case_and_hhmm() {
        let mut shift = workable(7, date(2024, 3, 11), t1());
        shift.cluster = Some(cluster(3, "#3366ff"));
        let json = serde_json::to_value(&shift).unwrap();
        assert_eq!(json["analystId"], 7);
        assert_eq!(json["date"], "2024-03-11");
        assert_eq!(json["startTime"], "08:00");
        assert_eq!(json["endTime"], "18:00");
        assert_eq!(json["cluster"]["id"], 3);
        assert_eq!(json["concept"]["isWorkable"], true);
    }

    #[test]
    fn missing_optional_fields_read_as_absent() {
        let json = r#"{
            "analystId": 5,
            "date": "2024-03-10",
            "concept": {"id": 3, "code": "OFF", "isWorkable": false},
            "startTime": ""
        }"#;
        let shift: ShiftAssignment = serde_json::from_str(json).unwrap();
        assert_eq!(shift.cluster, None);
        assert_eq!(shift.start_time, None);
        assert_eq!(shift.end_time, None);
        assert_eq!(shift.key(), AssignmentKey::new(5, date(2024, 3, 10)));
    }

    #[test]
    fn seconds_never_reach_the_wire() {
        let mut shift = workable(7, date(2024, 3, 11), t1());
        shift.start_time = NaiveTime::from_hms_opt(8, 0, 10);
        shift.end_time = NaiveTime::from_hms_opt(8, 0, 50);
        assert_eq!(
            shift.validate(),
            Err(InvariantError::SubMinuteTime(NaiveTime::from_hms_opt(8, 0, 10).unwrap()))
        );

        let json = r#"{
            "analystId": 7,
            "date": "2024-03-11",
            "concept": {"id": 1, "code": "T1", "isWorkable": true},
            "startTime": "08:00:10",
            "endTime": "08:00:50"
        }"#;
        assert!(serde_json::from_str::<ShiftAssignment>(json).is_err());
    }
}
