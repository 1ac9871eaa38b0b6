use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time_utils::hhmm;
use super::types::{AnalystId, AssignmentKey, ClusterId, ConceptId};

/// Create-or-replace request for one cell. Also the body of a remote upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintIntent {
    pub analyst_id: AnalystId,
    pub date: NaiveDate,
    pub concept_id: ConceptId,
    #[serde(default)]
    pub cluster_id: Option<ClusterId>,
    #[serde(default, with = "hhmm")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    pub end_time: Option<NaiveTime>,
}

impl PaintIntent {
    pub fn key(&self) -> AssignmentKey {
        AssignmentKey::new(self.analyst_id, self.date)
    }
}

/// A validated write produced by a cell click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteIntent {
    Paint(PaintIntent),
    Erase(AssignmentKey),
}

impl WriteIntent {
    pub fn key(&self) -> AssignmentKey {
        match self {
            WriteIntent::Paint(paint) => paint.key(),
            WriteIntent::Erase(key) => *key,
        }
    }
}
