use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

use crate::planning::types::{AnalystId, AssignmentKey, ClusterId, ConceptId};

/// Rejections raised by the interaction controller before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("select a brush or the eraser")]
    NoToolSelected,

    #[error("define start and end time")]
    MissingTimeWindow,

    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),

    #[error("start time {start} must be before end time {end}")]
    InvertedWindow { start: String, end: String },

    #[error("clusters can only be attached to a workable shift")]
    ClusterNotAllowed,

    #[error("unknown shift concept {0}")]
    UnknownConcept(ConceptId),

    #[error("unknown cluster {0}")]
    UnknownCluster(ClusterId),

    #[error("analyst {analyst_id} on {date} is not part of the current view")]
    CellOutsideView { analyst_id: AnalystId, date: NaiveDate },
}

/// Violations of the shift assignment invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    #[error("workable shift {code} needs a start and end time")]
    MissingTimes { code: String },

    #[error("shift window {start}-{end} is empty or inverted")]
    InvertedWindow { start: NaiveTime, end: NaiveTime },

    #[error("shift time {0} is not a whole minute")]
    SubMinuteTime(NaiveTime),

    #[error("non-workable shift {code} cannot carry a cluster")]
    ClusterOnNonWorkable { code: String },

    #[error("non-workable shift {code} cannot carry a time window")]
    TimesOnNonWorkable { code: String },
}

/// Failures reported by a [`PlanningRemote`](crate::remote::PlanningRemote)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("not found")]
    NotFound,

    #[error("remote rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("could not decode remote response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Write failures of the sync layer. The assignment store is never touched
/// when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("analyst {} on {} is still being saved", .0.analyst_id, .0.date)]
    WriteInFlight(AssignmentKey),

    #[error("remote write failed: {0}")]
    Remote(#[source] RemoteError),

    #[error("remote returned an invalid assignment: {0}")]
    InvalidResponse(#[from] InvariantError),

    #[error("remote answered for analyst {} on {} instead of the requested cell", .got.analyst_id, .got.date)]
    KeyMismatch {
        expected: AssignmentKey,
        got: AssignmentKey,
    },
}

/// Errors surfaced by a planner session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("failed to load {what}: {source}")]
    Read {
        what: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("remote returned an invalid assignment: {0}")]
    InvalidAssignment(#[source] InvariantError),

    #[error("view window starting {0} runs past the supported date range")]
    WindowOutOfRange(NaiveDate),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl PlannerError {
    pub(crate) fn read(what: &'static str) -> impl FnOnce(RemoteError) -> Self {
        move |source| Self::Read { what, source }
    }
}

/// Errors while loading CSV seed data
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    InvalidRow {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

/// Errors while writing a rendered grid to disk
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
