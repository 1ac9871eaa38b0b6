//! The remote store the planner reads from and writes to.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::RemoteError;
use crate::planning::intent::PaintIntent;
use crate::planning::types::{
    Analyst, AssignmentKey, Cluster, ShiftAssignment, ShiftConcept, Team, TeamId,
};

pub use http::HttpRemote;
pub use memory::MemoryStore;

/// Narrow service interface over the workforce-management backend
#[async_trait]
pub trait PlanningRemote: Send + Sync {
    async fn list_teams(&self) -> Result<Vec<Team>, RemoteError>;

    async fn list_concepts(&self) -> Result<Vec<ShiftConcept>, RemoteError>;

    async fn list_clusters(&self) -> Result<Vec<Cluster>, RemoteError>;

    /// Analysts, optionally restricted to one team
    async fn list_analysts(&self, team: Option<TeamId>) -> Result<Vec<Analyst>, RemoteError>;

    /// Assignments between `start` and `end` (both inclusive)
    async fn list_assignments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team: Option<TeamId>,
    ) -> Result<Vec<ShiftAssignment>, RemoteError>;

    /// Upserts the assignment at the intent's key and returns it resolved
    async fn put_assignment(&self, write: &PaintIntent) -> Result<ShiftAssignment, RemoteError>;

    /// Deletes the assignment at `key`; [`RemoteError::NotFound`] when absent
    async fn delete_assignment(&self, key: AssignmentKey) -> Result<(), RemoteError>;
}
