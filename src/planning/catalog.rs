use tracing::info;

use super::types::{Cluster, ClusterId, ConceptId, ShiftConcept, Team};
use crate::error::PlannerError;
use crate::remote::PlanningRemote;

/// Reference data the grid reads but never writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    concepts: Vec<ShiftConcept>,
    clusters: Vec<Cluster>,
    teams: Vec<Team>,
}

impl Catalog {
    pub fn new(concepts: Vec<ShiftConcept>, clusters: Vec<Cluster>, teams: Vec<Team>) -> Self {
        Self {
            concepts,
            clusters,
            teams,
        }
    }

    /// Fetches concepts, clusters and teams concurrently. Any failure fails
    /// the whole catalog; there is no retry.
    pub async fn fetch(remote: &dyn PlanningRemote) -> Result<Self, PlannerError> {
        let (concepts, clusters, teams) = tokio::try_join!(
            async { remote.list_concepts().await.map_err(PlannerError::read("concepts")) },
            async { remote.list_clusters().await.map_err(PlannerError::read("clusters")) },
            async { remote.list_teams().await.map_err(PlannerError::read("teams")) },
        )?;
        info!(
            concepts = concepts.len(),
            clusters = clusters.len(),
            teams = teams.len(),
            "catalog loaded"
        );
        Ok(Self::new(concepts, clusters, teams))
    }

    pub fn list_concepts(&self) -> &[ShiftConcept] {
        &self.concepts
    }

    pub fn list_clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn list_teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn concept(&self, id: ConceptId) -> Option<&ShiftConcept> {
        self.concepts.iter().find(|c| c.id == id)
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }
}
