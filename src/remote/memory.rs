use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;

use super::PlanningRemote;
use crate::error::RemoteError;
use crate::planning::intent::PaintIntent;
use crate::planning::types::{
    Analyst, AssignmentKey, Cluster, ClusterId, ConceptId, ShiftAssignment, ShiftConcept, Team,
    TeamId,
};

/// Row as kept by the store, references unresolved
#[derive(Debug, Clone)]
struct StoredAssignment {
    concept_id: ConceptId,
    cluster_id: Option<ClusterId>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
}

/// In-memory backend: reference data plus one assignment table keyed by
/// `(analyst, date)`. Serves the HTTP API and stands in for it in tests.
pub struct MemoryStore {
    teams: Vec<Team>,
    concepts: Vec<ShiftConcept>,
    clusters: Vec<Cluster>,
    analysts: Vec<Analyst>,
    assignments: RwLock<HashMap<AssignmentKey, StoredAssignment>>,
}

impl MemoryStore {
    pub fn new(
        teams: Vec<Team>,
        concepts: Vec<ShiftConcept>,
        clusters: Vec<Cluster>,
        analysts: Vec<Analyst>,
    ) -> Self {
        Self {
            teams,
            concepts,
            clusters,
            analysts,
            assignments: RwLock::new(HashMap::new()),
        }
    }

    /// Validates and stores a write, replacing whatever was at its key
    pub fn upsert(&self, write: &PaintIntent) -> Result<ShiftAssignment, RemoteError> {
        let resolved = self.resolve(write)?;
        self.assignments.write().insert(
            write.key(),
            StoredAssignment {
                concept_id: write.concept_id,
                cluster_id: write.cluster_id,
                start_time: write.start_time,
                end_time: write.end_time,
            },
        );
        Ok(resolved)
    }

    /// Deletes the row at `key`
    pub fn remove(&self, key: AssignmentKey) -> Result<(), RemoteError> {
        self.assignments
            .write()
            .remove(&key)
            .map(|_| ())
            .ok_or(RemoteError::NotFound)
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.read().len()
    }

    fn resolve(&self, write: &PaintIntent) -> Result<ShiftAssignment, RemoteError> {
        if !self.analysts.iter().any(|a| a.id == write.analyst_id) {
            return Err(RemoteError::rejected(422, format!("unknown analyst {}", write.analyst_id)));
        }
        let concept = self
            .concepts
            .iter()
            .find(|c| c.id == write.concept_id)
            .cloned()
            .ok_or_else(|| RemoteError::rejected(422, format!("unknown concept {}", write.concept_id)))?;
        let cluster = match write.cluster_id {
            Some(id) => Some(
                self.clusters
                    .iter()
                    .find(|c| c.id == id)
                    .cloned()
                    .ok_or_else(|| RemoteError::rejected(422, format!("unknown cluster {id}")))?,
            ),
            None => None,
        };
        let assignment = ShiftAssignment {
            analyst_id: write.analyst_id,
            date: write.date,
            concept,
            cluster,
            start_time: write.start_time,
            end_time: write.end_time,
        };
        assignment
            .validate()
            .map_err(|err| RemoteError::rejected(422, err.to_string()))?;
        Ok(assignment)
    }

    fn team_members(&self, team: Option<TeamId>) -> Vec<Analyst> {
        self.analysts
            .iter()
            .filter(|a| team.is_none() || a.team_id == team)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlanningRemote for MemoryStore {
    async fn list_teams(&self) -> Result<Vec<Team>, RemoteError> {
        Ok(self.teams.clone())
    }

    async fn list_concepts(&self) -> Result<Vec<ShiftConcept>, RemoteError> {
        Ok(self.concepts.clone())
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>, RemoteError> {
        Ok(self.clusters.clone())
    }

    async fn list_analysts(&self, team: Option<TeamId>) -> Result<Vec<Analyst>, RemoteError> {
        Ok(self.team_members(team))
    }

    async fn list_assignments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        team: Option<TeamId>,
    ) -> Result<Vec<ShiftAssignment>, RemoteError> {
        let members = self.team_members(team);
        let table = self.assignments.read();
        let mut rows: Vec<ShiftAssignment> = table
            .iter()
            .filter(|(key, _)| key.date >= start && key.date <= end)
            .filter(|(key, _)| members.iter().any(|a| a.id == key.analyst_id))
            .filter_map(|(key, stored)| {
                Some(ShiftAssignment {
                    analyst_id: key.analyst_id,
                    date: key.date,
                    concept: self.concepts.iter().find(|c| c.id == stored.concept_id)?.clone(),
                    cluster: match stored.cluster_id {
                        Some(id) => Some(self.clusters.iter().find(|c| c.id == id)?.clone()),
                        None => None,
                    },
                    start_time: stored.start_time,
                    end_time: stored.end_time,
                })
            })
            .collect();
        rows.sort_by_key(ShiftAssignment::key);
        Ok(rows)
    }

    async fn put_assignment(&self, write: &PaintIntent) -> Result<ShiftAssignment, RemoteError> {
        self.upsert(write)
    }

    async fn delete_assignment(&self, key: AssignmentKey) -> Result<(), RemoteError> {
        self.remove(key)
    }
}
