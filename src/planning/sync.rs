//! Applies write intents to the remote store and merges the confirmed
//! result into the local assignment store.
//!
//! Nothing is written locally before the remote answers: on failure the
//! store is exactly what it was before the click. A key with a write in
//! flight refuses further writes until that write settles.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::intent::{PaintIntent, WriteIntent};
use super::store::AssignmentStore;
use super::types::{AssignmentKey, ShiftAssignment};
use crate::error::{RemoteError, SyncError};
use crate::remote::PlanningRemote;

/// What a confirmed write did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Painted(ShiftAssignment),
    Erased(AssignmentKey),
}

pub struct SyncLayer {
    remote: Arc<dyn PlanningRemote>,
    store: Arc<RwLock<AssignmentStore>>,
    in_flight: Mutex<HashSet<AssignmentKey>>,
}

/// Releases a claimed key when the write settles, whatever the outcome
struct InFlightGuard<'a> {
    keys: &'a Mutex<HashSet<AssignmentKey>>,
    key: AssignmentKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.keys.lock().remove(&self.key);
    }
}

impl SyncLayer {
    pub fn new(remote: Arc<dyn PlanningRemote>, store: Arc<RwLock<AssignmentStore>>) -> Self {
        Self {
            remote,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<RwLock<AssignmentStore>> {
        &self.store
    }

    /// Whether a write for `key` is waiting on the remote
    pub fn is_pending(&self, key: &AssignmentKey) -> bool {
        self.in_flight.lock().contains(key)
    }

    /// Executes one intent; exactly one store mutation happens on success
    pub async fn dispatch(&self, intent: WriteIntent) -> Result<SyncOutcome, SyncError> {
        match intent {
            WriteIntent::Paint(paint) => self.apply_paint(paint).await.map(SyncOutcome::Painted),
            WriteIntent::Erase(key) => self.apply_erase(key).await.map(|()| SyncOutcome::Erased(key)),
        }
    }

    pub async fn apply_paint(&self, intent: PaintIntent) -> Result<ShiftAssignment, SyncError> {
        let key = intent.key();
        let _guard = self.claim(key)?;
        debug!(analyst_id = key.analyst_id, date = %key.date, concept_id = intent.concept_id, "painting cell");

        let assignment = self.remote.put_assignment(&intent).await.map_err(|err| {
            warn!(analyst_id = key.analyst_id, date = %key.date, error = %err, "paint rejected by remote");
            SyncError::Remote(err)
        })?;

        if assignment.key() != key {
            return Err(SyncError::KeyMismatch {
                expected: key,
                got: assignment.key(),
            });
        }
        assignment.validate()?;

        let mut store = self.store.write();
        if store.covers(&key) {
            store.upsert(assignment.clone());
        } else {
            debug!(analyst_id = key.analyst_id, date = %key.date, "painted cell left the view before the write settled");
        }
        info!(analyst_id = key.analyst_id, date = %key.date, code = %assignment.concept.code, "cell painted");
        Ok(assignment)
    }

    pub async fn apply_erase(&self, key: AssignmentKey) -> Result<(), SyncError> {
        let _guard = self.claim(key)?;
        debug!(analyst_id = key.analyst_id, date = %key.date, "erasing cell");

        match self.remote.delete_assignment(key).await {
            Ok(()) => {}
            Err(RemoteError::NotFound) => {
                debug!(analyst_id = key.analyst_id, date = %key.date, "remote had nothing to erase");
            }
            Err(err) => {
                warn!(analyst_id = key.analyst_id, date = %key.date, error = %err, "erase rejected by remote");
                return Err(SyncError::Remote(err));
            }
        }

        self.store.write().remove(key.analyst_id, key.date);
        info!(analyst_id = key.analyst_id, date = %key.date, "cell erased");
        Ok(())
    }

    fn claim(&self, key: AssignmentKey) -> Result<InFlightGuard<'_>, SyncError> {
        let mut keys = self.in_flight.lock();
        if !keys.insert(key) {
            debug!(analyst_id = key.analyst_id, date = %key.date, "write refused, cell still saving");
            return Err(SyncError::WriteInFlight(key));
        }
        Ok(InFlightGuard {
            keys: &self.in_flight,
            key,
        })
    }
}
