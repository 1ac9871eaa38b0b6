//! The planning page: catalog, store, toolbar state and view window of one
//! user session, wired to a remote store.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::Catalog;
use super::controller::{resolve_click, ClickOutcome, InteractionState, ToolEvent};
use super::grid::{render_grid, CellClick, GridView};
use super::policy::DefaultWindowPolicy;
use super::store::AssignmentStore;
use super::sync::{SyncLayer, SyncOutcome};
use super::time_utils::{ViewLength, ViewWindow};
use super::types::{Analyst, AnalystId, ClusterId, ConceptId, TeamId};
use crate::error::{PlannerError, ValidationError};
use crate::remote::PlanningRemote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Warning,
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Analysts and assignments of one view window
#[derive(Debug, Clone, Default)]
pub struct LoadedView {
    pub analysts: Vec<Analyst>,
    pub store: AssignmentStore,
}

/// Runs the two range queries of a view and builds a fresh store.
/// Assignments breaking the shift invariants fail the load.
pub async fn load_view(
    remote: &dyn PlanningRemote,
    window: &ViewWindow,
    team: Option<TeamId>,
) -> Result<LoadedView, PlannerError> {
    let (analysts, rows) = tokio::try_join!(
        async {
            remote
                .list_analysts(team)
                .await
                .map_err(PlannerError::read("analysts"))
        },
        async {
            remote
                .list_assignments(window.start(), window.end(), team)
                .await
                .map_err(PlannerError::read("assignments"))
        },
    )?;
    for row in &rows {
        row.validate().map_err(PlannerError::InvalidAssignment)?;
    }
    let store = AssignmentStore::load(&analysts, window, rows);
    Ok(LoadedView { analysts, store })
}

pub struct Planner {
    remote: Arc<dyn PlanningRemote>,
    catalog: Catalog,
    policy: DefaultWindowPolicy,
    analysts: Vec<Analyst>,
    sync: SyncLayer,
    state: InteractionState,
    window: ViewWindow,
    team: Option<TeamId>,
    notifications: Mutex<Vec<Notification>>,
}

impl Planner {
    /// Pending notifications kept before the oldest are dropped
    pub const NOTIFICATION_LIMIT: usize = 32;

    /// Loads the catalog, then the first view. A catalog failure means no
    /// session; a view failure leaves the session with an empty grid.
    pub async fn open(
        remote: Arc<dyn PlanningRemote>,
        window: ViewWindow,
        team: Option<TeamId>,
    ) -> Result<Self, PlannerError> {
        let catalog = Catalog::fetch(remote.as_ref()).await?;
        let store = Arc::new(RwLock::new(AssignmentStore::new()));
        let mut planner = Self {
            sync: SyncLayer::new(remote.clone(), store),
            remote,
            catalog,
            policy: DefaultWindowPolicy::standard(),
            analysts: Vec::new(),
            state: InteractionState::new(),
            window,
            team,
            notifications: Mutex::new(Vec::new()),
        };
        // a failed first load is already queued as a notification
        let _ = planner.refresh().await;
        Ok(planner)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn analysts(&self) -> &[Analyst] {
        &self.analysts
    }

    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn store(&self) -> &Arc<RwLock<AssignmentStore>> {
        self.sync.store()
    }

    /// Reloads analysts and assignments for the current window and team.
    /// On failure the grid is emptied rather than left stale.
    pub async fn refresh(&mut self) -> Result<(), PlannerError> {
        match load_view(self.remote.as_ref(), &self.window, self.team).await {
            Ok(view) => {
                info!(
                    start = %self.window.start(),
                    end = %self.window.end(),
                    analysts = view.analysts.len(),
                    assignments = view.store.len(),
                    "view loaded"
                );
                self.analysts = view.analysts;
                *self.sync.store().write() = view.store;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "view load failed");
                self.analysts.clear();
                *self.sync.store().write() = AssignmentStore::new();
                self.notify(NotificationLevel::Error, err.to_string());
                Err(err)
            }
        }
    }

    pub async fn set_window(&mut self, start: NaiveDate, length: ViewLength) -> Result<(), PlannerError> {
        let window = ViewWindow::new(start, length).ok_or(PlannerError::WindowOutOfRange(start));
        self.move_to(window).await
    }

    pub async fn next_window(&mut self) -> Result<(), PlannerError> {
        let window = self
            .window
            .next()
            .ok_or(PlannerError::WindowOutOfRange(self.window.end()));
        self.move_to(window).await
    }

    pub async fn previous_window(&mut self) -> Result<(), PlannerError> {
        let window = self
            .window
            .previous()
            .ok_or(PlannerError::WindowOutOfRange(self.window.start()));
        self.move_to(window).await
    }

    /// Out-of-range windows keep the current view
    async fn move_to(&mut self, window: Result<ViewWindow, PlannerError>) -> Result<(), PlannerError> {
        match window {
            Ok(window) => {
                self.window = window;
                self.refresh().await
            }
            Err(err) => {
                self.notify(NotificationLevel::Warning, err.to_string());
                Err(err)
            }
        }
    }

    pub async fn set_team(&mut self, team: Option<TeamId>) -> Result<(), PlannerError> {
        self.team = team;
        self.refresh().await
    }

    pub fn select_concept(&mut self, concept_id: ConceptId) -> Result<(), ValidationError> {
        let Some(concept) = self.catalog.concept(concept_id).cloned() else {
            return Err(self.reject(ValidationError::UnknownConcept(concept_id)));
        };
        self.apply(ToolEvent::SelectConcept(concept))
    }

    pub fn select_eraser(&mut self) -> Result<(), ValidationError> {
        self.apply(ToolEvent::SelectEraser)
    }

    pub fn select_cluster(&mut self, cluster_id: Option<ClusterId>) -> Result<(), ValidationError> {
        if let Some(id) = cluster_id {
            if self.catalog.cluster(id).is_none() {
                return Err(self.reject(ValidationError::UnknownCluster(id)));
            }
        }
        self.apply(ToolEvent::SelectCluster(cluster_id))
    }

    pub fn set_start_time(&mut self, value: impl Into<String>) -> Result<(), ValidationError> {
        self.apply(ToolEvent::SetStartTime(value.into()))
    }

    pub fn set_end_time(&mut self, value: impl Into<String>) -> Result<(), ValidationError> {
        self.apply(ToolEvent::SetEndTime(value.into()))
    }

    pub fn reset_tools(&mut self) {
        self.state = InteractionState::new();
    }

    /// Handles a click on a cell of the rendered view: validates, writes,
    /// merges. Cells outside the view are rejected. Validation and remote
    /// failures also land in the notification queue.
    pub async fn click(&self, analyst_id: AnalystId, date: NaiveDate) -> Result<Option<SyncOutcome>, PlannerError> {
        let Some(CellClick { key, current }) = self.grid().click(analyst_id, date) else {
            return Err(self.reject(ValidationError::CellOutsideView { analyst_id, date }).into());
        };

        let intent = match resolve_click(&self.state, key, current.as_ref()) {
            Ok(ClickOutcome::Ignored) => return Ok(None),
            Ok(ClickOutcome::Write(intent)) => intent,
            Err(err) => return Err(self.reject(err).into()),
        };

        match self.sync.dispatch(intent).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                self.notify(NotificationLevel::Error, err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn grid(&self) -> GridView {
        render_grid(&self.analysts, &self.store().read(), &self.window)
    }

    /// Pending notifications, oldest first; at most [`Self::NOTIFICATION_LIMIT`]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Takes the pending notifications, leaving the queue empty
    pub fn drain_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock())
    }

    fn apply(&mut self, event: ToolEvent) -> Result<(), ValidationError> {
        match self.state.apply(event, &self.policy) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: ValidationError) -> ValidationError {
        self.notify(NotificationLevel::Warning, err.to_string());
        err
    }

    fn notify(&self, level: NotificationLevel, message: String) {
        let mut queue = self.notifications.lock();
        if queue.len() >= Self::NOTIFICATION_LIMIT {
            queue.remove(0);
        }
        queue.push(Notification::new(level, message));
    }
}
