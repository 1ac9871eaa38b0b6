pub mod types;
pub mod time_utils;
pub mod policy;
pub mod catalog;
pub mod store;
pub mod intent;
pub mod controller;
pub mod sync;
pub mod grid;
pub mod session;

pub use catalog::Catalog;
pub use controller::{resolve_click, ClickOutcome, InteractionState, Tool, ToolEvent};
pub use grid::{coverage, render_grid, GridView};
pub use intent::{PaintIntent, WriteIntent};
pub use policy::DefaultWindowPolicy;
pub use session::{load_view, Notification, NotificationLevel, Planner};
pub use store::AssignmentStore;
pub use sync::{SyncLayer, SyncOutcome};
pub use time_utils::{ViewLength, ViewWindow};
pub use types::{Analyst, AssignmentKey, Cluster, ShiftAssignment, ShiftConcept, Team};
