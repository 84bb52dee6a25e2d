pub mod availability;
pub mod calendar;
pub mod capacity;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod planned_roles;
pub mod random;

pub use availability::{AvailabilityAggregator, JitterBand};
pub use calendar::{WeekHeader, WorkCalendar, WorkCalendarConfig};
pub use capacity::CapacityAggregator;
pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, DashboardError, RefreshSummary};
pub use export::{CsvSink, DataFrameSink, ExportError, ExportKind, ExportTable, TabularSink};
pub use filter::{AvailabilityFilter, SortDirection, SortKey, SortState};
pub use metrics::DashboardMetrics;
pub use mock::{CapacityBaseline, OverbookingPolicy};
pub use model::{
    Allocation, CapacityWeek, PlannedRole, Project, Role, RoleCapacity, RoleCapacityWeek,
    TeamMember, TeamMemberAllocation, WeeklyAvailability,
};
pub use planned_roles::{PlannedRoleBook, PlannedRoleDraft, PlannedRoleError};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
