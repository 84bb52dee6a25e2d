use crate::availability::{AvailabilityAggregator, JitterBand, window_weeks};
use crate::calendar::{CalendarError, WeekHeader, WorkCalendar, week_headers};
use crate::capacity::{CapacityAggregator, aggregate_role_capacity};
use crate::config::{self, ConfigError, DashboardConfig};
use crate::export::{self, ExportError, ExportKind, ExportTable, TabularSink};
use crate::filter::{self, AvailabilityFilter, SortKey, SortState};
use crate::metrics::DashboardMetrics;
use crate::mock::{CapacityBaseline, OverbookingPolicy};
use crate::model::{
    CapacityWeek, PlannedRole, Project, Role, RoleCapacityWeek, TeamMember, TeamMemberAllocation,
};
use crate::planned_roles::{PlannedRoleBook, PlannedRoleDraft, PlannedRoleError};
use crate::random::SeededRandom;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const AVAILABILITY_SALT: u64 = 0x5eed_0001;
const CAPACITY_SALT: u64 = 0x5eed_0002;
const PLANNED_CAPACITY_SALT: u64 = 0x5eed_0003;
const ROLE_CAPACITY_SALT: u64 = 0x5eed_0004;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    PlannedRole(#[from] PlannedRoleError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to serialize dashboard inputs: {0}")]
    InputKey(#[from] serde_json::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub recomputed: Vec<&'static str>,
    pub member_count: usize,
    pub visible_count: usize,
    pub weeks: u32,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("members={}", self.member_count),
            format!("visible={}", self.visible_count),
            format!("weeks={}", self.weeks),
        ];
        if self.recomputed.is_empty() {
            parts.push("unchanged".to_string());
        } else {
            parts.push(format!("recomputed={}", self.recomputed.join(",")));
        }
        parts.join(", ")
    }
}

/// Cached value tagged with the serialized inputs that produced it.
#[derive(Debug, Clone, Default)]
struct Memo<T> {
    key: Option<String>,
    value: T,
}

impl<T> Memo<T> {
    /// Recomputes only when `key` differs from the stored one.
    fn refresh(&mut self, key: String, compute: impl FnOnce() -> T) -> bool {
        if self.key.as_deref() == Some(key.as_str()) {
            return false;
        }
        self.value = compute();
        self.key = Some(key);
        true
    }
}

#[derive(Serialize)]
struct AvailabilityInputs<'a> {
    start: NaiveDate,
    end: NaiveDate,
    seed: Option<u64>,
    members: &'a [TeamMember],
    projects: &'a [Project],
    overbooking: OverbookingPolicy,
    jitter: Option<JitterBand>,
}

#[derive(Serialize)]
struct CapacityInputs<'a> {
    start: NaiveDate,
    weeks: u32,
    seed: Option<u64>,
    baseline: &'a CapacityBaseline,
    planned_roles: Option<&'a [PlannedRole]>,
}

#[derive(Serialize)]
struct RoleCapacityInputs<'a> {
    start: NaiveDate,
    weeks: u32,
    seed: Option<u64>,
    roles: &'a [Role],
}

fn stream(seed: Option<u64>, salt: u64) -> SeededRandom {
    SeededRandom::from_seed_option(seed.map(|seed| seed ^ salt))
}

/// Session state behind the staffing dashboard: configuration, the
/// planned-role book, the current filter/sort, and memoized aggregates.
pub struct Dashboard {
    config: DashboardConfig,
    calendar: WorkCalendar,
    planned_roles: PlannedRoleBook,
    filter: AvailabilityFilter,
    sort: Option<SortState>,
    availability: Memo<Vec<TeamMemberAllocation>>,
    capacity: Memo<Vec<CapacityWeek>>,
    planned_capacity: Memo<Vec<CapacityWeek>>,
    role_capacity: Memo<Vec<RoleCapacityWeek>>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> DashboardResult<Self> {
        config.validate()?;
        let calendar = config.work_calendar()?;
        let planned_roles = PlannedRoleBook::new(config.initial_planned_roles());
        let filter = AvailabilityFilter {
            search_text: config.search_text.clone(),
            min_fte: config.min_fte,
            max_fte: config.max_fte,
        };

        let mut dashboard = Self {
            config,
            calendar,
            planned_roles,
            filter,
            sort: None,
            availability: Memo::default(),
            capacity: Memo::default(),
            planned_capacity: Memo::default(),
            role_capacity: Memo::default(),
        };
        dashboard.refresh()?;
        Ok(dashboard)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn start_date(&self) -> NaiveDate {
        self.config.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.config.end_date()
    }

    pub fn weeks(&self) -> u32 {
        self.config.weeks
    }

    pub fn filter(&self) -> &AvailabilityFilter {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn planned_roles(&self) -> &[PlannedRole] {
        self.planned_roles.roles()
    }

    pub fn set_start_date(&mut self, date: NaiveDate) -> DashboardResult<RefreshSummary> {
        self.config.start_date = date;
        self.refresh()
    }

    pub fn set_weeks(&mut self, weeks: u32) -> DashboardResult<RefreshSummary> {
        config::validate_weeks(weeks)?;
        self.config.weeks = weeks;
        self.refresh()
    }

    pub fn set_seed(&mut self, seed: Option<u64>) -> DashboardResult<RefreshSummary> {
        self.config.seed = seed;
        self.refresh()
    }

    pub fn set_overbooking(
        &mut self,
        policy: OverbookingPolicy,
    ) -> DashboardResult<RefreshSummary> {
        self.config.overbooking = policy;
        self.refresh()
    }

    pub fn set_fte_range(&mut self, min_fte: f64, max_fte: f64) -> DashboardResult<()> {
        config::validate_fte_range(min_fte, max_fte)?;
        self.filter.min_fte = min_fte;
        self.filter.max_fte = max_fte;
        Ok(())
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.filter.search_text = text.into();
    }

    /// Sorts by `key`, flipping direction when it is already the sort key.
    pub fn sort_by(&mut self, key: SortKey) -> SortState {
        let state = SortState::toggle(self.sort, key);
        self.sort = Some(state);
        state
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn add_planned_role(&mut self, draft: PlannedRoleDraft) -> DashboardResult<PlannedRole> {
        let role = self.planned_roles.add(draft).map_err(Self::log_rejection)?.clone();
        self.refresh()?;
        Ok(role)
    }

    pub fn update_planned_role(
        &mut self,
        id: u32,
        draft: PlannedRoleDraft,
    ) -> DashboardResult<PlannedRole> {
        let role = self
            .planned_roles
            .update(id, draft)
            .map_err(Self::log_rejection)?
            .clone();
        self.refresh()?;
        Ok(role)
    }

    pub fn delete_planned_role(&mut self, id: u32) -> DashboardResult<PlannedRole> {
        let role = self.planned_roles.delete(id).map_err(Self::log_rejection)?;
        self.refresh()?;
        Ok(role)
    }

    fn log_rejection(err: PlannedRoleError) -> PlannedRoleError {
        warn!(error = %err, "planned role edit rejected");
        err
    }

    /// Recomputes every aggregate whose inputs changed since the last call.
    pub fn refresh(&mut self) -> DashboardResult<RefreshSummary> {
        let start = self.config.start_date;
        let end = self.config.end_date();
        let weeks = self.config.weeks;
        let seed = self.config.seed;
        if self.config.calendar.is_none() {
            self.calendar = self.config.work_calendar()?;
        }

        let mut recomputed = Vec::new();

        let projects = self.config.resolved_projects();
        let key = serde_json::to_string(&AvailabilityInputs {
            start,
            end,
            seed,
            members: &self.config.team_members,
            projects: &projects,
            overbooking: self.config.overbooking,
            jitter: self.config.availability_jitter,
        })?;
        let config = &self.config;
        if self.availability.refresh(key, || {
            let aggregator =
                AvailabilityAggregator::new(config.overbooking, config.availability_jitter);
            let mut rng = stream(seed, AVAILABILITY_SALT);
            aggregator.aggregate(start, end, &config.team_members, &projects, &mut rng)
        }) {
            recomputed.push("availability");
        }

        let capacity = CapacityAggregator::new(self.config.capacity_baseline);

        let key = serde_json::to_string(&CapacityInputs {
            start,
            weeks,
            seed,
            baseline: &self.config.capacity_baseline,
            planned_roles: None,
        })?;
        if self.capacity.refresh(key, || {
            capacity.aggregate(start, weeks, None, &mut stream(seed, CAPACITY_SALT))
        }) {
            recomputed.push("capacity");
        }

        let planned = self.planned_roles.roles();
        let key = serde_json::to_string(&CapacityInputs {
            start,
            weeks,
            seed,
            baseline: &self.config.capacity_baseline,
            planned_roles: Some(planned),
        })?;
        if self.planned_capacity.refresh(key, || {
            capacity.aggregate(
                start,
                weeks,
                Some(planned),
                &mut stream(seed, PLANNED_CAPACITY_SALT),
            )
        }) {
            recomputed.push("planned_capacity");
        }

        let roles = &self.config.roles;
        let key = serde_json::to_string(&RoleCapacityInputs {
            start,
            weeks,
            seed,
            roles,
        })?;
        if self.role_capacity.refresh(key, || {
            aggregate_role_capacity(start, weeks, roles, &mut stream(seed, ROLE_CAPACITY_SALT))
        }) {
            recomputed.push("role_capacity");
        }

        let summary = RefreshSummary {
            recomputed,
            member_count: self.availability.value.len(),
            visible_count: self.visible_availability().len(),
            weeks: window_weeks(start, end),
        };
        if summary.recomputed.is_empty() {
            debug!("dashboard inputs unchanged");
        } else {
            info!(summary = %summary.to_cli_summary(), "dashboard refreshed");
        }
        Ok(summary)
    }

    /// All members, unfiltered.
    pub fn availability(&self) -> &[TeamMemberAllocation] {
        &self.availability.value
    }

    /// Members after the current filter and sort.
    pub fn visible_availability(&self) -> Vec<TeamMemberAllocation> {
        filter::apply(&self.availability.value, &self.filter, self.sort)
    }

    pub fn capacity(&self) -> &[CapacityWeek] {
        &self.capacity.value
    }

    pub fn planned_capacity(&self) -> &[CapacityWeek] {
        &self.planned_capacity.value
    }

    pub fn role_capacity(&self) -> &[RoleCapacityWeek] {
        &self.role_capacity.value
    }

    pub fn week_headers(&self) -> Vec<WeekHeader> {
        week_headers(
            self.config.start_date,
            window_weeks(self.config.start_date, self.config.end_date()),
        )
    }

    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::compute(
            &self.availability.value,
            self.planned_roles.roles(),
            &self.calendar,
            self.config.start_date,
            self.config.end_date(),
        )
    }

    /// Flattens the currently displayed data for `kind`.
    pub fn export_table(&self, kind: ExportKind) -> ExportTable {
        match kind {
            ExportKind::Capacity => export::capacity_table(kind, self.capacity()),
            ExportKind::PlannedCapacity => export::capacity_table(kind, self.planned_capacity()),
            ExportKind::Availability => export::availability_table(&self.visible_availability()),
            ExportKind::Roles => export::planned_roles_table(self.planned_roles()),
            ExportKind::RoleCapacity => {
                export::role_capacity_table(self.role_capacity(), &self.config.roles)
            }
        }
    }

    /// Parses `kind`, formats the matching data and hands it to `sink`.
    pub fn export<S: TabularSink + ?Sized>(
        &self,
        kind: &str,
        sink: &mut S,
    ) -> Result<ExportTable, ExportError> {
        let kind = kind.parse::<ExportKind>().inspect_err(|err| {
            warn!(error = %err, "export rejected");
        })?;
        let table = self.export_table(kind);
        sink.write_table(&table)?;
        info!(kind = %kind, rows = table.records.len(), "export complete");
        Ok(table)
    }
}
