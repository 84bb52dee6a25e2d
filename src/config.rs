use crate::availability::JitterBand;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig, add_weeks};
use crate::mock::{self, CapacityBaseline, OverbookingPolicy};
use crate::model::{PlannedRole, Project, Role, TeamMember};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const MIN_WEEKS: u32 = 1;
pub const MAX_WEEKS: u32 = 52;

/// Environment variable naming a JSON config file for the CLI.
pub const CONFIG_ENV_VAR: &str = "STAFFING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("weeks must be between 1 and 52 (got {0})")]
    WeeksOutOfRange(u32),
    #[error("invalid fte range {min}..{max}")]
    FteRange { min: f64, max: f64 },
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("team member {id} has fte {fte} outside [0, 1]")]
    MemberFte { id: u32, fte: f64 },
}

/// Everything the dashboard needs at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub start_date: NaiveDate,
    pub weeks: u32,
    pub min_fte: f64,
    pub max_fte: f64,
    pub search_text: String,
    pub team_members: Vec<TeamMember>,
    /// `None` uses the sample projects with end dates anchored on `start_date`.
    pub projects: Option<Vec<Project>>,
    pub roles: Vec<Role>,
    /// `None` seeds the book with the sample roles anchored on `start_date`.
    pub planned_roles: Option<Vec<PlannedRole>>,
    /// `None` draws from OS entropy on every regeneration.
    pub seed: Option<u64>,
    pub overbooking: OverbookingPolicy,
    pub availability_jitter: Option<JitterBand>,
    pub capacity_baseline: CapacityBaseline,
    /// `None` uses Mon-Fri with US federal holidays for the window's years.
    pub calendar: Option<WorkCalendarConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::starting_on(Local::now().date_naive())
    }
}

impl DashboardConfig {
    pub fn starting_on(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            weeks: 12,
            min_fte: 0.0,
            max_fte: 1.0,
            search_text: String::new(),
            team_members: mock::default_team_members(),
            projects: None,
            roles: mock::default_roles(),
            planned_roles: None,
            seed: None,
            overbooking: OverbookingPolicy::default(),
            availability_jitter: Some(JitterBand::default()),
            capacity_baseline: CapacityBaseline::default(),
            calendar: None,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from [`CONFIG_ENV_VAR`] when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        add_weeks(self.start_date, self.weeks as i64)
    }

    pub fn resolved_projects(&self) -> Vec<Project> {
        self.projects
            .clone()
            .unwrap_or_else(|| mock::default_projects(self.start_date))
    }

    pub fn initial_planned_roles(&self) -> Vec<PlannedRole> {
        self.planned_roles
            .clone()
            .unwrap_or_else(|| mock::default_planned_roles(self.start_date))
    }

    pub fn work_calendar(&self) -> Result<WorkCalendar, CalendarError> {
        match &self.calendar {
            Some(config) => WorkCalendar::from_config(config),
            None => Ok(WorkCalendar::for_window(self.start_date, self.end_date())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weeks(self.weeks)?;
        validate_fte_range(self.min_fte, self.max_fte)?;

        let mut seen = HashSet::new();
        for member in &self.team_members {
            if !seen.insert(member.id) {
                return Err(ConfigError::DuplicateId {
                    kind: "team member",
                    id: member.id,
                });
            }
            if !member.fte.is_finite() || !(0.0..=1.0).contains(&member.fte) {
                return Err(ConfigError::MemberFte {
                    id: member.id,
                    fte: member.fte,
                });
            }
        }
        if let Some(projects) = &self.projects {
            check_unique("project", projects.iter().map(|p| p.id))?;
        }
        check_unique("role", self.roles.iter().map(|r| r.id))?;
        if let Some(planned) = &self.planned_roles {
            check_unique("planned role", planned.iter().map(|r| r.id))?;
        }
        if let Some(calendar) = &self.calendar {
            WorkCalendar::from_config(calendar)?;
        }
        Ok(())
    }
}

pub fn validate_weeks(weeks: u32) -> Result<(), ConfigError> {
    if (MIN_WEEKS..=MAX_WEEKS).contains(&weeks) {
        Ok(())
    } else {
        Err(ConfigError::WeeksOutOfRange(weeks))
    }
}

pub fn validate_fte_range(min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::FteRange { min, max })
    }
}

fn check_unique(
    kind: &'static str,
    ids: impl Iterator<Item = u32>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId { kind, id });
        }
    }
    Ok(())
}
