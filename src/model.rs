use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A person on the team with their nominal full-time-equivalent capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: u32,
    pub name: String,
    pub role: String,
    /// Nominal capacity in `[0, 1]`.
    pub fte: f64,
}

impl TeamMember {
    pub fn new(id: u32, name: impl Into<String>, role: impl Into<String>, fte: f64) -> Self {
        Self {
            id,
            name: name.into(),
            role: role.into(),
            fte,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,
    pub end_date: NaiveDate,
}

impl Project {
    pub fn new(id: u32, name: impl Into<String>, end_date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Role {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A fractional commitment of one team member to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub project_id: u32,
    pub project_name: String,
    /// Committed FTE, in `(0, member.fte]`.
    pub allocation: f64,
    /// First covered week index. `None` together with `duration` means the
    /// allocation spans the whole reporting window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub end_date: NaiveDate,
}

impl Allocation {
    pub fn new(project: &Project, allocation: f64) -> Self {
        Self {
            project_id: project.id,
            project_name: project.name.clone(),
            allocation,
            start_week: None,
            duration: None,
            end_date: project.end_date,
        }
    }

    pub fn for_weeks(mut self, start_week: u32, duration: u32) -> Self {
        self.start_week = Some(start_week);
        self.duration = Some(duration);
        self
    }

    /// Week `w` is covered iff `start_week <= w < start_week + duration`.
    pub fn covers_week(&self, week: u32) -> bool {
        match (self.start_week, self.duration) {
            (Some(start), Some(duration)) => week >= start && week < start + duration,
            (Some(start), None) => week >= start,
            (None, Some(duration)) => week < duration,
            (None, None) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub week: u32,
    pub date: NaiveDate,
    pub available_fte: f64,
}

/// A team member joined with their allocations and derived availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMemberAllocation {
    #[serde(flatten)]
    pub member: TeamMember,
    pub allocations: Vec<Allocation>,
    pub available_fte: f64,
    pub average_available_fte: f64,
    #[serde(default)]
    pub weekly_availability: Vec<WeeklyAvailability>,
}

impl TeamMemberAllocation {
    pub fn project_names(&self) -> Vec<&str> {
        self.allocations
            .iter()
            .map(|a| a.project_name.as_str())
            .collect()
    }

    pub fn week(&self, week: u32) -> Option<&WeeklyAvailability> {
        self.weekly_availability.iter().find(|w| w.week == week)
    }
}

/// A forward-looking staffing need held in the session's planned-role book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRole {
    pub id: u32,
    pub role: String,
    pub fte: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub project: String,
}

impl PlannedRole {
    /// Inclusive on both ends.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityWeek {
    pub week: u32,
    pub date: NaiveDate,
    pub name: String,
    pub total_capacity: f64,
    pub planned_capacity: f64,
    pub net_available: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleCapacity {
    pub capacity: f64,
    pub planned: f64,
    pub available: f64,
}

impl RoleCapacity {
    pub fn new(capacity: f64, planned: f64) -> Self {
        Self {
            capacity,
            planned,
            available: capacity - planned,
        }
    }
}

/// Per-week capacity keyed by role id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCapacityWeek {
    pub week: u32,
    pub date: NaiveDate,
    pub name: String,
    pub roles: BTreeMap<u32, RoleCapacity>,
}

impl RoleCapacityWeek {
    pub fn role(&self, role_id: u32) -> Option<&RoleCapacity> {
        self.roles.get(&role_id)
    }
}

/// Rounds to one decimal place.
pub fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
