use crate::calendar::WorkCalendar;
use crate::model::{PlannedRole, TeamMemberAllocation, round_one};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Headline figures shown above the dashboard tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_fte_days: f64,
    pub active_team_members: usize,
    pub planned_projects: usize,
    pub net_available_fte_days: f64,
}

impl DashboardMetrics {
    /// `end` is exclusive.
    pub fn compute(
        rows: &[TeamMemberAllocation],
        planned_roles: &[PlannedRole],
        calendar: &WorkCalendar,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let window_days = if end > start {
            calendar.count_working_days(start, end - Duration::days(1))
        } else {
            0
        };

        let total_fte_days: f64 = rows.iter().map(|row| row.member.fte * window_days as f64).sum();

        let net_available_fte_days: f64 = rows
            .iter()
            .flat_map(|row| row.weekly_availability.iter())
            .map(|week| week.available_fte * calendar.working_days_in_week(week.date) as f64)
            .sum();

        let active_team_members = rows.iter().filter(|row| !row.allocations.is_empty()).count();

        let planned_projects = planned_roles
            .iter()
            .map(|role| role.project.trim().to_lowercase())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            total_fte_days: round_one(total_fte_days),
            active_team_members,
            planned_projects,
            net_available_fte_days: round_one(net_available_fte_days),
        }
    }
}
