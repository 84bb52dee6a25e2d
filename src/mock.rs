use crate::model::{Allocation, PlannedRole, Project, Role, TeamMember, round_one};
use crate::random::RandomSource;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Whether generated allocations may push a member past their FTE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverbookingPolicy {
    #[default]
    Allow,
    Forbid,
}

const MAX_PROJECTS_PER_MEMBER: usize = 2;
const MIN_ALLOCATION: f64 = 0.1;
const ALLOCATION_SPREAD: f64 = 0.4;
const MAX_ALLOCATION_WEEKS: u32 = 4;

pub fn default_team_members() -> Vec<TeamMember> {
    vec![
        TeamMember::new(1, "Alex Johnson", "Frontend Developer", 1.0),
        TeamMember::new(2, "Sam Williams", "Backend Developer", 0.8),
        TeamMember::new(3, "Jordan Taylor", "Designer", 0.6),
        TeamMember::new(4, "Casey Parker", "Product Manager", 1.0),
        TeamMember::new(5, "Riley Morgan", "QA Engineer", 0.7),
        TeamMember::new(6, "Jamie Roberts", "DevOps Engineer", 0.9),
        TeamMember::new(7, "Quinn Adams", "Frontend Developer", 1.0),
        TeamMember::new(8, "Avery Martinez", "Backend Developer", 0.8),
        TeamMember::new(9, "Taylor Wilson", "Designer", 0.5),
        TeamMember::new(10, "Morgan Smith", "Product Manager", 0.6),
    ]
}

/// Sample projects with end dates relative to `anchor`.
pub fn default_projects(anchor: NaiveDate) -> Vec<Project> {
    vec![
        Project::new(1, "Website Redesign", anchor + Duration::days(30)),
        Project::new(2, "Mobile App Development", anchor + Duration::days(60)),
        Project::new(3, "API Integration", anchor + Duration::days(45)),
        Project::new(4, "Infrastructure Upgrade", anchor + Duration::days(20)),
    ]
}

pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new(1, "Frontend Developer").with_color("#3498db"),
        Role::new(2, "Backend Developer").with_color("#2ecc71"),
        Role::new(3, "Designer").with_color("#9b59b6"),
        Role::new(4, "Product Manager").with_color("#e74c3c"),
        Role::new(5, "QA Engineer").with_color("#f39c12"),
        Role::new(6, "DevOps Engineer").with_color("#1abc9c"),
    ]
}

pub fn default_planned_roles(anchor: NaiveDate) -> Vec<PlannedRole> {
    vec![
        PlannedRole {
            id: 1,
            role: "Frontend Developer".into(),
            fte: 0.5,
            start_date: anchor,
            end_date: anchor + Duration::days(30),
            project: "Website Redesign".into(),
        },
        PlannedRole {
            id: 2,
            role: "Backend Developer".into(),
            fte: 0.8,
            start_date: anchor + Duration::days(7),
            end_date: anchor + Duration::days(45),
            project: "API Integration".into(),
        },
        PlannedRole {
            id: 3,
            role: "Designer".into(),
            fte: 0.3,
            start_date: anchor,
            end_date: anchor + Duration::days(15),
            project: "Mobile App Development".into(),
        },
    ]
}

/// Assigns 0-2 distinct projects to `member`, each with a random amount in
/// `[0.1, 0.5]` (one decimal), a start week in the first half of the window
/// and a 1-4 week duration clipped to the window.
///
/// Under [`OverbookingPolicy::Forbid`] each amount is capped at the member's
/// remaining FTE and allocations that would fall below 0.1 are dropped.
pub fn generate_allocations<R: RandomSource + ?Sized>(
    member: &TeamMember,
    projects: &[Project],
    num_weeks: u32,
    policy: OverbookingPolicy,
    rng: &mut R,
) -> Vec<Allocation> {
    let num_weeks = num_weeks.max(1);
    let wanted = rng.below(MAX_PROJECTS_PER_MEMBER + 1).min(projects.len());
    let mut candidates: Vec<&Project> = projects.iter().collect();
    let mut remaining = member.fte;
    let mut allocations = Vec::with_capacity(wanted);

    for _ in 0..wanted {
        let project = candidates.remove(rng.below(candidates.len()));
        let mut amount = round_one(rng.between(MIN_ALLOCATION, MIN_ALLOCATION + ALLOCATION_SPREAD));
        let start_week = (rng.next_unit() * (num_weeks as f64 / 2.0)).floor() as u32;
        let duration = 1 + rng.below(MAX_ALLOCATION_WEEKS as usize) as u32;
        let duration = duration.min(num_weeks - start_week);

        if policy == OverbookingPolicy::Forbid {
            amount = amount.min(round_one(remaining));
            if amount < MIN_ALLOCATION {
                continue;
            }
        }
        remaining -= amount;

        allocations.push(Allocation::new(project, amount).for_weeks(start_week, duration));
    }

    allocations
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityBaseline {
    pub total: f64,
    pub planned: f64,
}

impl Default for CapacityBaseline {
    fn default() -> Self {
        Self {
            total: 10.0,
            planned: 6.0,
        }
    }
}

impl CapacityBaseline {
    /// Total capacity jittered to 80-120% of the baseline.
    pub fn sample_total<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        self.total * rng.between(0.8, 1.2)
    }

    /// Planned capacity jittered to 90-120% of the baseline.
    pub fn sample_planned<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        self.planned * rng.between(0.9, 1.2)
    }
}
