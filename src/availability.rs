use crate::calendar::{add_weeks, weeks_between};
use crate::mock::{self, OverbookingPolicy};
use crate::model::{
    Allocation, Project, TeamMember, TeamMemberAllocation, WeeklyAvailability, round_one,
};
use crate::random::RandomSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Multiplicative jitter applied to each week's availability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBand {
    pub min: f64,
    pub max: f64,
}

impl Default for JitterBand {
    fn default() -> Self {
        Self { min: 0.9, max: 1.1 }
    }
}

/// Number of weekly columns for a window; never less than one.
pub fn window_weeks(start: NaiveDate, end: NaiveDate) -> u32 {
    weeks_between(end, start).max(1) as u32
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityAggregator {
    policy: OverbookingPolicy,
    jitter: Option<JitterBand>,
}

impl AvailabilityAggregator {
    pub fn new(policy: OverbookingPolicy, jitter: Option<JitterBand>) -> Self {
        Self { policy, jitter }
    }

    /// Exact arithmetic: no jitter.
    pub fn exact() -> Self {
        Self::new(OverbookingPolicy::Allow, None)
    }

    /// Generates allocations for every member and derives their availability.
    pub fn aggregate<R: RandomSource + ?Sized>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        members: &[TeamMember],
        projects: &[Project],
        rng: &mut R,
    ) -> Vec<TeamMemberAllocation> {
        let num_weeks = window_weeks(start, end);
        debug!(members = members.len(), num_weeks, "aggregating availability");

        let mut rows = Vec::with_capacity(members.len());
        for member in members {
            let allocations =
                mock::generate_allocations(member, projects, num_weeks, self.policy, &mut *rng);
            rows.push(self.evaluate(member, allocations, start, num_weeks, &mut *rng));
        }
        rows
    }

    /// Derives weekly and summary availability for one member's allocations.
    pub fn evaluate<R: RandomSource + ?Sized>(
        &self,
        member: &TeamMember,
        allocations: Vec<Allocation>,
        start: NaiveDate,
        num_weeks: u32,
        rng: &mut R,
    ) -> TeamMemberAllocation {
        let weekly_availability: Vec<WeeklyAvailability> = (0..num_weeks.max(1))
            .map(|week| {
                let committed: f64 = allocations
                    .iter()
                    .filter(|a| a.covers_week(week))
                    .map(|a| a.allocation)
                    .sum();
                let available = round_one(member.fte - committed);
                let factor = match self.jitter {
                    Some(band) => rng.between(band.min, band.max),
                    None => 1.0,
                };
                WeeklyAvailability {
                    week,
                    date: add_weeks(start, week as i64),
                    available_fte: clamp_fte(round_one(available * factor), member.fte),
                }
            })
            .collect();

        let total_allocated: f64 = allocations.iter().map(|a| a.allocation).sum();
        let available_fte = clamp_fte(round_one(member.fte - total_allocated), member.fte);
        let average_available_fte = average(&weekly_availability);

        TeamMemberAllocation {
            member: member.clone(),
            allocations,
            available_fte,
            average_available_fte,
            weekly_availability,
        }
    }
}

/// Adding `0.0` turns a `-0.0` from rounding into `0.0`.
fn clamp_fte(value: f64, fte: f64) -> f64 {
    value.max(0.0).min(fte.max(0.0)) + 0.0
}

fn average(weeks: &[WeeklyAvailability]) -> f64 {
    if weeks.is_empty() {
        return 0.0;
    }
    let sum: f64 = weeks.iter().map(|w| w.available_fte).sum();
    round_one(sum / weeks.len() as f64)
}
