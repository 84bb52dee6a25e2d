use crate::calendar::{add_weeks, week_label};
use crate::mock::CapacityBaseline;
use crate::model::{CapacityWeek, PlannedRole, Role, RoleCapacity, RoleCapacityWeek};
use crate::random::RandomSource;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

const ROLE_CAPACITY_MIN: f64 = 1.5;
const ROLE_CAPACITY_MAX: f64 = 3.5;
const ROLE_PLANNED_MIN: f64 = 0.5;
const ROLE_PLANNED_MAX: f64 = 0.9;

/// Sum of `fte` over planned roles active on `date`.
pub fn planned_capacity_on(planned_roles: &[PlannedRole], date: NaiveDate) -> f64 {
    planned_roles
        .iter()
        .filter(|role| role.is_active_on(date))
        .fold(0.0, |total, role| total + role.fte)
}

#[derive(Debug, Clone, Default)]
pub struct CapacityAggregator {
    baseline: CapacityBaseline,
}

impl CapacityAggregator {
    pub fn new(baseline: CapacityBaseline) -> Self {
        Self { baseline }
    }

    /// One record per week. With a non-empty `planned_roles` the planned
    /// figure is the sum of active roles; otherwise a jittered baseline is used.
    pub fn aggregate<R: RandomSource + ?Sized>(
        &self,
        start: NaiveDate,
        num_weeks: u32,
        planned_roles: Option<&[PlannedRole]>,
        rng: &mut R,
    ) -> Vec<CapacityWeek> {
        let planned_roles = planned_roles.filter(|roles| !roles.is_empty());
        debug!(num_weeks, driven = planned_roles.is_some(), "aggregating capacity");
        (0..num_weeks)
            .map(|week| {
                let date = add_weeks(start, week as i64);
                let total_capacity = self.baseline.sample_total(&mut *rng);
                let planned_capacity = match planned_roles {
                    Some(roles) => planned_capacity_on(roles, date),
                    None => self.baseline.sample_planned(&mut *rng),
                };
                CapacityWeek {
                    week,
                    date,
                    name: week_label(date),
                    total_capacity,
                    planned_capacity,
                    net_available: total_capacity - planned_capacity,
                }
            })
            .collect()
    }
}

/// Per-role capacity with planned usage at 50-90% of capacity.
pub fn aggregate_role_capacity<R: RandomSource + ?Sized>(
    start: NaiveDate,
    num_weeks: u32,
    roles: &[Role],
    rng: &mut R,
) -> Vec<RoleCapacityWeek> {
    debug!(num_weeks, roles = roles.len(), "aggregating role capacity");
    (0..num_weeks)
        .map(|week| {
            let date = add_weeks(start, week as i64);
            let roles = roles
                .iter()
                .map(|role| {
                    let capacity = rng.between(ROLE_CAPACITY_MIN, ROLE_CAPACITY_MAX);
                    let planned = capacity * rng.between(ROLE_PLANNED_MIN, ROLE_PLANNED_MAX);
                    (role.id, RoleCapacity::new(capacity, planned))
                })
                .collect::<BTreeMap<_, _>>();
            RoleCapacityWeek {
                week,
                date,
                name: week_label(date),
                roles,
            }
        })
        .collect()
}
