use crate::model::TeamMemberAllocation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityFilter {
    pub search_text: String,
    pub min_fte: f64,
    pub max_fte: f64,
}

impl Default for AvailabilityFilter {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            min_fte: 0.0,
            max_fte: 1.0,
        }
    }
}

impl AvailabilityFilter {
    /// FTE bound is inclusive on both ends; search is a case-insensitive
    /// substring match on name, role or any allocated project.
    pub fn matches(&self, row: &TeamMemberAllocation) -> bool {
        if row.available_fte < self.min_fte || row.available_fte > self.max_fte {
            return false;
        }

        let needle = self.search_text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        row.member.name.to_lowercase().contains(&needle)
            || row.member.role.to_lowercase().contains(&needle)
            || row
                .allocations
                .iter()
                .any(|a| a.project_name.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Role,
    Fte,
    AvailableFte,
    AverageAvailableFte,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Role => "role",
            SortKey::Fte => "fte",
            SortKey::AvailableFte => "available",
            SortKey::AverageAvailableFte => "average",
        }
    }

    fn compare(&self, a: &TeamMemberAllocation, b: &TeamMemberAllocation) -> Ordering {
        match self {
            SortKey::Name => a.member.name.cmp(&b.member.name),
            SortKey::Role => a.member.role.cmp(&b.member.role),
            SortKey::Fte => compare_f64(a.member.fte, b.member.fte),
            SortKey::AvailableFte => compare_f64(a.available_fte, b.available_fte),
            SortKey::AverageAvailableFte => {
                compare_f64(a.average_available_fte, b.average_available_fte)
            }
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "role" => Ok(SortKey::Role),
            "fte" => Ok(SortKey::Fte),
            "available" | "available_fte" => Ok(SortKey::AvailableFte),
            "average" | "average_available_fte" => Ok(SortKey::AverageAvailableFte),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Selecting the current key flips direction; a new key starts ascending.
    pub fn toggle(current: Option<SortState>, key: SortKey) -> SortState {
        match current {
            Some(state) if state.key == key => SortState {
                key,
                direction: state.direction.reversed(),
            },
            _ => SortState {
                key,
                direction: SortDirection::Ascending,
            },
        }
    }
}

/// Unordered pairs (NaN) compare equal, so the stable sort keeps them in place.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Filters then stable-sorts `rows`. Applying the same configuration to its
/// own output returns it unchanged.
pub fn apply(
    rows: &[TeamMemberAllocation],
    filter: &AvailabilityFilter,
    sort: Option<SortState>,
) -> Vec<TeamMemberAllocation> {
    let mut visible: Vec<TeamMemberAllocation> =
        rows.iter().filter(|row| filter.matches(row)).cloned().collect();

    if let Some(state) = sort {
        visible.sort_by(|a, b| {
            let ordering = state.key.compare(a, b);
            match state.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    visible
}
