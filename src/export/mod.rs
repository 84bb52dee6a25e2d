use crate::model::{
    CapacityWeek, PlannedRole, Role, RoleCapacityWeek, TeamMemberAllocation, round_one,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;

pub mod sink;

pub use sink::{CsvSink, DataFrameSink, TabularSink};

/// Availability at or below this is reported as "Limited".
pub const LIMITED_THRESHOLD: f64 = 0.3;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export type '{0}'")]
    UnknownKind(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// One flat row: ordered label/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    fields: Vec<(String, String)>,
}

impl ExportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((label.into(), value.into()));
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// A named sheet ready for a [`TabularSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub filename: String,
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub records: Vec<ExportRecord>,
}

impl ExportTable {
    pub fn new(
        filename: impl Into<String>,
        sheet_name: impl Into<String>,
        columns: Vec<String>,
        records: Vec<ExportRecord>,
    ) -> Self {
        Self {
            filename: filename.into(),
            sheet_name: sheet_name.into(),
            columns,
            records,
        }
    }

    /// Values of `record` in column order; missing labels become empty.
    pub fn row_values<'a>(&'a self, record: &'a ExportRecord) -> Vec<&'a str> {
        self.columns
            .iter()
            .map(|column| record.get(column).unwrap_or(""))
            .collect()
    }

    /// All-string frame with one column per export label.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values: Vec<&str> = self
                    .records
                    .iter()
                    .map(|record| record.get(column).unwrap_or(""))
                    .collect();
                Series::new(PlSmallStr::from(column.as_str()), values).into_column()
            })
            .collect::<Vec<Column>>();
        DataFrame::new(columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Capacity,
    Availability,
    PlannedCapacity,
    Roles,
    RoleCapacity,
}

impl ExportKind {
    pub const ALL: [ExportKind; 5] = [
        ExportKind::Capacity,
        ExportKind::Availability,
        ExportKind::PlannedCapacity,
        ExportKind::Roles,
        ExportKind::RoleCapacity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Capacity => "capacity",
            ExportKind::Availability => "availability",
            ExportKind::PlannedCapacity => "planned-capacity",
            ExportKind::Roles => "roles",
            ExportKind::RoleCapacity => "role-capacity",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ExportKind::Capacity => "Total_FTE_Availability",
            ExportKind::Availability => "Filtered_Availability_Data",
            ExportKind::PlannedCapacity => "Total_FTE_Capacity_Planned_Usage",
            ExportKind::Roles => "Role_Based_FTE_Availability",
            ExportKind::RoleCapacity => "Role_Capacity_By_Week",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            ExportKind::Capacity => "Capacity",
            ExportKind::Availability => "Availability",
            ExportKind::PlannedCapacity => "PlannedCapacity",
            ExportKind::Roles => "Roles",
            ExportKind::RoleCapacity => "RoleCapacity",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ExportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ExportError::UnknownKind(s.to_string()))
    }
}

/// One decimal, ties rounded away from zero; never prints `-0.0`.
pub fn format_one(value: f64) -> String {
    format!("{:.1}", round_one(value) + 0.0)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

const CAPACITY_COLUMNS: [&str; 4] = ["Week", "Total Capacity", "Planned Capacity", "Net Available"];

pub fn format_capacity(weeks: &[CapacityWeek]) -> Vec<ExportRecord> {
    weeks
        .iter()
        .map(|week| {
            ExportRecord::new()
                .with("Week", week.name.clone())
                .with("Total Capacity", format_one(week.total_capacity))
                .with("Planned Capacity", format_one(week.planned_capacity))
                .with("Net Available", format_one(week.net_available))
        })
        .collect()
}

const AVAILABILITY_COLUMNS: [&str; 8] = [
    "Name",
    "Role",
    "Status",
    "Start Date",
    "End Date",
    "FTE",
    "Available FTE",
    "Projects",
];

pub fn availability_status(available_fte: f64) -> &'static str {
    if available_fte > LIMITED_THRESHOLD {
        "Available"
    } else {
        "Limited"
    }
}

/// Start/end dates are the first and last weekly columns of the row.
pub fn format_availability(rows: &[TeamMemberAllocation]) -> Vec<ExportRecord> {
    rows.iter()
        .map(|row| {
            let first = row.weekly_availability.first().map(|w| format_date(w.date));
            let last = row.weekly_availability.last().map(|w| format_date(w.date));
            ExportRecord::new()
                .with("Name", row.member.name.clone())
                .with("Role", row.member.role.clone())
                .with("Status", availability_status(row.available_fte))
                .with("Start Date", first.unwrap_or_default())
                .with("End Date", last.unwrap_or_default())
                .with("FTE", format_one(row.member.fte))
                .with("Available FTE", format_one(row.available_fte))
                .with("Projects", row.project_names().join(", "))
        })
        .collect()
}

const PLANNED_ROLE_COLUMNS: [&str; 6] = ["ID", "Role", "Project", "Start Date", "End Date", "FTE"];

pub fn format_planned_roles(roles: &[PlannedRole]) -> Vec<ExportRecord> {
    roles
        .iter()
        .map(|role| {
            ExportRecord::new()
                .with("ID", role.id.to_string())
                .with("Role", role.role.clone())
                .with("Project", role.project.clone())
                .with("Start Date", format_date(role.start_date))
                .with("End Date", format_date(role.end_date))
                .with("FTE", format_one(role.fte))
        })
        .collect()
}

fn role_capacity_columns(roles: &[Role]) -> Vec<String> {
    let mut columns = vec!["Week".to_string()];
    for role in roles {
        columns.push(format!("{} Capacity", role.name));
        columns.push(format!("{} Planned", role.name));
        columns.push(format!("{} Available", role.name));
    }
    columns
}

pub fn format_role_capacity(weeks: &[RoleCapacityWeek], roles: &[Role]) -> Vec<ExportRecord> {
    weeks
        .iter()
        .map(|week| {
            let mut record = ExportRecord::new().with("Week", week.name.clone());
            for role in roles {
                if let Some(capacity) = week.role(role.id) {
                    record = record
                        .with(format!("{} Capacity", role.name), format_one(capacity.capacity))
                        .with(format!("{} Planned", role.name), format_one(capacity.planned))
                        .with(format!("{} Available", role.name), format_one(capacity.available));
                }
            }
            record
        })
        .collect()
}

fn columns(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|label| label.to_string()).collect()
}

pub fn capacity_table(kind: ExportKind, weeks: &[CapacityWeek]) -> ExportTable {
    ExportTable::new(
        kind.filename(),
        kind.sheet_name(),
        columns(&CAPACITY_COLUMNS),
        format_capacity(weeks),
    )
}

pub fn availability_table(rows: &[TeamMemberAllocation]) -> ExportTable {
    let kind = ExportKind::Availability;
    ExportTable::new(
        kind.filename(),
        kind.sheet_name(),
        columns(&AVAILABILITY_COLUMNS),
        format_availability(rows),
    )
}

pub fn planned_roles_table(roles: &[PlannedRole]) -> ExportTable {
    let kind = ExportKind::Roles;
    ExportTable::new(
        kind.filename(),
        kind.sheet_name(),
        columns(&PLANNED_ROLE_COLUMNS),
        format_planned_roles(roles),
    )
}

pub fn role_capacity_table(weeks: &[RoleCapacityWeek], roles: &[Role]) -> ExportTable {
    let kind = ExportKind::RoleCapacity;
    ExportTable::new(
        kind.filename(),
        kind.sheet_name(),
        role_capacity_columns(roles),
        format_role_capacity(weeks, roles),
    )
}
