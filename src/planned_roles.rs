use crate::model::PlannedRole;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannedRoleError {
    #[error("invalid planned role: {0}")]
    Invalid(String),
    #[error("planned role {0} not found")]
    NotFound(u32),
}

/// Form contents for creating or editing a planned role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedRoleDraft {
    pub role: String,
    pub project: String,
    pub fte: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PlannedRoleDraft {
    pub fn validate(&self) -> Result<(), PlannedRoleError> {
        if self.role.trim().is_empty() {
            return Err(PlannedRoleError::Invalid("role is required".into()));
        }
        if self.project.trim().is_empty() {
            return Err(PlannedRoleError::Invalid("project is required".into()));
        }
        if !self.fte.is_finite() || self.fte <= 0.0 {
            return Err(PlannedRoleError::Invalid(format!(
                "fte must be greater than 0 (got {})",
                self.fte
            )));
        }
        if self.start_date > self.end_date {
            return Err(PlannedRoleError::Invalid(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    fn into_role(self, id: u32) -> PlannedRole {
        PlannedRole {
            id,
            role: self.role.trim().to_string(),
            fte: self.fte,
            start_date: self.start_date,
            end_date: self.end_date,
            project: self.project.trim().to_string(),
        }
    }
}

impl From<&PlannedRole> for PlannedRoleDraft {
    fn from(role: &PlannedRole) -> Self {
        Self {
            role: role.role.clone(),
            project: role.project.clone(),
            fte: role.fte,
            start_date: role.start_date,
            end_date: role.end_date,
        }
    }
}

/// Session-scoped list of planned roles. Edits that fail validation leave
/// the book untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannedRoleBook {
    roles: Vec<PlannedRole>,
}

impl PlannedRoleBook {
    pub fn new(roles: Vec<PlannedRole>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &[PlannedRole] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&PlannedRole> {
        self.roles.iter().find(|role| role.id == id)
    }

    fn next_id(&self) -> u32 {
        self.roles.iter().map(|role| role.id).max().map_or(1, |max| max + 1)
    }

    pub fn add(&mut self, draft: PlannedRoleDraft) -> Result<&PlannedRole, PlannedRoleError> {
        draft.validate()?;
        let id = self.next_id();
        info!(id, role = %draft.role, project = %draft.project, "planned role added");
        self.roles.push(draft.into_role(id));
        Ok(&self.roles[self.roles.len() - 1])
    }

    pub fn update(
        &mut self,
        id: u32,
        draft: PlannedRoleDraft,
    ) -> Result<&PlannedRole, PlannedRoleError> {
        draft.validate()?;
        let slot = self
            .roles
            .iter_mut()
            .find(|role| role.id == id)
            .ok_or(PlannedRoleError::NotFound(id))?;
        *slot = draft.into_role(id);
        info!(id, "planned role updated");
        Ok(&*slot)
    }

    pub fn delete(&mut self, id: u32) -> Result<PlannedRole, PlannedRoleError> {
        let idx = self
            .roles
            .iter()
            .position(|role| role.id == id)
            .ok_or(PlannedRoleError::NotFound(id))?;
        info!(id, "planned role deleted");
        Ok(self.roles.remove(idx))
    }
}
