use chrono::NaiveDate;
use staffing_planner::mock;
use staffing_planner::{PlannedRoleBook, PlannedRoleDraft, PlannedRoleError};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(role: &str, fte: f64) -> PlannedRoleDraft {
    PlannedRoleDraft {
        role: role.into(),
        project: "API Integration".into(),
        fte,
        start_date: d(2024, 1, 8),
        end_date: d(2024, 2, 15),
    }
}

#[test]
fn add_assigns_increasing_ids() {
    let mut book = PlannedRoleBook::default();
    assert_eq!(book.add(draft("QA Engineer", 0.4)).unwrap().id, 1);
    assert_eq!(book.add(draft("Designer", 0.2)).unwrap().id, 2);
    assert_eq!(book.len(), 2);

    let mut seeded = PlannedRoleBook::new(mock::default_planned_roles(d(2024, 1, 1)));
    assert_eq!(seeded.add(draft("DevOps Engineer", 1.0)).unwrap().id, 4);
}

#[test]
fn add_trims_text_fields() {
    let mut book = PlannedRoleBook::default();
    let mut padded = draft("  QA Engineer ", 0.4);
    padded.project = " API Integration ".into();
    let role = book.add(padded).unwrap();
    assert_eq!(role.role, "QA Engineer");
    assert_eq!(role.project, "API Integration");
}

#[test]
fn invalid_drafts_leave_the_book_untouched() {
    let mut book = PlannedRoleBook::new(mock::default_planned_roles(d(2024, 1, 1)));
    let before = book.clone();

    let err = book.add(draft("", 0.4)).unwrap_err();
    assert_eq!(err, PlannedRoleError::Invalid("role is required".into()));

    let err = book.add(draft("Designer", 0.0)).unwrap_err();
    assert!(matches!(
        err,
        PlannedRoleError::Invalid(ref msg) if msg.starts_with("fte must be greater than 0")
    ));

    let mut reversed = draft("Designer", 0.5);
    reversed.start_date = d(2024, 3, 1);
    let err = book.update(1, reversed).unwrap_err();
    assert!(matches!(err, PlannedRoleError::Invalid(_)));

    assert_eq!(book, before);
}

#[test]
fn update_replaces_fields_and_keeps_id() {
    let mut book = PlannedRoleBook::new(mock::default_planned_roles(d(2024, 1, 1)));
    let updated = book.update(2, draft("Backend Developer", 0.6)).unwrap().clone();
    assert_eq!(updated.id, 2);
    assert_eq!(updated.fte, 0.6);
    assert_eq!(updated.start_date, d(2024, 1, 8));
    assert_eq!(book.get(2), Some(&updated));
    assert_eq!(book.len(), 3);
}

#[test]
fn update_and_delete_report_missing_ids() {
    let mut book = PlannedRoleBook::default();
    assert_eq!(book.update(9, draft("Designer", 0.3)).unwrap_err(), PlannedRoleError::NotFound(9));
    assert_eq!(book.delete(9).unwrap_err(), PlannedRoleError::NotFound(9));
}

#[test]
fn delete_removes_the_role() {
    let mut book = PlannedRoleBook::new(mock::default_planned_roles(d(2024, 1, 1)));
    let removed = book.delete(3).unwrap();
    assert_eq!(removed.role, "Designer");
    assert!(book.get(3).is_none());
    assert_eq!(book.roles().iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(book.add(draft("Designer", 0.3)).unwrap().id, 3);
}

#[test]
fn draft_from_existing_role_round_trips() {
    let roles = mock::default_planned_roles(d(2024, 1, 1));
    let draft = PlannedRoleDraft::from(&roles[0]);
    assert!(draft.validate().is_ok());
    assert_eq!(draft.role, "Frontend Developer");
    assert_eq!(draft.end_date, d(2024, 1, 31));
}
