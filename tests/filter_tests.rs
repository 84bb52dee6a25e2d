use chrono::NaiveDate;
use staffing_planner::filter::{self, AvailabilityFilter, SortDirection, SortKey, SortState};
use staffing_planner::{Allocation, Project, TeamMember, TeamMemberAllocation};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn row(
    id: u32,
    name: &str,
    role: &str,
    available_fte: f64,
    projects: &[&str],
) -> TeamMemberAllocation {
    let allocations = projects
        .iter()
        .enumerate()
        .map(|(i, name)| Allocation::new(&Project::new(i as u32 + 1, *name, d(2024, 2, 1)), 0.1))
        .collect();
    TeamMemberAllocation {
        member: TeamMember::new(id, name, role, 1.0),
        allocations,
        available_fte,
        average_available_fte: available_fte,
        weekly_availability: Vec::new(),
    }
}

fn names(rows: &[TeamMemberAllocation]) -> Vec<&str> {
    rows.iter().map(|r| r.member.name.as_str()).collect()
}

fn sample_rows() -> Vec<TeamMemberAllocation> {
    vec![
        row(1, "Alex Johnson", "Frontend Developer", 0.0, &["Website Redesign"]),
        row(2, "Sam Williams", "Backend Developer", 0.3, &["API Integration"]),
        row(3, "Jordan Taylor", "Designer", 0.5, &[]),
        row(4, "Casey Parker", "Product Manager", 0.8, &["Website Redesign", "API Integration"]),
    ]
}

#[test]
fn fte_bounds_are_inclusive() {
    let filter = AvailabilityFilter {
        min_fte: 0.3,
        max_fte: 0.8,
        ..AvailabilityFilter::default()
    };
    let visible = filter::apply(&sample_rows(), &filter, None);
    assert_eq!(names(&visible), vec!["Sam Williams", "Jordan Taylor", "Casey Parker"]);
}

#[test]
fn search_matches_role_case_insensitively() {
    let filter = AvailabilityFilter {
        search_text: "design".into(),
        ..AvailabilityFilter::default()
    };
    let visible = filter::apply(&sample_rows(), &filter, None);
    assert_eq!(names(&visible), vec!["Jordan Taylor"]);
}

#[test]
fn search_matches_project_names() {
    let filter = AvailabilityFilter {
        search_text: "WEBSITE".into(),
        ..AvailabilityFilter::default()
    };
    let visible = filter::apply(&sample_rows(), &filter, None);
    assert_eq!(names(&visible), vec!["Alex Johnson", "Casey Parker"]);
}

#[test]
fn empty_search_keeps_every_row_in_range() {
    let visible = filter::apply(&sample_rows(), &AvailabilityFilter::default(), None);
    assert_eq!(visible.len(), 4);
}

#[test]
fn toggling_the_same_key_flips_direction() {
    let first = SortState::toggle(None, SortKey::Name);
    assert_eq!(first.direction, SortDirection::Ascending);

    let second = SortState::toggle(Some(first), SortKey::Name);
    assert_eq!(second.direction, SortDirection::Descending);

    let other = SortState::toggle(Some(second), SortKey::Role);
    assert_eq!(other.key, SortKey::Role);
    assert_eq!(other.direction, SortDirection::Ascending);
}

#[test]
fn sorts_by_available_fte_descending() {
    let sort = SortState {
        key: SortKey::AvailableFte,
        direction: SortDirection::Descending,
    };
    let visible = filter::apply(&sample_rows(), &AvailabilityFilter::default(), Some(sort));
    assert_eq!(
        names(&visible),
        vec!["Casey Parker", "Jordan Taylor", "Sam Williams", "Alex Johnson"]
    );
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let rows = vec![
        row(1, "Quinn Adams", "Frontend Developer", 0.5, &[]),
        row(2, "Alex Johnson", "Frontend Developer", 0.5, &[]),
        row(3, "Riley Morgan", "QA Engineer", 0.5, &[]),
    ];
    let sort = SortState {
        key: SortKey::Role,
        direction: SortDirection::Ascending,
    };
    let visible = filter::apply(&rows, &AvailabilityFilter::default(), Some(sort));
    assert_eq!(names(&visible), vec!["Quinn Adams", "Alex Johnson", "Riley Morgan"]);
}

#[test]
fn applying_twice_changes_nothing() {
    let filter = AvailabilityFilter {
        search_text: "developer".into(),
        min_fte: 0.0,
        max_fte: 0.5,
    };
    let sort = Some(SortState {
        key: SortKey::Name,
        direction: SortDirection::Ascending,
    });
    let once = filter::apply(&sample_rows(), &filter, sort);
    let twice = filter::apply(&once, &filter, sort);
    assert_eq!(once, twice);
    assert_eq!(names(&once), vec!["Alex Johnson", "Sam Williams"]);
}

#[test]
fn sort_keys_parse_from_cli_names() {
    assert_eq!("available".parse::<SortKey>(), Ok(SortKey::AvailableFte));
    assert_eq!("Average".parse::<SortKey>(), Ok(SortKey::AverageAvailableFte));
    assert!("salary".parse::<SortKey>().is_err());
}
