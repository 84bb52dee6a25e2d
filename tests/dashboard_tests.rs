use chrono::{NaiveDate, Weekday};
use staffing_planner::calendar::WorkCalendarConfig;
use staffing_planner::config::ConfigError;
use staffing_planner::export::{DataFrameSink, ExportError, ExportKind};
use staffing_planner::planned_roles::PlannedRoleError;
use staffing_planner::{
    Allocation, Dashboard, DashboardConfig, DashboardError, DashboardMetrics, PlannedRole,
    PlannedRoleDraft, Project, SortKey, TeamMember, TeamMemberAllocation, WeeklyAvailability,
    WorkCalendar, logging,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn seeded_config() -> DashboardConfig {
    let mut config = DashboardConfig::starting_on(d(2024, 1, 1));
    config.weeks = 8;
    config.seed = Some(42);
    config
}

#[test]
fn refresh_without_changes_is_a_no_op() {
    logging::init_test();
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let summary = dashboard.refresh().unwrap();
    assert!(summary.recomputed.is_empty());
    assert_eq!(summary.to_cli_summary(), "members=10, visible=10, weeks=8, unchanged");
}

#[test]
fn view_changes_do_not_regenerate_data() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let before = dashboard.availability().to_vec();

    dashboard.set_search_text("designer");
    dashboard.set_fte_range(0.0, 0.5).unwrap();
    dashboard.sort_by(SortKey::Name);

    assert!(dashboard.refresh().unwrap().recomputed.is_empty());
    assert_eq!(dashboard.availability(), before.as_slice());
}

#[test]
fn reseeding_recomputes_every_aggregate() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let summary = dashboard.set_seed(Some(43)).unwrap();
    assert_eq!(
        summary.recomputed,
        vec!["availability", "capacity", "planned_capacity", "role_capacity"]
    );
}

#[test]
fn same_seed_gives_identical_dashboards() {
    let first = Dashboard::new(seeded_config()).unwrap();
    let second = Dashboard::new(seeded_config()).unwrap();
    assert_eq!(first.availability(), second.availability());
    assert_eq!(first.capacity(), second.capacity());
    assert_eq!(first.role_capacity(), second.role_capacity());
}

#[test]
fn planned_role_edits_only_touch_planned_capacity() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let availability = dashboard.availability().to_vec();
    let capacity = dashboard.capacity().to_vec();

    assert!(approx(dashboard.planned_capacity()[0].planned_capacity, 0.8));
    assert!(approx(dashboard.planned_capacity()[1].planned_capacity, 1.6));

    let role = dashboard
        .add_planned_role(PlannedRoleDraft {
            role: "DevOps Engineer".into(),
            project: "Infrastructure Upgrade".into(),
            fte: 1.0,
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 7),
        })
        .unwrap();
    assert_eq!(role.id, 4);

    assert!(approx(dashboard.planned_capacity()[0].planned_capacity, 1.8));
    assert!(approx(dashboard.planned_capacity()[1].planned_capacity, 1.6));
    assert_eq!(dashboard.availability(), availability.as_slice());
    assert_eq!(dashboard.capacity(), capacity.as_slice());

    dashboard.delete_planned_role(4).unwrap();
    assert!(approx(dashboard.planned_capacity()[0].planned_capacity, 0.8));
}

#[test]
fn deleting_every_planned_role_restores_the_baseline() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    for id in 1..=3 {
        dashboard.delete_planned_role(id).unwrap();
    }
    assert!(dashboard.planned_roles().is_empty());
    for week in dashboard.planned_capacity() {
        assert!(week.planned_capacity >= 5.4 && week.planned_capacity < 7.2);
    }
}

#[test]
fn planned_capacity_export_has_no_negative_zero() {
    let mut config = seeded_config();
    config.weeks = 12;
    let dashboard = Dashboard::new(config).unwrap();
    let table = dashboard.export_table(ExportKind::PlannedCapacity);
    assert_eq!(table.records.len(), 12);

    let planned: Vec<&str> = table
        .records
        .iter()
        .filter_map(|record| record.get("Planned Capacity"))
        .collect();
    assert_eq!(planned.last(), Some(&"0.0"));
    assert!(planned.iter().all(|value| !value.starts_with('-')));
}

#[test]
fn moving_the_window_re_anchors_default_projects() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    dashboard.set_start_date(d(2024, 2, 5)).unwrap();

    let projects = dashboard.config().resolved_projects();
    assert_eq!(projects[0].end_date, d(2024, 3, 6));
    for row in dashboard.availability() {
        for allocation in &row.allocations {
            assert!(allocation.end_date > d(2024, 2, 5));
        }
    }
}

#[test]
fn rejected_planned_role_edits_surface_errors() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let err = dashboard.delete_planned_role(99).unwrap_err();
    assert!(matches!(err, DashboardError::PlannedRole(PlannedRoleError::NotFound(99))));

    let mut draft = PlannedRoleDraft::from(&dashboard.planned_roles()[0]);
    draft.fte = -1.0;
    let err = dashboard.update_planned_role(1, draft).unwrap_err();
    assert!(matches!(err, DashboardError::PlannedRole(PlannedRoleError::Invalid(_))));
    assert_eq!(dashboard.planned_roles().len(), 3);
}

#[test]
fn window_changes_resize_every_series() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    dashboard.set_weeks(4).unwrap();
    assert_eq!(dashboard.capacity().len(), 4);
    assert_eq!(dashboard.role_capacity().len(), 4);
    assert_eq!(dashboard.week_headers().len(), 4);
    assert!(dashboard.availability().iter().all(|row| row.weekly_availability.len() == 4));

    dashboard.set_start_date(d(2024, 2, 5)).unwrap();
    assert_eq!(dashboard.capacity()[0].name, "Feb 5");
    assert_eq!(dashboard.end_date(), d(2024, 3, 4));
}

#[test]
fn invalid_window_and_filter_values_are_rejected() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    let err = dashboard.set_weeks(53).unwrap_err();
    assert!(matches!(err, DashboardError::Config(ConfigError::WeeksOutOfRange(53))));
    assert_eq!(dashboard.weeks(), 8);

    assert!(dashboard.set_fte_range(0.9, 0.1).is_err());
    assert_eq!(dashboard.filter().min_fte, 0.0);
}

#[test]
fn sorting_orders_visible_rows() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    dashboard.sort_by(SortKey::Name);
    let names: Vec<String> = dashboard
        .visible_availability()
        .iter()
        .map(|row| row.member.name.clone())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    dashboard.sort_by(SortKey::Name);
    let reversed: Vec<String> = dashboard
        .visible_availability()
        .iter()
        .map(|row| row.member.name.clone())
        .collect();
    sorted.reverse();
    assert_eq!(reversed, sorted);
}

#[test]
fn export_dispatches_on_kind() {
    let dashboard = Dashboard::new(seeded_config()).unwrap();
    let mut sink = DataFrameSink::new();

    let table = dashboard.export("capacity", &mut sink).unwrap();
    assert_eq!(table.records.len(), 8);
    assert_eq!(sink.last().unwrap().sheet_name, "Capacity");

    let table = dashboard.export("roles", &mut sink).unwrap();
    assert_eq!(table.records.len(), 3);
    assert_eq!(sink.sheets().len(), 2);
}

#[test]
fn unknown_export_kind_writes_nothing() {
    let dashboard = Dashboard::new(seeded_config()).unwrap();
    let mut sink = DataFrameSink::new();
    let err = dashboard.export("timesheets", &mut sink).unwrap_err();
    assert!(matches!(err, ExportError::UnknownKind(_)));
    assert!(sink.sheets().is_empty());
}

#[test]
fn availability_export_follows_the_filter() {
    let mut dashboard = Dashboard::new(seeded_config()).unwrap();
    assert_eq!(dashboard.export_table(ExportKind::Availability).records.len(), 10);

    dashboard.set_search_text("no such person");
    assert!(dashboard.export_table(ExportKind::Availability).records.is_empty());
    assert_eq!(dashboard.export_table(ExportKind::Capacity).records.len(), 8);
}

#[test]
fn dashboard_metrics_use_the_configured_calendar() {
    let mut config = seeded_config();
    config.weeks = 2;
    config.calendar = Some(
        WorkCalendarConfig::new(
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            [],
        )
        .unwrap(),
    );
    let dashboard = Dashboard::new(config).unwrap();
    let metrics = dashboard.metrics();

    assert!(approx(metrics.total_fte_days, 79.0));
    assert_eq!(metrics.planned_projects, 3);
    assert!(metrics.net_available_fte_days <= metrics.total_fte_days);
    assert!(metrics.active_team_members <= 10);
}

#[test]
fn metrics_weight_weekly_availability_by_working_days() {
    let project = Project::new(1, "API Integration", d(2024, 2, 15));
    let row = TeamMemberAllocation {
        member: TeamMember::new(1, "Alex Johnson", "Frontend Developer", 1.0),
        allocations: vec![Allocation::new(&project, 0.5).for_weeks(0, 1)],
        available_fte: 0.5,
        average_available_fte: 0.8,
        weekly_availability: vec![
            WeeklyAvailability {
                week: 0,
                date: d(2024, 1, 1),
                available_fte: 0.5,
            },
            WeeklyAvailability {
                week: 1,
                date: d(2024, 1, 8),
                available_fte: 1.0,
            },
        ],
    };
    let idle = TeamMemberAllocation {
        member: TeamMember::new(2, "Sam Williams", "Backend Developer", 0.0),
        allocations: Vec::new(),
        available_fte: 0.0,
        average_available_fte: 0.0,
        weekly_availability: Vec::new(),
    };
    let planned = vec![
        PlannedRole {
            id: 1,
            role: "QA Engineer".into(),
            fte: 0.4,
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 31),
            project: "API Integration".into(),
        },
        PlannedRole {
            id: 2,
            role: "Designer".into(),
            fte: 0.2,
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 31),
            project: "api integration ".into(),
        },
    ];
    let calendar = WorkCalendar::with_year_range(2024, 2024);

    let metrics = DashboardMetrics::compute(
        &[row, idle],
        &planned,
        &calendar,
        d(2024, 1, 1),
        d(2024, 1, 15),
    );

    assert!(approx(metrics.total_fte_days, 9.0));
    assert!(approx(metrics.net_available_fte_days, 7.0));
    assert_eq!(metrics.active_team_members, 1);
    assert_eq!(metrics.planned_projects, 1);
}
