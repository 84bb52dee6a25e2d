use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use staffing_planner::export::format_one;
use staffing_planner::{
    CsvSink, Dashboard, DashboardConfig, ExportKind, OverbookingPolicy, PlannedRoleDraft, SortKey,
    TeamMemberAllocation, logging,
};

fn render_df_as_text_table(df: &DataFrame) -> String {
    // Compute column widths
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |col: &Column, row_idx: usize| -> String {
        match col.get(row_idx) {
            Ok(AnyValue::Null) | Err(_) => String::new(),
            Ok(AnyValue::String(s)) => s.to_string(),
            Ok(av) => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            let len = cell(col, row_idx).chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    // Build horizontal separator
    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    // Header
    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        out.push_str(&" ".repeat(widths[i] - name.chars().count()));
        out.push_str(" |");
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    // Rows
    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = cell(col, row_idx);
            out.push(' ');
            out.push_str(&s);
            out.push_str(&" ".repeat(widths[ci].saturating_sub(s.chars().count())));
            out.push_str(" |");
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

/// One row per member, one column per reporting week.
fn weekly_frame(rows: &[TeamMemberAllocation]) -> PolarsResult<DataFrame> {
    let mut columns = vec![
        Series::new(
            PlSmallStr::from("Name"),
            rows.iter().map(|r| r.member.name.clone()).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    let labels: Vec<(u32, String)> = rows
        .first()
        .map(|row| {
            row.weekly_availability
                .iter()
                .map(|w| (w.week, staffing_planner::calendar::week_label(w.date)))
                .collect()
        })
        .unwrap_or_default();
    for (week, label) in labels {
        let values: Vec<String> = rows
            .iter()
            .map(|row| {
                row.week(week)
                    .map(|w| format_one(w.available_fte))
                    .unwrap_or_default()
            })
            .collect();
        columns.push(Series::new(PlSmallStr::from(label.as_str()), values).into_column());
    }
    DataFrame::new(columns)
}

fn print_kind(dashboard: &Dashboard, kind: ExportKind) {
    match dashboard.export_table(kind).to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
}

fn print_metrics(dashboard: &Dashboard) {
    let metrics = dashboard.metrics();
    println!("Total FTE-days: {}", format_one(metrics.total_fte_days));
    println!("Active team members: {}", metrics.active_team_members);
    println!("Planned projects: {}", metrics.planned_projects);
    println!(
        "Net available FTE-days: {}",
        format_one(metrics.net_available_fte_days)
    );
}

fn print_config(dashboard: &Dashboard) {
    let filter = dashboard.filter();
    println!(
        "Window: {} .. {} ({} weeks)",
        dashboard.start_date(),
        dashboard.end_date(),
        dashboard.weeks()
    );
    let headers = dashboard.week_headers();
    if let (Some(first), Some(last)) = (headers.first(), headers.last()) {
        println!("Week headers: {} .. {}", first.label, last.label);
    }
    match dashboard.config().seed {
        Some(seed) => println!("Seed: {}", seed),
        None => println!("Seed: none"),
    }
    println!(
        "Filter: fte {}..{} search '{}'",
        format_one(filter.min_fte),
        format_one(filter.max_fte),
        filter.search_text
    );
    match dashboard.sort() {
        Some(state) => println!("Sort: {} {:?}", state.key, state.direction),
        None => println!("Sort: none"),
    }
    let calendar = dashboard.calendar().to_config();
    println!(
        "Calendar: {} working days per week, {} holidays",
        calendar.working_days().len(),
        calendar.holidays().len()
    );
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Parses `role | project | fte | start | end`.
fn parse_draft(s: &str) -> Result<PlannedRoleDraft, String> {
    let fields: Vec<&str> = s.split('|').map(str::trim).collect();
    if fields.len() != 5 {
        return Err("expected: <role> | <project> | <fte> | <YYYY-MM-DD> | <YYYY-MM-DD>".into());
    }
    let fte: f64 = fields[2].parse().map_err(|_| "Invalid fte".to_string())?;
    let start_date = parse_date(fields[3]).ok_or("Invalid start date (YYYY-MM-DD)")?;
    let end_date = parse_date(fields[4]).ok_or("Invalid end date (YYYY-MM-DD)")?;
    Ok(PlannedRoleDraft {
        role: fields[0].to_string(),
        project: fields[1].to_string(),
        fte,
        start_date,
        end_date,
    })
}

fn export_kind(dashboard: &Dashboard, kind: &str, dir: &Path) {
    let mut sink = CsvSink::new(dir);
    match dashboard.export(kind, &mut sink) {
        Ok(table) => println!(
            "Exported {} rows to {}",
            table.records.len(),
            sink.path_for(&table).display()
        ),
        Err(e) => println!("Export failed: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show [view]                        availability|weekly|capacity|planned|roles|role-capacity|metrics|config\n  weeks <n>                          Set the window length (1-52)\n  start <YYYY-MM-DD>                 Set the window start\n  fte <min> <max>                    Filter by available FTE (inclusive)\n  search [text...]                   Filter by name, role or project\n  sort <name|role|fte|available|average|none>\n                                     Sort rows; repeat to flip direction\n  seed <n|none>                      Reseed the mock generators\n  overbooking <allow|forbid>         Allow allocations past a member's FTE\n  role add <role> | <project> | <fte> | <start> | <end>\n  role update <id> <role> | <project> | <fte> | <start> | <end>\n  role delete <id>\n  export <kind|all> <dir>            capacity|availability|planned-capacity|roles|role-capacity\n  quit|exit                          Exit"
    );
}

fn main() {
    logging::init();

    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };
    let mut dashboard = match Dashboard::new(config) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Staffing Planner (CLI) - type 'help' for commands\n");
    print_kind(&dashboard, ExportKind::Availability);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => match rest {
                "" | "availability" => print_kind(&dashboard, ExportKind::Availability),
                "weekly" => match weekly_frame(&dashboard.visible_availability()) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Render error: {}", e),
                },
                "capacity" => print_kind(&dashboard, ExportKind::Capacity),
                "planned" => print_kind(&dashboard, ExportKind::PlannedCapacity),
                "roles" => print_kind(&dashboard, ExportKind::Roles),
                "role-capacity" => print_kind(&dashboard, ExportKind::RoleCapacity),
                "metrics" => print_metrics(&dashboard),
                "config" => print_config(&dashboard),
                other => println!("Unknown view '{}'. Type 'help'.", other),
            },
            "weeks" => {
                let weeks: u32 = match rest.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        println!("Usage: weeks <n>");
                        continue;
                    }
                };
                match dashboard.set_weeks(weeks) {
                    Ok(summary) => println!("Refreshed ({})", summary.to_cli_summary()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "start" => {
                let Some(date) = parse_date(rest) else {
                    println!("Invalid date (YYYY-MM-DD)");
                    continue;
                };
                match dashboard.set_start_date(date) {
                    Ok(summary) => println!("Refreshed ({})", summary.to_cli_summary()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "fte" => {
                let mut parts = rest.split_whitespace();
                let bounds = (
                    parts.next().and_then(|s| s.parse::<f64>().ok()),
                    parts.next().and_then(|s| s.parse::<f64>().ok()),
                );
                let (Some(min), Some(max)) = bounds else {
                    println!("Usage: fte <min> <max>");
                    continue;
                };
                match dashboard.set_fte_range(min, max) {
                    Ok(()) => println!(
                        "Filter set ({} visible).",
                        dashboard.visible_availability().len()
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "search" => {
                dashboard.set_search_text(rest);
                println!(
                    "Filter set ({} visible).",
                    dashboard.visible_availability().len()
                );
            }
            "sort" if rest == "none" => {
                dashboard.clear_sort();
                println!("Sort cleared.");
            }
            "sort" => match rest.parse::<SortKey>() {
                Ok(key) => {
                    let state = dashboard.sort_by(key);
                    println!("Sorted by {} {:?}.", state.key, state.direction);
                    print_kind(&dashboard, ExportKind::Availability);
                }
                Err(e) => println!("Error: {}", e),
            },
            "seed" => {
                let seed = match rest {
                    "none" => None,
                    s => match s.parse::<u64>() {
                        Ok(v) => Some(v),
                        Err(_) => {
                            println!("Usage: seed <n|none>");
                            continue;
                        }
                    },
                };
                match dashboard.set_seed(seed) {
                    Ok(summary) => println!("Refreshed ({})", summary.to_cli_summary()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "overbooking" => {
                let policy = match rest {
                    "allow" => OverbookingPolicy::Allow,
                    "forbid" => OverbookingPolicy::Forbid,
                    _ => {
                        println!("Usage: overbooking <allow|forbid>");
                        continue;
                    }
                };
                match dashboard.set_overbooking(policy) {
                    Ok(summary) => println!("Refreshed ({})", summary.to_cli_summary()),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "role" => {
                let (sub, args) = match rest.split_once(char::is_whitespace) {
                    Some((sub, args)) => (sub, args.trim()),
                    None => (rest, ""),
                };
                match sub {
                    "add" => match parse_draft(args) {
                        Ok(draft) => match dashboard.add_planned_role(draft) {
                            Ok(role) => println!("Added planned role {}.", role.id),
                            Err(e) => println!("Error: {}", e),
                        },
                        Err(e) => println!("Error: {}", e),
                    },
                    "update" => {
                        let Some((id_s, fields)) = args.split_once(char::is_whitespace) else {
                            println!(
                                "Usage: role update <id> <role> | <project> | <fte> | <start> | <end>"
                            );
                            continue;
                        };
                        let id: u32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match parse_draft(fields) {
                            Ok(draft) => match dashboard.update_planned_role(id, draft) {
                                Ok(role) => println!("Updated planned role {}.", role.id),
                                Err(e) => println!("Error: {}", e),
                            },
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    "delete" => {
                        let id: u32 = match args.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match dashboard.delete_planned_role(id) {
                            Ok(role) => println!("Deleted planned role {}.", role.id),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: role <add|update|delete> ..."),
                }
            }
            "export" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("all"), Some(dir)) => {
                        for kind in ExportKind::ALL {
                            export_kind(&dashboard, kind.as_str(), Path::new(dir));
                        }
                    }
                    (Some(kind), Some(dir)) => export_kind(&dashboard, kind, Path::new(dir)),
                    _ => println!("Usage: export <kind|all> <dir>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
