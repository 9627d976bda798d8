use anyhow::{Result, anyhow};
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;
use std::path::{Path, PathBuf};

use ballog::account::{AccountDirectory, LocalAccountStore, Registration};
use ballog::config::Config;
use ballog::health::memory::InMemoryHealthStore;
use ballog::health::store::WorkoutStoreAccessor;
use ballog::health::{ActivityCategory, WorkoutSession};
use ballog::logging::{init_logger, parse_level};
use ballog::session::{
    CategoryStats, WorkoutStats, WorkoutSummary, calculate_stats, category_breakdown,
    filter_by_category, summarize,
};

use crossterm::event::{self, KeyCode};
use ratatui::{
    DefaultTerminal,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

#[derive(Parser, Debug)]
#[command(version, about = "Ballog - workout statistics CLI", long_about = None)]
struct Args {
    /// Overrides BALLOG_LOG (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Statistics for a health export, optionally for one month and activity
    Stats {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long, requires = "month")]
        year: Option<i32>,
        #[arg(short, long, requires = "year")]
        month: Option<u32>,
        #[arg(short, long)]
        activity: Option<ActivityCategory>,
    },
    /// Today's step, distance, energy and workout totals
    Today {
        #[arg(short, long)]
        file: PathBuf,
        /// RFC 3339 instant to treat as "now"
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Interactive month-by-month browser
    Dashboard {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        activity: Option<ActivityCategory>,
    },
    /// Manage the local account store
    Account {
        /// Database path, defaults to DATABASE_URL
        #[arg(short, long)]
        database: Option<String>,
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand, Debug)]
enum AccountAction {
    Add {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        admin: bool,
    },
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    List,
    Remove {
        #[arg(short, long)]
        username: String,
    },
}

fn format_duration(seconds: f64) -> String {
    let total_minutes = (seconds / 60.0).round() as i64;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn stats_lines(stats: &WorkoutStats) -> Vec<String> {
    vec![
        format!("Sessions:       {}", stats.count),
        format!("Total time:     {}", format_duration(stats.total_duration)),
        format!("Average time:   {}", format_duration(stats.average_duration)),
        format!("Calories:       {:.0} kcal", stats.total_calories),
        format!("Distance:       {:.2} km", stats.total_distance / 1000.0),
    ]
}

fn summary_line(summary: &WorkoutSummary) -> String {
    let favourite = summary
        .most_frequent
        .map(|a| a.display_name())
        .unwrap_or("-");
    format!("Most frequent:  {}", favourite)
}

fn breakdown_lines(breakdown: &[CategoryStats]) -> Vec<String> {
    breakdown
        .iter()
        .map(|c| {
            format!(
                "  {:<18} {:>3} sessions, {}, {:.2} km",
                c.activity.display_name(),
                c.stats.count,
                format_duration(c.stats.total_duration),
                c.stats.total_distance / 1000.0
            )
        })
        .collect()
}

async fn open_accessor(
    file: &Path,
    offset: FixedOffset,
) -> Result<WorkoutStoreAccessor<InMemoryHealthStore>> {
    let store = InMemoryHealthStore::load(file)?;
    let accessor = WorkoutStoreAccessor::with_offset(store, offset);
    if !accessor.authorize().await {
        eprintln!(
            "Warning: read access was not granted in {}, results will be empty",
            file.display()
        );
    }
    Ok(accessor)
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

fn month_title(year: i32, month: u32) -> String {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    let name = month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("?");
    format!("{} {}", name, year)
}

struct MonthDashboard {
    accessor: WorkoutStoreAccessor<InMemoryHealthStore>,
    activity: Option<ActivityCategory>,
    year: i32,
    month: u32,
    sessions: Vec<WorkoutSession>,
    selected: usize,
    status_message: String,
}

impl MonthDashboard {
    async fn new(
        accessor: WorkoutStoreAccessor<InMemoryHealthStore>,
        activity: Option<ActivityCategory>,
        year: i32,
        month: u32,
    ) -> Self {
        let mut dashboard = Self {
            accessor,
            activity,
            year,
            month,
            sessions: Vec::new(),
            selected: 0,
            status_message: String::new(),
        };
        dashboard.refresh().await;
        dashboard
    }

    async fn refresh(&mut self) {
        self.sessions = match self.activity {
            Some(activity) => {
                self.accessor
                    .sessions_for_month_by_category(self.year, self.month, activity)
                    .await
            }
            None => self.accessor.sessions_for_month(self.year, self.month).await,
        };
        self.selected = 0;
        self.status_message = if self.sessions.is_empty() {
            "No sessions this month | h/l: change month | q: quit".to_string()
        } else {
            "j/k: navigate | h/l: change month | q: quit".to_string()
        };
        debug!(
            "Dashboard loaded {} sessions for {}-{:02}",
            self.sessions.len(),
            self.year,
            self.month
        );
    }

    async fn change_month(&mut self, delta: i32) {
        let (year, month) = shift_month(self.year, self.month, delta);
        self.year = year;
        self.month = month;
        self.refresh().await;
    }

    fn scroll_down(&mut self) {
        if !self.sessions.is_empty() && self.selected < self.sessions.len() - 1 {
            self.selected += 1;
        }
    }

    fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn report(&self) -> String {
        let mut lines = stats_lines(&calculate_stats(&self.sessions));
        lines.push(summary_line(&summarize(&self.sessions)));
        let breakdown = category_breakdown(&self.sessions);
        if !breakdown.is_empty() {
            lines.push(String::new());
            lines.push("By activity:".to_string());
            lines.extend(breakdown_lines(&breakdown));
        }
        lines.join("\n")
    }
}

async fn run_dashboard(mut terminal: DefaultTerminal, mut dashboard: MonthDashboard) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

            // Header
            let filter = dashboard
                .activity
                .map(|a| format!(" - {}", a.display_name()))
                .unwrap_or_default();
            let header = Paragraph::new(format!(
                "Ballog - {}{}",
                month_title(dashboard.year, dashboard.month),
                filter
            ))
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            let body = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);

            // Session list
            if dashboard.sessions.is_empty() {
                let empty_msg = Paragraph::new("No workouts recorded this month.")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).title("Sessions"));
                frame.render_widget(empty_msg, body[0]);
            } else {
                let items: Vec<ListItem> = dashboard
                    .sessions
                    .iter()
                    .enumerate()
                    .map(|(idx, session)| {
                        let style = if idx == dashboard.selected {
                            Style::default()
                                .fg(Color::Black)
                                .bg(Color::Cyan)
                                .add_modifier(Modifier::BOLD)
                        } else {
                            Style::default()
                        };
                        ListItem::new(session.to_string()).style(style)
                    })
                    .collect();

                let list = List::new(items).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Sessions ({} total)", dashboard.sessions.len())),
                );

                let mut list_state = ListState::default();
                list_state.select(Some(dashboard.selected));

                frame.render_stateful_widget(list, body[0], &mut list_state);
            }

            // Totals
            let report = Paragraph::new(dashboard.report())
                .block(Block::default().borders(Borders::ALL).title("Summary"));
            frame.render_widget(report, body[1]);

            // Footer with status
            let footer = Paragraph::new(dashboard.status_message.as_str())
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(footer, chunks[2]);
        })?;

        if let event::Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(());
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    dashboard.scroll_down();
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    dashboard.scroll_up();
                }
                KeyCode::Char('h') | KeyCode::Left => {
                    dashboard.change_month(-1).await;
                }
                KeyCode::Char('l') | KeyCode::Right => {
                    dashboard.change_month(1).await;
                }
                _ => {}
            }
        }
    }
}

async fn run_account(database_url: &str, action: AccountAction) -> Result<()> {
    let store = LocalAccountStore::open(database_url).await?;
    match action {
        AccountAction::Add {
            username,
            email,
            password,
            admin,
        } => {
            let account = store
                .create_account(&Registration {
                    username,
                    password,
                    email,
                    is_admin: admin,
                })
                .await?;
            println!("Created account {} <{}>", account.username, account.email);
        }
        AccountAction::Login { username, password } => {
            match store.authenticate(&username, &password).await? {
                Some(account) => {
                    let role = if account.is_admin { "admin" } else { "member" };
                    println!("Signed in as {} ({})", account.username, role);
                }
                None => return Err(anyhow!("Invalid username or password")),
            }
        }
        AccountAction::List => {
            let accounts = store.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found");
            }
            for account in accounts {
                let admin = if account.is_admin { " (admin)" } else { "" };
                println!("{}, {}{}", account.username, account.email, admin);
            }
        }
        AccountAction::Remove { username } => {
            if store.delete_account(&username).await? {
                println!("Removed account {}", username);
            } else {
                println!("No account named {}", username);
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let config = Config::from_env()?;

    let level = match args.log_level.as_deref() {
        Some(raw) => parse_level(raw).ok_or_else(|| anyhow!("Unknown log level '{}'", raw))?,
        None => config.log_level,
    };
    init_logger(level);

    match args.command {
        Commands::Stats {
            file,
            year,
            month,
            activity,
        } => {
            let accessor = open_accessor(&file, config.utc_offset).await?;
            let sessions = match (year, month) {
                (Some(year), Some(month)) => {
                    println!("{}", month_title(year, month));
                    accessor.sessions_for_month(year, month).await
                }
                _ => {
                    println!("All time");
                    accessor
                        .query_sessions(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC, None)
                        .await
                }
            };
            let sessions = match activity {
                Some(activity) => {
                    println!("Activity: {}", activity.display_name());
                    filter_by_category(&sessions, activity)
                }
                None => sessions,
            };
            println!();

            for line in stats_lines(&calculate_stats(&sessions)) {
                println!("{}", line);
            }
            println!("{}", summary_line(&summarize(&sessions)));

            let breakdown = category_breakdown(&sessions);
            if !breakdown.is_empty() {
                println!();
                println!("By activity:");
                for line in breakdown_lines(&breakdown) {
                    println!("{}", line);
                }
            }
            Ok(())
        }
        Commands::Today { file, now } => {
            let accessor = open_accessor(&file, config.utc_offset).await?;
            let now = now.unwrap_or_else(Utc::now);
            let statistics = accessor.fetch_statistics(now).await;
            println!("Today: {}", statistics);

            let workouts = accessor.fetch_today_workouts(now).await;
            if workouts.is_empty() {
                println!("No workouts recorded today.");
            }
            for workout in workouts {
                println!("\t{}", workout);
            }
            Ok(())
        }
        Commands::Dashboard { file, activity } => {
            let accessor = open_accessor(&file, config.utc_offset).await?;
            let today = Utc::now().with_timezone(&config.utc_offset);
            let dashboard =
                MonthDashboard::new(accessor, activity, today.year(), today.month()).await;

            let terminal = ratatui::init();
            let result = run_dashboard(terminal, dashboard).await;
            ratatui::restore();
            result
        }
        Commands::Account { database, action } => {
            let database_url = database.unwrap_or(config.database_url);
            run_account(&database_url, action).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_wrap_across_years() {
        assert_eq!(shift_month(2024, 1, -1), (2023, 12));
        assert_eq!(shift_month(2023, 12, 1), (2024, 1));
        assert_eq!(shift_month(2024, 6, 0), (2024, 6));
        assert_eq!(shift_month(2024, 2, -14), (2022, 12));
    }

    #[test]
    fn months_out_of_range_have_a_title() {
        assert_eq!(month_title(2024, 2), "February 2024");
        assert_eq!(month_title(2024, 12), "December 2024");
        assert_eq!(month_title(2024, 0), "? 2024");
        assert_eq!(month_title(2024, 13), "? 2024");

        let args = Args::try_parse_from([
            "ballog", "stats", "--file", "x.json", "--year", "2024", "--month", "0",
        ])
        .unwrap();
        assert!(matches!(args.command, Commands::Stats { month: Some(0), .. }));
    }

    #[test]
    fn durations_read_as_hours_and_minutes() {
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(45.0 * 60.0), "45m");
        assert_eq!(format_duration(95.0 * 60.0), "1h 35m");
    }

    #[test]
    fn parses_stats_arguments() {
        let args = Args::try_parse_from([
            "ballog", "stats", "--file", "export.json", "--year", "2024", "--month", "2",
            "--activity", "soccer",
        ])
        .unwrap();
        match args.command {
            Commands::Stats {
                year,
                month,
                activity,
                ..
            } => {
                assert_eq!(year, Some(2024));
                assert_eq!(month, Some(2));
                assert_eq!(activity, Some(ActivityCategory::Soccer));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(
            Args::try_parse_from(["ballog", "stats", "--file", "x.json", "--month", "2"]).is_err()
        );
    }
}
