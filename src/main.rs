//! # Campus Desk CLI (`desk`)
//!
//! One subcommand per page of the desk.
//!
//! ## Usage
//!
//! ```bash
//! desk --config ./config/desk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `desk dashboard` | KPI summary, students by region, MOU partners |
//! | `desk reports search <q>` | Search weekly reports |
//! | `desk reports recent` | Five most recent weekly reports |
//! | `desk reports chat` | Interactive report chat |
//! | `desk schedule staff` | Staff with schedule entries |
//! | `desk schedule free --staff A --staff B` | Common free time on a date |
//! | `desk schedule summary --staff A` | Entries and busy slots per date |
//! | `desk staff search [q]` | Search staff by expertise |
//! | `desk staff departments` | List departments |
//! | `desk staff dept <name>` | Members of one department |
//! | `desk evaluation` | Evaluation guidance by category |
//! | `desk cards search [q]` | Search business cards |
//! | `desk cards orgs` | Contacts per organization |
//! | `desk admin upload <file>` | Validate and save a JSON document |
//! | `desk admin list` | Known documents and their source |
//! | `desk admin show <name>` | Print one document |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use campus_desk::config;
use campus_desk::pages::{admin, cards, chat, dashboard, evaluation, schedule, staff};
use campus_desk::store::DataStore;

const DEFAULT_CONFIG: &str = "./config/desk.toml";

/// Campus Desk: office dashboard over JSON documents in a Git repository.
///
/// Reads go to the GitHub repository named by `REPO_NAME` (authenticated
/// with `GITHUB_TOKEN`) and fall back to the local cache directory.
#[derive(Parser)]
#[command(name = "desk", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/desk.toml`; if that file does not exist, the
    /// desk runs with defaults and environment overrides only.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show KPIs, students by region, and MOU partners.
    Dashboard,

    /// Weekly report search and chat.
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },

    /// Staff schedules and common free time.
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Staff directory.
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },

    /// Institutional evaluation guidance and previous feedback.
    Evaluation {
        /// Only show this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Business card hub.
    Cards {
        #[command(subcommand)]
        action: CardsAction,
    },

    /// Upload, list, and inspect data documents.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ReportsAction {
    /// Search reports by department, issue, or summary text.
    Search {
        query: String,
    },
    /// Show the five most recent reports.
    Recent,
    /// Ask questions interactively; `exit` or EOF ends the session.
    Chat,
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// List staff with schedule entries.
    Staff,
    /// Show schedules and common free time on one date.
    Free {
        /// Staff member to include (repeatable).
        #[arg(long = "staff", required = true)]
        staff: Vec<String>,
        /// Date (YYYY-MM-DD). Defaults to the first date with entries.
        #[arg(long)]
        date: Option<String>,
    },
    /// Entries and busy slots per date for the selection.
    Summary {
        /// Staff member to include (repeatable).
        #[arg(long = "staff", required = true)]
        staff: Vec<String>,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Search by department, expertise, interests, or name.
    Search {
        query: Option<String>,
    },
    /// List departments and member counts.
    Departments,
    /// List members of one department.
    Dept {
        name: String,
    },
}

#[derive(Subcommand)]
enum CardsAction {
    /// Search by organization, name, history, or position.
    Search {
        query: Option<String>,
    },
    /// Contacts per organization.
    Orgs,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Validate a JSON file and save it to the data repository.
    ///
    /// The file name selects the document, e.g. `schedules.json`.
    Upload {
        file: PathBuf,
        /// Validate and summarize without saving.
        #[arg(long)]
        dry_run: bool,
    },
    /// List the known documents and where each loads from.
    List,
    /// Print one document as JSON.
    Show {
        name: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<config::Config> {
    match explicit {
        Some(path) => config::load_config(path),
        None => config::load_or_minimal(Path::new(DEFAULT_CONFIG)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "desk", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = load_config(cli.config.as_deref())?;
    let store = DataStore::from_config(&cfg);

    match cli.command {
        Commands::Dashboard => dashboard::run_dashboard(&store)?,
        Commands::Reports { action } => match action {
            ReportsAction::Search { query } => chat::run_search(&store, &query)?,
            ReportsAction::Recent => chat::run_recent(&store)?,
            ReportsAction::Chat => {
                let stdin = std::io::stdin();
                chat::run_chat(&store, stdin.lock(), std::io::stdout())?;
            }
        },
        Commands::Schedule { action } => match action {
            ScheduleAction::Staff => schedule::run_staff(&store)?,
            ScheduleAction::Free { staff, date } => {
                schedule::run_free(&store, &staff, date.as_deref())?
            }
            ScheduleAction::Summary { staff } => schedule::run_summary(&store, &staff)?,
        },
        Commands::Staff { action } => match action {
            StaffAction::Search { query } => staff::run_search(&store, query.as_deref())?,
            StaffAction::Departments => staff::run_departments(&store)?,
            StaffAction::Dept { name } => staff::run_department(&store, &name)?,
        },
        Commands::Evaluation { category } => {
            evaluation::run_evaluation(&store, category.as_deref())?
        }
        Commands::Cards { action } => match action {
            CardsAction::Search { query } => cards::run_search(&store, query.as_deref())?,
            CardsAction::Orgs => cards::run_orgs(&store)?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Upload { file, dry_run } => admin::run_upload(&store, &file, dry_run)?,
            AdminAction::List => admin::run_list(&store)?,
            AdminAction::Show { name } => admin::run_show(&store, &name)?,
        },
        Commands::Completions { .. } => {}
    }

    Ok(())
}
