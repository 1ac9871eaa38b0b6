use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wfm_planner::display::{print_grid, write_grid_to_file};
use wfm_planner::export::export_grid_to_csv;
use wfm_planner::planning::{coverage, Planner, ViewLength, ViewWindow};
use wfm_planner::remote::{HttpRemote, PlanningRemote};
use wfm_planner::seed::load_seed;
use wfm_planner::web;

#[derive(Parser)]
#[command(name = "wfm-planner", version, about = "Analyst shift planning grid")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the planning API backed by the CSV seed data
    Serve {
        #[arg(long, env = "PLANNER_PORT", default_value_t = 8080)]
        port: u16,

        #[arg(long, env = "PLANNER_SEED_DIR", default_value = "data")]
        seed_dir: PathBuf,

        #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123", hide_env_values = true)]
        admin_password: String,
    },
    /// Print the grid of one view window
    Show {
        /// First day of the view (defaults to this week's Monday)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// 7 or 15
        #[arg(long, default_value_t = 7)]
        days: u32,

        #[arg(long)]
        team: Option<i64>,

        #[arg(long, env = "PLANNER_SEED_DIR", default_value = "data")]
        seed_dir: PathBuf,

        /// Read from a running server instead of the seed directory
        #[arg(long, env = "PLANNER_REMOTE_URL")]
        remote: Option<String>,

        /// Also write the grid as text
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write the grid as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve {
            port,
            seed_dir,
            admin_password,
        } => {
            let store = load_seed(&seed_dir)
                .with_context(|| format!("loading seed data from {}", seed_dir.display()))?;

            println!("Starting web server on port {}...", port);
            println!("Access the API at http://localhost:{}/api", port);

            web::start_server(port, admin_password, Arc::new(store)).await?;
        }
        Command::Show {
            start,
            days,
            team,
            seed_dir,
            remote,
            out,
            csv,
        } => {
            let Some(length) = ViewLength::from_days(days) else {
                bail!("--days must be 7 or 15, got {days}");
            };
            let window = match start {
                Some(start) => ViewWindow::new(start, length),
                None => ViewWindow::week_of(Local::now().date_naive(), length),
            }
            .context("--start is out of the supported date range")?;
            let remote: Arc<dyn PlanningRemote> = match remote {
                Some(url) => Arc::new(HttpRemote::new(url)),
                None => Arc::new(
                    load_seed(&seed_dir)
                        .with_context(|| format!("loading seed data from {}", seed_dir.display()))?,
                ),
            };

            let planner = Planner::open(remote, window, team).await?;
            if let Some(failure) = planner.drain_notifications().into_iter().next() {
                bail!("{}", failure.message);
            }
            let grid = planner.grid();
            print_grid(&grid);

            println!("\n=== Coverage ===");
            for day in coverage(&grid) {
                let concepts: Vec<String> = day
                    .by_concept
                    .iter()
                    .map(|(code, count)| format!("{code}={count}"))
                    .collect();
                println!(
                    "  {} working: {}, empty: {} ({})",
                    day.date,
                    day.workable,
                    day.empty,
                    concepts.join(", ")
                );
            }

            if let Some(path) = out {
                write_grid_to_file(&grid, &path)?;
                println!("Grid saved to {}", path.display());
            }
            if let Some(path) = csv {
                export_grid_to_csv(&grid, &path)?;
                println!("Grid exported to {}", path.display());
            }
        }
    }

    Ok(())
}
