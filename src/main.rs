use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;

mod aggregate;
mod config;
mod dashboard;
mod dates;
mod error;
mod feed;
mod filter;
mod ingest;
mod leaderboard;
mod logging;
mod models;
mod report;
mod snapshot;
mod visits;

use config::Config;
use dashboard::{PerformanceControls, VisitControls};
use dates::QuickRange;
use feed::FeedClient;
use filter::RangeSelection;
use models::VisitStatus;

#[derive(Parser)]
#[command(name = "team-dashboard")]
#[command(about = "Sales and site-visit dashboard over published spreadsheet feeds", long_about = None)]
struct Cli {
    /// TOML config naming the feeds; falls back to environment variables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Treat this date (yyyy-mm-dd) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Args)]
struct RangeArgs {
    /// Custom range start (yyyy-mm-dd or dd/mm/yyyy); needs --end
    #[arg(long)]
    start: Option<String>,
    /// Custom range end (yyyy-mm-dd or dd/mm/yyyy); needs --start
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    member: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
    /// Write to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a template config file
    InitConfig {
        #[arg(long, default_value = "dashboard.toml")]
        out: PathBuf,
    },
    /// List members found in the performance feed
    Members {
        /// List members of the visit feeds instead
        #[arg(long)]
        visits: bool,
    },
    /// Summary cards, record table and leaderboard
    Dashboard {
        #[arg(long, value_enum, default_value_t = QuickRange::Today)]
        range: QuickRange,
        #[command(flatten)]
        filters: RangeArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Visit summary and visit table
    Visits {
        /// Quick range; all dates when omitted
        #[arg(long, value_enum)]
        range: Option<QuickRange>,
        #[command(flatten)]
        filters: RangeArgs,
        #[arg(long)]
        status: Option<VisitStatus>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Export the filtered record table as CSV
    Export {
        #[arg(long, value_enum, default_value_t = QuickRange::Today)]
        range: QuickRange,
        #[command(flatten)]
        filters: RangeArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Both views with default filters in one markdown document
    Report {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

fn emit(content: &str, out: Option<&PathBuf>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Written to {}.", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn selection(quick: Option<QuickRange>, filters: &RangeArgs) -> RangeSelection {
    RangeSelection::from_controls(quick, filters.start.as_deref(), filters.end.as_deref())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let config_path = cli.config;
    let connect = || -> anyhow::Result<(Config, FeedClient)> {
        let config = Config::resolve(config_path.as_deref())?;
        let client = FeedClient::new(config.request_timeout());
        Ok((config, client))
    };

    match cli.command {
        Commands::InitConfig { out } => {
            Config::template().save_to_file(&out)?;
            println!("Template config written to {}.", out.display());
        }
        Commands::Members { visits } => {
            let (config, client) = connect()?;
            let members = if visits {
                snapshot::load_visits(&client, &config.feeds)
                    .await
                    .map(|snapshot| snapshot.members())
            } else {
                snapshot::load_performance(&client, &config.feeds)
                    .await
                    .map(|snapshot| snapshot.members())
            };

            match members {
                Ok(members) if members.is_empty() => println!("No members found."),
                Ok(members) => {
                    for member in members {
                        println!("{member}");
                    }
                }
                Err(err) => {
                    error!(error = %err, "member feed failed");
                    print!("{}", report::render_feed_error("Members"));
                }
            }
        }
        Commands::Dashboard {
            range,
            filters,
            output,
        } => {
            let (config, client) = connect()?;
            let controls = PerformanceControls {
                range: selection(Some(range), &filters),
                member: filters.member.clone(),
            };
            let content = match snapshot::load_performance(&client, &config.feeds).await {
                Ok(snapshot) => {
                    let view = dashboard::build_performance_view(&snapshot, &controls, today);
                    match output.format {
                        OutputFormat::Markdown => report::render_performance(
                            &view,
                            &report::describe_range(&controls.range, today),
                            controls.member.as_deref(),
                        ),
                        OutputFormat::Json => report::render_json(&view)?,
                    }
                }
                Err(err) => {
                    error!(error = %err, "performance feed failed");
                    report::render_feed_error("Team Performance")
                }
            };
            emit(&content, output.out.as_ref())?;
        }
        Commands::Visits {
            range,
            filters,
            status,
            output,
        } => {
            let (config, client) = connect()?;
            let controls = VisitControls {
                range: selection(range, &filters),
                member: filters.member.clone(),
                status,
            };
            let content = match snapshot::load_visits(&client, &config.feeds).await {
                Ok(snapshot) => {
                    let view = dashboard::build_visit_view(&snapshot, &controls, today);
                    match output.format {
                        OutputFormat::Markdown => report::render_visits(
                            &view,
                            &report::describe_range(&controls.range, today),
                        ),
                        OutputFormat::Json => report::render_json(&view)?,
                    }
                }
                Err(err) => {
                    error!(error = %err, "visit feeds failed");
                    report::render_feed_error("Site Visits")
                }
            };
            emit(&content, output.out.as_ref())?;
        }
        Commands::Export {
            range,
            filters,
            out,
        } => {
            let (config, client) = connect()?;
            let controls = PerformanceControls {
                range: selection(Some(range), &filters),
                member: filters.member.clone(),
            };
            match snapshot::load_performance(&client, &config.feeds).await {
                Ok(snapshot) => {
                    let view = dashboard::build_performance_view(&snapshot, &controls, today);
                    if view.table.is_empty() {
                        println!("No data found for this window.");
                        return Ok(());
                    }
                    let written = report::export_records_csv(&view.table, &out)?;
                    println!("Exported {written} records to {}.", out.display());
                }
                Err(err) => {
                    error!(error = %err, "performance feed failed");
                    print!("{}", report::render_feed_error("Export"));
                }
            }
        }
        Commands::Report { out } => {
            let (config, client) = connect()?;
            let (performance, visits) = tokio::join!(
                snapshot::load_performance(&client, &config.feeds),
                snapshot::load_visits(&client, &config.feeds)
            );

            let performance_controls = PerformanceControls::default();
            let mut document = match performance {
                Ok(snapshot) => report::render_performance(
                    &dashboard::build_performance_view(&snapshot, &performance_controls, today),
                    &report::describe_range(&performance_controls.range, today),
                    None,
                ),
                Err(err) => {
                    error!(error = %err, "performance feed failed");
                    report::render_feed_error("Team Performance")
                }
            };
            document.push('\n');

            let visit_controls = VisitControls::default();
            document.push_str(&match visits {
                Ok(snapshot) => report::render_visits(
                    &dashboard::build_visit_view(&snapshot, &visit_controls, today),
                    &report::describe_range(&visit_controls.range, today),
                ),
                Err(err) => {
                    error!(error = %err, "visit feeds failed");
                    report::render_feed_error("Site Visits")
                }
            });

            emit(&document, Some(&out))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_config_parses_without_any_feed_config() {
        let cli = Cli::try_parse_from(["team-dashboard", "init-config", "--out", "feeds.toml"]).unwrap();
        assert!(cli.config.is_none());
        match cli.command {
            Commands::InitConfig { out } => assert_eq!(out, PathBuf::from("feeds.toml")),
            _ => panic!("expected init-config"),
        }
    }

    #[test]
    fn visit_status_flag_ignores_case() {
        let cli = Cli::try_parse_from(["team-dashboard", "visits", "--status", "cancelled"]).unwrap();
        match cli.command {
            Commands::Visits { status, range, .. } => {
                assert_eq!(status, Some(VisitStatus::Cancelled));
                assert!(range.is_none());
            }
            _ => panic!("expected visits"),
        }
    }
}
