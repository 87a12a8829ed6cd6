use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gigmate_core::{
    ChartMode, InsightScope, ShiftRecord, WeeklySummaryParams, bucket_shifts,
    build_weekly_summary, calculate_weekly_stats, compute_insights, compute_patterns,
    dashboard_stats, shifts_in_current_week,
};
use gigmate_digest::{
    DigestWindow, InMemoryDirectory, LogMailer, Period, ResendMailer, authorize, load_users,
    run_weekly_digest,
};
use gigmate_export::{export_filename, write_entries_file};
use gigmate_ingest::{UserShift, parse_entries_csv};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod state;

use config::{Config, init_config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "gigmate",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIGMATE_BUILD_SHA"), ")"),
    about = "Net profit, hourly and tax estimates for gig work"
)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.gigmate/config.toml
    Init,

    /// Dashboard totals: gross, expenses, net, hours, hourly
    Summary {
        #[arg(long, value_enum, default_value_t = ScopeArg::Week)]
        scope: ScopeArg,
    },

    /// Net and hours per day, week or month
    Chart {
        #[arg(long, value_enum, default_value_t = ModeArg::Day)]
        mode: ModeArg,
    },

    /// Best shift, week-over-week change and top platform
    Insights {
        #[arg(long, value_enum, default_value_t = ScopeArg::Week)]
        scope: ScopeArg,
    },

    /// Best weekday, time of day and weekend platform over the last 30 days
    Patterns,

    /// Render the weekly summary for the last 7 days
    Weekly {
        /// Only count entries owned by this user id
        #[arg(long)]
        user: Option<String>,

        /// Name used in the greeting
        #[arg(long)]
        name: Option<String>,
    },

    /// Export entries as CSV
    Export {
        /// Output path (default: ./gigmate-entries-<today>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Merge a previously exported CSV into ~/.gigmate/entries.json
    Import {
        csv: PathBuf,

        /// Owner for imported rows
        #[arg(long)]
        user: Option<String>,
    },

    /// Send weekly summary emails to every user with recent entries
    Digest {
        /// Must match $CRON_SECRET when that is set
        #[arg(long)]
        secret: Option<String>,

        /// Log the emails instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Week,
    All,
}

impl From<ScopeArg> for InsightScope {
    fn from(s: ScopeArg) -> Self {
        match s {
            ScopeArg::Week => InsightScope::Week,
            ScopeArg::All => InsightScope::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Day,
    Week,
    Month,
}

impl From<ModeArg> for ChartMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Day => ChartMode::Day,
            ModeArg::Week => ChartMode::Week,
            ModeArg::Month => ChartMode::Month,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Init = cli.command {
        return init_config();
    }

    let cfg = load_config()?;
    let reference = cfg.time_reference(chrono::Utc::now())?;
    let shifts = state::load_shifts(reference.tz)?;
    let records: Vec<ShiftRecord> = shifts.iter().map(|s| s.shift.clone()).collect();

    match cli.command {
        Command::Init => {}

        Command::Summary { scope } => {
            let scoped = match scope {
                ScopeArg::Week => shifts_in_current_week(&records, &reference),
                ScopeArg::All => records.clone(),
            };
            let stats = dashboard_stats(&scoped, cfg.rates.as_ref());
            emit(cli.json, &stats, || render::summary(&stats))?;
        }

        Command::Chart { mode } => {
            let buckets = bucket_shifts(
                &records,
                cfg.rates.as_ref(),
                mode.into(),
                &reference,
                cfg.bucket_options(),
            );
            emit(cli.json, &buckets, || render::chart(&buckets))?;
        }

        Command::Insights { scope } => {
            match compute_insights(&records, cfg.rates.as_ref(), scope.into(), &reference) {
                Some(report) => emit(cli.json, &report, || render::insights(&report))?,
                None => nothing_to_show(cli.json, &cfg)?,
            }
        }

        Command::Patterns => match compute_patterns(&records, cfg.rates.as_ref(), &reference) {
            Some(report) => emit(cli.json, &report, || render::patterns(&report))?,
            None => nothing_to_show(cli.json, &cfg)?,
        },

        Command::Weekly { user, name } => {
            let window = DigestWindow::ending(reference);
            let mut this_week = Vec::new();
            let mut previous_week = Vec::new();
            for us in owned_by(&shifts, user.as_deref()) {
                match window.period_of(us.shift.started_at) {
                    Some(Period::ThisWeek) => this_week.push(us.shift.clone()),
                    Some(Period::PreviousWeek) => previous_week.push(us.shift.clone()),
                    None => {}
                }
            }

            let current = calculate_weekly_stats(&this_week, cfg.rates.as_ref(), reference.tz);
            let previous = (!previous_week.is_empty())
                .then(|| calculate_weekly_stats(&previous_week, cfg.rates.as_ref(), reference.tz));
            let message = build_weekly_summary(&WeeklySummaryParams {
                full_name: name.as_deref(),
                week_label: &window.label,
                this_week: &current,
                previous_week: previous.as_ref(),
            });

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&message)?);
            } else {
                println!("Subject: {}\n\n{}", message.subject, message.text);
            }
        }

        Command::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(export_filename(reference.today())));
            write_entries_file(&path, &records)?;
            println!("Exported {} entries to {}", records.len(), path.display());
        }

        Command::Import { csv, user } => {
            if !csv.exists() {
                bail!("CSV not found: {}", csv.display());
            }
            let file =
                std::fs::File::open(&csv).with_context(|| format!("open {}", csv.display()))?;
            let mut incoming =
                parse_entries_csv(file).with_context(|| format!("parsing {}", csv.display()))?;
            if let Some(user) = &user {
                for row in &mut incoming {
                    row.user_id = Some(user.clone());
                }
            }

            let mut rows = state::read_entry_rows()?;
            let (added, replaced) = state::merge_rows(&mut rows, incoming);
            state::write_entry_rows(&rows)?;
            println!("Imported {} new and {} updated entries", added, replaced);
        }

        Command::Digest { secret, dry_run } => {
            let configured = std::env::var("CRON_SECRET").ok();
            authorize(configured.as_deref(), None, secret.as_deref())
                .context("digest authorization")?;

            let directory = InMemoryDirectory::new(load_users(state::users_path()?)?);
            if directory.is_empty() {
                tracing::warn!("no users on file; digest emails will have no recipients");
            }
            tracing::info!(users = directory.len(), "loaded user directory");

            let window = DigestWindow::ending(reference);
            let from_instant = window.fetch_from();
            let recent: Vec<UserShift> = shifts
                .iter()
                .filter(|s| s.shift.started_at >= from_instant)
                .cloned()
                .collect();
            let from = match (&cfg.digest.from_email, dry_run) {
                (Some(from), _) => from.clone(),
                (None, true) => "GigMate <digest@localhost>".to_string(),
                (None, false) => bail!("digest.from_email is not set in config.toml"),
            };

            let report = if dry_run {
                run_weekly_digest(&recent, &directory, &LogMailer, &window, &from).await
            } else {
                let key = std::env::var("RESEND_API_KEY").context("RESEND_API_KEY is not set")?;
                let mailer = ResendMailer::new(key);
                run_weekly_digest(&recent, &directory, &mailer, &window, &from).await
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn owned_by<'a>(
    shifts: &'a [UserShift],
    user: Option<&'a str>,
) -> impl Iterator<Item = &'a UserShift> {
    shifts
        .iter()
        .filter(move |s| user.is_none() || s.user_id.as_deref() == user)
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn nothing_to_show(json: bool, cfg: &Config) -> Result<()> {
    if json {
        println!("null");
    } else if cfg.rates.is_none() {
        println!("Set [rates] in config.toml to see insights.");
    } else {
        println!("Not enough shifts yet.");
    }
    Ok(())
}
