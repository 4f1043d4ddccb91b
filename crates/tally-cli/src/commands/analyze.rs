//! Input loading and the full analysis command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use tally_core::{
    analyze_with_cancel, load_expenses_csv, load_snapshot, AnalysisReport, AnalysisRequest,
    AnalysisWindow, AnalyticsConfig, CancellationToken, Snapshot, YearMonth,
};

use super::reports::{print_report, ReportSection};
use crate::cli::InputArgs;

/// Everything one analysis run needs, owned so it can move to a worker thread
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub snapshot: Snapshot,
    pub window: AnalysisWindow,
    pub anchor: NaiveDate,
    pub previous_score: Option<f64>,
}

/// Parse a YYYY-MM-DD flag value
fn parse_flag_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// Resolve a period name (or explicit --from/--to) into a window ending relative to `anchor`
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
    anchor: NaiveDate,
) -> Result<AnalysisWindow> {
    // If custom dates provided, use those
    if custom_from.is_some() || custom_to.is_some() {
        let (Some(from), Some(to)) = (custom_from, custom_to) else {
            anyhow::bail!("--from and --to must be given together");
        };
        let from_date = parse_flag_date(from, "--from")?;
        let to_date = parse_flag_date(to, "--to")?;
        return AnalysisWindow::new(from_date, to_date).context("Invalid date range");
    }

    let this_month = YearMonth::of(anchor);

    let (from, to) = match period.to_lowercase().as_str() {
        "this-month" => (this_month.first_day(), anchor),
        "last-month" => {
            let last_month = this_month.previous();
            (last_month.first_day(), last_month.last_day())
        }
        "last-3-months" => (this_month.previous().previous().first_day(), anchor),
        "this-year" => (anchor.with_ordinal(1).unwrap_or(anchor), anchor),
        "last-30-days" => (anchor - Duration::days(30), anchor),
        "last-90-days" => (anchor - Duration::days(90), anchor),
        "last-12-months" => {
            let mut start = this_month;
            for _ in 0..11 {
                start = start.previous();
            }
            (start.first_day(), anchor)
        }
        "all" => (NaiveDate::MIN, anchor),
        _ => anyhow::bail!(
            "Unknown period: {}. Available: this-month, last-month, last-3-months, this-year, last-30-days, last-90-days, last-12-months, all",
            period
        ),
    };

    AnalysisWindow::new(from, to).context("Invalid period")
}

/// Load the snapshot (plus any CSV expenses) and resolve the window
pub fn load_input(input: &InputArgs) -> Result<LoadedInput> {
    let mut snapshot = load_snapshot(&input.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", input.snapshot.display()))?;

    if let Some(path) = &input.expenses {
        let extra = load_expenses_csv(path)
            .with_context(|| format!("Failed to import expenses from {}", path.display()))?;
        debug!(path = %path.display(), count = extra.len(), "Imported CSV expenses");
        snapshot.expenses.extend(extra);
    }

    let anchor = match &input.anchor {
        Some(value) => parse_flag_date(value, "--anchor")?,
        None => Utc::now().date_naive(),
    };

    let mut window = resolve_period(
        &input.period,
        input.from.as_deref(),
        input.to.as_deref(),
        anchor,
    )?;

    // "all" starts at the first recorded expense
    if window.start == NaiveDate::MIN {
        let first = snapshot.expenses.iter().map(|e| e.date).min().unwrap_or(anchor);
        window = AnalysisWindow::new(first.min(anchor), window.end)?;
    }

    Ok(LoadedInput {
        snapshot,
        window,
        anchor,
        previous_score: input.previous_score,
    })
}

/// Analytics config from --config, the data dir override, or built-in defaults
pub fn load_analytics_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    let config = match path {
        Some(p) => AnalyticsConfig::from_path(p)
            .with_context(|| format!("Failed to load config {}", p.display()))?,
        None => AnalyticsConfig::load().context("Failed to load analytics config")?,
    };
    Ok(config)
}

/// Run the analysis on a blocking thread, cancelling it on Ctrl-C
pub async fn run_analysis(input: LoadedInput, config: AnalyticsConfig) -> Result<AnalysisReport> {
    let token = CancellationToken::new();
    let worker_token = token.clone();

    let mut handle = tokio::task::spawn_blocking(move || {
        let mut request = AnalysisRequest::new(&input.snapshot, input.window, input.anchor);
        if let Some(score) = input.previous_score {
            request = request.with_previous_score(score);
        }
        analyze_with_cancel(&request, &config, &worker_token)
    });

    let result = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling analysis");
            token.cancel();
            handle.await
        }
    };

    let report = result.context("Analysis task failed")??;
    Ok(report)
}

/// Full report: every section, or the whole report as JSON
pub async fn cmd_analyze(config_path: Option<&Path>, input: &InputArgs) -> Result<()> {
    let config = load_analytics_config(config_path)?;
    let loaded = load_input(input)?;

    let report = run_analysis(loaded, config).await?;

    if input.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("🧮 Tally Analysis");
    println!(
        "   Period: {} to {} (as of {})",
        report.window.start, report.window.end, report.anchor
    );

    for section in ReportSection::all() {
        print_report(&report, *section);
    }

    if !report.notes.is_empty() {
        println!();
        println!("ℹ️  Notes");
        for note in &report.notes {
            println!("   • {}", note);
        }
    }

    Ok(())
}

