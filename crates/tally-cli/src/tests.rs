//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;

use tally_core::test_utils::{budget, date, expense, month};
use tally_core::{AnalyticsConfig, Category, Snapshot};

use crate::cli::InputArgs;
use crate::commands::{self, truncate, ReportSection};

const SNAPSHOT: &str = r#"{
  "expenses": [
    {"id": 1, "category": "food", "amount": 40.0, "date": "2024-02-06", "payment_method": "debit_card"},
    {"id": 2, "category": "food", "amount": 60.0, "date": "2024-03-05", "payment_method": "debit_card"},
    {"id": 3, "category": "entertainment", "amount": 9.99, "date": "2024-01-10", "payment_method": "credit_card", "description": "Music"},
    {"id": 4, "category": "entertainment", "amount": 9.99, "date": "2024-02-10", "payment_method": "credit_card", "description": "Music"},
    {"id": 5, "category": "entertainment", "amount": 9.99, "date": "2024-03-10", "payment_method": "credit_card", "description": "Music"}
  ],
  "budgets": [{"category": "food", "monthly_limit": 100.0, "period": "2024-03"}],
  "goals": [{"id": 1, "title": "Bike", "target_amount": 500.0, "current_amount": 100.0, "status": "active"}]
}"#;

fn write_snapshot(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn input_args(snapshot: PathBuf) -> InputArgs {
    InputArgs {
        snapshot,
        expenses: None,
        anchor: Some("2024-03-20".to_string()),
        period: "last-3-months".to_string(),
        from: None,
        to: None,
        previous_score: None,
        json: false,
    }
}

// ========== Period Tests ==========

#[test]
fn test_resolve_period_this_month() {
    let window = commands::resolve_period("this-month", None, None, date(2024, 3, 20)).unwrap();
    assert_eq!(window.start, date(2024, 3, 1));
    assert_eq!(window.end, date(2024, 3, 20));
}

#[test]
fn test_resolve_period_last_month_crosses_year() {
    let window = commands::resolve_period("last-month", None, None, date(2024, 1, 10)).unwrap();
    assert_eq!(window.start, date(2023, 12, 1));
    assert_eq!(window.end, date(2023, 12, 31));
}

#[test]
fn test_resolve_period_last_3_months() {
    let window = commands::resolve_period("last-3-months", None, None, date(2024, 3, 20)).unwrap();
    assert_eq!(window.start, date(2024, 1, 1));
}

#[test]
fn test_resolve_period_last_12_months() {
    let window = commands::resolve_period("last-12-months", None, None, date(2024, 3, 20)).unwrap();
    assert_eq!(window.start, date(2023, 4, 1));
}

#[test]
fn test_resolve_period_this_year() {
    let window = commands::resolve_period("this-year", None, None, date(2024, 5, 20)).unwrap();
    assert_eq!(window.start, date(2024, 1, 1));
    assert_eq!(window.end, date(2024, 5, 20));
}

#[test]
fn test_resolve_period_custom_range() {
    let window = commands::resolve_period(
        "this-month",
        Some("2024-01-15"),
        Some("2024-02-15"),
        date(2024, 3, 20),
    )
    .unwrap();
    assert_eq!(window.start, date(2024, 1, 15));
    assert_eq!(window.end, date(2024, 2, 15));
}

#[test]
fn test_resolve_period_rejects_bad_input() {
    let anchor = date(2024, 3, 20);
    assert!(commands::resolve_period("fortnight", None, None, anchor).is_err());
    assert!(commands::resolve_period("all", Some("2024-01-01"), None, anchor).is_err());
    assert!(commands::resolve_period("all", Some("01/01/2024"), Some("2024-02-01"), anchor).is_err());
    assert!(commands::resolve_period("all", Some("2024-03-01"), Some("2024-02-01"), anchor).is_err());
}

// ========== Input Tests ==========

#[test]
fn test_load_input() {
    let file = write_snapshot(SNAPSHOT);
    let loaded = commands::load_input(&input_args(file.path().to_path_buf())).unwrap();

    assert_eq!(loaded.snapshot.expenses.len(), 5);
    assert_eq!(loaded.anchor, date(2024, 3, 20));
    assert_eq!(loaded.window.start, date(2024, 1, 1));
    assert_eq!(loaded.window.end, date(2024, 3, 20));
}

#[test]
fn test_load_input_all_starts_at_first_expense() {
    let file = write_snapshot(SNAPSHOT);
    let mut args = input_args(file.path().to_path_buf());
    args.period = "all".to_string();

    let loaded = commands::load_input(&args).unwrap();
    assert_eq!(loaded.window.start, date(2024, 1, 10));
}

#[test]
fn test_load_input_appends_csv_expenses() {
    let file = write_snapshot(SNAPSHOT);
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    write!(csv, "id,category,amount,date\n99,transportation,12.00,2024-03-15\n").unwrap();

    let mut args = input_args(file.path().to_path_buf());
    args.expenses = Some(csv.path().to_path_buf());

    let loaded = commands::load_input(&args).unwrap();
    assert_eq!(loaded.snapshot.expenses.len(), 6);
    assert_eq!(loaded.snapshot.expenses[5].id, 99);
}

#[test]
fn test_load_input_missing_snapshot() {
    let args = input_args(PathBuf::from("/nonexistent/tally-snapshot.json"));
    assert!(commands::load_input(&args).is_err());
}

#[test]
fn test_load_input_bad_anchor() {
    let file = write_snapshot(SNAPSHOT);
    let mut args = input_args(file.path().to_path_buf());
    args.anchor = Some("March 20".to_string());
    assert!(commands::load_input(&args).is_err());
}

// ========== Analysis Tests ==========

#[tokio::test]
async fn test_run_analysis() {
    let file = write_snapshot(SNAPSHOT);
    let loaded = commands::load_input(&input_args(file.path().to_path_buf())).unwrap();

    let report = commands::run_analysis(loaded, AnalyticsConfig::default())
        .await
        .unwrap();

    assert_eq!(report.recurring.len(), 1);
    assert_eq!(report.recurring[0].description, "Music");
    assert_eq!(report.forecast.days_elapsed, 20);
    assert_eq!(report.insights.goal_predictions.len(), 1);
}

#[tokio::test]
async fn test_run_analysis_rejects_bad_previous_score() {
    let file = write_snapshot(SNAPSHOT);
    let mut loaded = commands::load_input(&input_args(file.path().to_path_buf())).unwrap();
    loaded.previous_score = Some(140.0);

    assert!(commands::run_analysis(loaded, AnalyticsConfig::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_cmd_analyze_text_and_json() {
    let file = write_snapshot(SNAPSHOT);
    let mut args = input_args(file.path().to_path_buf());

    assert!(commands::cmd_analyze(None, &args).await.is_ok());

    args.json = true;
    assert!(commands::cmd_analyze(None, &args).await.is_ok());
}

#[tokio::test]
async fn test_cmd_report_every_section() {
    let file = write_snapshot(SNAPSHOT);
    let args = input_args(file.path().to_path_buf());

    for section in ReportSection::all() {
        let result = commands::cmd_report(None, section.as_str(), &args).await;
        assert!(result.is_ok(), "section {} failed", section.as_str());
    }
}

#[tokio::test]
async fn test_cmd_report_unknown_section() {
    let file = write_snapshot(SNAPSHOT);
    let args = input_args(file.path().to_path_buf());
    assert!(commands::cmd_report(None, "weather", &args).await.is_err());
}

#[tokio::test]
async fn test_cmd_analyze_empty_snapshot() {
    let file = write_snapshot("{}");
    let args = input_args(file.path().to_path_buf());
    assert!(commands::cmd_analyze(None, &args).await.is_ok());
}

#[tokio::test]
async fn test_run_analysis_flags_outlier() {
    let mut expenses: Vec<_> = (1..=8)
        .map(|d| expense(d, Category::Shopping, 20.0 + d as f64, date(2024, 3, d as u32)))
        .collect();
    expenses.push(expense(9, Category::Shopping, 900.0, date(2024, 3, 12)));
    let snapshot = Snapshot {
        expenses,
        budgets: vec![budget(Category::Shopping, 500.0, month(2024, 3))],
        goals: Vec::new(),
    };
    let file = write_snapshot(&serde_json::to_string(&snapshot).unwrap());

    let loaded = commands::load_input(&input_args(file.path().to_path_buf())).unwrap();
    let report = commands::run_analysis(loaded, AnalyticsConfig::default())
        .await
        .unwrap();

    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(report.anomalies[0].expense_id, 9);
    assert!(report.forecast.will_exceed_total_budget);
}

// ========== Report Section Tests ==========

#[test]
fn test_report_section_parsing() {
    assert_eq!("health".parse::<ReportSection>().unwrap(), ReportSection::Health);
    assert_eq!(" Trends ".parse::<ReportSection>().unwrap(), ReportSection::Trends);
    assert!("budget".parse::<ReportSection>().is_err());
}

#[tokio::test]
async fn test_section_json() {
    let file = write_snapshot(SNAPSHOT);
    let loaded = commands::load_input(&input_args(file.path().to_path_buf())).unwrap();
    let report = commands::run_analysis(loaded, AnalyticsConfig::default())
        .await
        .unwrap();

    let trends = commands::section_json(&report, ReportSection::Trends).unwrap();
    assert!(trends["categories"].is_array());
    assert!(trends["total"].is_object());

    let forecast = commands::section_json(&report, ReportSection::Forecast).unwrap();
    assert_eq!(forecast["month"], "2024-03");
}

// ========== Config Tests ==========

#[test]
fn test_cmd_config_with_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[anomaly]\nstddev_multiplier = 3.0\n").unwrap();

    let config = commands::load_analytics_config(Some(file.path())).unwrap();
    assert_eq!(config.anomaly.stddev_multiplier, 3.0);

    assert!(commands::cmd_config(Some(file.path()), true).is_ok());
}

#[test]
fn test_cmd_config_invalid_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[anomaly]\nstddev_multiplier = -1.0\n").unwrap();

    assert!(commands::cmd_config(Some(file.path()), true).is_err());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 10), "Netflix");
    assert_eq!(truncate("Standing desk with drawers", 12), "Standing ...");
    assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
}
