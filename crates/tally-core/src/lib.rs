//! Tally Core Library
//!
//! Financial analytics for the Tally personal finance tracker:
//! - Expense, budget and saving goal models
//! - Snapshot and CSV import
//! - Tunable analytics configuration
//! - The analytics engine (trends, recurring charges, anomalies, forecast,
//!   spending patterns, health score, predictive insights)

pub mod analytics;
pub mod config;
pub mod error;
pub mod import;
pub mod models;

/// Builders for expenses, budgets and goals
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{analyze, analyze_with_cancel, AnalysisReport, AnalysisRequest, CancellationToken};
pub use config::AnalyticsConfig;
pub use error::{Error, Result};
pub use import::{load_expenses_csv, load_snapshot, parse_expenses_csv};
pub use models::{
    AnalysisWindow, Budget, Category, Contribution, Expense, GoalStatus, PaymentMethod,
    SavingGoal, Snapshot, YearMonth,
};
