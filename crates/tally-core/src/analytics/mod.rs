//! Analytics Engine - financial analytics over one user's expense history
//!
//! Everything is recomputed from the supplied records on each call; nothing
//! is learned or persisted between runs.
//!
//! ## Components
//!
//! - **Normalizer** - groups expenses by category, day and month
//! - **Trend Analyzer** - month-over-month change per category
//! - **Recurrence Detector** - weekly and monthly repeating charges
//! - **Anomaly Detector** - transactions far above their category's usual amount
//! - **Forecaster** - month-end projection and budget comparison
//! - **Spending Patterns** - category shares, weekdays, payment methods
//! - **Health Scorer** - composite 0-100 score with recommendations
//! - **Insight Composer** - budget warnings, goal predictions, savings opportunities
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::analytics::{analyze, AnalysisRequest};
//!
//! let request = AnalysisRequest::new(&snapshot, window, anchor);
//! let report = analyze(&request, &config)?;
//! println!("{}", report.health.overall_score);
//! ```

pub mod anomalies;
pub mod cancel;
pub mod engine;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod messages;
pub mod normalize;
pub mod patterns;
pub mod recurring;
pub mod stats;
pub mod trends;
pub mod types;

pub use anomalies::{detect_anomalies, AnomalyScan};
pub use cancel::CancellationToken;
pub use engine::{analyze, analyze_with_cancel, AnalysisReport, AnalysisRequest};
pub use forecast::forecast_spending;
pub use health::score_health;
pub use insights::{compose_insights, InsightContext};
pub use normalize::{Bucket, NormalizedView};
pub use patterns::analyze_patterns;
pub use recurring::detect_recurring;
pub use trends::{analyze_trends, total_trend};
pub use types::{
    Anomaly, AnomalySeverity, BudgetWarning, CategoryForecast, CategoryShare, CategoryTrend,
    FinancialHealthScore, Frequency, GoalPace, GoalPrediction, HealthComponent, HealthRating,
    InsufficientData, LargestExpense, PaymentMethodSpending, PercentChange, PredictiveInsights,
    Priority, Recommendation, RecommendationSource, RecurringExpense, SavingsOpportunity,
    ScoreBreakdown, ScoreTrend, SpendingForecast, SpendingPatterns, TotalTrend, TrendDirection,
    WarningSeverity, WeekdaySpending,
};
