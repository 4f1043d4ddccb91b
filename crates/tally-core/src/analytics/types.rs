//! Result types produced by the analyzers
//!
//! Everything here is a plain value object: computed fresh on every call and
//! serializable so the caller can hand it straight to a transport layer.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Category, PaymentMethod, YearMonth};

/// Direction of a month-over-month comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percentage change, or a sentinel when there is nothing to compare against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PercentChange {
    Percent(f64),
    /// Previous period was exactly zero and the current one is not
    NewSpending,
}

impl PercentChange {
    /// Numeric value, None for the sentinel
    pub fn value(&self) -> Option<f64> {
        match self {
            PercentChange::Percent(p) => Some(*p),
            PercentChange::NewSpending => None,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Percent(p) => write!(f, "{:+.1}%", p),
            PercentChange::NewSpending => write!(f, "new spending"),
        }
    }
}

/// Current vs previous month for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: Category,
    pub current_month_total: f64,
    pub previous_month_total: f64,
    pub change: PercentChange,
    pub trend: TrendDirection,
    /// Window total / window transaction count for the category
    pub average_transaction: f64,
    pub transaction_count: usize,
}

/// Current vs previous month across all categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalTrend {
    pub current_month_total: f64,
    pub previous_month_total: f64,
    /// None when both months are empty
    pub change: Option<PercentChange>,
    pub trend: TrendDirection,
}

/// How often a recurring charge repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A charge that repeats on a regular cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub description: String,
    pub category: Category,
    /// Amount of the most recent occurrence
    pub amount: f64,
    pub frequency: Frequency,
    pub occurrences: usize,
    pub interval_days: i64,
    pub last_occurrence: NaiveDate,
    pub next_expected: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Low => "low",
            AnomalySeverity::Medium => "medium",
            AnomalySeverity::High => "high",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction far above its category's usual amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub expense_id: i64,
    pub category: Category,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: Option<String>,
    /// Leave-one-out mean of the category
    pub typical_amount: f64,
    pub std_dev: f64,
    pub deviation_pct: f64,
    pub severity: AnomalySeverity,
    pub reason: String,
}

/// Month-end projection for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForecast {
    pub category: Category,
    pub current_spending: f64,
    pub daily_average: f64,
    pub projected_total: f64,
    pub budget_limit: Option<f64>,
    pub will_exceed_budget: bool,
    pub excess_amount: f64,
}

/// Month-end projection for the anchor month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub month: YearMonth,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    pub current_spending: f64,
    pub daily_average: f64,
    pub projected_additional_spending: f64,
    pub projected_month_end: f64,
    /// Sum of all budgets for the month, None when there are none
    pub total_budget: Option<f64>,
    pub will_exceed_total_budget: bool,
    pub categories: Vec<CategoryForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdaySpending {
    pub weekday: Weekday,
    pub amount: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodSpending {
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargestExpense {
    pub expense_id: i64,
    pub category: Category,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Where and when money goes within the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPatterns {
    pub total_spending: f64,
    pub transaction_count: usize,
    pub average_daily_spending: f64,
    pub average_transaction: f64,
    pub top_categories: Vec<CategoryShare>,
    /// Monday through Sunday
    pub by_weekday: Vec<WeekdaySpending>,
    pub peak_weekday: Option<Weekday>,
    pub by_payment_method: Vec<PaymentMethodSpending>,
    pub largest_expense: Option<LargestExpense>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            HealthRating::Excellent
        } else if score >= 70.0 {
            HealthRating::Good
        } else if score >= 50.0 {
            HealthRating::Fair
        } else {
            HealthRating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthRating::Excellent => "Excellent",
            HealthRating::Good => "Good",
            HealthRating::Fair => "Fair",
            HealthRating::Poor => "Poor",
        }
    }
}

impl fmt::Display for HealthRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score movement between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTrend {
    Improving,
    Stable,
    Declining,
}

impl ScoreTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTrend::Improving => "improving",
            ScoreTrend::Stable => "stable",
            ScoreTrend::Declining => "declining",
        }
    }
}

impl fmt::Display for ScoreTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five parts of the health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthComponent {
    Savings,
    Budget,
    Goals,
    Trend,
    Emergency,
}

impl HealthComponent {
    /// Maximum points the component contributes
    pub fn max(&self) -> f64 {
        match self {
            HealthComponent::Savings => 30.0,
            HealthComponent::Budget => 25.0,
            HealthComponent::Goals => 20.0,
            HealthComponent::Trend => 15.0,
            HealthComponent::Emergency => 10.0,
        }
    }

    pub fn all() -> &'static [HealthComponent] {
        &[
            HealthComponent::Savings,
            HealthComponent::Budget,
            HealthComponent::Goals,
            HealthComponent::Trend,
            HealthComponent::Emergency,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub savings_score: f64,
    pub budget_score: f64,
    pub goal_score: f64,
    pub trend_score: f64,
    pub emergency_score: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, component: HealthComponent) -> f64 {
        match component {
            HealthComponent::Savings => self.savings_score,
            HealthComponent::Budget => self.budget_score,
            HealthComponent::Goals => self.goal_score,
            HealthComponent::Trend => self.trend_score,
            HealthComponent::Emergency => self.emergency_score,
        }
    }

    pub fn total(&self) -> f64 {
        HealthComponent::all().iter().map(|c| self.get(*c)).sum()
    }
}

/// Composite 0-100 financial health score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealthScore {
    pub overall_score: f64,
    pub rating: HealthRating,
    pub breakdown: ScoreBreakdown,
    pub savings_rate: f64,
    /// Months of average expenses the savings balance covers
    pub emergency_coverage_months: Option<f64>,
    pub trend: ScoreTrend,
    pub previous_score: Option<f64>,
    pub recommendations: Vec<String>,
}

/// Severity of a budget warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
    Critical,
}

impl WarningSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningSeverity::Info => "info",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            WarningSeverity::Info => 1,
            WarningSeverity::Warning => 2,
            WarningSeverity::Critical => 3,
        }
    }
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetWarning {
    pub category: Category,
    pub budget_limit: f64,
    pub current_spending: f64,
    pub projected_total: f64,
    /// Projected total as a percentage of the limit
    pub projected_pct: f64,
    pub excess_amount: f64,
    pub severity: WarningSeverity,
    pub message: String,
}

/// Whether a goal is on pace for its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPace {
    Ahead,
    OnTrack,
    Behind,
}

impl GoalPace {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPace::Ahead => "ahead",
            GoalPace::OnTrack => "on-track",
            GoalPace::Behind => "behind",
        }
    }
}

impl fmt::Display for GoalPace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPrediction {
    pub goal_id: i64,
    pub title: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining_amount: f64,
    pub progress_pct: f64,
    pub deadline: Option<NaiveDate>,
    pub months_to_deadline: Option<u32>,
    pub required_monthly: Option<f64>,
    pub average_monthly_contribution: f64,
    pub predicted_completion: Option<NaiveDate>,
    pub status: GoalPace,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a recommendation was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Budget,
    SavingsRate,
    Goal,
    Anomaly,
    Recurring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub source: RecommendationSource,
    pub priority: Priority,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub category: Category,
    pub current_spending: f64,
    /// Mean monthly spend over the baseline months
    pub baseline_spending: f64,
    pub excess_pct: f64,
    pub suggested_reduction_pct: f64,
    pub monthly_savings: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictiveInsights {
    pub budget_warnings: Vec<BudgetWarning>,
    pub goal_predictions: Vec<GoalPrediction>,
    pub recommendations: Vec<Recommendation>,
    pub savings_opportunities: Vec<SavingsOpportunity>,
}

/// A documented gap in the input: the result is partial, not an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsufficientData {
    NoExpenses,
    NoPreviousMonth,
    NoBudgets,
    NoGoals,
    /// Category skipped by anomaly detection
    AnomalySample {
        category: Category,
        transactions: usize,
    },
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientData::NoExpenses => write!(f, "no expenses in the analysis window"),
            InsufficientData::NoPreviousMonth => {
                write!(f, "no spending recorded for the previous month")
            }
            InsufficientData::NoBudgets => write!(f, "no budgets for the current month"),
            InsufficientData::NoGoals => write!(f, "no active saving goals"),
            InsufficientData::AnomalySample {
                category,
                transactions,
            } => write!(
                f,
                "{} has only {} transactions, too few for anomaly detection",
                category.label(),
                transactions
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(HealthRating::from_score(100.0), HealthRating::Excellent);
        assert_eq!(HealthRating::from_score(85.0), HealthRating::Excellent);
        assert_eq!(HealthRating::from_score(84.9), HealthRating::Good);
        assert_eq!(HealthRating::from_score(70.0), HealthRating::Good);
        assert_eq!(HealthRating::from_score(50.0), HealthRating::Fair);
        assert_eq!(HealthRating::from_score(0.0), HealthRating::Poor);
    }

    #[test]
    fn test_component_caps_sum_to_100() {
        let total: f64 = HealthComponent::all().iter().map(|c| c.max()).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert!(WarningSeverity::Critical.priority() > WarningSeverity::Warning.priority());
    }

    #[test]
    fn test_percent_change_serialization() {
        let json = serde_json::to_value(PercentChange::NewSpending).unwrap();
        assert_eq!(json["kind"], "new_spending");

        let json = serde_json::to_value(PercentChange::Percent(50.0)).unwrap();
        assert_eq!(json["kind"], "percent");
        assert_eq!(json["value"], 50.0);
        assert_eq!(PercentChange::Percent(50.0).to_string(), "+50.0%");
    }

    #[test]
    fn test_insufficient_data_serialization() {
        let note = InsufficientData::AnomalySample {
            category: Category::Travel,
            transactions: 2,
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["kind"], "anomaly_sample");
        assert_eq!(json["category"], "travel");
        assert!(note.to_string().contains("Travel"));
    }
}
