//! Analytics Engine - validates input and runs every analyzer over one view

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisWindow, Budget, Expense, SavingGoal, Snapshot};

use super::anomalies::detect_anomalies;
use super::cancel::CancellationToken;
use super::forecast::{budgets_for_month, forecast_spending};
use super::health::{previous_period_score, score_health};
use super::insights::{compose_insights, InsightContext};
use super::normalize::NormalizedView;
use super::patterns::analyze_patterns;
use super::recurring::detect_recurring;
use super::trends::{analyze_trends, total_trend};
use super::types::{
    Anomaly, CategoryTrend, FinancialHealthScore, InsufficientData, PredictiveInsights,
    RecurringExpense, SpendingForecast, SpendingPatterns, TotalTrend,
};

/// Input to one analysis run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub expenses: &'a [Expense],
    pub budgets: &'a [Budget],
    pub goals: &'a [SavingGoal],
    pub window: AnalysisWindow,
    /// "Today" for month-elapsed calculations
    pub anchor: NaiveDate,
    /// Health score of the previous period, recomputed when absent
    pub previous_score: Option<f64>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(snapshot: &'a Snapshot, window: AnalysisWindow, anchor: NaiveDate) -> Self {
        Self {
            expenses: &snapshot.expenses,
            budgets: &snapshot.budgets,
            goals: &snapshot.goals,
            window,
            anchor,
            previous_score: None,
        }
    }

    pub fn with_previous_score(mut self, score: f64) -> Self {
        self.previous_score = Some(score);
        self
    }

    /// Check every record before anything is computed
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        for expense in self.expenses {
            expense.validate()?;
        }
        for budget in self.budgets {
            budget.validate()?;
        }
        for goal in self.goals {
            goal.validate()?;
        }
        if let Some(score) = self.previous_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(Error::InvalidData(format!(
                    "previous score must be between 0 and 100, got {}",
                    score
                )));
            }
        }
        Ok(())
    }
}

/// Everything one analysis produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window: AnalysisWindow,
    pub anchor: NaiveDate,
    pub trends: Vec<CategoryTrend>,
    pub total_trend: TotalTrend,
    pub recurring: Vec<RecurringExpense>,
    pub anomalies: Vec<Anomaly>,
    pub forecast: SpendingForecast,
    pub patterns: SpendingPatterns,
    pub health: FinancialHealthScore,
    pub insights: PredictiveInsights,
    /// Parts of the report computed from incomplete data
    pub notes: Vec<InsufficientData>,
}

pub fn analyze(request: &AnalysisRequest<'_>, config: &AnalyticsConfig) -> Result<AnalysisReport> {
    analyze_with_cancel(request, config, &CancellationToken::new())
}

pub fn analyze_with_cancel(
    request: &AnalysisRequest<'_>,
    config: &AnalyticsConfig,
    cancel: &CancellationToken,
) -> Result<AnalysisReport> {
    request.validate()?;
    cancel.check()?;

    let view = NormalizedView::build(request.expenses, request.window, request.anchor)?;
    let mut notes = Vec::new();

    if view.window_expenses.is_empty() {
        notes.push(InsufficientData::NoExpenses);
    }
    if view.month_total(view.previous_month()) == 0.0 {
        notes.push(InsufficientData::NoPreviousMonth);
    }
    if budgets_for_month(&view, request.budgets).is_empty() {
        notes.push(InsufficientData::NoBudgets);
    }
    if !request.goals.iter().any(|g| g.is_tracked()) {
        notes.push(InsufficientData::NoGoals);
    }

    let trends = analyze_trends(&view, &config.trend, cancel)?;
    let total_trend = total_trend(&view, &config.trend);
    let recurring = detect_recurring(&view, &config.recurrence, cancel)?;
    let scan = detect_anomalies(&view, &config.anomaly, cancel)?;
    notes.extend(scan.skipped);
    let anomalies = scan.anomalies;
    let forecast = forecast_spending(&view, request.budgets, cancel)?;
    let patterns = analyze_patterns(&view, &config.patterns);

    cancel.check()?;
    let previous_score = match request.previous_score {
        Some(score) => Some(score),
        None => previous_period_score(
            request.expenses,
            request.budgets,
            request.goals,
            &view,
            config,
        )?,
    };
    let health = score_health(
        &view,
        request.budgets,
        request.goals,
        previous_score,
        config,
    );

    let ctx = InsightContext {
        view: &view,
        forecast: &forecast,
        health: &health,
        anomalies: &anomalies,
        recurring: &recurring,
        goals: request.goals,
    };
    let insights = compose_insights(&ctx, config, cancel)?;

    tracing::info!(
        start = %request.window.start,
        end = %request.window.end,
        expenses = view.window_expenses.len(),
        recurring = recurring.len(),
        anomalies = anomalies.len(),
        score = health.overall_score,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        window: request.window,
        anchor: request.anchor,
        trends,
        total_trend,
        recurring,
        anomalies,
        forecast,
        patterns,
        health,
        insights,
        notes,
    })
}
