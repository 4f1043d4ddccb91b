//! Health Scorer - composite 0-100 financial health score
//!
//! Five sub-scores with fixed caps:
//! - Savings (30): share of money kept rather than spent
//! - Budget (25): how far projected anchor-month spend is over the limits
//! - Goals (20): progress on saving goals, penalized when late
//! - Trend (15): projected month-end spend against the previous month
//! - Emergency (10): months of expenses the savings would cover

use chrono::{Duration, NaiveDate};

use crate::config::{AnalyticsConfig, HealthConfig, TrendConfig};
use crate::error::Result;
use crate::models::{AnalysisWindow, Budget, Expense, SavingGoal};

use super::forecast::{budgets_for_month, project_month_end};
use super::insights::{average_monthly_contribution, months_to_deadline};
use super::messages;
use super::normalize::NormalizedView;
use super::stats::{mean, ratio, ratio_or, round2};
use super::trends::compare;
use super::types::{
    FinancialHealthScore, HealthComponent, HealthRating, PercentChange, ScoreBreakdown, ScoreTrend,
};

/// Sub-scores plus the ratios they were derived from
#[derive(Debug, Clone, PartialEq)]
pub struct HealthComponents {
    pub breakdown: ScoreBreakdown,
    pub savings_rate: f64,
    pub emergency_coverage_months: Option<f64>,
}

/// Compute the five sub-scores for one window
pub fn score_components(
    view: &NormalizedView<'_>,
    budgets: &[Budget],
    goals: &[SavingGoal],
    config: &AnalyticsConfig,
) -> HealthComponents {
    let tracked: Vec<&SavingGoal> = goals.iter().filter(|g| g.is_tracked()).collect();
    let total_savings: f64 = tracked.iter().map(|g| g.current_amount).sum();
    let window_spend = view.window_total();

    let savings_rate = ratio_or(total_savings, window_spend + total_savings, 0.0);
    let savings_score = (HealthComponent::Savings.max() * savings_rate
        / config.health.savings_rate_target)
        .min(HealthComponent::Savings.max());

    let average_monthly = view.average_monthly_spend();
    let emergency_coverage_months = ratio(total_savings, average_monthly);
    let emergency_score = emergency_score(total_savings, emergency_coverage_months, &config.health);

    let breakdown = ScoreBreakdown {
        savings_score,
        budget_score: budget_score(view, budgets),
        goal_score: goal_score(&tracked, view.anchor, config),
        trend_score: trend_score(view, &config.trend, &config.health),
        emergency_score,
    };

    HealthComponents {
        breakdown,
        savings_rate,
        emergency_coverage_months,
    }
}

pub fn score_health(
    view: &NormalizedView<'_>,
    budgets: &[Budget],
    goals: &[SavingGoal],
    previous_score: Option<f64>,
    config: &AnalyticsConfig,
) -> FinancialHealthScore {
    let components = score_components(view, budgets, goals, config);
    let overall_score = round2(components.breakdown.total().clamp(0.0, 100.0));

    let trend = match previous_score {
        Some(previous) if overall_score - previous > config.health.score_tolerance => {
            ScoreTrend::Improving
        }
        Some(previous) if overall_score - previous < -config.health.score_tolerance => {
            ScoreTrend::Declining
        }
        _ => ScoreTrend::Stable,
    };

    tracing::debug!(
        score = overall_score,
        savings = components.breakdown.savings_score,
        budget = components.breakdown.budget_score,
        goals = components.breakdown.goal_score,
        trend = components.breakdown.trend_score,
        emergency = components.breakdown.emergency_score,
        "Health score"
    );

    FinancialHealthScore {
        overall_score,
        rating: HealthRating::from_score(overall_score),
        recommendations: recommendations(&components.breakdown, &config.health),
        breakdown: components.breakdown,
        savings_rate: components.savings_rate,
        emergency_coverage_months: components.emergency_coverage_months,
        trend,
        previous_score,
    }
}

/// Window of the same length ending on the last day of the month before the anchor
pub fn previous_window(view: &NormalizedView<'_>) -> Option<(AnalysisWindow, NaiveDate)> {
    let end = view.previous_month().last_day();
    let start = end.checked_sub_signed(Duration::days(view.window.days() - 1))?;
    let window = AnalysisWindow::new(start, end).ok()?;
    Some((window, end))
}

/// Score of the previous period, None when it has no spending to score
pub fn previous_period_score(
    expenses: &[Expense],
    budgets: &[Budget],
    goals: &[SavingGoal],
    view: &NormalizedView<'_>,
    config: &AnalyticsConfig,
) -> Result<Option<f64>> {
    let Some((window, anchor)) = previous_window(view) else {
        return Ok(None);
    };

    let previous = NormalizedView::build(expenses, window, anchor)?;
    if previous.window_expenses.is_empty() {
        return Ok(None);
    }

    let components = score_components(&previous, budgets, goals, config);
    let score = round2(components.breakdown.total().clamp(0.0, 100.0));
    tracing::debug!(
        start = %window.start,
        end = %window.end,
        score,
        "Previous period score"
    );
    Ok(Some(score))
}

fn budget_score(view: &NormalizedView<'_>, budgets: &[Budget]) -> f64 {
    let penalties: Vec<f64> = budgets_for_month(view, budgets)
        .into_iter()
        .map(|(category, limit)| {
            let to_date = view
                .month_to_date
                .get(&category)
                .map(|b| b.total)
                .unwrap_or(0.0);
            let spent = project_month_end(view, to_date);
            if spent <= limit {
                0.0
            } else {
                (0.5 + ratio_or(spent - limit, limit, 1.0)).min(1.0)
            }
        })
        .collect();

    match mean(&penalties) {
        Some(penalty) => HealthComponent::Budget.max() * (1.0 - penalty),
        None => 0.0,
    }
}

fn goal_score(goals: &[&SavingGoal], anchor: NaiveDate, config: &AnalyticsConfig) -> f64 {
    let progress: Vec<f64> = goals
        .iter()
        .map(|goal| {
            let ratio = ratio_or(goal.current_amount, goal.target_amount, 1.0).min(1.0);
            if goal.is_funded() {
                return ratio;
            }

            let Some(deadline) = goal.deadline else {
                return ratio;
            };
            if deadline < anchor {
                return ratio * 0.5;
            }

            let months = months_to_deadline(anchor, deadline);
            if months as i32 <= config.health.deadline_warning_months {
                let required = goal.remaining() / months as f64;
                let average = average_monthly_contribution(
                    goal,
                    anchor,
                    config.insights.contribution_lookback_months,
                );
                if required > average {
                    return ratio * 0.75;
                }
            }
            ratio
        })
        .collect();

    mean(&progress)
        .map(|p| HealthComponent::Goals.max() * p)
        .unwrap_or(0.0)
}

fn trend_score(view: &NormalizedView<'_>, trend: &TrendConfig, health: &HealthConfig) -> f64 {
    let cap = HealthComponent::Trend.max();
    let stable = cap * 0.8;

    let projected = project_month_end(view, view.month_to_date_total());
    let previous = view.month_total(view.previous_month());

    match compare(projected, previous) {
        None | Some(PercentChange::NewSpending) => 0.0,
        Some(PercentChange::Percent(change)) if change < -trend.stable_band_pct => cap,
        Some(PercentChange::Percent(change)) if change <= trend.stable_band_pct => stable,
        Some(PercentChange::Percent(change)) => {
            let over = ratio_or(
                change - trend.stable_band_pct,
                health.sharp_increase_pct - trend.stable_band_pct,
                1.0,
            );
            (stable * (1.0 - over)).clamp(0.0, stable)
        }
    }
}

fn emergency_score(total_savings: f64, coverage: Option<f64>, config: &HealthConfig) -> f64 {
    let cap = HealthComponent::Emergency.max();
    if total_savings <= 0.0 {
        return 0.0;
    }
    match coverage {
        // Savings but nothing spent
        None => cap,
        Some(months) => (cap * months / config.emergency_months).min(cap),
    }
}

fn recommendations(breakdown: &ScoreBreakdown, config: &HealthConfig) -> Vec<String> {
    let mut ratios: Vec<(HealthComponent, f64)> = HealthComponent::all()
        .iter()
        .map(|c| (*c, breakdown.get(*c) / c.max()))
        .collect();
    ratios.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut weak: Vec<HealthComponent> = ratios
        .iter()
        .filter(|(_, r)| *r < config.recommendation_ratio)
        .map(|(c, _)| *c)
        .collect();

    if weak.is_empty() && breakdown.total() < 100.0 {
        if let Some((lowest, ratio)) = ratios.first() {
            if *ratio < 1.0 {
                weak.push(*lowest);
            }
        }
    }

    weak.into_iter()
        .map(|c| messages::health_recommendation(c).to_string())
        .collect()
}
