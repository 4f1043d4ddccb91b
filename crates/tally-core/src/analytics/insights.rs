//! Insight Composer - turns analyzer output into forward-looking advice
//!
//! Produces four lists:
//! - Budget warnings from the month-end forecast
//! - Goal predictions from the recent contribution pace
//! - Prioritized recommendations drawn from every analyzer
//! - Savings opportunities where spend jumped above its baseline

use chrono::{Datelike, Months, NaiveDate};
use std::collections::{BTreeSet, HashSet};

use crate::config::{AnalyticsConfig, InsightsConfig};
use crate::error::Result;
use crate::models::{Category, SavingGoal, YearMonth};

use super::cancel::CancellationToken;
use super::messages;
use super::normalize::NormalizedView;
use super::stats::{ratio, ratio_or};
use super::types::{
    Anomaly, BudgetWarning, FinancialHealthScore, Frequency, GoalPace, GoalPrediction, Priority,
    PredictiveInsights, Recommendation, RecommendationSource, RecurringExpense,
    SavingsOpportunity, SpendingForecast, WarningSeverity,
};

/// Everything the composer reads, computed earlier in the same analysis
pub struct InsightContext<'a> {
    pub view: &'a NormalizedView<'a>,
    pub forecast: &'a SpendingForecast,
    pub health: &'a FinancialHealthScore,
    pub anomalies: &'a [Anomaly],
    pub recurring: &'a [RecurringExpense],
    pub goals: &'a [SavingGoal],
}

pub fn compose_insights(
    ctx: &InsightContext<'_>,
    config: &AnalyticsConfig,
    cancel: &CancellationToken,
) -> Result<PredictiveInsights> {
    let budget_warnings = budget_warnings(ctx.forecast, &config.insights);

    let mut goal_predictions = Vec::new();
    for goal in ctx.goals.iter().filter(|g| g.is_tracked()) {
        cancel.check()?;
        goal_predictions.push(predict_goal(goal, ctx.view.anchor, &config.insights));
    }

    cancel.check()?;
    let savings_opportunities = savings_opportunities(ctx.view, &config.insights);
    let recommendations = recommendations(ctx, &budget_warnings, &goal_predictions, config);

    tracing::debug!(
        warnings = budget_warnings.len(),
        goals = goal_predictions.len(),
        recommendations = recommendations.len(),
        opportunities = savings_opportunities.len(),
        "Insights composed"
    );

    Ok(PredictiveInsights {
        budget_warnings,
        goal_predictions,
        recommendations,
        savings_opportunities,
    })
}

/// Calendar months from `anchor` to `deadline`, at least 1
///
/// A deadline earlier in its month than the anchor's day doesn't count the
/// final partial month.
pub fn months_to_deadline(anchor: NaiveDate, deadline: NaiveDate) -> u32 {
    let mut months = YearMonth::of(anchor).months_until(YearMonth::of(deadline));
    if deadline.day() < anchor.day() {
        months -= 1;
    }
    months.max(1) as u32
}

/// Mean monthly contribution over the `lookback` months ending at the anchor
pub fn average_monthly_contribution(goal: &SavingGoal, anchor: NaiveDate, lookback: u32) -> f64 {
    let Some(since) = anchor.checked_sub_months(Months::new(lookback)) else {
        return 0.0;
    };
    let total: f64 = goal
        .contributions
        .iter()
        .filter(|c| c.date > since && c.date <= anchor)
        .map(|c| c.amount)
        .sum();
    ratio_or(total, lookback as f64, 0.0)
}

pub fn budget_warnings(forecast: &SpendingForecast, config: &InsightsConfig) -> Vec<BudgetWarning> {
    let mut warnings: Vec<BudgetWarning> = forecast
        .categories
        .iter()
        .filter_map(|c| {
            let limit = c.budget_limit?;
            let projected = c.projected_total;
            let excess = projected - limit;

            let severity = if projected > limit && excess > limit * config.critical_excess_pct / 100.0
            {
                WarningSeverity::Critical
            } else if projected > limit {
                WarningSeverity::Warning
            } else if limit > 0.0 && projected >= limit * config.info_threshold_pct / 100.0 {
                WarningSeverity::Info
            } else {
                return None;
            };

            Some(BudgetWarning {
                category: c.category,
                budget_limit: limit,
                current_spending: c.current_spending,
                projected_total: projected,
                projected_pct: ratio_or(projected, limit, 0.0) * 100.0,
                excess_amount: excess.max(0.0),
                severity,
                message: messages::budget_warning(c.category, severity, projected, limit),
            })
        })
        .collect();

    warnings.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
    warnings
}

pub fn predict_goal(goal: &SavingGoal, anchor: NaiveDate, config: &InsightsConfig) -> GoalPrediction {
    let remaining = goal.remaining();
    let average = average_monthly_contribution(goal, anchor, config.contribution_lookback_months);
    let months_to_finish = ratio(remaining, average);

    let (months_left, required, status) = if goal.is_funded() {
        let months = goal
            .deadline
            .filter(|d| *d >= anchor)
            .map(|d| months_to_deadline(anchor, d));
        (months, Some(0.0), GoalPace::Ahead)
    } else {
        match goal.deadline {
            Some(deadline) if deadline < anchor => (Some(0), Some(remaining), GoalPace::Behind),
            Some(deadline) => {
                let months = months_to_deadline(anchor, deadline);
                let required = remaining / months as f64;
                let status = if required > config.behind_multiple * average {
                    GoalPace::Behind
                } else if months_to_finish
                    .is_some_and(|m| m <= months as f64 - config.ahead_margin_months)
                {
                    GoalPace::Ahead
                } else {
                    GoalPace::OnTrack
                };
                (Some(months), Some(required), status)
            }
            None if average > 0.0 => (None, None, GoalPace::OnTrack),
            None => (None, None, GoalPace::Behind),
        }
    };

    let predicted_completion = if goal.is_funded() {
        None
    } else {
        months_to_finish.and_then(|m| anchor.checked_add_months(Months::new(m.ceil() as u32)))
    };

    tracing::debug!(
        goal_id = goal.id,
        remaining,
        average,
        status = status.as_str(),
        "Goal prediction"
    );

    GoalPrediction {
        goal_id: goal.id,
        title: goal.title.clone(),
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        remaining_amount: remaining,
        progress_pct: (ratio_or(goal.current_amount, goal.target_amount, 1.0) * 100.0).min(100.0),
        deadline: goal.deadline,
        months_to_deadline: months_left,
        required_monthly: required,
        average_monthly_contribution: average,
        predicted_completion,
        status,
        message: messages::goal_prediction(&goal.title, status, required, average),
    }
}

/// Months before the anchor month that have any spending, most recent `limit`
fn baseline_months(view: &NormalizedView<'_>, limit: u32) -> Vec<YearMonth> {
    let current = view.current_month();
    let months: BTreeSet<YearMonth> = view
        .category_months
        .keys()
        .map(|(month, _)| *month)
        .filter(|m| *m < current)
        .collect();
    months.into_iter().rev().take(limit as usize).collect()
}

pub fn savings_opportunities(
    view: &NormalizedView<'_>,
    config: &InsightsConfig,
) -> Vec<SavingsOpportunity> {
    let baseline = baseline_months(view, config.baseline_months);
    if baseline.is_empty() {
        return Vec::new();
    }

    let current = view.current_month();
    let categories: BTreeSet<Category> = view
        .category_months
        .keys()
        .filter(|(month, _)| *month == current)
        .map(|(_, category)| *category)
        .collect();

    let mut opportunities: Vec<SavingsOpportunity> = categories
        .into_iter()
        .filter_map(|category| {
            let spent = view.category_month(current, category).total;
            let history: f64 = baseline
                .iter()
                .map(|m| view.category_month(*m, category).total)
                .sum();
            let typical = history / baseline.len() as f64;

            let excess_pct = ratio(spent - typical, typical)? * 100.0;
            if excess_pct <= config.opportunity_threshold_pct
                || spent - typical < config.opportunity_min_amount
            {
                return None;
            }

            let reduction = excess_pct.min(config.max_reduction_pct);
            let monthly_savings = spent * reduction / 100.0;
            Some(SavingsOpportunity {
                category,
                current_spending: spent,
                baseline_spending: typical,
                excess_pct,
                suggested_reduction_pct: reduction,
                monthly_savings,
                message: messages::savings_opportunity(category, reduction, monthly_savings),
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.monthly_savings.total_cmp(&a.monthly_savings));
    opportunities
}

/// Monthly cost of a recurring charge
fn monthly_equivalent(recurring: &RecurringExpense) -> f64 {
    match recurring.frequency {
        Frequency::Weekly => recurring.amount * 52.0 / 12.0,
        Frequency::Monthly => recurring.amount,
    }
}

fn recommendations(
    ctx: &InsightContext<'_>,
    warnings: &[BudgetWarning],
    goals: &[GoalPrediction],
    config: &AnalyticsConfig,
) -> Vec<Recommendation> {
    let mut all = Vec::new();

    for warning in warnings {
        let priority = match warning.severity {
            WarningSeverity::Critical => Priority::High,
            WarningSeverity::Warning => Priority::Medium,
            WarningSeverity::Info => continue,
        };
        all.push(Recommendation {
            source: RecommendationSource::Budget,
            priority,
            message: messages::budget_recommendation(warning.category, warning.severity),
        });
    }

    let rate = ctx.health.savings_rate;
    let target = config.health.savings_rate_target;
    let savings_priority = if rate < target / 2.0 {
        Some(Priority::High)
    } else if rate < target {
        Some(Priority::Medium)
    } else {
        None
    };
    if let Some(priority) = savings_priority {
        all.push(Recommendation {
            source: RecommendationSource::SavingsRate,
            priority,
            message: messages::savings_rate_recommendation(priority, rate, target),
        });
    }

    for prediction in goals.iter().filter(|p| p.status == GoalPace::Behind) {
        let Some(required) = prediction.required_monthly else {
            continue;
        };
        let shortfall = required - prediction.average_monthly_contribution;
        if shortfall > 0.0 {
            all.push(Recommendation {
                source: RecommendationSource::Goal,
                priority: Priority::Medium,
                message: messages::goal_recommendation(&prediction.title, shortfall),
            });
        }
    }

    if !ctx.anomalies.is_empty() {
        all.push(Recommendation {
            source: RecommendationSource::Anomaly,
            priority: Priority::Low,
            message: messages::anomaly_recommendation(ctx.anomalies.len()),
        });
    }

    let recurring_total: f64 = ctx.recurring.iter().map(monthly_equivalent).sum();
    if recurring_total > 0.0 {
        all.push(Recommendation {
            source: RecommendationSource::Recurring,
            priority: Priority::Low,
            message: messages::recurring_recommendation(ctx.recurring.len(), recurring_total),
        });
    }

    let mut seen = HashSet::new();
    all.retain(|r| seen.insert(r.message.clone()));
    all.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
    all
}
