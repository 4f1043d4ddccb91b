//! Forecaster - linear month-end projection from the month-to-date pace

use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::models::{Budget, Category};

use super::cancel::CancellationToken;
use super::normalize::NormalizedView;
use super::stats::ratio_or;
use super::types::{CategoryForecast, SpendingForecast};

/// Budgets that apply to the anchor month, keyed by category
pub fn budgets_for_month(view: &NormalizedView<'_>, budgets: &[Budget]) -> BTreeMap<Category, f64> {
    let month = view.current_month();
    let mut limits = BTreeMap::new();
    for budget in budgets.iter().filter(|b| b.period == month) {
        limits.entry(budget.category).or_insert(budget.monthly_limit);
    }
    limits
}

/// Month-end total if `spent` keeps its month-to-date daily pace
pub fn project_month_end(view: &NormalizedView<'_>, spent: f64) -> f64 {
    let days_elapsed = view.anchor.day();
    let days_remaining = view.current_month().days_in_month().saturating_sub(days_elapsed);
    spent + ratio_or(spent, days_elapsed as f64, 0.0) * days_remaining as f64
}

pub fn forecast_spending(
    view: &NormalizedView<'_>,
    budgets: &[Budget],
    cancel: &CancellationToken,
) -> Result<SpendingForecast> {
    let month = view.current_month();
    let days_elapsed = view.anchor.day();
    let days_remaining = month.days_in_month().saturating_sub(days_elapsed);

    let current_spending = view.month_to_date_total();
    let daily_average = ratio_or(current_spending, days_elapsed as f64, 0.0);
    let projected_additional_spending = daily_average * days_remaining as f64;
    let projected_month_end = current_spending + projected_additional_spending;

    let limits = budgets_for_month(view, budgets);
    let total_budget = (!limits.is_empty()).then(|| limits.values().sum::<f64>());

    let categories: BTreeSet<Category> = view
        .month_to_date
        .keys()
        .chain(limits.keys())
        .copied()
        .collect();

    let mut forecasts = Vec::new();
    for category in categories {
        cancel.check()?;

        let spent = view
            .month_to_date
            .get(&category)
            .map(|b| b.total)
            .unwrap_or(0.0);
        let daily = ratio_or(spent, days_elapsed as f64, 0.0);
        let projected = project_month_end(view, spent);
        let limit = limits.get(&category).copied();

        forecasts.push(CategoryForecast {
            category,
            current_spending: spent,
            daily_average: daily,
            projected_total: projected,
            budget_limit: limit,
            will_exceed_budget: limit.is_some_and(|l| projected > l),
            excess_amount: limit.map(|l| (projected - l).max(0.0)).unwrap_or(0.0),
        });
    }

    tracing::debug!(
        month = %month,
        days_elapsed,
        current = current_spending,
        projected = projected_month_end,
        "Spending forecast"
    );

    Ok(SpendingForecast {
        month,
        days_elapsed,
        days_remaining,
        current_spending,
        daily_average,
        projected_additional_spending,
        projected_month_end,
        total_budget,
        will_exceed_total_budget: total_budget.is_some_and(|t| projected_month_end > t),
        categories: forecasts,
    })
}
