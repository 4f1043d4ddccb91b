//! Trend Analyzer - month-over-month change per category

use std::collections::BTreeSet;

use crate::config::TrendConfig;
use crate::error::Result;
use crate::models::Category;

use super::cancel::CancellationToken;
use super::normalize::NormalizedView;
use super::stats::{percent_change, ratio_or};
use super::types::{CategoryTrend, PercentChange, TotalTrend, TrendDirection};

/// Compare `current` against `previous`; None when both are zero
pub fn compare(current: f64, previous: f64) -> Option<PercentChange> {
    if previous == 0.0 {
        return (current > 0.0).then_some(PercentChange::NewSpending);
    }
    percent_change(current, previous).map(PercentChange::Percent)
}

/// Label a change using the stable band
pub fn direction(change: Option<PercentChange>, config: &TrendConfig) -> TrendDirection {
    match change {
        Some(PercentChange::NewSpending) => TrendDirection::Increasing,
        Some(PercentChange::Percent(p)) if p > config.stable_band_pct => TrendDirection::Increasing,
        Some(PercentChange::Percent(p)) if p < -config.stable_band_pct => {
            TrendDirection::Decreasing
        }
        Some(PercentChange::Percent(_)) | None => TrendDirection::Stable,
    }
}

/// Per-category trends for the anchor month vs the month before
pub fn analyze_trends(
    view: &NormalizedView<'_>,
    config: &TrendConfig,
    cancel: &CancellationToken,
) -> Result<Vec<CategoryTrend>> {
    let current = view.current_month();
    let previous = view.previous_month();

    let categories: BTreeSet<Category> = view
        .category_months
        .keys()
        .filter(|(month, _)| *month == current || *month == previous)
        .map(|(_, category)| *category)
        .collect();

    let mut trends = Vec::new();
    for category in categories {
        cancel.check()?;

        let current_total = view.category_month(current, category).total;
        let previous_total = view.category_month(previous, category).total;

        let Some(change) = compare(current_total, previous_total) else {
            continue;
        };

        let window = view.by_category.get(&category).copied().unwrap_or_default();
        let trend = direction(Some(change), config);

        tracing::debug!(
            category = category.as_str(),
            current = current_total,
            previous = previous_total,
            trend = trend.as_str(),
            "Category trend"
        );

        trends.push(CategoryTrend {
            category,
            current_month_total: current_total,
            previous_month_total: previous_total,
            change,
            trend,
            average_transaction: ratio_or(window.total, window.count as f64, 0.0),
            transaction_count: window.count,
        });
    }

    Ok(trends)
}

/// Trend of total spend, anchor month vs the month before
pub fn total_trend(view: &NormalizedView<'_>, config: &TrendConfig) -> TotalTrend {
    let current = view.month_total(view.current_month());
    let previous = view.month_total(view.previous_month());
    let change = compare(current, previous);

    TotalTrend {
        current_month_total: current,
        previous_month_total: previous,
        change,
        trend: direction(change, config),
    }
}
