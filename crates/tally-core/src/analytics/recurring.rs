//! Recurrence Detector - finds weekly and monthly repeating charges
//!
//! A recurring charge is characterized by:
//! 1. The same description (case-insensitive, whitespace-normalized)
//! 2. The same amount, within a small tolerance
//! 3. Every gap between occurrences matching one cadence
//!
//! Irregular gaps produce nothing. Missing a real subscription is acceptable;
//! reporting a coffee shop as one is not.

use chrono::Duration;
use regex::Regex;
use std::collections::BTreeMap;

use crate::config::RecurrenceConfig;
use crate::error::Result;
use crate::models::Expense;

use super::cancel::CancellationToken;
use super::normalize::NormalizedView;
use super::types::{Frequency, RecurringExpense};

pub fn detect_recurring(
    view: &NormalizedView<'_>,
    config: &RecurrenceConfig,
    cancel: &CancellationToken,
) -> Result<Vec<RecurringExpense>> {
    let whitespace = Regex::new(r"\s+")?;

    let mut groups: BTreeMap<String, Vec<&Expense>> = BTreeMap::new();
    for expense in &view.window_expenses {
        let Some(description) = expense.description.as_deref() else {
            continue;
        };
        let key = normalize_description(&whitespace, description);
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(*expense);
    }

    let mut detected = Vec::new();
    for (key, expenses) in &groups {
        cancel.check()?;

        if expenses.len() < config.min_occurrences {
            continue;
        }

        for cluster in cluster_by_amount(expenses, config) {
            if cluster.len() < config.min_occurrences {
                continue;
            }
            if let Some(recurring) = detect_pattern(&cluster, config) {
                tracing::debug!(
                    description = key.as_str(),
                    frequency = recurring.frequency.as_str(),
                    occurrences = recurring.occurrences,
                    "Recurring charge detected"
                );
                detected.push(recurring);
            }
        }
    }

    detected.sort_by(|a, b| {
        a.next_expected
            .cmp(&b.next_expected)
            .then_with(|| a.description.cmp(&b.description))
    });

    Ok(detected)
}

/// Lowercase, trim and collapse internal whitespace
fn normalize_description(whitespace: &Regex, description: &str) -> String {
    whitespace
        .replace_all(description.trim(), " ")
        .to_lowercase()
}

/// Whether `amount` is close enough to `reference` to be the same charge
fn amounts_match(reference: f64, amount: f64, config: &RecurrenceConfig) -> bool {
    let tolerance = (reference * config.amount_tolerance_pct / 100.0).max(config.amount_tolerance_abs);
    (amount - reference).abs() <= tolerance
}

/// Split one description group into clusters of matching amounts, each in date order
fn cluster_by_amount<'a>(expenses: &[&'a Expense], config: &RecurrenceConfig) -> Vec<Vec<&'a Expense>> {
    let mut by_amount: Vec<&Expense> = expenses.to_vec();
    by_amount.sort_by(|a, b| a.amount.total_cmp(&b.amount).then_with(|| a.id.cmp(&b.id)));

    let mut clusters: Vec<Vec<&Expense>> = Vec::new();
    for expense in by_amount {
        match clusters.last_mut() {
            Some(cluster) if amounts_match(cluster[0].amount, expense.amount, config) => {
                cluster.push(expense)
            }
            _ => clusters.push(vec![expense]),
        }
    }

    for cluster in &mut clusters {
        cluster.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    }
    clusters
}

fn classify_gap(gap: i64, config: &RecurrenceConfig) -> Option<Frequency> {
    if (gap - config.weekly_days).abs() <= config.weekly_tolerance_days {
        return Some(Frequency::Weekly);
    }
    let low = config.monthly_min_days - config.monthly_tolerance_days;
    let high = config.monthly_max_days + config.monthly_tolerance_days;
    if (low..=high).contains(&gap) {
        return Some(Frequency::Monthly);
    }
    None
}

/// Most common gap; ties resolve to the shorter one
fn modal_gap(gaps: &[i64]) -> Option<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for gap in gaps {
        *counts.entry(*gap).or_insert(0) += 1;
    }

    let mut best: Option<(i64, usize)> = None;
    for (gap, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((gap, count)),
        }
    }
    best.map(|(gap, _)| gap)
}

/// Check a date-ordered cluster for a consistent cadence
fn detect_pattern(cluster: &[&Expense], config: &RecurrenceConfig) -> Option<RecurringExpense> {
    let gaps: Vec<i64> = cluster
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect();

    let frequency = classify_gap(*gaps.first()?, config)?;
    if gaps.iter().any(|g| classify_gap(*g, config) != Some(frequency)) {
        return None;
    }

    let interval = modal_gap(&gaps)?;
    let first = cluster.first()?;
    let last = cluster.last()?;

    Some(RecurringExpense {
        description: first
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        category: last.category,
        amount: last.amount,
        frequency,
        occurrences: cluster.len(),
        interval_days: interval,
        last_occurrence: last.date,
        next_expected: last.date + Duration::days(interval),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisWindow, Category};
    use crate::test_utils::{date, described};

    fn detect(expenses: &[Expense]) -> Vec<RecurringExpense> {
        let window = AnalysisWindow::new(date(2024, 1, 1), date(2024, 6, 30)).unwrap();
        let view = NormalizedView::build(expenses, window, date(2024, 6, 30)).unwrap();
        detect_recurring(&view, &RecurrenceConfig::default(), &CancellationToken::new()).unwrap()
    }

    #[test]
    fn test_monthly_every_28_days() {
        // Days 1, 29 and 57 of the window
        let expenses = vec![
            described(1, Category::Entertainment, 15.49, date(2024, 1, 1), "Netflix"),
            described(2, Category::Entertainment, 15.49, date(2024, 1, 29), "Netflix"),
            described(3, Category::Entertainment, 15.49, date(2024, 2, 26), "Netflix"),
        ];
        let detected = detect(&expenses);

        assert_eq!(detected.len(), 1);
        let netflix = &detected[0];
        assert_eq!(netflix.frequency, Frequency::Monthly);
        assert_eq!(netflix.interval_days, 28);
        assert_eq!(netflix.occurrences, 3);
        assert_eq!(netflix.last_occurrence, date(2024, 2, 26));
        // Day 85 of the window
        assert_eq!(netflix.next_expected, date(2024, 3, 25));
        assert_eq!(
            (netflix.next_expected - date(2024, 1, 1)).num_days() + 1,
            85
        );
    }

    #[test]
    fn test_weekly_with_normalized_descriptions() {
        let expenses = vec![
            described(1, Category::Food, 20.00, date(2024, 3, 2), "Farmers  Market"),
            described(2, Category::Food, 20.25, date(2024, 3, 9), " farmers market"),
            described(3, Category::Food, 19.80, date(2024, 3, 17), "FARMERS MARKET "),
        ];
        let detected = detect(&expenses);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].frequency, Frequency::Weekly);
        assert_eq!(detected[0].amount, 19.80);
        assert_eq!(detected[0].description, "Farmers  Market");
        // Gaps 7 and 8: both count once, shorter wins
        assert_eq!(detected[0].interval_days, 7);
        assert_eq!(detected[0].next_expected, date(2024, 3, 24));
    }

    #[test]
    fn test_irregular_gaps_not_reported() {
        let expenses = vec![
            described(1, Category::Food, 4.50, date(2024, 3, 1), "Coffee"),
            described(2, Category::Food, 4.50, date(2024, 3, 8), "Coffee"),
            described(3, Category::Food, 4.50, date(2024, 4, 8), "Coffee"),
        ];
        assert!(detect(&expenses).is_empty());

        let expenses = vec![
            described(1, Category::Food, 4.50, date(2024, 3, 1), "Coffee"),
            described(2, Category::Food, 4.50, date(2024, 3, 15), "Coffee"),
        ];
        assert!(detect(&expenses).is_empty());
    }

    #[test]
    fn test_different_amounts_split_clusters() {
        let expenses = vec![
            described(1, Category::Utilities, 60.0, date(2024, 1, 5), "City Power"),
            described(2, Category::Utilities, 60.0, date(2024, 2, 5), "City Power"),
            described(3, Category::Utilities, 95.0, date(2024, 1, 20), "City Power"),
            described(4, Category::Utilities, 140.0, date(2024, 2, 20), "City Power"),
        ];
        let detected = detect(&expenses);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].amount, 60.0);
        assert_eq!(detected[0].interval_days, 31);
        assert_eq!(detected[0].next_expected, date(2024, 3, 7));
    }

    #[test]
    fn test_single_occurrence_and_missing_description() {
        let mut no_description = described(2, Category::Housing, 900.0, date(2024, 2, 1), "");
        no_description.description = None;
        let expenses = vec![
            described(1, Category::Housing, 900.0, date(2024, 1, 1), "Rent"),
            no_description,
            described(3, Category::Housing, 900.0, date(2024, 3, 1), "   "),
        ];
        assert!(detect(&expenses).is_empty());
    }

    #[test]
    fn test_amount_tolerance() {
        let config = RecurrenceConfig::default();
        assert!(amounts_match(100.0, 101.9, &config));
        assert!(!amounts_match(100.0, 102.5, &config));
        // Absolute floor dominates for small amounts
        assert!(amounts_match(5.0, 5.45, &config));
    }

    #[test]
    fn test_modal_gap() {
        assert_eq!(modal_gap(&[30, 31, 31]), Some(31));
        assert_eq!(modal_gap(&[31, 30]), Some(30));
        assert_eq!(modal_gap(&[]), None);
    }
}
