//! Anomaly Detector - transactions far above their category's usual amount
//!
//! Each candidate is compared against the *other* transactions in its
//! category (leave-one-out), so a single huge purchase cannot hide itself by
//! inflating the mean it is measured against.

use crate::config::AnomalyConfig;
use crate::error::Result;
use crate::models::{Category, Expense};

use super::cancel::CancellationToken;
use super::messages;
use super::normalize::NormalizedView;
use super::stats::{mean, ratio, std_dev};
use super::types::{Anomaly, AnomalySeverity, InsufficientData};

/// Flagged transactions plus the categories that were too small to judge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyScan {
    pub anomalies: Vec<Anomaly>,
    pub skipped: Vec<InsufficientData>,
}

pub fn detect_anomalies(
    view: &NormalizedView<'_>,
    config: &AnomalyConfig,
    cancel: &CancellationToken,
) -> Result<AnomalyScan> {
    let mut scan = AnomalyScan::default();

    for (category, expenses) in view.expenses_by_category() {
        cancel.check()?;

        if expenses.len() < config.min_history {
            tracing::debug!(
                category = category.as_str(),
                count = expenses.len(),
                "Too few transactions for anomaly detection"
            );
            scan.skipped.push(InsufficientData::AnomalySample {
                category,
                transactions: expenses.len(),
            });
            continue;
        }

        let found = scan_category(category, &expenses, config);
        if !found.is_empty() {
            tracing::debug!(
                category = category.as_str(),
                count = found.len(),
                "Anomalies detected"
            );
        }
        scan.anomalies.extend(found);
    }

    scan.anomalies.sort_by(|a, b| {
        b.deviation_pct
            .total_cmp(&a.deviation_pct)
            .then_with(|| a.expense_id.cmp(&b.expense_id))
    });

    Ok(scan)
}

fn scan_category(category: Category, expenses: &[&Expense], config: &AnomalyConfig) -> Vec<Anomaly> {
    let amounts: Vec<f64> = expenses.iter().map(|e| e.amount).collect();
    let mut anomalies = Vec::new();

    for (i, expense) in expenses.iter().enumerate() {
        if expense.amount <= config.absolute_floor {
            continue;
        }

        let others: Vec<f64> = amounts
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, a)| *a)
            .collect();
        let (Some(typical), Some(spread)) = (mean(&others), std_dev(&others)) else {
            continue;
        };

        if expense.amount <= typical + config.stddev_multiplier * spread {
            continue;
        }

        let deviation = ratio(expense.amount - typical, typical).map(|r| r * 100.0);
        let deviation_pct = deviation.unwrap_or(0.0);

        anomalies.push(Anomaly {
            expense_id: expense.id,
            category,
            date: expense.date,
            amount: expense.amount,
            description: expense.description.clone(),
            typical_amount: typical,
            std_dev: spread,
            deviation_pct,
            severity: severity(deviation),
            reason: messages::anomaly_reason(category, deviation_pct),
        });
    }

    anomalies
}

/// None means the typical amount was zero: any spend is off the scale
fn severity(deviation_pct: Option<f64>) -> AnomalySeverity {
    match deviation_pct {
        None => AnomalySeverity::High,
        Some(d) if d >= 200.0 => AnomalySeverity::High,
        Some(d) if d >= 100.0 => AnomalySeverity::Medium,
        Some(_) => AnomalySeverity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisWindow, YearMonth};
    use crate::test_utils::{date, expense};

    fn scan(expenses: &[Expense]) -> AnomalyScan {
        let window = AnalysisWindow::month(YearMonth::new(2024, 3).unwrap());
        let view = NormalizedView::build(expenses, window, date(2024, 3, 31)).unwrap();
        detect_anomalies(&view, &AnomalyConfig::default(), &CancellationToken::new()).unwrap()
    }

    fn food(amounts: &[f64]) -> Vec<Expense> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| expense(i as i64 + 1, Category::Food, *a, date(2024, 3, i as u32 + 1)))
            .collect()
    }

    #[test]
    fn test_large_outlier_flagged() {
        let result = scan(&food(&[10.0, 12.0, 11.0, 9.0, 10.0, 100.0]));

        assert_eq!(result.anomalies.len(), 1);
        let anomaly = &result.anomalies[0];
        assert_eq!(anomaly.expense_id, 6);
        assert!((anomaly.typical_amount - 10.4).abs() < 1e-9);
        assert!(anomaly.deviation_pct > 800.0);
        assert_eq!(anomaly.severity, AnomalySeverity::High);
        assert!(anomaly.reason.contains("above your typical Food spend"));
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_identical_amounts_never_flagged() {
        let result = scan(&food(&[42.0; 8]));
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_absolute_floor() {
        // Statistically extreme but too small to matter
        let result = scan(&food(&[1.0, 1.0, 1.0, 1.0, 20.0]));
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_severity_bands() {
        let result = scan(&food(&[50.0, 50.0, 50.0, 50.0, 100.0]));
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].deviation_pct, 100.0);
        assert_eq!(result.anomalies[0].severity, AnomalySeverity::Medium);

        let result = scan(&food(&[40.0, 50.0, 60.0, 50.0, 70.0]));
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].severity, AnomalySeverity::Low);

        assert_eq!(severity(None), AnomalySeverity::High);
        assert_eq!(severity(Some(250.0)), AnomalySeverity::High);
    }

    #[test]
    fn test_small_category_reported_as_note() {
        let mut expenses = food(&[10.0, 11.0, 12.0, 13.0, 90.0]);
        expenses.push(expense(10, Category::Travel, 50.0, date(2024, 3, 3)));
        expenses.push(expense(11, Category::Travel, 900.0, date(2024, 3, 9)));

        let result = scan(&expenses);
        assert_eq!(
            result.skipped,
            vec![InsufficientData::AnomalySample {
                category: Category::Travel,
                transactions: 2,
            }]
        );
        assert!(result.anomalies.iter().all(|a| a.category == Category::Food));
    }

    #[test]
    fn test_three_transactions_are_enough() {
        let result = scan(&food(&[30.0, 30.0, 300.0]));

        assert!(result.skipped.is_empty());
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].expense_id, 3);
        assert_eq!(result.anomalies[0].typical_amount, 30.0);
    }

    #[test]
    fn test_sorted_by_deviation() {
        let mut expenses = food(&[10.0, 10.0, 10.0, 10.0, 60.0]);
        expenses.extend(
            [20.0, 20.0, 20.0, 20.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, a)| expense(20 + i as i64, Category::Shopping, *a, date(2024, 3, 10))),
        );

        let result = scan(&expenses);
        assert_eq!(result.anomalies.len(), 2);
        assert_eq!(result.anomalies[0].category, Category::Shopping);
        assert!(result.anomalies[0].deviation_pct > result.anomalies[1].deviation_pct);
    }
}
