//! Spending Patterns - where and when money goes within the window

use chrono::{Datelike, Weekday};
use std::collections::BTreeMap;

use crate::config::PatternsConfig;
use crate::models::{Expense, PaymentMethod};

use super::normalize::{Bucket, NormalizedView};
use super::stats::ratio_or;
use super::types::{
    CategoryShare, LargestExpense, PaymentMethodSpending, SpendingPatterns, WeekdaySpending,
};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn analyze_patterns(view: &NormalizedView<'_>, config: &PatternsConfig) -> SpendingPatterns {
    let total = view.window_total();
    let count = view.window_expenses.len();

    let mut top_categories: Vec<CategoryShare> = view
        .by_category
        .iter()
        .map(|(category, bucket)| CategoryShare {
            category: *category,
            amount: bucket.total,
            percentage: ratio_or(bucket.total, total, 0.0) * 100.0,
            transaction_count: bucket.count,
        })
        .collect();
    // Stable sort keeps category order among equal amounts
    top_categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    top_categories.truncate(config.top_categories);

    let mut weekdays = [Bucket::default(); 7];
    let mut methods: BTreeMap<PaymentMethod, Bucket> = BTreeMap::new();
    for expense in &view.window_expenses {
        let bucket = &mut weekdays[expense.date.weekday().num_days_from_monday() as usize];
        bucket.total += expense.amount;
        bucket.count += 1;

        let bucket = methods.entry(expense.payment_method).or_default();
        bucket.total += expense.amount;
        bucket.count += 1;
    }

    let by_weekday: Vec<WeekdaySpending> = WEEK
        .iter()
        .zip(weekdays.iter())
        .map(|(weekday, bucket)| WeekdaySpending {
            weekday: *weekday,
            amount: bucket.total,
            transaction_count: bucket.count,
        })
        .collect();

    // First maximum wins so Monday beats a tied Sunday
    let peak_weekday = by_weekday
        .iter()
        .filter(|w| w.amount > 0.0)
        .fold(None::<&WeekdaySpending>, |best, w| match best {
            Some(b) if b.amount >= w.amount => Some(b),
            _ => Some(w),
        })
        .map(|w| w.weekday);

    let mut by_payment_method: Vec<PaymentMethodSpending> = methods
        .into_iter()
        .map(|(payment_method, bucket)| PaymentMethodSpending {
            payment_method,
            amount: bucket.total,
            percentage: ratio_or(bucket.total, total, 0.0) * 100.0,
            transaction_count: bucket.count,
        })
        .collect();
    by_payment_method.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let largest_expense = view
        .window_expenses
        .iter()
        .copied()
        .fold(None::<&Expense>, |best, e| match best {
            Some(b) if b.amount >= e.amount => Some(b),
            _ => Some(e),
        })
        .map(|e| LargestExpense {
            expense_id: e.id,
            category: e.category,
            amount: e.amount,
            date: e.date,
            description: e.description.clone(),
        });

    tracing::debug!(
        total,
        count,
        categories = view.by_category.len(),
        "Spending patterns"
    );

    SpendingPatterns {
        total_spending: total,
        transaction_count: count,
        average_daily_spending: ratio_or(total, view.window.days() as f64, 0.0),
        average_transaction: ratio_or(total, count as f64, 0.0),
        top_categories,
        by_weekday,
        peak_weekday,
        by_payment_method,
        largest_expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisWindow, Category};
    use crate::test_utils::{date, described, expense};

    fn patterns(expenses: &[Expense]) -> SpendingPatterns {
        // 2024-04-01 is a Monday
        let window = AnalysisWindow::new(date(2024, 4, 1), date(2024, 4, 14)).unwrap();
        let view = NormalizedView::build(expenses, window, date(2024, 4, 14)).unwrap();
        analyze_patterns(&view, &PatternsConfig::default())
    }

    #[test]
    fn test_shares_and_weekdays() {
        let mut cash = expense(3, Category::Shopping, 60.0, date(2024, 4, 6));
        cash.payment_method = PaymentMethod::Cash;
        let expenses = vec![
            expense(1, Category::Food, 20.0, date(2024, 4, 1)),
            expense(2, Category::Food, 20.0, date(2024, 4, 8)),
            cash,
            described(4, Category::Housing, 100.0, date(2024, 4, 3), "Rent share"),
        ];
        let result = patterns(&expenses);

        assert_eq!(result.total_spending, 200.0);
        assert_eq!(result.transaction_count, 4);
        assert_eq!(result.average_daily_spending, 200.0 / 14.0);
        assert_eq!(result.average_transaction, 50.0);

        assert_eq!(result.top_categories[0].category, Category::Housing);
        assert_eq!(result.top_categories[0].percentage, 50.0);
        assert_eq!(result.top_categories[2].category, Category::Food);
        assert_eq!(result.top_categories[2].transaction_count, 2);

        assert_eq!(result.by_weekday.len(), 7);
        assert_eq!(result.by_weekday[0].weekday, Weekday::Mon);
        assert_eq!(result.by_weekday[0].amount, 40.0);
        assert_eq!(result.peak_weekday, Some(Weekday::Wed));

        assert_eq!(result.by_payment_method[0].payment_method, PaymentMethod::DebitCard);
        assert_eq!(result.by_payment_method[0].percentage, 70.0);
        assert_eq!(result.by_payment_method[1].payment_method, PaymentMethod::Cash);

        let largest = result.largest_expense.unwrap();
        assert_eq!(largest.expense_id, 4);
        assert_eq!(largest.description.as_deref(), Some("Rent share"));
    }

    #[test]
    fn test_top_categories_truncated() {
        let expenses: Vec<Expense> = Category::all()
            .iter()
            .enumerate()
            .map(|(i, c)| expense(i as i64, *c, 10.0 + i as f64, date(2024, 4, 2)))
            .collect();
        let result = patterns(&expenses);
        assert_eq!(result.top_categories.len(), 5);
        assert!(result
            .top_categories
            .windows(2)
            .all(|w| w[0].amount >= w[1].amount));
    }

    #[test]
    fn test_empty_window() {
        let result = patterns(&[]);
        assert_eq!(result.total_spending, 0.0);
        assert_eq!(result.average_transaction, 0.0);
        assert!(result.top_categories.is_empty());
        assert_eq!(result.peak_weekday, None);
        assert!(result.largest_expense.is_none());
        assert!(result.by_weekday.iter().all(|w| w.amount == 0.0));
    }
}
