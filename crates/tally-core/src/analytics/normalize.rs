//! Normalizer - groups raw expenses into the views every analyzer reads
//!
//! Window views (`by_category`, `by_day`, `window_expenses`) only see expenses
//! inside the analysis window. Month views (`by_month`, `category_months`,
//! `month_to_date`) see every supplied expense up to the anchor date, so the
//! caller can pass a prior comparison period that starts before the window.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{AnalysisWindow, Category, Expense, YearMonth};

use super::stats::ratio_or;

/// Running sum and transaction count
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub total: f64,
    pub count: usize,
}

impl Bucket {
    fn add(&mut self, amount: f64) {
        self.total += amount;
        self.count += 1;
    }
}

/// Grouped, read-only view over one user's expenses
#[derive(Debug, Clone)]
pub struct NormalizedView<'a> {
    pub window: AnalysisWindow,
    pub anchor: NaiveDate,
    /// Window totals per category
    pub by_category: BTreeMap<Category, Bucket>,
    /// Window totals per day, zero-filled
    pub by_day: BTreeMap<NaiveDate, f64>,
    /// Monthly totals up to the anchor; always holds the anchor month and the one before
    pub by_month: BTreeMap<YearMonth, f64>,
    pub category_months: BTreeMap<(YearMonth, Category), Bucket>,
    /// Anchor month from the 1st through the anchor date, per category
    pub month_to_date: BTreeMap<Category, Bucket>,
    /// Window expenses sorted by date, then id
    pub window_expenses: Vec<&'a Expense>,
}

impl<'a> NormalizedView<'a> {
    pub fn build(expenses: &'a [Expense], window: AnalysisWindow, anchor: NaiveDate) -> Result<Self> {
        window.validate()?;

        let current = YearMonth::of(anchor);
        let month_start = current.first_day();

        let mut by_category: BTreeMap<Category, Bucket> = BTreeMap::new();
        let mut by_day: BTreeMap<NaiveDate, f64> = window.dates().map(|d| (d, 0.0)).collect();
        let mut by_month: BTreeMap<YearMonth, f64> = BTreeMap::new();
        let mut category_months: BTreeMap<(YearMonth, Category), Bucket> = BTreeMap::new();
        let mut month_to_date: BTreeMap<Category, Bucket> = BTreeMap::new();
        let mut window_expenses = Vec::new();

        by_month.insert(current, 0.0);
        by_month.insert(current.previous(), 0.0);

        for expense in expenses {
            if window.contains(expense.date) {
                by_category
                    .entry(expense.category)
                    .or_default()
                    .add(expense.amount);
                *by_day.entry(expense.date).or_insert(0.0) += expense.amount;
                window_expenses.push(expense);
            }

            if expense.date > anchor {
                continue;
            }

            let month = YearMonth::of(expense.date);
            *by_month.entry(month).or_insert(0.0) += expense.amount;
            category_months
                .entry((month, expense.category))
                .or_default()
                .add(expense.amount);

            if expense.date >= month_start {
                month_to_date
                    .entry(expense.category)
                    .or_default()
                    .add(expense.amount);
            }
        }

        window_expenses.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        tracing::debug!(
            window_expenses = window_expenses.len(),
            categories = by_category.len(),
            months = by_month.len(),
            "Normalized expenses"
        );

        Ok(Self {
            window,
            anchor,
            by_category,
            by_day,
            by_month,
            category_months,
            month_to_date,
            window_expenses,
        })
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.anchor)
    }

    pub fn previous_month(&self) -> YearMonth {
        self.current_month().previous()
    }

    pub fn window_total(&self) -> f64 {
        self.by_category.values().map(|b| b.total).sum()
    }

    pub fn month_total(&self, month: YearMonth) -> f64 {
        self.by_month.get(&month).copied().unwrap_or(0.0)
    }

    pub fn category_month(&self, month: YearMonth, category: Category) -> Bucket {
        self.category_months
            .get(&(month, category))
            .copied()
            .unwrap_or_default()
    }

    pub fn month_to_date_total(&self) -> f64 {
        self.month_to_date.values().map(|b| b.total).sum()
    }

    /// Window expenses grouped by category, each group in date order
    pub fn expenses_by_category(&self) -> BTreeMap<Category, Vec<&'a Expense>> {
        let mut groups: BTreeMap<Category, Vec<&'a Expense>> = BTreeMap::new();
        for expense in &self.window_expenses {
            groups.entry(expense.category).or_default().push(*expense);
        }
        groups
    }

    /// Average spend per month, a partial month weighted by its elapsed days
    pub fn average_monthly_spend(&self) -> f64 {
        ratio_or(self.window_total(), self.window.calendar_months(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::{date, expense};

    fn sample() -> Vec<Expense> {
        vec![
            expense(1, Category::Food, 12.5, date(2024, 3, 2)),
            expense(2, Category::Food, 7.5, date(2024, 3, 2)),
            expense(3, Category::Housing, 900.0, date(2024, 3, 1)),
            expense(4, Category::Travel, 300.0, date(2024, 2, 20)),
            expense(5, Category::Food, 40.0, date(2024, 3, 20)),
        ]
    }

    #[test]
    fn test_category_and_day_totals_agree() {
        let expenses = sample();
        let window = AnalysisWindow::new(date(2024, 2, 15), date(2024, 3, 31)).unwrap();
        let view = NormalizedView::build(&expenses, window, date(2024, 3, 31)).unwrap();

        let by_category: f64 = view.by_category.values().map(|b| b.total).sum();
        let by_day: f64 = view.by_day.values().sum();
        let raw: f64 = expenses.iter().map(|e| e.amount).sum();

        assert_eq!(by_category, by_day);
        assert_eq!(by_category, raw);
        assert_eq!(view.by_day.len(), 46);
        assert_eq!(view.by_day[&date(2024, 3, 2)], 20.0);
        assert_eq!(view.by_day[&date(2024, 3, 3)], 0.0);
    }

    #[test]
    fn test_window_excludes_outside_expenses() {
        let expenses = sample();
        let window = AnalysisWindow::month(YearMonth::new(2024, 3).unwrap());
        let view = NormalizedView::build(&expenses, window, date(2024, 3, 31)).unwrap();

        assert_eq!(view.window_total(), 960.0);
        assert!(!view.by_category.contains_key(&Category::Travel));
        // Month views still see February
        assert_eq!(view.month_total(YearMonth::new(2024, 2).unwrap()), 300.0);
        assert_eq!(view.window_expenses.first().unwrap().id, 3);
    }

    #[test]
    fn test_month_views_respect_anchor() {
        let expenses = sample();
        let window = AnalysisWindow::month(YearMonth::new(2024, 3).unwrap());
        let view = NormalizedView::build(&expenses, window, date(2024, 3, 10)).unwrap();

        assert_eq!(view.month_total(view.current_month()), 920.0);
        assert_eq!(view.month_to_date_total(), 920.0);
        let food = view.month_to_date[&Category::Food];
        assert_eq!(food.count, 2);
        assert_eq!(food.total, 20.0);
    }

    #[test]
    fn test_current_and_previous_month_always_present() {
        let window = AnalysisWindow::month(YearMonth::new(2024, 1).unwrap());
        let view = NormalizedView::build(&[], window, date(2024, 1, 15)).unwrap();

        assert_eq!(view.by_month.len(), 2);
        assert_eq!(view.month_total(YearMonth::new(2023, 12).unwrap()), 0.0);
        assert_eq!(view.window_total(), 0.0);
        assert_eq!(view.average_monthly_spend(), 0.0);
    }

    #[test]
    fn test_partial_month_weighted_in_average() {
        let expenses = vec![
            expense(1, Category::Housing, 200.0, date(2024, 3, 1)),
            expense(2, Category::Food, 100.0, date(2024, 4, 10)),
        ];
        // All of March plus half of April
        let window = AnalysisWindow::new(date(2024, 3, 1), date(2024, 4, 15)).unwrap();
        let view = NormalizedView::build(&expenses, window, date(2024, 4, 15)).unwrap();

        assert!((view.average_monthly_spend() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_independent() {
        let expenses = sample();
        let mut reversed = expenses.clone();
        reversed.reverse();
        let window = AnalysisWindow::month(YearMonth::new(2024, 3).unwrap());
        let a = NormalizedView::build(&expenses, window, date(2024, 3, 31)).unwrap();
        let b = NormalizedView::build(&reversed, window, date(2024, 3, 31)).unwrap();

        assert_eq!(a.by_category, b.by_category);
        assert_eq!(a.by_day, b.by_day);
        let ids_a: Vec<i64> = a.window_expenses.iter().map(|e| e.id).collect();
        let ids_b: Vec<i64> = b.window_expenses.iter().map(|e| e.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_invalid_window() {
        let window = AnalysisWindow {
            start: date(2024, 3, 2),
            end: date(2024, 3, 1),
        };
        let err = NormalizedView::build(&[], window, date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { .. }));
    }
}
