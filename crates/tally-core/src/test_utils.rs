//! Test utilities for tally-core
//!
//! Small builders for expenses, budgets and goals so tests can describe a
//! user's history in a few lines.

use chrono::NaiveDate;

use crate::models::{
    Budget, Category, Contribution, Expense, GoalStatus, PaymentMethod, SavingGoal, YearMonth,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

/// A card expense without description
pub fn expense(id: i64, category: Category, amount: f64, date: NaiveDate) -> Expense {
    Expense {
        id,
        category,
        amount,
        date,
        recorded_at: None,
        payment_method: PaymentMethod::DebitCard,
        description: None,
    }
}

pub fn described(
    id: i64,
    category: Category,
    amount: f64,
    date: NaiveDate,
    description: &str,
) -> Expense {
    Expense {
        description: Some(description.to_string()),
        ..expense(id, category, amount, date)
    }
}

pub fn budget(category: Category, limit: f64, period: YearMonth) -> Budget {
    Budget {
        category,
        monthly_limit: limit,
        period,
    }
}

/// An active goal with no contribution history
pub fn goal(id: i64, target: f64, current: f64, deadline: Option<NaiveDate>) -> SavingGoal {
    SavingGoal {
        id,
        title: format!("Goal {}", id),
        target_amount: target,
        current_amount: current,
        deadline,
        status: GoalStatus::Active,
        archived: false,
        contributions: vec![],
    }
}

/// One contribution of `amount` on the 1st of each listed month
pub fn monthly_contributions(amount: f64, months: &[YearMonth]) -> Vec<Contribution> {
    months
        .iter()
        .map(|m| Contribution {
            date: m.first_day(),
            amount,
        })
        .collect()
}
