//! User-facing message templates
//!
//! All report text is produced here from computed enums and numbers, so the
//! wording can be tested without running an analysis.

use crate::models::Category;

use super::stats::ratio_or;
use super::types::{GoalPace, HealthComponent, Priority, WarningSeverity};

pub fn anomaly_reason(category: Category, deviation_pct: f64) -> String {
    format!(
        "Amount is {:.0}% above your typical {} spend",
        deviation_pct,
        category.label()
    )
}

pub fn budget_warning(
    category: Category,
    severity: WarningSeverity,
    projected: f64,
    limit: f64,
) -> String {
    let name = category.label();
    match severity {
        WarningSeverity::Critical => format!(
            "{} is on track to exceed its ${:.0} budget by ${:.0}",
            name,
            limit,
            projected - limit
        ),
        WarningSeverity::Warning => format!(
            "{} spending is projected at ${:.0}, slightly over its ${:.0} budget",
            name, projected, limit
        ),
        WarningSeverity::Info => format!(
            "{} spending is projected to use {:.0}% of its ${:.0} budget",
            name,
            ratio_or(projected, limit, 0.0) * 100.0,
            limit
        ),
    }
}

pub fn goal_prediction(
    title: &str,
    pace: GoalPace,
    required_monthly: Option<f64>,
    average_monthly: f64,
) -> String {
    match (pace, required_monthly) {
        (GoalPace::Ahead, Some(r)) if r <= 0.0 => format!("\"{}\" is fully funded", title),
        (GoalPace::Ahead, _) => format!(
            "\"{}\" will finish early at your current ${:.0}/month pace",
            title, average_monthly
        ),
        (GoalPace::OnTrack, Some(r)) => format!(
            "\"{}\" is on track: ${:.0}/month needed, saving ${:.0}/month",
            title, r, average_monthly
        ),
        (GoalPace::OnTrack, None) => format!(
            "\"{}\" is growing by about ${:.0}/month",
            title, average_monthly
        ),
        (GoalPace::Behind, Some(r)) => format!(
            "\"{}\" needs ${:.0}/month but recent contributions average ${:.0}/month",
            title, r, average_monthly
        ),
        (GoalPace::Behind, None) => {
            format!("\"{}\" has had no contributions recently", title)
        }
    }
}

pub fn health_recommendation(component: HealthComponent) -> &'static str {
    match component {
        HealthComponent::Savings => {
            "Increase your savings rate by setting aside a fixed amount each month"
        }
        HealthComponent::Budget => "Review categories that went over budget and adjust limits",
        HealthComponent::Goals => "Set up regular contributions to catch up on your saving goals",
        HealthComponent::Trend => "Your spending is rising month over month; look for costs to cut",
        HealthComponent::Emergency => {
            "Build an emergency fund covering at least three months of expenses"
        }
    }
}

pub fn budget_recommendation(category: Category, severity: WarningSeverity) -> String {
    match severity {
        WarningSeverity::Critical => format!(
            "Cut back on {} now to avoid a large budget overrun",
            category.label()
        ),
        WarningSeverity::Warning => format!(
            "Slow down {} spending for the rest of the month",
            category.label()
        ),
        WarningSeverity::Info => format!("Keep an eye on {} spending", category.label()),
    }
}

pub fn savings_rate_recommendation(priority: Priority, rate: f64, target: f64) -> String {
    match priority {
        Priority::High => format!(
            "You are saving {:.0}% of your money; aim for at least {:.0}%",
            rate * 100.0,
            target * 100.0
        ),
        Priority::Medium | Priority::Low => format!(
            "Your savings rate of {:.0}% is close to the {:.0}% target; a small increase gets you there",
            rate * 100.0,
            target * 100.0
        ),
    }
}

pub fn goal_recommendation(title: &str, shortfall: f64) -> String {
    format!(
        "Add ${:.0}/month to \"{}\" to meet its deadline",
        shortfall, title
    )
}

pub fn anomaly_recommendation(count: usize) -> String {
    if count == 1 {
        "Review 1 unusually large transaction".to_string()
    } else {
        format!("Review {} unusually large transactions", count)
    }
}

pub fn recurring_recommendation(count: usize, monthly_total: f64) -> String {
    format!(
        "You have {} recurring charges totalling about ${:.0}/month; cancel any you no longer use",
        count, monthly_total
    )
}

pub fn savings_opportunity(category: Category, reduction_pct: f64, monthly_savings: f64) -> String {
    format!(
        "Reducing {} spending by {:.0}% would save about ${:.0}/month",
        category.label(),
        reduction_pct,
        monthly_savings
    )
}
