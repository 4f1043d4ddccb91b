//! Report rendering
//!
//! Each section of an [`AnalysisReport`] has a text renderer; `tally report`
//! prints one of them (or its JSON) on its own.

use std::path::Path;

use anyhow::Result;

use tally_core::analytics::types::{HealthComponent, ScoreBreakdown};
use tally_core::AnalysisReport;

use super::analyze::{load_analytics_config, load_input, run_analysis};
use super::truncate;
use crate::cli::InputArgs;

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// A printable section of the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSection {
    Trends,
    Recurring,
    Anomalies,
    Forecast,
    Patterns,
    Health,
    Insights,
}

impl ReportSection {
    pub fn all() -> &'static [ReportSection] {
        &[
            ReportSection::Trends,
            ReportSection::Recurring,
            ReportSection::Anomalies,
            ReportSection::Forecast,
            ReportSection::Patterns,
            ReportSection::Health,
            ReportSection::Insights,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSection::Trends => "trends",
            ReportSection::Recurring => "recurring",
            ReportSection::Anomalies => "anomalies",
            ReportSection::Forecast => "forecast",
            ReportSection::Patterns => "patterns",
            ReportSection::Health => "health",
            ReportSection::Insights => "insights",
        }
    }
}

impl std::str::FromStr for ReportSection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ReportSection::all()
            .iter()
            .find(|section| section.as_str() == wanted)
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown report section: {}. Available: trends, recurring, anomalies, forecast, patterns, health, insights",
                    s
                )
            })
    }
}

/// JSON for one section of the report
pub fn section_json(report: &AnalysisReport, section: ReportSection) -> Result<serde_json::Value> {
    let value = match section {
        ReportSection::Trends => serde_json::json!({
            "categories": report.trends,
            "total": report.total_trend,
        }),
        ReportSection::Recurring => serde_json::to_value(&report.recurring)?,
        ReportSection::Anomalies => serde_json::to_value(&report.anomalies)?,
        ReportSection::Forecast => serde_json::to_value(&report.forecast)?,
        ReportSection::Patterns => serde_json::to_value(&report.patterns)?,
        ReportSection::Health => serde_json::to_value(&report.health)?,
        ReportSection::Insights => serde_json::to_value(&report.insights)?,
    };
    Ok(value)
}

/// Print one report section as text
pub fn print_report(report: &AnalysisReport, section: ReportSection) {
    match section {
        ReportSection::Trends => print_trends(report),
        ReportSection::Recurring => print_recurring(report),
        ReportSection::Anomalies => print_anomalies(report),
        ReportSection::Forecast => print_forecast(report),
        ReportSection::Patterns => print_patterns(report),
        ReportSection::Health => print_health(report),
        ReportSection::Insights => print_insights(report),
    }
}

/// Single-section report
pub async fn cmd_report(config_path: Option<&Path>, section: &str, input: &InputArgs) -> Result<()> {
    let section: ReportSection = section.parse()?;
    let config = load_analytics_config(config_path)?;
    let loaded = load_input(input)?;

    let report = run_analysis(loaded, config).await?;

    if input.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&section_json(&report, section)?)?
        );
    } else {
        print_report(&report, section);
    }

    Ok(())
}

fn print_trends(report: &AnalysisReport) {
    println!();
    println!("📈 Spending Trends ({})", report.forecast.month);
    println!("{}", RULE);

    if report.trends.is_empty() {
        println!("   No spending in the last two months.");
        return;
    }

    println!(
        "   {:18} │ {:>10} │ {:>10} │ {:>12} │ Trend",
        "Category", "This month", "Last month", "Change"
    );
    for trend in &report.trends {
        println!(
            "   {:18} │ {:>10.2} │ {:>10.2} │ {:>12} │ {}",
            trend.category.label(),
            trend.current_month_total,
            trend.previous_month_total,
            trend.change.to_string(),
            trend.trend.as_str()
        );
    }

    let total = &report.total_trend;
    let change = total
        .change
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{}", RULE);
    println!(
        "   {:18} │ {:>10.2} │ {:>10.2} │ {:>12} │ {}",
        "TOTAL",
        total.current_month_total,
        total.previous_month_total,
        change,
        total.trend.as_str()
    );
}

fn print_recurring(report: &AnalysisReport) {
    println!();
    println!("🔁 Recurring Expenses");
    println!("{}", RULE);

    if report.recurring.is_empty() {
        println!("   No recurring expenses detected.");
        return;
    }

    for item in &report.recurring {
        println!(
            "   {:25} │ {:>9.2} │ {:8} │ {}x │ next {}",
            truncate(&item.description, 25),
            item.amount,
            item.frequency.as_str(),
            item.occurrences,
            item.next_expected
        );
    }
}

fn print_anomalies(report: &AnalysisReport) {
    println!();
    println!("⚠️  Unusual Expenses");
    println!("{}", RULE);

    if report.anomalies.is_empty() {
        println!("   Nothing out of the ordinary.");
        return;
    }

    for anomaly in &report.anomalies {
        let label = anomaly
            .description
            .as_deref()
            .unwrap_or_else(|| anomaly.category.label());
        println!(
            "   {} │ {:22} │ {:>9.2} │ typical {:>8.2} │ {}",
            anomaly.date,
            truncate(label, 22),
            anomaly.amount,
            anomaly.typical_amount,
            anomaly.severity.as_str()
        );
        println!("      {}", anomaly.reason);
    }
}

fn print_forecast(report: &AnalysisReport) {
    let forecast = &report.forecast;

    println!();
    println!("🔮 Month-End Forecast ({})", forecast.month);
    println!(
        "   Day {} of {} ({} remaining)",
        forecast.days_elapsed,
        forecast.days_elapsed + forecast.days_remaining,
        forecast.days_remaining
    );
    println!("{}", RULE);
    println!("   Spent so far:     ${:>10.2}", forecast.current_spending);
    println!("   Daily average:    ${:>10.2}", forecast.daily_average);
    println!("   Projected total:  ${:>10.2}", forecast.projected_month_end);
    if let Some(budget) = forecast.total_budget {
        let marker = if forecast.will_exceed_total_budget {
            " ❌"
        } else {
            " ✓"
        };
        println!("   Total budget:     ${:>10.2}{}", budget, marker);
    }

    if forecast.categories.is_empty() {
        return;
    }

    println!();
    println!(
        "   {:18} │ {:>10} │ {:>10} │ {:>10}",
        "Category", "Spent", "Projected", "Budget"
    );
    for category in &forecast.categories {
        let budget = category
            .budget_limit
            .map(|b| format!("{:.2}", b))
            .unwrap_or_else(|| "-".to_string());
        let marker = if category.will_exceed_budget { " ❌" } else { "" };
        println!(
            "   {:18} │ {:>10.2} │ {:>10.2} │ {:>10}{}",
            category.category.label(),
            category.current_spending,
            category.projected_total,
            budget,
            marker
        );
    }
}

fn print_patterns(report: &AnalysisReport) {
    let patterns = &report.patterns;

    println!();
    println!("📊 Spending Patterns");
    println!("{}", RULE);
    println!(
        "   Total: ${:.2} across {} transactions",
        patterns.total_spending, patterns.transaction_count
    );
    println!(
        "   Average: ${:.2}/day, ${:.2}/transaction",
        patterns.average_daily_spending, patterns.average_transaction
    );

    if !patterns.top_categories.is_empty() {
        println!();
        println!("   Top categories:");
        for share in &patterns.top_categories {
            println!(
                "   {:18} │ {:>10.2} │ {:>5.1}% │ {:>4}",
                share.category.label(),
                share.amount,
                share.percentage,
                share.transaction_count
            );
        }
    }

    if let Some(peak) = patterns.peak_weekday {
        println!();
        print!("   By weekday:");
        for day in &patterns.by_weekday {
            print!(" {} {:.0}", day.weekday, day.amount);
        }
        println!();
        println!("   Busiest day: {}", peak);
    }

    if !patterns.by_payment_method.is_empty() {
        println!();
        println!("   Payment methods:");
        for method in &patterns.by_payment_method {
            println!(
                "   {:18} │ {:>10.2} │ {:>5.1}% │ {:>4}",
                method.payment_method.as_str(),
                method.amount,
                method.percentage,
                method.transaction_count
            );
        }
    }

    if let Some(largest) = &patterns.largest_expense {
        println!();
        println!(
            "   Largest: ${:.2} on {} ({})",
            largest.amount,
            largest.date,
            largest
                .description
                .as_deref()
                .unwrap_or_else(|| largest.category.label())
        );
    }
}

fn component_label(component: HealthComponent) -> &'static str {
    match component {
        HealthComponent::Savings => "Savings rate",
        HealthComponent::Budget => "Budget adherence",
        HealthComponent::Goals => "Goal progress",
        HealthComponent::Trend => "Spending trend",
        HealthComponent::Emergency => "Emergency fund",
    }
}

fn print_breakdown(breakdown: &ScoreBreakdown) {
    for component in HealthComponent::all() {
        println!(
            "   {:18} │ {:>5.1} / {:>4.0}",
            component_label(*component),
            breakdown.get(*component),
            component.max()
        );
    }
}

fn print_health(report: &AnalysisReport) {
    let health = &report.health;

    println!();
    println!("💚 Financial Health");
    println!("{}", RULE);
    println!(
        "   Score: {:.1}/100 ({}) │ trend {}",
        health.overall_score,
        health.rating.as_str(),
        health.trend.as_str()
    );
    if let Some(previous) = health.previous_score {
        println!("   Previous period: {:.1}", previous);
    }
    println!();
    print_breakdown(&health.breakdown);
    println!();
    println!("   Savings rate: {:.1}%", health.savings_rate * 100.0);
    if let Some(months) = health.emergency_coverage_months {
        println!("   Emergency coverage: {:.1} months", months);
    }

    if !health.recommendations.is_empty() {
        println!();
        for recommendation in &health.recommendations {
            println!("   → {}", recommendation);
        }
    }
}

fn print_insights(report: &AnalysisReport) {
    let insights = &report.insights;

    println!();
    println!("💡 Insights");
    println!("{}", RULE);

    if !insights.budget_warnings.is_empty() {
        println!("   Budget warnings:");
        for warning in &insights.budget_warnings {
            println!(
                "   [{:8}] {}",
                warning.severity.as_str(),
                warning.message
            );
        }
        println!();
    }

    if !insights.goal_predictions.is_empty() {
        println!("   Goals:");
        for goal in &insights.goal_predictions {
            println!(
                "   {:22} │ {:>5.1}% │ {:8} │ {}",
                truncate(&goal.title, 22),
                goal.progress_pct,
                goal.status.as_str(),
                goal.message
            );
        }
        println!();
    }

    if !insights.savings_opportunities.is_empty() {
        println!("   Savings opportunities:");
        for opportunity in &insights.savings_opportunities {
            println!("   • {}", opportunity.message);
        }
        println!();
    }

    if insights.recommendations.is_empty() {
        println!("   No recommendations right now.");
    } else {
        println!("   Recommendations:");
        for recommendation in &insights.recommendations {
            println!(
                "   [{:6}] {}",
                recommendation.priority.as_str(),
                recommendation.message
            );
        }
    }
}
