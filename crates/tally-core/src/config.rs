//! Analytics configuration
//!
//! Every threshold the analyzers use lives here so it can be tuned without
//! touching code.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/analytics.toml)
//!    or an explicit path
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Month-over-month trend labelling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Changes within ±this percentage are labelled stable
    pub stable_band_pct: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_band_pct: 5.0,
        }
    }
}

/// Recurring charge detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Relative amount tolerance (percent of the reference amount)
    pub amount_tolerance_pct: f64,
    /// Absolute amount tolerance in currency units
    pub amount_tolerance_abs: f64,
    pub min_occurrences: usize,
    pub weekly_days: i64,
    pub weekly_tolerance_days: i64,
    pub monthly_min_days: i64,
    pub monthly_max_days: i64,
    pub monthly_tolerance_days: i64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            amount_tolerance_pct: 2.0,
            amount_tolerance_abs: 0.50,
            min_occurrences: 2,
            weekly_days: 7,
            weekly_tolerance_days: 2,
            monthly_min_days: 28,
            monthly_max_days: 31,
            monthly_tolerance_days: 3,
        }
    }
}

/// Per-transaction anomaly detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Flag amounts above mean + multiplier × stddev
    pub stddev_multiplier: f64,
    /// Amounts at or below this are never flagged
    pub absolute_floor: f64,
    /// Categories with fewer transactions than this are not tested
    pub min_history: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            stddev_multiplier: 2.0,
            absolute_floor: 25.0,
            min_history: 3,
        }
    }
}

/// Financial health scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub savings_rate_target: f64,
    pub emergency_months: f64,
    pub sharp_increase_pct: f64,
    pub deadline_warning_months: i32,
    pub score_tolerance: f64,
    pub recommendation_ratio: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            savings_rate_target: 0.20,
            emergency_months: 3.0,
            sharp_increase_pct: 50.0,
            deadline_warning_months: 3,
            score_tolerance: 2.0,
            recommendation_ratio: 0.6,
        }
    }
}

/// Budget warnings, goal predictions and savings opportunities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Excess over the limit (percent of limit) that makes a warning critical
    pub critical_excess_pct: f64,
    /// Projected share of the limit that triggers an info warning
    pub info_threshold_pct: f64,
    /// Behind when required contribution > multiple × recent average
    pub behind_multiple: f64,
    /// Ahead when finishing at least this many months early
    pub ahead_margin_months: f64,
    pub contribution_lookback_months: u32,
    pub baseline_months: u32,
    pub opportunity_threshold_pct: f64,
    pub opportunity_min_amount: f64,
    pub max_reduction_pct: f64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            critical_excess_pct: 20.0,
            info_threshold_pct: 90.0,
            behind_multiple: 1.0,
            ahead_margin_months: 1.0,
            contribution_lookback_months: 3,
            baseline_months: 3,
            opportunity_threshold_pct: 25.0,
            opportunity_min_amount: 20.0,
            max_reduction_pct: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub top_categories: usize,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self { top_categories: 5 }
    }
}

/// All analytics thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub trend: TrendConfig,
    pub recurrence: RecurrenceConfig,
    pub anomaly: AnomalyConfig,
    pub health: HealthConfig,
    pub insights: InsightsConfig,
    pub patterns: PatternsConfig,
}

impl AnalyticsConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (embedded defaults if it doesn't exist)
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that would make the analyzers meaningless
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!("{} must be positive, got {}", name, value)))
            }
        }
        fn non_negative(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )))
            }
        }

        non_negative("trend.stable_band_pct", self.trend.stable_band_pct)?;

        let r = &self.recurrence;
        non_negative("recurrence.amount_tolerance_pct", r.amount_tolerance_pct)?;
        non_negative("recurrence.amount_tolerance_abs", r.amount_tolerance_abs)?;
        if r.min_occurrences < 2 {
            return Err(Error::Config(
                "recurrence.min_occurrences must be at least 2".to_string(),
            ));
        }
        if r.weekly_days <= 0 || r.weekly_tolerance_days < 0 || r.monthly_tolerance_days < 0 {
            return Err(Error::Config(
                "recurrence day counts must not be negative".to_string(),
            ));
        }
        if r.monthly_min_days > r.monthly_max_days {
            return Err(Error::Config(format!(
                "recurrence.monthly_min_days ({}) is greater than monthly_max_days ({})",
                r.monthly_min_days, r.monthly_max_days
            )));
        }
        if r.weekly_days + r.weekly_tolerance_days
            >= r.monthly_min_days - r.monthly_tolerance_days
        {
            return Err(Error::Config(
                "recurrence weekly and monthly bands overlap".to_string(),
            ));
        }

        positive("anomaly.stddev_multiplier", self.anomaly.stddev_multiplier)?;
        non_negative("anomaly.absolute_floor", self.anomaly.absolute_floor)?;

        let h = &self.health;
        positive("health.savings_rate_target", h.savings_rate_target)?;
        positive("health.emergency_months", h.emergency_months)?;
        if h.sharp_increase_pct <= self.trend.stable_band_pct {
            return Err(Error::Config(
                "health.sharp_increase_pct must be above trend.stable_band_pct".to_string(),
            ));
        }
        non_negative("health.score_tolerance", h.score_tolerance)?;
        non_negative("health.recommendation_ratio", h.recommendation_ratio)?;

        let i = &self.insights;
        non_negative("insights.critical_excess_pct", i.critical_excess_pct)?;
        positive("insights.info_threshold_pct", i.info_threshold_pct)?;
        positive("insights.behind_multiple", i.behind_multiple)?;
        non_negative("insights.ahead_margin_months", i.ahead_margin_months)?;
        if i.contribution_lookback_months == 0 || i.baseline_months == 0 {
            return Err(Error::Config(
                "insights lookback periods must be at least one month".to_string(),
            ));
        }
        non_negative("insights.opportunity_threshold_pct", i.opportunity_threshold_pct)?;
        positive("insights.max_reduction_pct", i.max_reduction_pct)?;

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("analytics.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalyticsConfig> {
    let source = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match source {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading analytics config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    AnalyticsConfig::from_toml_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = AnalyticsConfig::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AnalyticsConfig::from_toml_str(
            r#"
[anomaly]
stddev_multiplier = 3.0
"#,
        )
        .unwrap();
        assert_eq!(config.anomaly.stddev_multiplier, 3.0);
        assert_eq!(config.anomaly.min_history, 3);
        assert_eq!(config.trend, TrendConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = AnalyticsConfig::from_toml_str(
            r#"
[recurrence]
monthly_min_days = 35
monthly_max_days = 30
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = AnalyticsConfig::from_toml_str("[health]\nsavings_rate_target = 0.0\n")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = AnalyticsConfig::from_toml_str("[trend\nstable_band_pct = ").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trend]\nstable_band_pct = 10.0").unwrap();

        let config = AnalyticsConfig::from_path(file.path()).unwrap();
        assert_eq!(config.trend.stable_band_pct, 10.0);
    }

    #[test]
    fn test_missing_path_uses_embedded_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyticsConfig::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }
}
