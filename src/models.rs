use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TARGET_REVENUE: f64 = 25_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub id: String,
    pub amount: f64,
    /// Naive calendar date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RevenueEntry {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub target_revenue: f64,
    /// Empty string means no demo day has been chosen.
    #[serde(default)]
    pub demo_day: String,
}

impl Settings {
    pub fn with_target(target_revenue: f64) -> Self {
        Self {
            target_revenue,
            demo_day: String::new(),
        }
    }

    pub fn demo_date(&self) -> Option<NaiveDate> {
        parse_date(&self.demo_day)
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(target) = patch.target_revenue {
            self.target_revenue = target;
        }
        if let Some(demo_day) = patch.demo_day {
            self.demo_day = demo_day;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_target(DEFAULT_TARGET_REVENUE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub entries: Vec<RevenueEntry>,
    #[serde(default)]
    pub settings: Settings,
}

impl AppData {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            entries: Vec::new(),
            settings,
        }
    }
}

/// Body of an add-entry request; the id is assigned on insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub target_revenue: Option<f64>,
    #[serde(default)]
    pub demo_day: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub data: AppData,
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SaveFailure {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub label: String,
    pub cumulative: f64,
    pub added: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    /// Unclamped; absent when the target is zero.
    pub percent: Option<f64>,
    pub bar_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub total_revenue: f64,
    pub target_revenue: f64,
    pub remaining: f64,
    pub chart: Vec<ChartPoint>,
    pub demo_day: Option<String>,
    pub days_until_demo: Option<i64>,
    pub weeks_remaining: Option<i64>,
    pub weekly_target: f64,
    pub progress: Progress,
    pub countdown: Option<Countdown>,
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
