use crate::models::{
    AppData, ChartPoint, Countdown, DashboardMetrics, Progress, RevenueEntry, Settings,
    DATE_FORMAT,
};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;

pub fn build_metrics(data: &AppData) -> DashboardMetrics {
    build_metrics_at(Local::now().naive_local(), data)
}

pub fn build_metrics_at(now: NaiveDateTime, data: &AppData) -> DashboardMetrics {
    let today = now.date();
    let settings = &data.settings;
    let total = total_revenue(&data.entries);
    let demo = settings.demo_date();

    DashboardMetrics {
        total_revenue: total,
        target_revenue: settings.target_revenue,
        remaining: remaining_to_target(total, settings),
        chart: chart_series(&data.entries),
        demo_day: demo.map(|date| date.format(DATE_FORMAT).to_string()),
        days_until_demo: days_until_demo(settings, today),
        weeks_remaining: demo.map(|date| weeks_remaining(date, today)),
        weekly_target: weekly_target(total, settings, today),
        progress: progress(total, settings.target_revenue),
        countdown: demo.map(|date| countdown(date, now)),
    }
}

pub fn total_revenue(entries: &[RevenueEntry]) -> f64 {
    entries.iter().map(|entry| entry.amount).sum()
}

/// Cumulative revenue per calendar date, oldest first.
pub fn chart_series(entries: &[RevenueEntry]) -> Vec<ChartPoint> {
    let mut by_date: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        let key = entry
            .parsed_date()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| entry.date.clone());
        *by_date.entry(key).or_default() += entry.amount;
    }

    let mut cumulative = 0.0;
    by_date
        .into_iter()
        .map(|(date, added)| {
            cumulative += added;
            ChartPoint {
                label: chart_label(&date),
                date,
                cumulative,
                added,
            }
        })
        .collect()
}

pub fn days_until_demo(settings: &Settings, today: NaiveDate) -> Option<i64> {
    settings
        .demo_date()
        .map(|demo| (demo - today).num_days().max(0))
}

/// Whole weeks from this week's Monday through the demo day, never below one.
pub fn weeks_remaining(demo: NaiveDate, today: NaiveDate) -> i64 {
    let days = (demo - week_start(today)).num_days() + 1;
    (days / 7).max(1)
}

/// Amount still to add during the current calendar week to stay on pace.
pub fn weekly_target(total: f64, settings: &Settings, today: NaiveDate) -> f64 {
    let Some(demo) = settings.demo_date() else {
        return 0.0;
    };

    let remaining = settings.target_revenue - total;
    if remaining <= 0.0 {
        return 0.0;
    }

    remaining / weeks_remaining(demo, today) as f64
}

pub fn remaining_to_target(total: f64, settings: &Settings) -> f64 {
    (settings.target_revenue - total).max(0.0)
}

pub fn progress(total: f64, target: f64) -> Progress {
    if target <= 0.0 {
        return Progress {
            percent: None,
            bar_percent: 0.0,
        };
    }

    let percent = total / target * 100.0;
    Progress {
        percent: Some(percent),
        bar_percent: percent.clamp(0.0, 100.0),
    }
}

pub fn countdown(demo: NaiveDate, now: NaiveDateTime) -> Countdown {
    let target = demo.and_time(NaiveTime::MIN);
    let total_seconds = (target - now).num_seconds().max(0);

    Countdown {
        days: total_seconds / 86_400,
        hours: (total_seconds % 86_400) / 3_600,
        minutes: (total_seconds % 3_600) / 60,
        seconds: total_seconds % 60,
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn chart_label(key: &str) -> String {
    NaiveDate::parse_from_str(key, DATE_FORMAT)
        .map(|date| date.format("%b %-d").to_string())
        .unwrap_or_else(|_| key.to_string())
}
