//! Display-ready views for rendering collaborators.
//!
//! Pure functions over dashboard state: metric cards, the news panel,
//! and chart series. Nothing here touches the network or the cache
//! directly except through `Dashboard`'s pull accessors.

use chrono::{DateTime, Utc};

use crate::data::fallback::PROVIDER_SIGNUP_LINKS;
use crate::engine::normalizer::{
    format_axis_tick, format_billions, format_value, round_half_away, to_display_units,
};
use crate::engine::Dashboard;
use crate::registry::{IndicatorDef, GDP_CODE};
use crate::types::{Direction, MetricSnapshot, NewsArticle, NewsBatch, Unit};

/// Most articles the news panel shows.
pub const NEWS_PANEL_LIMIT: usize = 6;

/// Periods in the GDP comparison chart.
pub const COMPARISON_PERIODS: usize = 5;

pub const DESCRIPTION_PLACEHOLDER: &str = "Click to read more...";

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub code: String,
    pub name: String,
    pub value_label: String,
    pub change_label: String,
    pub direction: Direction,
    pub period_label: String,
}

/// `↑ 5.3%`, `↓ 2.1%`, `0.0%`, or `—` when no change is computable.
pub fn change_label(change: Option<f64>) -> String {
    match change {
        Some(c) if c > 0.0 => format!("↑ {}%", round_half_away(c, 1)),
        Some(c) if c < 0.0 => format!("↓ {}%", round_half_away(c.abs(), 1)),
        Some(_) => "0.0%".to_string(),
        None => "—".to_string(),
    }
}

pub fn metric_card(def: &IndicatorDef, snapshot: &MetricSnapshot) -> MetricCard {
    MetricCard {
        code: def.code.clone(),
        name: def.name.clone(),
        value_label: format_value(snapshot.latest_value, def.unit),
        change_label: change_label(snapshot.percent_change),
        direction: snapshot.direction,
        period_label: format!("Year: {}", snapshot.period),
    }
}

/// Cards for every indicator with a usable snapshot, in registry order.
pub fn metric_cards(dashboard: &Dashboard) -> Vec<MetricCard> {
    dashboard
        .registry()
        .iter()
        .filter_map(|def| {
            dashboard
                .get_metric_snapshot(&def.code)
                .map(|snap| metric_card(def, &snap))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// News panel
// ---------------------------------------------------------------------------

/// `Just now`, `N minutes ago`, `N hours ago`, `N days ago`, `N weeks ago`.
pub fn relative_time(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - published).num_seconds().max(0);
    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => format!("{} minutes ago", s / 60),
        s if s < 86_400 => format!("{} hours ago", s / 3_600),
        s if s < 604_800 => format!("{} days ago", s / 86_400),
        s => format!("{} weeks ago", s / 604_800),
    }
}

/// Time label for an article: its timestamp, else its hint, else `Recently`.
pub fn article_time_label(article: &NewsArticle, now: DateTime<Utc>) -> String {
    match (&article.published_at, &article.time_hint) {
        (Some(ts), _) => relative_time(*ts, now),
        (None, Some(hint)) => hint.clone(),
        (None, None) => "Recently".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub meta: String,
    pub description: String,
    pub link: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsPanel {
    pub items: Vec<NewsItem>,
    pub source_used: Option<String>,
    /// Set while built-in content is shown.
    pub degraded: bool,
    /// Where to get a key, shown alongside degraded content.
    pub signup_links: Vec<(&'static str, &'static str)>,
}

pub fn news_panel(batch: &NewsBatch, now: DateTime<Utc>) -> NewsPanel {
    let degraded = batch.is_degraded();
    let items = batch
        .articles
        .iter()
        .take(NEWS_PANEL_LIMIT)
        .map(|a| {
            let time = article_time_label(a, now);
            let meta = match (&a.category, degraded) {
                (Some(category), true) => format!("{time} • {category}"),
                _ => time,
            };
            NewsItem {
                source: a.source_name.clone(),
                title: a.title.clone(),
                meta,
                description: a
                    .description
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
                link: a.url.clone(),
                image: a.image.clone(),
            }
        })
        .collect();

    NewsPanel {
        items,
        source_used: batch.provider_id().map(String::from),
        degraded,
        signup_links: if degraded { PROVIDER_SIGNUP_LINKS.to_vec() } else { Vec::new() },
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// How a chart's plotted values are labelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartScale {
    /// Raw indicator values in their registry unit.
    Raw(Unit),
    /// Values already divided down to billions of USD.
    Billions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub code: String,
    pub title: String,
    /// Indicator name without chart decoration, used in tooltips.
    pub series_name: String,
    pub scale: ChartScale,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// Axis tick label for a plotted value: `$450.0B`, `12.4%`, `2,184`,
    /// or `$477B` on a billions chart.
    pub fn tick_label(&self, value: f64) -> String {
        match self.scale {
            ChartScale::Raw(unit) => format_axis_tick(value, unit),
            ChartScale::Billions => format_billions(value, 0),
        }
    }

    /// Hover label for a plotted value: `GDP: $477.00B`.
    pub fn tooltip_label(&self, value: f64) -> String {
        let formatted = match self.scale {
            ChartScale::Raw(unit) => format_value(value, unit),
            ChartScale::Billions => format_billions(value, 2),
        };
        format!("{}: {formatted}", self.series_name)
    }
}

/// Raw points of the selected indicator, oldest first. Absent values are
/// left out.
pub fn main_chart(dashboard: &Dashboard) -> Option<ChartData> {
    let series = dashboard.get_indicator_series(&dashboard.selected_indicator())?;
    Some(ChartData {
        points: series
            .points
            .iter()
            .filter_map(|p| p.value.map(|value| ChartPoint { label: p.period.clone(), value }))
            .collect(),
        scale: ChartScale::Raw(series.unit),
        code: series.code,
        title: series.name.clone(),
        series_name: series.name,
    })
}

/// Last five GDP periods in billions. `None` until five points exist.
pub fn comparison_chart(dashboard: &Dashboard) -> Option<ChartData> {
    let series = dashboard.get_indicator_series(GDP_CODE)?;
    if series.len() < COMPARISON_PERIODS {
        return None;
    }
    Some(ChartData {
        points: series
            .tail(COMPARISON_PERIODS)
            .iter()
            .filter_map(|p| {
                p.value.map(|v| ChartPoint {
                    label: p.period.clone(),
                    value: to_display_units(v, series.unit),
                })
            })
            .collect(),
        code: series.code.clone(),
        title: format!("{} (Billions USD)", series.name),
        series_name: series.name.clone(),
        scale: ChartScale::Billions,
    })
}
