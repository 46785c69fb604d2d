//! Metric normalizer.
//!
//! Turns a cached indicator series into a `MetricSnapshot` (latest value,
//! period-over-period change, polarity-aware direction) and formats raw
//! values for display. Everything here is pure.
//!
//! Rounding is half away from zero, applied to the shortest decimal that
//! round-trips the float (`12.345` → `12.35`, `-0.125` → `-0.13`).

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::registry::PolarityTable;
use crate::types::{Direction, IndicatorSeries, MetricSnapshot, Unit};

// ---------------------------------------------------------------------------
// Change and direction
// ---------------------------------------------------------------------------

/// `(latest - previous) / previous * 100`, or `None` when either value is
/// missing or zero.
pub fn percent_change(latest: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (latest, previous) {
        (Some(l), Some(p)) if l != 0.0 && p != 0.0 => Some((l - p) / p * 100.0),
        _ => None,
    }
}

/// Combine the sign of a change with the indicator's polarity.
pub fn direction(change: Option<f64>, higher_is_better: bool) -> Direction {
    match change {
        Some(c) if c > 0.0 => {
            if higher_is_better {
                Direction::Favorable
            } else {
                Direction::Unfavorable
            }
        }
        Some(c) if c < 0.0 => {
            if higher_is_better {
                Direction::Unfavorable
            } else {
                Direction::Favorable
            }
        }
        _ => Direction::Neutral,
    }
}

/// Derive a snapshot from the last two points of `series`.
///
/// Returns `None` when the series is empty or its newest point has no
/// value. A single-point series yields a snapshot with no change.
pub fn normalize(series: &IndicatorSeries, polarity: &PolarityTable) -> Option<MetricSnapshot> {
    let latest = series.points.last()?;
    let latest_value = latest.value?;
    let previous_value = series
        .points
        .len()
        .checked_sub(2)
        .and_then(|i| series.points[i].value);

    let change = percent_change(Some(latest_value), previous_value);

    Some(MetricSnapshot {
        code: series.code.clone(),
        period: latest.period.clone(),
        latest_value,
        previous_value,
        percent_change: change,
        direction: direction(change, polarity.higher_is_better(&series.code)),
    })
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

const BILLION: Decimal = dec!(1_000_000_000);

fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

fn round(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Round `value` half away from zero to `dp` decimals.
pub fn round_half_away(value: f64, dp: u32) -> String {
    match to_decimal(value) {
        Some(d) => round(d, dp).to_string(),
        None => value.to_string(),
    }
}

/// Insert `,` thousands separators into a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn currency(amount: Decimal, body: impl FnOnce(Decimal) -> String) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${}", body(amount.abs()))
    } else {
        format!("${}", body(amount.abs()))
    }
}

fn format_with(value: f64, unit: Unit, dp: u32) -> String {
    match to_decimal(value) {
        Some(d) => format_decimal(d, unit, dp),
        None if value.is_finite() => format_float(value, unit, dp),
        None => value.to_string(),
    }
}

// Finite values beyond `Decimal`'s range (about 7.9e28) keep their unit
// decoration; billions are scaled in f64 before conversion.
fn format_float(value: f64, unit: Unit, dp: u32) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    match unit {
        Unit::Percent => format!("{:.*}%", dp as usize, value),
        Unit::CurrencyBillions => match to_decimal(abs / 1e9) {
            Some(b) => format!("{sign}${}B", round(b, dp)),
            None => format!("{sign}${:.*}B", dp as usize, abs / 1e9),
        },
        Unit::CurrencyRaw => format!("{sign}${}", group_thousands(&format!("{abs:.0}"))),
        Unit::Count => format!("{sign}{}", group_thousands(&format!("{abs:.0}"))),
    }
}

fn format_decimal(d: Decimal, unit: Unit, dp: u32) -> String {
    match unit {
        Unit::Percent => format!("{}%", round(d, dp)),
        Unit::CurrencyBillions => {
            let billions = round(d / BILLION, dp);
            currency(billions, |b| format!("{b}B"))
        }
        Unit::CurrencyRaw => {
            let whole = round(d, 0);
            currency(whole, |w| group_thousands(&w.to_string()))
        }
        Unit::Count => group_thousands(&round(d, 0).to_string()),
    }
}

/// Display string for a raw value: `$450.00B`, `12.35%`, `$2,184`, `1,234`.
pub fn format_value(value: f64, unit: Unit) -> String {
    format_with(value, unit, 2)
}

/// Label for a value already expressed in billions: `$477B` at `dp = 0`,
/// `$477.00B` at `dp = 2`.
pub fn format_billions(billions: f64, dp: u32) -> String {
    match to_decimal(billions) {
        Some(b) => currency(round(b, dp), |v| format!("{v}B")),
        None if billions.is_finite() => format_float(billions * 1e9, Unit::CurrencyBillions, dp),
        None => billions.to_string(),
    }
}

/// Compact label for chart axis ticks: `$450.0B`, `12.3%`, otherwise a
/// grouped integer without currency symbol.
pub fn format_axis_tick(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Percent | Unit::CurrencyBillions => format_with(value, unit, 1),
        Unit::CurrencyRaw | Unit::Count => format_with(value, Unit::Count, 0),
    }
}

/// Convert a raw value into the magnitude charts plot (billions for
/// `currency-billions`, unchanged otherwise).
pub fn to_display_units(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::CurrencyBillions => value / 1e9,
        _ => value,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
