// =============================================================================
// Console Summary
// =============================================================================

use std::fmt::Write as _;

use crate::indicators::rsi::latest_rsi;
use crate::indicators::IndicatorFrame;
use crate::types::MarketSummary;

/// Build the human-readable market summary printed at the end of a run.
pub fn render_summary(summary: &MarketSummary, frame: &IndicatorFrame, vs_currency: &str) -> String {
    let title = if summary.name.is_empty() {
        summary.id.to_uppercase()
    } else {
        summary.name.to_uppercase()
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n🔹 {title} Summary");
    let _ = writeln!(out, "Current Price: {}", money(summary.current_price, vs_currency));
    let _ = writeln!(out, "24h Change: {}", percent(summary.price_change_percentage_24h_in_currency));
    let _ = writeln!(out, "7d Change: {}", percent(summary.price_change_percentage_7d_in_currency));
    let _ = writeln!(out, "30d Change: {}", percent(summary.price_change_percentage_30d_in_currency));
    let _ = writeln!(out, "24h Volume: {}", money(summary.total_volume, vs_currency));
    let _ = writeln!(out, "Market Cap: {}", money(summary.market_cap, vs_currency));

    let window = frame.params.rsi_window;
    match latest_rsi(&frame.rsi) {
        Some((value, zone)) => {
            let _ = writeln!(out, "RSI ({window}): {value:.2} ({zone})");
        }
        None => {
            let _ = writeln!(out, "RSI ({window}): n/a");
        }
    }

    out
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

fn money(value: Option<f64>, vs_currency: &str) -> String {
    let Some(v) = value else {
        return "n/a".to_string();
    };
    let amount = group_thousands(v);
    if vs_currency.eq_ignore_ascii_case("usd") {
        match amount.strip_prefix('-') {
            Some(abs) => format!("-${abs}"),
            None => format!("${amount}"),
        }
    } else {
        format!("{amount} {}", vs_currency.to_uppercase())
    }
}

/// Format `value` with two decimals and comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
