//! Number formatting for reports (German grouping, euro sign after the amount).

const NBSP: char = '\u{a0}';

/// Formats an amount as whole euros in de-DE style: `4.050.000 €`.
///
/// Rounds half away from zero. Non-finite amounts render as `0 €`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("0{NBSP}€");
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}{NBSP}€", group_thousands(rounded.abs()))
}

/// Reads back a value produced by [`format_currency`].
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '€' && *c != '.' && *c != NBSP && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Whole number with de-DE thousands separators: `1.000`.
pub fn format_integer(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(rounded.abs()))
}

/// Compact millions figure used in headlines: `€4.1M`.
pub fn format_millions(amount: f64) -> String {
    if !amount.is_finite() {
        return "€0.0M".to_string();
    }
    format!("€{:.1}M", amount / 1_000_000.0)
}

pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", value)
}

/// Plain number without trailing zeros, at most two decimals (`50`, `12.5`).
pub fn format_plain(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        rounded.to_string()
    }
}

fn group_thousands(non_negative_whole: f64) -> String {
    let digits = format!("{:.0}", non_negative_whole);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
