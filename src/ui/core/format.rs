use num_format::{Locale, ToFormattedString};

pub fn format_money(num: f64) -> String {
    if num >= 1_000_000_000.0 {
        format!("${:.2}B", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("${:.2}M", num / 1_000_000.0)
    } else {
        format!("${:.2}", num)
    }
}

pub fn format_change(change: f64) -> String {
    // -0.0 renders as +0.00%
    let change = change + 0.0;
    if change >= 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// Whole-dollar amount with thousands separators, e.g. `$28,500,000,000`.
pub fn format_grouped(num: f64) -> String {
    let whole = num.abs().round() as u64;
    let sign = if num < 0.0 && whole > 0 { "-" } else { "" };
    format!("{}${}", sign, whole.to_formatted_string(&Locale::en))
}
