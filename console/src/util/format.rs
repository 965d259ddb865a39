//! Human-readable formatting of file sizes, counts, and formats.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

const MIB: f64 = 1024.0 * 1024.0;

/// Size in mebibytes with `decimals` places, e.g. `"10.00 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn size_mb(bytes: u64, decimals: usize) -> String {
    format!("{:.decimals$} MB", bytes as f64 / MIB)
}

/// Integer with comma thousands separators, e.g. `"1,234,567"`.
#[must_use]
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Upper-cased text after the last dot; the whole name when there is none.
#[must_use]
pub fn format_label(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_uppercase()
}

/// One-decimal percentage, e.g. `"65.0%"`.
#[must_use]
pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}
