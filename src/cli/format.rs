//! Plain-text formatting helpers for CLI output

/// Format an amount with thousand separators and two decimals
/// (e.g., 1234567.5 -> "1,234,567.50")
pub fn format_money(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let len = whole.len();
    let mut result = String::with_capacity(len + len / 3 + 4);
    if amount < 0.0 && fixed != "0.00" {
        result.push('-');
    }
    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in whole.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }
    result.push('.');
    result.push_str(fraction);
    result
}

/// Signed percentage with one decimal (e.g., "+12.5%")
pub fn format_change(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{:.1}%", percent)
    } else {
        format!("{:.1}%", percent)
    }
}

/// Horizontal bar of `width` cells filled to `value / max`
/// Example: 5 of 10 with width 10 → "█████░░░░░"
pub fn format_bar(value: f64, max: f64, width: usize) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
