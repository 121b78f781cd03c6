//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format a digit string with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;
    for c in s.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a signed amount as money, e.g. `$1,234.50` or `-$12.00`
pub fn format_money(amount: Decimal, symbol: &str, decimal_places: u32) -> String {
    let rounded = amount
        .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let text = format!("{:.*}", decimal_places as usize, rounded);
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}{}{}.{}", sign, symbol, format_number(whole), fraction),
        None => format!("{}{}{}", sign, symbol, format_number(whole)),
    }
}

/// Escape text for HTML bodies and attribute values
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
