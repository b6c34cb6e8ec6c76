use crate::ast::Value;
use crate::config::DigitGrouping;

/// Formats a calculation result with exactly two fractional digits and grouped thousands.
///
/// Rounding is half toward positive infinity, so `1.125` becomes `1.13` and
/// `-1.125` becomes `-1.12`. `None` formats as `0.00`.
pub fn format_number(value: Option<f64>, grouping: DigitGrouping) -> String {
    let Some(n) = value else {
        return "0.00".to_string();
    };
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    // Near the top of the f64 range `n * 100.0` overflows; such values are already integral.
    let cents = (n * 100.0 + 0.5).floor();
    let (negative, fixed) = if cents.is_finite() {
        (cents < 0.0, format!("{:.2}", cents.abs() / 100.0))
    } else {
        (n < 0.0, format!("{:.2}", n.abs()))
    };
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 2 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, grouping));
    out.push('.');
    out.push_str(frac_part);
    out
}

/// Formats any evaluation outcome for display.
pub fn format_value(value: &Value, grouping: DigitGrouping) -> String {
    match value {
        Value::Number(n) => format_number(Some(*n), grouping),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
    }
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    let len = digits.len();
    if len <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(len - 3);
    let group = match grouping {
        DigitGrouping::Indian => 2,
        DigitGrouping::Western => 3,
    };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    groups.push(tail);
    groups.join(",")
}
