use super::Dynamic;

/// Largest magnitude still shown without a fractional part.
const INTEGRAL_DISPLAY_LIMIT: f64 = 1e15;

/// Format a Dynamic value for display.
pub fn format_dynamic(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(n) = value.as_int() {
        n.to_string()
    } else if let Ok(b) = value.as_bool() {
        if b { "TRUE" } else { "FALSE" }.to_string()
    } else if let Ok(s) = value.clone().into_string() {
        s
    } else {
        value.to_string()
    }
}

/// Format a number for display.
///
/// Integral values print without decimals; others print with up to six
/// decimals and no trailing zeros, so `0.1 + 0.2` shows as `0.3`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < INTEGRAL_DISPLAY_LIMIT {
        format!("{:.0}", n)
    } else {
        let fixed = format!("{:.6}", n);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}
