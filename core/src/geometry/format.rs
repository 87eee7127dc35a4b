use super::latlng::LatLng;

/// Fixed-point rendering used by the read-only output fields.
///
/// Ties round away from zero, non-finite values render as `NaN`,
/// `Infinity` or `-Infinity`, and negative zero renders as `0`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let scale = 10f64.powi(digits as i32);
    let rounded = (value.abs() * scale).round() / scale;
    let signed = if value < 0.0 && rounded != 0.0 {
        -rounded
    } else {
        rounded
    };
    format!("{:.*}", digits, signed)
}

/// Leading-number parse used for free-text numeric inputs.
///
/// Leading whitespace is skipped and the longest numeric prefix is read, so
/// `"12m"` yields 12. Text without a numeric prefix yields NaN.
pub fn parse_float(input: &str) -> f64 {
    let trimmed = input.trim_start();
    let (sign, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if body.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = body.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    body[..end]
        .parse::<f64>()
        .map(|value| sign * value)
        .unwrap_or(f64::NAN)
}

/// Rounds half-up to `precision` decimals, dropping trailing zeros.
fn round_for_url(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    (value * scale + 0.5).floor() / scale
}

/// Renders a coordinate as `lat,lng` with at most `precision` decimals.
pub fn to_url_value(position: &LatLng, precision: i32) -> String {
    format!(
        "{},{}",
        round_for_url(position.lat, precision),
        round_for_url(position.lng, precision)
    )
}
