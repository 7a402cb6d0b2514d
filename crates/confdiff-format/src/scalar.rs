//! Literal inference for untyped scalar text (XML leaves and YAML values).

use confdiff_types::{ConfigValue, Number};

/// Infer a typed value from a bare token.
///
/// `true`/`false` become booleans, `null`/`~` null, integer- and
/// decimal-looking tokens numbers, quoted tokens strings without their
/// quotes, and everything else a verbatim string.
pub fn infer_scalar(token: &str) -> ConfigValue {
    let token = token.trim();
    match token {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        "null" | "~" => return ConfigValue::Null,
        _ => {}
    }

    if let Some(inner) = unquote(token) {
        return ConfigValue::String(inner.to_string());
    }

    if looks_like_integer(token) {
        return match token.parse::<i64>() {
            Ok(i) => ConfigValue::Number(Number::Integer(i)),
            Err(_) => match token.parse::<f64>() {
                Ok(f) => ConfigValue::Number(Number::Float(f)),
                Err(_) => ConfigValue::String(token.to_string()),
            },
        };
    }

    if looks_like_decimal(token) {
        if let Ok(f) = token.parse::<f64>() {
            return ConfigValue::Number(Number::Float(f));
        }
    }

    ConfigValue::String(token.to_string())
}

/// Strip one pair of matching single or double quotes.
pub fn unquote(token: &str) -> Option<&str> {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return Some(&token[1..token.len() - 1]);
        }
    }
    None
}

fn strip_sign(token: &str) -> &str {
    token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token)
}

fn looks_like_integer(token: &str) -> bool {
    let digits = strip_sign(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn looks_like_decimal(token: &str) -> bool {
    let body = strip_sign(token);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            !(int.is_empty() && frac.is_empty())
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => exponent.is_some() && looks_like_integer(mantissa),
    };
    let exponent_ok = exponent.map_or(true, looks_like_integer);
    mantissa_ok && exponent_ok
}
