//! Structured-value encoder

use crate::value::StructuredValue;

/// Encode a value into a fresh buffer
pub fn encode(value: &StructuredValue) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

/// Encode a value, appending to `out`
///
/// Length and count headers are always computed from `value` itself.
pub fn encode_into(value: &StructuredValue, out: &mut Vec<u8>) {
    match value {
        StructuredValue::Null => out.extend_from_slice(b"N;"),
        StructuredValue::Bool(b) => {
            out.extend_from_slice(if *b { b"b:1;" } else { b"b:0;" });
        }
        StructuredValue::Int(n) => {
            out.extend_from_slice(format!("i:{};", n).as_bytes());
        }
        StructuredValue::Float(f) => {
            out.extend_from_slice(b"d:");
            write_float(out, *f);
            out.push(b';');
        }
        StructuredValue::Bytes(data) => {
            out.extend_from_slice(format!("s:{}:\"", data.len()).as_bytes());
            out.extend_from_slice(data);
            out.extend_from_slice(b"\";");
        }
        StructuredValue::Map(pairs) => {
            out.extend_from_slice(format!("a:{}:{{", pairs.len()).as_bytes());
            for (key, value) in pairs {
                encode_into(key, out);
                encode_into(value, out);
            }
            out.push(b'}');
        }
    }
}

/// Write a float the way PHP's `serialize()` does (`serialize_precision = -1`)
///
/// Shortest round-trip digits; plain notation while the decimal exponent is
/// within [-4, 17), `D.DDDE+X` notation outside it; no trailing `.0` for
/// integral values.
fn write_float(out: &mut Vec<u8>, f: f64) {
    if f.is_nan() {
        out.extend_from_slice(b"NAN");
        return;
    }
    if f.is_infinite() {
        out.extend_from_slice(if f > 0.0 { b"INF" } else { b"-INF" });
        return;
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "-1.2345e-7"
    let sci = format!("{:e}", f);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    // Position of the decimal point relative to the first digit
    let point = exponent + 1;

    let text = if point < -3 || point > 17 {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}.{}E{}{}", sign, first, rest, exp_sign, exponent.abs())
    } else if point <= 0 {
        format!("{}0.{}{}", sign, "0".repeat((-point) as usize), digits)
    } else if digits.len() <= point as usize {
        format!("{}{}{}", sign, digits, "0".repeat(point as usize - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}{}.{}", sign, int_part, frac_part)
    };
    out.extend_from_slice(text.as_bytes());
}
