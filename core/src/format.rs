//! printf-style formatting with value-aware conversions.
//!
//! Beside the usual C conversions, `%V` writes the stringified argument,
//! `%J` its compact JSON text and `%lJ` its pretty JSON text. A conversion
//! this formatter does not know is copied to the output unchanged.

use std::iter::Peekable;

use crate::errors::FormatError;
use crate::json;
use crate::values::Value;

/// Largest field width or precision accepted, as with C's `int` fields.
const MAX_FIELD: usize = i32::MAX as usize;

#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    long: bool,
}

/// Format `template` with `args`.
pub fn sprintf(template: &str, args: &[Value]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut used = 0;
    let mut rest = template;

    while let Some(percent) = rest.find('%') {
        out.push_str(&rest[..percent]);
        let directive = &rest[percent..];
        let offset = template.len() - directive.len();
        let (spec, conversion, consumed) =
            parse_directive(directive).ok_or(FormatError::FieldTooWide { offset })?;
        rest = &directive[consumed..];

        let Some(conversion) = conversion else {
            out.push_str(&directive[..consumed]);
            continue;
        };
        if conversion == '%' {
            out.push('%');
            continue;
        }
        if !is_known(conversion) {
            out.push_str(&directive[..consumed]);
            continue;
        }

        let arg = args.get(used).ok_or(FormatError::MissingArgument {
            index: used,
            conversion,
        })?;
        used += 1;
        convert(&mut out, &spec, conversion, arg)?;
    }
    out.push_str(rest);
    Ok(out)
}

fn is_known(conversion: char) -> bool {
    matches!(
        conversion,
        'd' | 'i' | 'u' | 'o' | 'x' | 'X' | 'c' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 's' | 'p'
            | 'V' | 'J'
    )
}

/// Parse one directive starting at its `%`. Returns the spec, the conversion
/// character (if the directive is complete) and the bytes consumed, or
/// `None` when a width or precision exceeds [`MAX_FIELD`].
fn parse_directive(directive: &str) -> Option<(Spec, Option<char>, usize)> {
    let mut spec = Spec::default();
    let mut chars = directive.char_indices().skip(1).peekable();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            '-' => spec.left = true,
            '0' => spec.zero = true,
            '+' => spec.plus = true,
            ' ' => spec.space = true,
            '#' => spec.alt = true,
            _ => break,
        }
        chars.next();
    }
    spec.width = field(&mut chars)?;
    if let Some(&(_, '.')) = chars.peek() {
        chars.next();
        spec.precision = Some(field(&mut chars)?);
    }
    while let Some(&(_, c)) = chars.peek() {
        match c {
            'l' => spec.long = true,
            'h' | 'L' | 'q' | 'z' | 'j' | 't' => {}
            _ => break,
        }
        chars.next();
    }
    Some(match chars.next() {
        Some((at, c)) => (spec, Some(c), at + c.len_utf8()),
        None => (spec, None, directive.len()),
    })
}

/// Read a run of decimal digits, `None` past [`MAX_FIELD`].
fn field(chars: &mut Peekable<impl Iterator<Item = (usize, char)>>) -> Option<usize> {
    let mut value: usize = 0;
    while let Some(&(_, c)) = chars.peek() {
        let Some(digit) = c.to_digit(10) else { break };
        value = value
            .checked_mul(10)?
            .checked_add(digit as usize)
            .filter(|&v| v <= MAX_FIELD)?;
        chars.next();
    }
    Some(value)
}

fn convert(out: &mut String, spec: &Spec, conversion: char, arg: &Value) -> Result<(), FormatError> {
    match conversion {
        'd' | 'i' => {
            let n = to_int(arg);
            let sign = sign_of(spec, n < 0);
            let mut digits = n.unsigned_abs().to_string();
            apply_int_precision(&mut digits, spec);
            pad_number(out, spec, sign, &digits, spec.precision.is_none());
        }
        'u' | 'o' | 'x' | 'X' | 'p' => {
            let n = to_int(arg) as u64;
            let (mut digits, prefix) = match conversion {
                'o' => (format!("{:o}", n), if spec.alt && n != 0 { "0" } else { "" }),
                'x' => (format!("{:x}", n), if spec.alt && n != 0 { "0x" } else { "" }),
                'X' => (format!("{:X}", n), if spec.alt && n != 0 { "0X" } else { "" }),
                'p' => (format!("{:x}", n), "0x"),
                _ => (n.to_string(), ""),
            };
            apply_int_precision(&mut digits, spec);
            pad_number(out, spec, prefix, &digits, spec.precision.is_none());
        }
        'c' => {
            let c = match arg {
                Value::Str(s) => s.borrow().chars().next().unwrap_or('\0'),
                other => u32::try_from(to_int(other))
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}'),
            };
            pad_text(out, spec, &c.to_string());
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let r = to_real(arg);
            let sign = sign_of(spec, r.is_sign_negative() && r != 0.0);
            let body = format_real(r.abs(), conversion, spec);
            if r.is_finite() {
                pad_number(out, spec, sign, &body, true);
            } else {
                pad_text(out, spec, &format!("{}{}", sign, body));
            }
        }
        's' | 'V' => {
            let text = arg.to_string();
            let text = match spec.precision {
                Some(max) => truncate(&text, max),
                None => &text,
            };
            pad_text(out, spec, text);
        }
        'J' => {
            let text = if spec.long {
                json::encode_pretty(arg)?
            } else {
                json::encode(arg)?
            };
            pad_text(out, spec, &text);
        }
        _ => unreachable!("conversion {:?} is filtered by is_known", conversion),
    }
    Ok(())
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        Value::Real(r) => *r as i64,
        Value::Bool(b) => *b as i64,
        Value::Str(s) => s.borrow().trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn to_real(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Real(r) => *r,
        Value::Bool(b) => *b as i64 as f64,
        Value::Str(s) => s.borrow().trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn sign_of(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn apply_int_precision(digits: &mut String, spec: &Spec) {
    if let Some(precision) = spec.precision {
        if digits == "0" && precision == 0 {
            digits.clear();
        } else if digits.len() < precision {
            digits.insert_str(0, &"0".repeat(precision - digits.len()));
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn pad_text(out: &mut String, spec: &Spec, text: &str) {
    let fill = spec.width.saturating_sub(text.chars().count());
    if spec.left {
        out.push_str(text);
        out.extend(std::iter::repeat_n(' ', fill));
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.push_str(text);
    }
}

/// Pad a number; zero padding goes between the sign or prefix and the digits.
fn pad_number(out: &mut String, spec: &Spec, prefix: &str, digits: &str, zero_ok: bool) {
    let fill = spec.width.saturating_sub(prefix.len() + digits.len());
    let zero = spec.zero && !spec.left && zero_ok;
    if spec.left {
        out.push_str(prefix);
        out.push_str(digits);
        out.extend(std::iter::repeat_n(' ', fill));
    } else if zero {
        out.push_str(prefix);
        out.extend(std::iter::repeat_n('0', fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat_n(' ', fill));
        out.push_str(prefix);
        out.push_str(digits);
    }
}

fn format_real(r: f64, conversion: char, spec: &Spec) -> String {
    if !r.is_finite() {
        let text = if r.is_nan() { "nan" } else { "inf" };
        return if conversion.is_ascii_uppercase() {
            text.to_ascii_uppercase()
        } else {
            text.to_string()
        };
    }
    let precision = spec.precision.unwrap_or(6);
    let mut body = match conversion {
        'f' | 'F' => format!("{:.*}", precision, r),
        'e' | 'E' => exponential(r, precision),
        _ => general(r, precision, spec.alt),
    };
    if spec.alt && !body.contains('.') && matches!(conversion, 'f' | 'F' | 'e' | 'E') {
        let at = body.find('e').unwrap_or(body.len());
        body.insert(at, '.');
    }
    if conversion.is_ascii_uppercase() {
        body = body.to_ascii_uppercase();
    }
    body
}

/// `d.ddde+XX`, with at least two exponent digits.
fn exponential(r: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, r);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
}

/// `%g`: the shorter of fixed and exponential, trailing zeros removed.
fn general(r: f64, precision: usize, alt: bool) -> String {
    let precision = precision.max(1);
    let exponent = if r == 0.0 {
        0
    } else {
        let text = format!("{:.*e}", precision - 1, r);
        text.split_once('e')
            .and_then(|(_, exponent)| exponent.parse::<i32>().ok())
            .unwrap_or(0)
    };
    let mut body = if exponent < -4 || exponent >= precision as i32 {
        exponential(r, precision - 1)
    } else {
        format!("{:.*}", (precision as i32 - 1 - exponent) as usize, r)
    };
    if !alt {
        strip_trailing_zeros(&mut body);
    }
    body
}

fn strip_trailing_zeros(body: &mut String) {
    let exponent = body.find('e').map(|at| body.split_off(at));
    if body.contains('.') {
        while body.ends_with('0') {
            body.pop();
        }
        if body.ends_with('.') {
            body.pop();
        }
    }
    if let Some(exponent) = exponent {
        body.push_str(&exponent);
    }
}
