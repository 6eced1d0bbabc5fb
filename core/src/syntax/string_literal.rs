/// Quoted-key escaping and unescaping for path syntax.
///
/// This module converts between:
/// - Runtime keys (e.g., `a 'key'` with actual quote characters)
/// - Quoted keys as written in a path (e.g., `'a \'key\''`)
use std::borrow::Cow;
use std::fmt;

/// Errors that can occur when unescaping quoted keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    /// Invalid escape sequence (e.g., `\q`)
    InvalidEscape { pos: usize, seq: String },
    /// Invalid hex digit in Unicode escape
    InvalidHexDigit { pos: usize, seq: String },
    /// Incomplete Unicode escape (not enough digits)
    IncompleteUnicodeEscape {
        pos: usize,
        expected: usize,
        got: usize,
    },
    /// Invalid Unicode scalar value
    InvalidUnicodeScalar { pos: usize, value: u32 },
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::InvalidEscape { pos, seq } => {
                write!(f, "invalid escape sequence '{}' at position {}", seq, pos)
            }
            UnescapeError::InvalidHexDigit { pos, seq } => {
                write!(f, "invalid hex digit in '{}' at position {}", seq, pos)
            }
            UnescapeError::IncompleteUnicodeEscape { pos, expected, got } => {
                write!(
                    f,
                    "incomplete Unicode escape at position {}: expected {} digits, got {}",
                    pos, expected, got
                )
            }
            UnescapeError::InvalidUnicodeScalar { pos, value } => {
                write!(
                    f,
                    "invalid Unicode scalar value U+{:X} at position {}",
                    value, pos
                )
            }
        }
    }
}

/// Whether `key` can be written bare after a dot (`$.key`).
pub fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Write `key` as a single-quoted path key.
///
/// Escapes `'`, `\` and control characters; everything else is written as is.
///
/// # Example
///
/// ```ignore
/// let mut output = String::new();
/// escape_key(&mut output, "it's").unwrap();
/// assert_eq!(output, r"'it\'s'");
/// ```
pub fn escape_key(f: &mut impl fmt::Write, key: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in key.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

/// Unescape the body of a quoted key (without the surrounding quotes).
///
/// Supported escapes: `\\`, `\'`, `\"`, `\/`, `\b`, `\f`, `\n`, `\r`, `\t`,
/// `\0` and `\uNNNN`. Input without backslashes is returned borrowed.
pub fn unescape_key(input: &str) -> Result<Cow<'_, str>, UnescapeError> {
    if !input.contains('\\') {
        return Ok(Cow::Borrowed(input));
    }

    let mut output = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((pos, ch)) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }

        match chars.next() {
            Some((_, 'n')) => output.push('\n'),
            Some((_, 'r')) => output.push('\r'),
            Some((_, 't')) => output.push('\t'),
            Some((_, 'b')) => output.push('\u{8}'),
            Some((_, 'f')) => output.push('\u{c}'),
            Some((_, '0')) => output.push('\0'),
            Some((_, c @ ('\\' | '"' | '\'' | '/'))) => output.push(c),
            Some((upos, 'u')) => {
                let hex_start = upos + 1;
                let mut hex_value = 0u32;
                let mut digit_count = 0;

                for _ in 0..4 {
                    match chars.next() {
                        Some((_, ch)) => match ch.to_digit(16) {
                            Some(digit) => {
                                hex_value = (hex_value << 4) | digit;
                                digit_count += 1;
                            }
                            None => {
                                return Err(UnescapeError::InvalidHexDigit {
                                    pos: hex_start,
                                    seq: format!("\\u{}", ch),
                                });
                            }
                        },
                        None => {
                            return Err(UnescapeError::IncompleteUnicodeEscape {
                                pos,
                                expected: 4,
                                got: digit_count,
                            });
                        }
                    }
                }

                let unicode_char =
                    char::from_u32(hex_value).ok_or(UnescapeError::InvalidUnicodeScalar {
                        pos,
                        value: hex_value,
                    })?;
                output.push(unicode_char);
            }
            Some((_, other)) => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: format!("\\{}", other),
                });
            }
            None => {
                return Err(UnescapeError::InvalidEscape {
                    pos,
                    seq: "\\".to_string(),
                });
            }
        }
    }

    Ok(Cow::Owned(output))
}
