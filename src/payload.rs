//! Inbound payload → magnitude.
//!
//! Readings arrive as ASCII decimal text.  Parsing follows C `atof`
//! conventions: leading whitespace is skipped, the longest numeric prefix is
//! used and anything after it (units, a trailing NUL, a newline) is ignored.
//! Only the magnitude matters to the threshold logic, so the sign is dropped.
//! A payload with no numeric prefix reads as zero and is flagged malformed.
//! A well-formed number too large for `f64` reads as infinity, which sits
//! above every finite threshold.

/// Result of interpreting one payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Absolute value of the parsed number (0.0 when malformed).
    pub magnitude: f64,
    /// True when no numeric prefix was found.
    pub malformed: bool,
}

impl Reading {
    const MALFORMED: Self = Self {
        magnitude: 0.0,
        malformed: true,
    };
}

/// Interpret a raw payload as a magnitude.
pub fn parse_reading(payload: &[u8]) -> Reading {
    let start = payload
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(payload.len());
    let rest = &payload[start..];
    let len = numeric_prefix_len(rest);
    if len == 0 {
        return Reading::MALFORMED;
    }
    // The prefix is pure ASCII by construction.
    let Ok(text) = core::str::from_utf8(&rest[..len]) else {
        return Reading::MALFORMED;
    };
    // The scanner never admits "inf"/"nan", so the only non-finite result
    // is an overflowing exponent.
    match text.parse::<f64>() {
        Ok(v) => Reading {
            magnitude: v.abs(),
            malformed: false,
        },
        Err(_) => Reading::MALFORMED,
    }
}

/// Length of the longest `[+-]digits[.digits][(e|E)[+-]digits]` prefix.
/// Returns 0 when there is no mantissa digit.
fn numeric_prefix_len(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(&s[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if s.get(i) == Some(&b'.') {
        frac_digits = count_digits(&s[i + 1..]);
        // "5." is valid, "." alone is not.
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(s.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&s[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    i
}

fn count_digits(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}
