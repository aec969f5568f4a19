//! Loose price parsing.
//!
//! Product prices arrive from spreadsheet cells typed by hand: `"$1.234,56"`,
//! `"1,234.56"`, `"12"`, `" 12.5 "`, `"ARS 950"`. [`parse_price`] normalizes
//! these into a [`Decimal`] so the cart and order totals stay exact.

use rust_decimal::Decimal;

/// Parse a loosely-formatted price string into a [`Decimal`].
///
/// Currency symbols, letters, and whitespace are ignored. When both `,` and
/// `.` are present, the rightmost one is the decimal mark and the other is a
/// thousands separator. A lone separator is a decimal mark when it is
/// followed by one or two digits, and a thousands separator when followed by
/// exactly three (so `"1.234"` parses as `1234`, `"12.5"` as `12.5`).
///
/// Returns `None` when the string contains no digits or the normalized form
/// is not a valid number. Never panics.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            let decimal_mark = if comma > dot { ',' } else { '.' };
            rewrite(&cleaned, Some(decimal_mark))
        }
        (Some(_), None) => rewrite(&cleaned, lone_separator_mark(&cleaned, ',')),
        (None, Some(_)) => rewrite(&cleaned, lone_separator_mark(&cleaned, '.')),
        (None, None) => cleaned,
    };

    normalized.parse::<Decimal>().ok()
}

/// Decide whether a lone separator char acts as the decimal mark.
///
/// Multiple occurrences can only be thousands grouping. A single occurrence
/// followed by exactly three digits is treated as grouping too.
fn lone_separator_mark(s: &str, sep: char) -> Option<char> {
    if s.matches(sep).count() != 1 {
        return None;
    }
    let tail_digits = s
        .rsplit(sep)
        .next()
        .map_or(0, |tail| tail.chars().filter(char::is_ascii_digit).count());
    if tail_digits == 3 || tail_digits == 0 {
        None
    } else {
        Some(sep)
    }
}

/// Drop every separator except the decimal mark, which becomes `.`.
fn rewrite(s: &str, decimal_mark: Option<char>) -> String {
    let mut out = String::with_capacity(s.len());
    // Only the *last* occurrence of the decimal mark splits the fraction.
    let split_at = decimal_mark.and_then(|mark| s.rfind(mark));
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == split_at {
            out.push('.');
        }
    }
    out
}
