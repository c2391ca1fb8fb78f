//! Seat identifiers and the linear row-spacing model
//!
//! A seat is `<row><optional letter>`, e.g. `12B`. Only the row matters for
//! travel distance; the letter is accepted and ignored (no column offsets).

use crate::error::{CartError, CartResult};

/// Parse a seat identifier into its row number.
///
/// Accepts the shape `\s*(\d+)\s*[A-Za-z]?\s*` and nothing else.
pub fn parse_row(seat: &str) -> CartResult<u32> {
    let invalid = || CartError::InvalidSeat(seat.to_string());

    let trimmed = seat.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, rest) = trimmed.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid());
    }

    let mut rest = rest.trim_start().chars();
    match rest.next() {
        None => {}
        Some(c) if c.is_ascii_alphabetic() && rest.as_str().trim().is_empty() => {}
        Some(_) => return Err(invalid()),
    }

    digits.parse::<u32>().map_err(|_| invalid())
}

/// Travel distance for a row under the linear spacing model.
/// Always non-negative: `|row - home_row| * seat_spacing_cm`.
pub fn distance_cm(row: u32, home_row: u32, seat_spacing_cm: f64) -> f64 {
    (f64::from(row) - f64::from(home_row)).abs() * seat_spacing_cm
}

/// Wire command for a travel distance, one decimal place
pub fn go_command(distance_cm: f64) -> String {
    format!("GO {distance_cm:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_row() {
        assert_eq!(parse_row("12").unwrap(), 12);
        assert_eq!(parse_row("1").unwrap(), 1);
    }

    #[test]
    fn row_with_letter() {
        assert_eq!(parse_row("12B").unwrap(), 12);
        assert_eq!(parse_row("7a").unwrap(), 7);
    }

    #[test]
    fn surrounding_whitespace_tolerated() {
        assert_eq!(parse_row("  12B  ").unwrap(), 12);
        assert_eq!(parse_row(" 3 C ").unwrap(), 3);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "  ", "B12", "12BB", "12-3", "1.5", "seat 12", "12 B x"] {
            assert!(
                matches!(parse_row(bad), Err(CartError::InvalidSeat(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflowing_row() {
        assert!(parse_row("99999999999999999999").is_err());
    }

    #[test]
    fn distance_is_absolute() {
        assert_eq!(distance_cm(12, 1, 80.0), 880.0);
        assert_eq!(distance_cm(1, 12, 80.0), 880.0);
        assert_eq!(distance_cm(5, 5, 80.0), 0.0);
    }

    #[test]
    fn distance_tolerance() {
        let d = distance_cm(10, 1, 72.3);
        assert!((d - 650.7).abs() < 1e-9);
    }

    #[test]
    fn go_command_one_decimal() {
        assert_eq!(go_command(880.0), "GO 880.0");
        assert_eq!(go_command(650.7000000001), "GO 650.7");
        assert_eq!(go_command(0.0), "GO 0.0");
    }
}
