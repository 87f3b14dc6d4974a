// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of `timeout` attribute durations ("750ms", "1s", "2m30s", "1h").

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration segment: {0:?}")]
    InvalidSegment(String),
    #[error("unknown duration unit: {0:?}")]
    UnknownUnit(String),
}

/// Parse a duration string into a [`Duration`].
///
/// Accepts a sequence of `<number><unit>` segments where unit is one of
/// `ms`, `s`, `m`, `h`, `d`. A bare number is read as seconds.
pub fn parse(s: &str) -> Result<Duration, DurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    // Bare numbers are seconds.
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total_ms: u64 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits_end == 0 {
            return Err(DurationError::InvalidSegment(rest.to_string()));
        }
        let (digits, tail) = rest.split_at(digits_end);
        let amount: u64 =
            digits.parse().map_err(|_| DurationError::InvalidSegment(rest.to_string()))?;

        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let per_unit_ms = match unit {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            "d" => 86_400_000,
            other => return Err(DurationError::UnknownUnit(other.to_string())),
        };

        total_ms = total_ms.saturating_add(amount.saturating_mul(per_unit_ms));
        rest = tail;
    }

    Ok(Duration::from_millis(total_ms))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
