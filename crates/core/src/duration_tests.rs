// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    millis    = { "750ms",  750 },
    seconds   = { "1s",     1_000 },
    minutes   = { "2m",     120_000 },
    compound  = { "2m30s",  150_000 },
    hours     = { "1h",     3_600_000 },
    days      = { "2d",     172_800_000 },
    bare      = { "90",     90_000 },
    padded    = { " 10s ",  10_000 },
)]
fn parses_durations(input: &str, expected_ms: u64) {
    assert_eq!(parse(input), Ok(Duration::from_millis(expected_ms)));
}

#[test]
fn empty_input_is_an_error() {
    assert_eq!(parse(""), Err(DurationError::Empty));
    assert_eq!(parse("   "), Err(DurationError::Empty));
}

#[test]
fn unknown_unit_is_an_error() {
    assert!(matches!(parse("10x"), Err(DurationError::UnknownUnit(u)) if u == "x"));
}

#[test]
fn missing_amount_is_an_error() {
    assert!(matches!(parse("ms"), Err(DurationError::InvalidSegment(_))));
}

#[test]
fn trailing_bare_number_is_an_error() {
    // "1m90" has no unit for the trailing segment
    assert!(matches!(parse("1m90"), Err(DurationError::UnknownUnit(u)) if u.is_empty()));
}
