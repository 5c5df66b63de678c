//! Indicator value normalization.
//!
//! Maps a raw coded value onto `[0, 1]` according to the indicator's
//! [`ValueDomain`]. This is a total function: anything that does not parse is
//! [`Score::Unknown`], never an error, so a malformed cell degrades to
//! "no evidence" instead of aborting the build.

use crate::domain::{Score, ValueDomain};

/// Count value that maps to a full score of 1.0.
pub const COUNT_CAP: f64 = 50.0;

/// Normalize a raw value under the given domain.
pub fn normalize(raw: &str, domain: ValueDomain) -> Score {
    match domain {
        ValueDomain::Binary => normalize_binary(raw),
        ValueDomain::Ordinal3 => normalize_ordinal3(raw),
        ValueDomain::Count => normalize_count(raw),
        ValueDomain::UnitInterval => normalize_unit_interval(raw),
    }
}

fn normalize_binary(raw: &str) -> Score {
    match raw {
        "Yes" => Score::Known(1.0),
        "No" => Score::Known(0.0),
        _ => Score::Unknown,
    }
}

fn normalize_ordinal3(raw: &str) -> Score {
    match raw {
        "0" => Score::Known(0.0),
        "1" => Score::Known(0.5),
        "2" => Score::Known(1.0),
        _ => Score::Unknown,
    }
}

fn normalize_count(raw: &str) -> Score {
    let Some(n) = parse_finite(raw) else {
        return Score::Unknown;
    };
    // Every negative count clamps to the bottom of the scale.
    let scaled = (1.0 + n.max(0.0)).log2() / (1.0 + COUNT_CAP).log2();
    Score::Known(scaled.clamp(0.0, 1.0))
}

fn normalize_unit_interval(raw: &str) -> Score {
    match parse_finite(raw) {
        Some(v) if (0.0..=1.0).contains(&v) => Score::Known(v),
        _ => Score::Unknown,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(score: Score) -> f64 {
        score.value().expect("expected a known score")
    }

    #[test]
    fn binary_tokens() {
        assert_eq!(normalize("Yes", ValueDomain::Binary), Score::Known(1.0));
        assert_eq!(normalize("No", ValueDomain::Binary), Score::Known(0.0));
        assert_eq!(normalize("Unknown", ValueDomain::Binary), Score::Unknown);
    }

    #[test]
    fn binary_is_exact_match() {
        assert_eq!(normalize("yes", ValueDomain::Binary), Score::Unknown);
        assert_eq!(normalize(" Yes", ValueDomain::Binary), Score::Unknown);
        assert_eq!(normalize("1", ValueDomain::Binary), Score::Unknown);
        assert_eq!(normalize("", ValueDomain::Binary), Score::Unknown);
    }

    #[test]
    fn ordinal3_tokens() {
        assert_eq!(normalize("0", ValueDomain::Ordinal3), Score::Known(0.0));
        assert_eq!(normalize("1", ValueDomain::Ordinal3), Score::Known(0.5));
        assert_eq!(normalize("2", ValueDomain::Ordinal3), Score::Known(1.0));
        assert_eq!(normalize("Unknown", ValueDomain::Ordinal3), Score::Unknown);
        assert_eq!(normalize("3", ValueDomain::Ordinal3), Score::Unknown);
        assert_eq!(normalize("1.0", ValueDomain::Ordinal3), Score::Unknown);
    }

    #[test]
    fn count_endpoints() {
        assert_eq!(normalize("0", ValueDomain::Count), Score::Known(0.0));
        assert!((known(normalize("50", ValueDomain::Count)) - 1.0).abs() < 1e-12);
        assert_eq!(normalize("5000", ValueDomain::Count), Score::Known(1.0));
    }

    #[test]
    fn count_midpoint_is_log_scaled() {
        // log2(8) / log2(51)
        let expected = 3.0 / 51f64.log2();
        assert!((known(normalize("7", ValueDomain::Count)) - expected).abs() < 1e-12);
    }

    #[test]
    fn count_is_monotone_and_bounded() {
        let mut prev = 0.0;
        for n in 0..200 {
            let v = known(normalize(&n.to_string(), ValueDomain::Count));
            assert!((0.0..=1.0).contains(&v), "n={n} -> {v}");
            assert!(v >= prev, "not monotone at n={n}");
            prev = v;
        }
    }

    #[test]
    fn count_rejects_non_numeric() {
        assert_eq!(normalize("Unknown", ValueDomain::Count), Score::Unknown);
        assert_eq!(normalize("many", ValueDomain::Count), Score::Unknown);
        assert_eq!(normalize("NaN", ValueDomain::Count), Score::Unknown);
        assert_eq!(normalize("inf", ValueDomain::Count), Score::Unknown);
    }

    #[test]
    fn every_negative_count_clamps_to_zero() {
        assert_eq!(normalize("-0.5", ValueDomain::Count), Score::Known(0.0));
        assert_eq!(normalize("-1", ValueDomain::Count), Score::Known(0.0));
        assert_eq!(normalize("-3", ValueDomain::Count), Score::Known(0.0));
        assert_eq!(normalize("-1e9", ValueDomain::Count), Score::Known(0.0));
    }

    #[test]
    fn unit_interval_passthrough() {
        assert_eq!(normalize("0.25", ValueDomain::UnitInterval), Score::Known(0.25));
        assert_eq!(normalize("1", ValueDomain::UnitInterval), Score::Known(1.0));
        assert_eq!(normalize(" 0 ", ValueDomain::UnitInterval), Score::Known(0.0));
        assert_eq!(normalize("1.5", ValueDomain::UnitInterval), Score::Unknown);
        assert_eq!(normalize("-0.1", ValueDomain::UnitInterval), Score::Unknown);
        assert_eq!(normalize("Yes", ValueDomain::UnitInterval), Score::Unknown);
    }
}
