//! Quality evaluator — spacing heuristics for a pitch arrangement.
//!
//! A voicing is acceptable when at least `required_checks` of four spacing
//! checks pass. Duplicate pitches are a hard error, never a quality verdict.

use serde::{Deserialize, Serialize};

use super::VoicingError;

/// Tunable spacing limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Largest allowed gap between adjacent notes.
    pub max_gap: i32,
    /// Largest allowed distance from lowest to highest note.
    pub max_spread: i32,
    /// Gaps wider than this count as "wide".
    pub wide_gap: i32,
    /// How many wide gaps are tolerated.
    pub max_wide_gaps: usize,
    /// Largest allowed mean gap.
    pub max_avg_gap: f64,
    /// Checks that must pass (out of 4).
    pub required_checks: u8,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_gap: 15,
            max_spread: 24,
            wide_gap: 12,
            max_wide_gaps: 1,
            max_avg_gap: 8.0,
            required_checks: 3,
        }
    }
}

/// Spacing metrics for one arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityReport {
    pub max_gap: i32,
    pub total_spread: i32,
    pub avg_gap: f64,
    pub wide_gaps: usize,
    pub checks_passed: u8,
    pub acceptable: bool,
    /// Fraction of checks passed, 0.0..=1.0.
    pub score: f64,
}

/// Evaluate the spacing of `pitches` (any order).
pub fn evaluate(pitches: &[i32], thresholds: &QualityThresholds) -> Result<QualityReport, VoicingError> {
    let mut sorted = pitches.to_vec();
    sorted.sort_unstable();

    let gaps: Vec<i32> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
    if let Some(pos) = gaps.iter().position(|&g| g == 0) {
        return Err(VoicingError::DuplicateNote(sorted[pos]));
    }

    let max_gap = gaps.iter().copied().max().unwrap_or(0);
    let total_spread = match (sorted.first(), sorted.last()) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0,
    };
    let avg_gap = if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<i32>() as f64 / gaps.len() as f64
    };
    let wide_gaps = gaps.iter().filter(|&&g| g > thresholds.wide_gap).count();

    let checks = [
        max_gap <= thresholds.max_gap,
        total_spread <= thresholds.max_spread,
        wide_gaps <= thresholds.max_wide_gaps,
        avg_gap <= thresholds.max_avg_gap,
    ];
    let checks_passed = checks.iter().filter(|&&ok| ok).count() as u8;

    Ok(QualityReport {
        max_gap,
        total_spread,
        avg_gap,
        wide_gaps,
        checks_passed,
        acceptable: checks_passed >= thresholds.required_checks,
        score: checks_passed as f64 / checks.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn eval(pitches: &[i32]) -> QualityReport {
        evaluate(pitches, &QualityThresholds::default()).unwrap()
    }

    #[test]
    fn close_seventh_is_acceptable() {
        let report = eval(&[60, 64, 67, 71]);
        assert_eq!(report.max_gap, 4);
        assert_eq!(report.total_spread, 11);
        assert_approx_eq!(report.avg_gap, 11.0 / 3.0);
        assert_eq!(report.checks_passed, 4);
        assert!(report.acceptable);
        assert_approx_eq!(report.score, 1.0);
    }

    #[test]
    fn one_huge_gap_is_rejected() {
        // gaps [1, 23]
        let report = eval(&[60, 61, 84]);
        assert_eq!(report.max_gap, 23);
        assert_eq!(report.total_spread, 24);
        assert_approx_eq!(report.avg_gap, 12.0);
        assert_eq!(report.checks_passed, 2);
        assert!(!report.acceptable);
    }

    #[test]
    fn three_of_four_is_enough() {
        // gaps [16, 4, 3]: max gap fails, the rest pass
        let report = eval(&[48, 64, 68, 71]);
        assert_eq!(report.checks_passed, 3);
        assert!(report.acceptable);
    }

    #[test]
    fn two_wide_gaps_fail_that_check() {
        let report = eval(&[36, 50, 64]);
        assert_eq!(report.wide_gaps, 2);
        assert!(!report.acceptable);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(eval(&[71, 60, 67, 64]), eval(&[60, 64, 67, 71]));
    }

    #[test]
    fn duplicate_is_an_error() {
        let err = evaluate(&[60, 64, 64], &QualityThresholds::default()).unwrap_err();
        assert_eq!(err, VoicingError::DuplicateNote(64));
    }

    #[test]
    fn single_note_is_trivially_fine() {
        let report = eval(&[60]);
        assert_eq!(report.max_gap, 0);
        assert_eq!(report.total_spread, 0);
        assert!(report.acceptable);
    }

    #[test]
    fn custom_thresholds() {
        let strict = QualityThresholds {
            max_spread: 10,
            required_checks: 4,
            ..QualityThresholds::default()
        };
        let report = evaluate(&[60, 64, 67, 71], &strict).unwrap();
        assert_eq!(report.checks_passed, 3);
        assert!(!report.acceptable);
    }
}
