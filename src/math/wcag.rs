use super::hex::{self, Rgb};
use super::luminance::{relative_luminance, LuminanceValue};
use crate::error::Result;

/// Minimum ratio for WCAG AA, normal body text.
pub const AA_THRESHOLD: f64 = 4.5;
/// Minimum ratio for WCAG AAA, normal body text.
pub const AAA_THRESHOLD: f64 = 7.0;

/// Outcome of comparing two colors against the WCAG thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastVerdict {
    pub ratio: f64,
    pub passes_aa: bool,
    pub passes_aaa: bool,
}

impl ContrastVerdict {
    /// Ratio rendered to 2 decimal places, e.g. `"21.00"`.
    pub fn formatted_ratio(&self) -> String {
        format!("{:.2}", self.ratio)
    }
}

/// ratio = (L1 + 0.05) / (L2 + 0.05) where L1 >= L2
pub fn luminance_ratio(a: LuminanceValue, b: LuminanceValue) -> f64 {
    let (lighter, darker) = if a.value() > b.value() {
        (a.value(), b.value())
    } else {
        (b.value(), a.value())
    };
    (lighter + 0.05) / (darker + 0.05)
}

/// Calculate WCAG 2.x contrast ratio between two decoded colors.
pub fn ratio(a: Rgb, b: Rgb) -> f64 {
    luminance_ratio(relative_luminance(a), relative_luminance(b))
}

/// Contrast ratio between two hex colors. Both are validated before any math runs.
pub fn contrast_ratio(hex1: &str, hex2: &str) -> Result<f64> {
    let a = hex::decode(hex1)?;
    let b = hex::decode(hex2)?;
    Ok(ratio(a, b))
}

/// Determine pass/fail for the normal-text thresholds.
pub fn evaluate(ratio: f64) -> ContrastVerdict {
    ContrastVerdict {
        ratio,
        passes_aa: ratio >= AA_THRESHOLD,
        passes_aaa: ratio >= AAA_THRESHOLD,
    }
}

/// Decode, measure and evaluate a foreground/background pair.
pub fn contrast(foreground: &str, background: &str) -> Result<ContrastVerdict> {
    contrast_ratio(foreground, background).map(evaluate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SAMPLES: &[&str] = &[
        "#000000", "#ffffff", "#777777", "#888888", "#767676", "#ff0000", "#00ff00", "#0000ff",
        "#1e293b", "#09090b", "#a1a1aa", "#f4f4f5", "#0a0a0a", "#fedcba",
    ];

    #[test]
    fn black_on_white_is_21() {
        let verdict = contrast("#000000", "#ffffff").unwrap();
        assert!((verdict.ratio - 21.0).abs() < 1e-9);
        assert_eq!(verdict.formatted_ratio(), "21.00");
        assert!(verdict.passes_aa);
        assert!(verdict.passes_aaa);
    }

    #[test]
    fn adjacent_grays_fail_both() {
        let verdict = contrast("#777777", "#888888").unwrap();
        assert!(verdict.ratio < 1.5, "got {}", verdict.ratio);
        assert!(!verdict.passes_aa);
        assert!(!verdict.passes_aaa);
    }

    #[test]
    fn gray_on_white() {
        // colord: 4.54
        let ratio = contrast_ratio("#767676", "#ffffff").unwrap();
        assert!((ratio - 4.54).abs() < 0.01);
    }

    #[test]
    fn slate_on_white() {
        // colord: 14.62
        let ratio = contrast_ratio("#1e293b", "#ffffff").unwrap();
        assert!((ratio - 14.62).abs() < 0.1);
    }

    #[test]
    fn symmetric_for_all_samples() {
        for a in SAMPLES {
            for b in SAMPLES {
                let ab = contrast_ratio(a, b).unwrap();
                let ba = contrast_ratio(b, a).unwrap();
                assert_eq!(ab, ba, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn identity_and_lower_bound() {
        for a in SAMPLES {
            assert_eq!(contrast_ratio(a, a).unwrap(), 1.0, "{a}");
            for b in SAMPLES {
                assert!(contrast_ratio(a, b).unwrap() >= 1.0, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn aa_boundary_is_inclusive() {
        assert!(evaluate(4.5).passes_aa);
        assert!(!evaluate(4.5).passes_aaa);
        assert!(!evaluate(4.4999).passes_aa);
        assert!(!evaluate(4.5 - f64::EPSILON * 4.0).passes_aa);
    }

    #[test]
    fn aaa_boundary_is_inclusive() {
        let at = evaluate(7.0);
        assert!(at.passes_aa);
        assert!(at.passes_aaa);
        let below = evaluate(6.9999);
        assert!(below.passes_aa);
        assert!(!below.passes_aaa);
    }

    #[test]
    fn malformed_input_rejected() {
        assert!(matches!(contrast("#12", "#ffffff"), Err(Error::InvalidColorFormat(s)) if s == "#12"));
        assert!(matches!(contrast("#000000", "zzzzzz"), Err(Error::InvalidColorFormat(s)) if s == "zzzzzz"));
    }
}
