use tracing::debug;

use super::hex::HexColor;
use super::wcag::{self, ContrastVerdict};
use crate::error::Result;

/// Foreground/background pair behind the live contrast checker.
///
/// Inputs are validated on the way in, so reading the verdict never fails.
/// The verdict is recomputed on every call; it is O(1) and not cached.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveContrastChecker {
    foreground: HexColor,
    background: HexColor,
}

impl Default for LiveContrastChecker {
    fn default() -> Self {
        Self {
            foreground: HexColor::black(),
            background: HexColor::white(),
        }
    }
}

impl LiveContrastChecker {
    pub fn new(foreground: &str, background: &str) -> Result<Self> {
        Ok(Self {
            foreground: HexColor::parse(foreground)?,
            background: HexColor::parse(background)?,
        })
    }

    /// Replace the foreground. On error the previous color is kept.
    pub fn set_foreground(&mut self, hex: &str) -> Result<()> {
        self.foreground = HexColor::parse(hex)?;
        debug!(foreground = %self.foreground, "foreground changed");
        Ok(())
    }

    /// Replace the background. On error the previous color is kept.
    pub fn set_background(&mut self, hex: &str) -> Result<()> {
        self.background = HexColor::parse(hex)?;
        debug!(background = %self.background, "background changed");
        Ok(())
    }

    pub fn foreground(&self) -> &HexColor {
        &self.foreground
    }

    pub fn background(&self) -> &HexColor {
        &self.background
    }

    pub fn verdict(&self) -> ContrastVerdict {
        wcag::evaluate(wcag::ratio(self.foreground.rgb(), self.background.rgb()))
    }

    /// One-line summary, e.g. `#000000 on #ffffff: 21.00:1 (AA Pass, AAA Pass)`.
    pub fn summary(&self) -> String {
        let verdict = self.verdict();
        format!(
            "{} on {}: {}:1 (AA {}, AAA {})",
            self.foreground,
            self.background,
            verdict.formatted_ratio(),
            pass_label(verdict.passes_aa),
            pass_label(verdict.passes_aaa),
        )
    }
}

fn pass_label(pass: bool) -> &'static str {
    if pass {
        "Pass"
    } else {
        "Fail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_are_black_on_white() {
        let checker = LiveContrastChecker::default();
        assert_eq!(checker.foreground().hex(), "#000000");
        assert_eq!(checker.background().hex(), "#ffffff");
        let verdict = checker.verdict();
        assert_eq!(verdict.formatted_ratio(), "21.00");
        assert!(verdict.passes_aa && verdict.passes_aaa);
    }

    #[test]
    fn verdict_tracks_every_change() {
        let mut checker = LiveContrastChecker::default();
        checker.set_foreground("#777777").unwrap();
        checker.set_background("#888888").unwrap();
        let verdict = checker.verdict();
        assert!(!verdict.passes_aa);
        assert!(!verdict.passes_aaa);

        checker.set_background("#FFFFFF").unwrap();
        assert!(checker.verdict().passes_aa);
    }

    #[test]
    fn invalid_input_keeps_previous_color() {
        let mut checker = LiveContrastChecker::default();
        let err = checker.set_foreground("#12").unwrap_err();
        assert!(matches!(err, Error::InvalidColorFormat(_)));
        assert_eq!(checker.foreground().hex(), "#000000");
    }

    #[test]
    fn summary_line() {
        let checker = LiveContrastChecker::new("#000000", "#ffffff").unwrap();
        assert_eq!(checker.summary(), "#000000 on #ffffff: 21.00:1 (AA Pass, AAA Pass)");
    }
}
