pub mod client;
pub mod session;
mod wire;

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use client::{AnalysisService, HttpAnalysisService};
pub use session::{Attempt, Completion, ImageSource, SelectedImage, Session, SessionState, SubmissionTicket};

/// Color-vision deficiency simulated by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionType {
    /// Red-blind
    #[default]
    Protanopia,
    /// Green-blind
    Deuteranopia,
    /// Blue-yellow
    Tritanopia,
    /// No color
    Achromatopsia,
}

impl VisionType {
    pub const ALL: [VisionType; 4] = [
        VisionType::Protanopia,
        VisionType::Deuteranopia,
        VisionType::Tritanopia,
        VisionType::Achromatopsia,
    ];

    /// Wire name, as sent in the `vision_type` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            VisionType::Protanopia => "protanopia",
            VisionType::Deuteranopia => "deuteranopia",
            VisionType::Tritanopia => "tritanopia",
            VisionType::Achromatopsia => "achromatopsia",
        }
    }
}

impl fmt::Display for VisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidVisionType(s.to_string()))
    }
}

/// Contrast between the two probe pixels the service samples from the image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelContrast {
    pub pixel_1: [u8; 3],
    pub pixel_2: [u8; 3],
    pub ratio: f64,
    pub passes_wcag: bool,
}

/// Readability of one text region detected in the image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub text: String,
    pub ratio: f64,
    pub passes_wcag: bool,
}

/// Result of one remote analysis. Replaced wholesale on each new submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub message: String,
    pub simulation_type: VisionType,
    pub pixel_contrast: PixelContrast,
    /// Kept in the order the service reported them.
    pub text_regions: Vec<TextRegion>,
    /// Decoded PNG bytes of the simulated image.
    pub simulated_image: Vec<u8>,
}

impl AnalysisResult {
    pub fn has_simulated_image(&self) -> bool {
        !self.simulated_image.is_empty()
    }

    /// `data:image/png;base64,...` form of the simulated image, ready for an `<img>` tag.
    pub fn simulated_image_data_uri(&self) -> Option<String> {
        if !self.has_simulated_image() {
            return None;
        }
        Some(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.simulated_image)
        ))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn result_with_regions(regions: &[(&str, f64, bool)]) -> AnalysisResult {
        AnalysisResult {
            message: "Image processed successfully.".to_string(),
            simulation_type: VisionType::Protanopia,
            pixel_contrast: PixelContrast {
                pixel_1: [12, 34, 56],
                pixel_2: [250, 250, 250],
                ratio: 14.2,
                passes_wcag: true,
            },
            text_regions: regions
                .iter()
                .map(|(text, ratio, passes_wcag)| TextRegion {
                    text: text.to_string(),
                    ratio: *ratio,
                    passes_wcag: *passes_wcag,
                })
                .collect(),
            simulated_image: vec![0x89, b'P', b'N', b'G'],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vision_type_defaults_to_protanopia() {
        assert_eq!(VisionType::default(), VisionType::Protanopia);
    }

    #[test]
    fn vision_type_parses_wire_names() {
        for v in VisionType::ALL {
            assert_eq!(v.as_str().parse::<VisionType>().unwrap(), v);
        }
        assert_eq!("Tritanopia".parse::<VisionType>().unwrap(), VisionType::Tritanopia);
    }

    #[test]
    fn unknown_vision_type_rejected() {
        assert!(matches!(
            "monochrome".parse::<VisionType>(),
            Err(Error::InvalidVisionType(_))
        ));
    }

    #[test]
    fn data_uri_has_png_prefix() {
        let result = fixtures::result_with_regions(&[]);
        let uri = result.simulated_image_data_uri().unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn no_data_uri_without_image() {
        let mut result = fixtures::result_with_regions(&[]);
        result.simulated_image.clear();
        assert!(result.simulated_image_data_uri().is_none());
    }
}
