//! JSON shapes returned by the remote `/analyze` endpoint.
//!
//! Wire quirks stop here: `passes_wcag` arrives as the string `"True"`/`"False"`
//! on the pixel summary and as a real bool on text regions, and the simulated
//! image is base64 text. Everything past [`parse_response`] sees plain types.

use base64::Engine;
use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;

use super::{AnalysisResult, PixelContrast, TextRegion, VisionType};
use crate::error::{RequestFailure, Result};

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    message: String,
    simulation: VisionType,
    simulated_image: String,
    contrast_result: WireContrast,
    /// Older service builds omit this field entirely.
    #[serde(default)]
    text_readability: Vec<WireTextRegion>,
}

#[derive(Debug, Deserialize)]
struct WireContrast {
    pixel_1: [u8; 3],
    pixel_2: [u8; 3],
    contrast_ratio: f64,
    #[serde(deserialize_with = "wcag_flag")]
    passes_wcag: bool,
}

#[derive(Debug, Deserialize)]
struct WireTextRegion {
    text: String,
    contrast_ratio: f64,
    #[serde(deserialize_with = "wcag_flag")]
    passes_wcag: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WcagFlag {
    Bool(bool),
    Text(String),
}

fn wcag_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match WcagFlag::deserialize(deserializer)? {
        WcagFlag::Bool(flag) => Ok(flag),
        WcagFlag::Text(text) => match text.as_str() {
            "True" => Ok(true),
            "False" => Ok(false),
            other => Err(de::Error::invalid_value(
                Unexpected::Str(other),
                &"\"True\" or \"False\"",
            )),
        },
    }
}

impl AnalyzeResponse {
    fn into_result(self) -> Result<AnalysisResult> {
        let simulated_image = base64::engine::general_purpose::STANDARD
            .decode(self.simulated_image.trim())
            .map_err(|e| RequestFailure::Malformed(format!("simulated_image is not base64: {e}")))?;

        Ok(AnalysisResult {
            message: self.message,
            simulation_type: self.simulation,
            pixel_contrast: PixelContrast {
                pixel_1: self.contrast_result.pixel_1,
                pixel_2: self.contrast_result.pixel_2,
                ratio: self.contrast_result.contrast_ratio,
                passes_wcag: self.contrast_result.passes_wcag,
            },
            text_regions: self
                .text_readability
                .into_iter()
                .map(|r| TextRegion {
                    text: r.text,
                    ratio: r.contrast_ratio,
                    passes_wcag: r.passes_wcag,
                })
                .collect(),
            simulated_image,
        })
    }
}

/// Parse a response body into an [`AnalysisResult`].
pub(crate) fn parse_response(body: &[u8]) -> Result<AnalysisResult> {
    let response: AnalyzeResponse = serde_json::from_slice(body)
        .map_err(|e| RequestFailure::Malformed(e.to_string()))?;
    response.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "message": "Image processed successfully.",
            "simulation": "deuteranopia",
            "simulated_image": "iVBORw==",
            "contrast_result": {
                "pixel_1": [12, 34, 56],
                "pixel_2": [200, 210, 220],
                "contrast_ratio": 9.87,
                "passes_wcag": "True"
            },
            "text_readability": [
                {"text": "OK", "contrast_ratio": 5.2, "passes_wcag": true},
                {"text": "Warn", "contrast_ratio": 2.1, "passes_wcag": false}
            ]
        })
    }

    #[test]
    fn full_response_parsed() {
        let result = parse_response(&body(sample())).unwrap();
        assert_eq!(result.simulation_type, VisionType::Deuteranopia);
        assert_eq!(result.pixel_contrast.pixel_1, [12, 34, 56]);
        assert_eq!(result.pixel_contrast.ratio, 9.87);
        assert!(result.pixel_contrast.passes_wcag);
        assert_eq!(result.simulated_image, vec![0x89, b'P', b'N', b'G']);
        let texts: Vec<&str> = result.text_regions.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["OK", "Warn"]);
        assert!(!result.text_regions[1].passes_wcag);
    }

    #[test]
    fn false_string_normalized() {
        let mut value = sample();
        value["contrast_result"]["passes_wcag"] = json!("False");
        let result = parse_response(&body(value)).unwrap();
        assert!(!result.pixel_contrast.passes_wcag);
    }

    #[test]
    fn bool_flag_accepted_on_pixel_summary() {
        let mut value = sample();
        value["contrast_result"]["passes_wcag"] = json!(true);
        assert!(parse_response(&body(value)).unwrap().pixel_contrast.passes_wcag);
    }

    #[test]
    fn lowercase_string_flag_is_malformed() {
        let mut value = sample();
        value["contrast_result"]["passes_wcag"] = json!("true");
        let err = parse_response(&body(value)).unwrap_err();
        assert!(matches!(err, Error::AnalysisRequestFailed(RequestFailure::Malformed(_))));
    }

    #[test]
    fn missing_text_readability_defaults_empty() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("text_readability");
        let result = parse_response(&body(value)).unwrap();
        assert!(result.text_regions.is_empty());
    }

    #[test]
    fn bad_base64_is_malformed() {
        let mut value = sample();
        value["simulated_image"] = json!("not base64!");
        let err = parse_response(&body(value)).unwrap_err();
        assert!(matches!(err, Error::AnalysisRequestFailed(RequestFailure::Malformed(_))));
    }

    #[test]
    fn unknown_simulation_is_malformed() {
        let mut value = sample();
        value["simulation"] = json!("monochrome");
        assert!(parse_response(&body(value)).is_err());
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_response(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, Error::AnalysisRequestFailed(RequestFailure::Malformed(_))));
    }
}
