use napi_derive::napi;

use crate::analysis::{AnalysisResult, PixelContrast, TextRegion};
use crate::config::AnalyzerConfig;
use crate::math::ContrastVerdict;

/// WCAG verdict for a color pair, as returned to JS
#[napi(object)]
#[derive(Debug, Clone)]
pub struct ContrastVerdictJs {
    pub ratio: f64,
    /// Ratio rendered to 2 decimals, e.g. "21.00"
    pub ratio_text: String,
    pub passes_aa: bool,
    pub passes_aaa: bool,
}

impl From<ContrastVerdict> for ContrastVerdictJs {
    fn from(verdict: ContrastVerdict) -> Self {
        Self {
            ratio: verdict.ratio,
            ratio_text: verdict.formatted_ratio(),
            passes_aa: verdict.passes_aa,
            passes_aaa: verdict.passes_aaa,
        }
    }
}

/// Per-session overrides on top of the environment configuration
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfigJs {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u32>,
    pub report_file_name: Option<String>,
    /// Append the live checker pair to exported reports
    pub include_live_checker: Option<bool>,
}

impl AnalyzerConfigJs {
    pub fn apply(&self, mut base: AnalyzerConfig) -> AnalyzerConfig {
        if let Some(endpoint) = &self.endpoint {
            base.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            base.timeout_secs = u64::from(timeout);
        }
        if let Some(name) = &self.report_file_name {
            base.report_file_name = name.clone();
        }
        base
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PixelContrastJs {
    pub pixel_1: Vec<u32>,
    pub pixel_2: Vec<u32>,
    pub ratio: f64,
    pub passes_wcag: bool,
}

impl From<&PixelContrast> for PixelContrastJs {
    fn from(contrast: &PixelContrast) -> Self {
        Self {
            pixel_1: contrast.pixel_1.iter().map(|&c| u32::from(c)).collect(),
            pixel_2: contrast.pixel_2.iter().map(|&c| u32::from(c)).collect(),
            ratio: contrast.ratio,
            passes_wcag: contrast.passes_wcag,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct TextRegionJs {
    pub text: String,
    pub ratio: f64,
    pub passes_wcag: bool,
}

impl From<&TextRegion> for TextRegionJs {
    fn from(region: &TextRegion) -> Self {
        Self {
            text: region.text.clone(),
            ratio: region.ratio,
            passes_wcag: region.passes_wcag,
        }
    }
}

/// Analysis result flattened for display; the simulated image is a data URI
#[napi(object)]
#[derive(Debug, Clone)]
pub struct AnalysisResultJs {
    pub message: String,
    pub simulation: String,
    pub pixel_contrast: PixelContrastJs,
    pub text_regions: Vec<TextRegionJs>,
    pub simulated_image: Option<String>,
}

impl From<&AnalysisResult> for AnalysisResultJs {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            message: result.message.clone(),
            simulation: result.simulation_type.to_string(),
            pixel_contrast: PixelContrastJs::from(&result.pixel_contrast),
            text_regions: result.text_regions.iter().map(TextRegionJs::from).collect(),
            simulated_image: result.simulated_image_data_uri(),
        }
    }
}
