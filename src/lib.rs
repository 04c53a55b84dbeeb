#[macro_use]
extern crate napi_derive;

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod math;
pub mod report;
pub mod types;

use analysis::VisionType;
use types::ContrastVerdictJs;

#[napi]
pub fn health_check() -> String {
    "color-contrast-native ok".to_string()
}

/// Install the tracing subscriber. Returns false if one was already installed.
#[napi]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init(filter.as_deref())
}

/// WCAG contrast of a foreground/background pair of `#rrggbb` colors.
#[napi]
pub fn check_contrast(foreground: String, background: String) -> napi::Result<ContrastVerdictJs> {
    Ok(math::contrast(&foreground, &background)?.into())
}

#[napi]
pub fn normalize_color(hex: String) -> napi::Result<String> {
    Ok(math::hex::normalize(&hex)?)
}

/// Vision types accepted by the analysis service, in display order.
#[napi]
pub fn vision_types() -> Vec<String> {
    VisionType::ALL.iter().map(|v| v.to_string()).collect()
}
