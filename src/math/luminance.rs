use super::hex::Rgb;

/// Linear-segment cutoff used by WCAG 2.x for the sRGB transfer curve.
const LINEAR_CUTOFF: f64 = 0.03928;

/// Relative luminance in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LuminanceValue(f64);

impl LuminanceValue {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Convert a normalized sRGB channel to linear light.
/// c <= 0.03928: c/12.92, else ((c+0.055)/1.055)^2.4
fn srgb_to_linear(c: f64) -> f64 {
    if c <= LINEAR_CUTOFF {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Calculate relative luminance per WCAG 2.x.
/// L = 0.2126 * R + 0.7152 * G + 0.0722 * B (linear channels)
pub fn relative_luminance(rgb: Rgb) -> LuminanceValue {
    LuminanceValue(
        0.2126 * srgb_to_linear(rgb.r) + 0.7152 * srgb_to_linear(rgb.g) + 0.0722 * srgb_to_linear(rgb.b),
    )
}

/// Same model applied to a 0-255 pixel triple, as reported by the analysis service.
pub fn relative_luminance_rgb8(pixel: [u8; 3]) -> LuminanceValue {
    relative_luminance(Rgb::from_rgb8(pixel))
}
