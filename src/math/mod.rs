pub mod checker;
pub mod hex;
pub mod luminance;
pub mod wcag;

pub use checker::LiveContrastChecker;
pub use hex::{HexColor, Rgb};
pub use luminance::{relative_luminance, LuminanceValue};
pub use wcag::{contrast, evaluate, ContrastVerdict};
