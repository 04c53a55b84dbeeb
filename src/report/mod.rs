//! Report composition.
//!
//! A report is composed in two steps so the original image can be read
//! without holding on to the session:
//!   1. [`draft`] reads the session once and lays out the textual pages.
//!   2. [`ReportDraft::finish`] (or [`ReportDraft::acquire`]) appends the image pages.
//!
//! The simulated image is captured in step 1, so a report only ever embeds
//! the simulated image of the result that was current when it was drafted.

pub mod pdf;

use tracing::warn;

use crate::analysis::{AnalysisResult, SelectedImage, Session};

pub const REPORT_TITLE: &str = "Color Accessibility Analyzer Report";

/// Left margin of every text line, in mm.
pub const LEFT_MARGIN_MM: f32 = 20.0;
/// Lines below this y coordinate (mm from the top) continue on a new page.
const PAGE_BOTTOM_MM: f32 = 280.0;
const CONTINUATION_TOP_MM: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

impl LineStyle {
    pub fn font_size(self) -> f32 {
        match self {
            LineStyle::Title => 16.0,
            LineStyle::Heading => 14.0,
            LineStyle::Body => 12.0,
        }
    }
}

/// One positioned line of text. `y_mm` is measured from the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub style: LineStyle,
    pub y_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPage {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Original,
    Simulated,
}

impl ImageKind {
    pub fn heading(self) -> &'static str {
        match self {
            ImageKind::Original => "Original Image",
            ImageKind::Simulated => "Simulated Image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePage {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Text(TextPage),
    Image(ImagePage),
}

/// Ordered pages of one exported report. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// All text lines across the textual pages, in reading order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .filter_map(|page| match page {
                Page::Text(text) => Some(text),
                Page::Image(_) => None,
            })
            .flat_map(|text| text.lines.iter().map(|line| line.text.as_str()))
    }

    pub fn image_kinds(&self) -> Vec<ImageKind> {
        self.pages
            .iter()
            .filter_map(|page| match page {
                Page::Image(image) => Some(image.kind),
                Page::Text(_) => None,
            })
            .collect()
    }
}

/// Opt-in extras for the summary page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Append the live contrast checker's current pair after the analysis section.
    pub include_live_checker: bool,
}

/// Textual pages plus what is still needed to attach the image pages.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    text_pages: Vec<TextPage>,
    original: Option<SelectedImage>,
    simulated: Option<Vec<u8>>,
}

/// Lay out the textual pages from the session. Does not mutate the session.
pub fn draft(session: &Session, options: ReportOptions) -> ReportDraft {
    let mut layout = Layout::new();

    layout.push(REPORT_TITLE, LineStyle::Title, 20.0);
    layout.push(format!("Vision Type: {}", session.vision_type()), LineStyle::Body, 35.0);
    layout.push(format!("Image Name: {}", session.image_name()), LineStyle::Body, 45.0);
    let elapsed = match session.elapsed_seconds() {
        Some(seconds) => format!("Analysis Time: {seconds:.2} seconds"),
        None => "Analysis Time: not available".to_string(),
    };
    layout.push(elapsed, LineStyle::Body, 55.0);

    let result = session.current_result();
    if let Some(result) = result {
        push_analysis(&mut layout, result);
    }

    if options.include_live_checker {
        layout.advance(12.0);
        layout.push("Live Contrast Checker:", LineStyle::Body, layout.y);
        layout.advance(10.0);
        layout.push(session.checker().summary(), LineStyle::Body, layout.y);
    }

    ReportDraft {
        text_pages: layout.finish(),
        original: session.selected_image().cloned(),
        simulated: result
            .filter(|r| r.has_simulated_image())
            .map(|r| r.simulated_image.clone()),
    }
}

fn push_analysis(layout: &mut Layout, result: &AnalysisResult) {
    let contrast = &result.pixel_contrast;
    layout.push(format!("Pixel 1 RGB: {}", rgb_triple(contrast.pixel_1)), LineStyle::Body, 70.0);
    layout.push(format!("Pixel 2 RGB: {}", rgb_triple(contrast.pixel_2)), LineStyle::Body, 80.0);
    layout.push(format!("Contrast Ratio: {}", contrast.ratio), LineStyle::Body, 90.0);
    layout.push(
        format!("WCAG Pass: {}", if contrast.passes_wcag { "Yes" } else { "No" }),
        LineStyle::Body,
        100.0,
    );

    if result.text_regions.is_empty() {
        return;
    }

    layout.push("Text Readability:", LineStyle::Body, 120.0);
    layout.advance(10.0);
    for region in &result.text_regions {
        layout.push(
            format!(
                "\"{}\" - Contrast: {} ({})",
                region.text,
                region.ratio,
                if region.passes_wcag { "Pass" } else { "Fail" }
            ),
            LineStyle::Body,
            layout.y,
        );
        layout.advance(8.0);
    }
}

/// `[r,g,b]`, matching the JSON rendering of the pixel arrays.
fn rgb_triple([r, g, b]: [u8; 3]) -> String {
    format!("[{r},{g},{b}]")
}

/// Cursor over textual pages; breaks to a new page past the bottom margin.
struct Layout {
    pages: Vec<TextPage>,
    current: TextPage,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: TextPage::default(),
            y: 0.0,
        }
    }

    fn push(&mut self, text: impl Into<String>, style: LineStyle, y_mm: f32) {
        self.y = y_mm;
        if self.y > PAGE_BOTTOM_MM {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = CONTINUATION_TOP_MM;
        }
        self.current.lines.push(TextLine {
            text: text.into(),
            style,
            y_mm: self.y,
        });
    }

    fn advance(&mut self, mm: f32) {
        self.y += mm;
    }

    fn finish(mut self) -> Vec<TextPage> {
        self.pages.push(self.current);
        self.pages
    }
}

impl ReportDraft {
    pub fn has_original(&self) -> bool {
        self.original.is_some()
    }

    /// Assemble the document. Image pages are added only when `original` bytes
    /// are present; the simulated page always follows the original one.
    pub fn finish(self, original: Option<Vec<u8>>) -> ReportDocument {
        let mut pages: Vec<Page> = self.text_pages.into_iter().map(Page::Text).collect();

        if let Some(bytes) = original {
            pages.push(Page::Image(ImagePage {
                kind: ImageKind::Original,
                bytes,
            }));
            if let Some(bytes) = self.simulated {
                pages.push(Page::Image(ImagePage {
                    kind: ImageKind::Simulated,
                    bytes,
                }));
            }
        }

        ReportDocument { pages }
    }

    /// Read the original image, then assemble. A failed read drops the image
    /// pages but never the textual summary.
    pub async fn acquire(self) -> ReportDocument {
        let original = match &self.original {
            Some(image) => match image.source.read().await {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    warn!(name = %image.name, error = %err, "exporting report without image pages");
                    None
                }
            },
            None => None,
        };
        self.finish(original)
    }
}

/// Compose a report from the session and already-read original image bytes.
pub fn compose(session: &Session, original: Option<Vec<u8>>, options: ReportOptions) -> ReportDocument {
    draft(session, options).finish(original)
}

/// Compose a report, reading the original image from the session's selection.
pub async fn export(session: &Session, options: ReportOptions) -> ReportDocument {
    draft(session, options).acquire().await
}
