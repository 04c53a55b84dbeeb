//! PDF sink for [`ReportDocument`], built with `lopdf`.
//!
//! Coordinates in the document model are mm from the top-left corner of an A4
//! page; PDF user space is points from the bottom-left, so everything passes
//! through [`to_points`] / [`from_top`] here.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{info, warn};

use super::{ImagePage, LineStyle, Page, ReportDocument, LEFT_MARGIN_MM};
use crate::error::{Error, Result};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Fixed display box every embedded image is scaled into.
const IMAGE_BOX_X_MM: f32 = 20.0;
const IMAGE_BOX_Y_MM: f32 = 30.0;
const IMAGE_BOX_WIDTH_MM: f32 = 160.0;
const IMAGE_BOX_HEIGHT_MM: f32 = 120.0;
const IMAGE_HEADING_Y_MM: f32 = 20.0;

const FONT_NAME: &str = "F1";

fn to_points(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// y offset in mm from the top edge -> PDF y in points.
fn from_top(y_mm: f32) -> f32 {
    to_points(PAGE_HEIGHT_MM - y_mm)
}

fn render_error(err: impl std::fmt::Display) -> Error {
    Error::Render(err.to_string())
}

/// Encode text for the WinAnsi-encoded base font. Characters the encoding
/// has no code for become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => b'?',
    }
}

/// 8-bit DeviceRGB image XObject. An alpha channel goes into a DeviceGray
/// soft mask added to `doc`.
fn image_xobject(doc: &mut Document, decoded: &DynamicImage) -> Stream {
    let width = i64::from(decoded.width());
    let height = i64::from(decoded.height());

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|px| px.0[3]).collect();
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        dict.set("SMask", mask_id);
    }

    Stream::new(dict, decoded.to_rgb8().into_raw())
}

fn text_ops(ops: &mut Vec<Operation>, text: &str, style: LineStyle, y_mm: f32) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![FONT_NAME.into(), style.font_size().into()],
    ));
    ops.push(Operation::new(
        "Td",
        vec![to_points(LEFT_MARGIN_MM).into(), from_top(y_mm).into()],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Serialize the report to PDF bytes.
///
/// An image that cannot be decoded leaves its page with only the heading; the
/// rest of the report is still produced.
pub fn render(report: &ReportDocument) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    let mut image_pages: Vec<(ObjectId, &ImagePage)> = Vec::new();

    for page in report.pages() {
        let mut operations = Vec::new();
        match page {
            Page::Text(text) => {
                for line in &text.lines {
                    text_ops(&mut operations, &line.text, line.style, line.y_mm);
                }
            }
            Page::Image(image) => {
                text_ops(&mut operations, image.kind.heading(), LineStyle::Heading, IMAGE_HEADING_Y_MM);
            }
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(render_error)?,
        ));
        // Per-page resources; insert_image registers XObjects here.
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_NAME => font_id,
            },
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());

        if let Page::Image(image) = page {
            image_pages.push((page_id, image));
        }
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        to_points(PAGE_WIDTH_MM).into(),
        to_points(PAGE_HEIGHT_MM).into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    for (page_id, upload) in image_pages {
        let decoded = match image::load_from_memory(&upload.bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(kind = ?upload.kind, error = %err, "image could not be decoded, page left without it");
                continue;
            }
        };
        let stream = image_xobject(&mut doc, &decoded);
        doc.insert_image(
            page_id,
            stream,
            (
                to_points(IMAGE_BOX_X_MM),
                from_top(IMAGE_BOX_Y_MM + IMAGE_BOX_HEIGHT_MM),
            ),
            (to_points(IMAGE_BOX_WIDTH_MM), to_points(IMAGE_BOX_HEIGHT_MM)),
        )
        .map_err(render_error)?;
    }

    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(render_error)?;
    Ok(bytes)
}

/// Render and write the report to `dir/file_name`, returning the full path.
pub async fn save(report: &ReportDocument, dir: &Path, file_name: &str) -> Result<PathBuf> {
    let bytes = render(report)?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, &bytes).await.map_err(Error::ReportWrite)?;
    info!(path = %path.display(), bytes = bytes.len(), "report saved");
    Ok(path)
}
