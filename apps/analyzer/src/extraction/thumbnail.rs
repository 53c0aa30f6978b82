//! First-page preview rendering.
//!
//! Page 1 is rendered by pdfium at 2× its size and encoded as a PNG data URI.
//! When the pdfium library cannot be loaded, the page is approximated instead:
//! the real MediaBox size at 2×, with the extracted text laid out as grey
//! glyph blocks in reading order.

use std::io::Cursor;
use std::sync::Once;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use lopdf::{Dictionary, Document, Object};
use pdfium_render::prelude::*;
use tracing::warn;

use super::ExtractionError;

pub const THUMBNAIL_SCALE: f32 = 2.0;
const DATA_URI_PREFIX: &str = "data:image/png;base64,";
const PDFIUM_LIB_DIR: &str = "./lib/";

/// US Letter in points, used when no MediaBox is found.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);
/// Upper bound on either canvas side, in pixels.
const MAX_CANVAS_SIDE: u32 = 4096;
const MAX_PARENT_DEPTH: usize = 32;

// Layout preview metrics, in points.
const MARGIN_PT: f32 = 72.0;
const LINE_HEIGHT_PT: f32 = 14.0;
const GLYPH_ADVANCE_PT: f32 = 6.0;
const GLYPH_HEIGHT_PT: f32 = 8.0;

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([96, 96, 96]);

static PDFIUM_MISSING: Once = Once::new();

/// Renders page 1 and returns it as a PNG data URI.
///
/// `page_text` is only used by the layout preview fallback.
pub fn render_first_page(pdf_bytes: &[u8], page_text: &str) -> Result<String, ExtractionError> {
    let raster = match bind_pdfium() {
        Ok(pdfium) => render_with_pdfium(&pdfium, pdf_bytes)?,
        Err(e) => {
            PDFIUM_MISSING.call_once(|| {
                warn!("pdfium library unavailable ({e}); thumbnails fall back to a layout preview");
            });
            let (width_pt, height_pt) = first_page_size(pdf_bytes)?;
            DynamicImage::ImageRgb8(layout_preview(width_pt, height_pt, page_text))
        }
    };
    encode_png_data_uri(raster)
}

/// Decodes a thumbnail produced by [`render_first_page`] back to PNG bytes.
pub fn decode_png_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(payload).ok()
}

/// Fresh binding per call: a bundled library under `./lib/` wins over the system one.
fn bind_pdfium() -> Result<Pdfium, PdfiumError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
        PDFIUM_LIB_DIR,
    ))
    .or_else(|_| Pdfium::bind_to_system_library())?;
    Ok(Pdfium::new(bindings))
}

fn render_with_pdfium(pdfium: &Pdfium, pdf_bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;
    let page = document
        .pages()
        .first()
        .map_err(|_| ExtractionError::NoPages)?;

    let config = PdfRenderConfig::new().scale_page_by_factor(THUMBNAIL_SCALE);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| ExtractionError::Render(e.to_string()))?;

    RgbaImage::from_raw(
        bitmap.width() as u32,
        bitmap.height() as u32,
        bitmap.as_rgba_bytes(),
    )
    .map(DynamicImage::ImageRgba8)
    .ok_or_else(|| ExtractionError::Render("bitmap size does not match its pixel data".to_string()))
}

fn first_page_size(pdf_bytes: &[u8]) -> Result<(f32, f32), ExtractionError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| ExtractionError::Parse(e.to_string()))?;
    let pages = doc.get_pages();
    let page_id = *pages.values().next().ok_or(ExtractionError::NoPages)?;

    let mut dict = doc
        .get_dictionary(page_id)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    // MediaBox is inheritable: walk up the page tree until one is found.
    for _ in 0..MAX_PARENT_DEPTH {
        if let Some(size) = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| media_box_size(&doc, obj))
        {
            return Ok(size);
        }
        match parent_of(&doc, dict) {
            Some(parent) => dict = parent,
            None => break,
        }
    }

    Ok(DEFAULT_PAGE_SIZE)
}

fn parent_of<'a>(doc: &'a Document, dict: &Dictionary) -> Option<&'a Dictionary> {
    let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    doc.get_dictionary(parent_id).ok()
}

fn media_box_size(doc: &Document, obj: &Object) -> Option<(f32, f32)> {
    let obj = resolve(doc, obj)?;
    let coords = obj.as_array().ok()?;
    if coords.len() < 4 {
        return None;
    }
    let n: Vec<f32> = coords
        .iter()
        .take(4)
        .map(|c| resolve(doc, c).and_then(object_to_float))
        .collect::<Option<_>>()?;

    let width = (n[2] - n[0]).abs();
    let height = (n[3] - n[1]).abs();
    (width > 0.0 && height > 0.0).then_some((width, height))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn object_to_float(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

fn canvas_side(points: f32) -> u32 {
    ((points * THUMBNAIL_SCALE).round() as u32).clamp(1, MAX_CANVAS_SIDE)
}

fn layout_preview(width_pt: f32, height_pt: f32, page_text: &str) -> RgbImage {
    let width = canvas_side(width_pt);
    let height = canvas_side(height_pt);
    let mut canvas = RgbImage::from_pixel(width, height, PAPER);

    let margin = MARGIN_PT * THUMBNAIL_SCALE;
    let line_height = LINE_HEIGHT_PT * THUMBNAIL_SCALE;
    let advance = GLYPH_ADVANCE_PT * THUMBNAIL_SCALE;
    let glyph_height = GLYPH_HEIGHT_PT * THUMBNAIL_SCALE;

    let usable_width = width as f32 - 2.0 * margin;
    if usable_width < advance {
        return canvas;
    }
    let columns = (usable_width / advance).floor() as usize;
    let bottom = height as f32 - margin;

    let mut y = margin;
    'lines: for line in page_text.lines() {
        let chars: Vec<char> = line.trim_end().chars().collect();
        // Blank lines still advance, so paragraph gaps survive.
        let rows: Vec<&[char]> = if chars.is_empty() {
            vec![&chars[..]]
        } else {
            chars.chunks(columns).collect()
        };

        for row in rows {
            if y + glyph_height > bottom {
                break 'lines;
            }
            for (col, ch) in row.iter().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x = margin + col as f32 * advance;
                fill_rect(&mut canvas, x, y, advance - THUMBNAIL_SCALE, glyph_height);
            }
            y += line_height;
        }
    }

    canvas
}

fn fill_rect(canvas: &mut RgbImage, x: f32, y: f32, w: f32, h: f32) {
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).max(0.0) as u32).min(canvas.width());
    let y1 = ((y + h).max(0.0) as u32).min(canvas.height());
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, INK);
        }
    }
}

fn encode_png_data_uri(raster: DynamicImage) -> Result<String, ExtractionError> {
    let mut png = Vec::new();
    raster
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ExtractionError::Render(e.to_string()))?;
    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&png)))
}
