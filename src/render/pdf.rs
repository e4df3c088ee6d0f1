//! PDF encoding via printpdf

use printpdf::{Mm, PdfDocument};
use thiserror::Error;
use tracing::warn;
use ttf_parser::Face;

use crate::render::layout::{layout, Page};

/// A4 in points
const PAGE_WIDTH_PT: f32 = 595.28;
const PAGE_HEIGHT_PT: f32 = 841.89;

const FONT_SIZE_PT: f32 = 12.0;

/// DejaVu Sans: Latin, Greek and Cyrillic coverage, embedded in every document
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Drawn in place of characters the font has no glyph for
const MISSING_GLYPH: char = '?';

#[derive(Debug, Error)]
#[error("PDF encoding failed: {0}")]
pub struct RenderError(String);

impl From<printpdf::Error> for RenderError {
    fn from(err: printpdf::Error) -> Self {
        Self(err.to_string())
    }
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Render text as a paginated PDF document
pub fn render(text: &str) -> Result<Vec<u8>, RenderError> {
    encode(&layout(text))
}

fn encode(pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let face = Face::parse(FONT_BYTES, 0)
        .map_err(|e| RenderError(format!("embedded font is unreadable: {e}")))?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Meeting summary",
        mm(PAGE_WIDTH_PT),
        mm(PAGE_HEIGHT_PT),
        "Text",
    );
    let font = doc.add_external_font(FONT_BYTES)?;

    let mut replaced = 0;
    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), "Text")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let (text, missing) = with_available_glyphs(&face, &line.text);
            replaced += missing;
            layer.use_text(text, FONT_SIZE_PT, mm(line.x), mm(line.y), &font);
        }
    }

    if replaced > 0 {
        warn!(
            "{} characters have no glyph in the PDF font and were drawn as '{}'",
            replaced, MISSING_GLYPH
        );
    }

    Ok(doc.save_to_bytes()?)
}

/// printpdf skips characters without a glyph, so substitute them up front.
/// Returns the drawable text and the number of substituted characters.
fn with_available_glyphs(face: &Face<'_>, text: &str) -> (String, usize) {
    let mut missing = 0;
    let drawable = text
        .chars()
        .map(|ch| match ch {
            '\t' => ' ',
            ch if face.glyph_index(ch).is_some() => ch,
            _ => {
                missing += 1;
                MISSING_GLYPH
            }
        })
        .collect();
    (drawable, missing)
}
