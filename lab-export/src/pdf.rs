//! Session export to PDF.
//!
//! Page one carries the title block and the word-wrapped concept text
//! (continuing onto extra pages when it overflows). Every gallery entry
//! then gets its own page with a heading, a rule and the image scaled to
//! the content width at 16:9.

use chrono::{DateTime, Utc};
use lab_core::{GalleryEntry, ImageData};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use tracing::{debug, error};

use crate::error::{ExportError, ExportResult};

const TITLE_FONT_SIZE: f32 = 24.0;
const SUBTITLE_FONT_SIZE: f32 = 10.0;
const BODY_FONT_SIZE: f32 = 11.0;
const HEADING_FONT_SIZE: f32 = 14.0;

/// Vertical advance between body lines.
const LINE_HEIGHT_MM: f32 = 5.5;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH_EM: f32 = 0.5;
const MM_PER_POINT: f32 = 25.4 / 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Configuration for session export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Page width in millimetres (default: A4 portrait, 210).
    pub page_width_mm: f32,
    /// Page height in millimetres (default: A4 portrait, 297).
    pub page_height_mm: f32,
    /// Margin on every side in millimetres.
    pub margin_mm: f32,
    /// Title printed on the first page and stored as document title.
    pub title: String,
    /// Resolution images are assumed to have before scaling.
    pub image_dpi: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            title: "GEMINI DESIGN LAB".to_string(),
            image_dpi: 300.0,
        }
    }
}

/// A rendered document plus what went into it.
#[derive(Clone)]
pub struct ExportedDocument {
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Total page count.
    pub pages: usize,
    /// Images placed on their pages.
    pub images_embedded: usize,
    /// Images whose page was left blank because they failed to decode.
    pub images_failed: usize,
}

impl std::fmt::Debug for ExportedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedDocument")
            .field("bytes", &self.bytes.len())
            .field("pages", &self.pages)
            .field("images_embedded", &self.images_embedded)
            .field("images_failed", &self.images_failed)
            .finish()
    }
}

/// File name for an export taken at `at`.
#[must_use]
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("Gemini-Design-Project-{}.pdf", at.timestamp_millis())
}

/// Greedy word wrap at `max_chars` characters per line.
///
/// Newlines start a new paragraph; blank lines are kept. Words longer than
/// a line are split.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        lines.push(current);
    }
    lines
}

/// Drop characters the built-in PDF fonts cannot encode.
fn pdf_text(text: &str) -> String {
    text.chars()
        .filter(|c| u32::from(*c) <= 0xFF || "•–—‘’“”…€".contains(*c))
        .collect()
}

/// Exports a session's concept text and gallery to PDF.
pub struct SessionExporter {
    config: ExportConfig,
}

impl SessionExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Width available between the margins.
    #[must_use]
    pub fn content_width_mm(&self) -> f32 {
        self.config.page_width_mm - 2.0 * self.config.margin_mm
    }

    /// Render the document.
    ///
    /// An image that fails to decode is logged and its page keeps an empty
    /// image area; the rest of the document is still produced.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::ExportFailed`] if fonts cannot be registered or
    /// the document cannot be serialized.
    pub fn render(
        &self,
        text: &str,
        entries: &[GalleryEntry],
        exported_at: DateTime<Utc>,
    ) -> ExportResult<ExportedDocument> {
        let config = &self.config;
        let (doc, page, layer) = PdfDocument::new(
            config.title.as_str(),
            Mm(config.page_width_mm),
            Mm(config.page_height_mm),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::ExportFailed(format!("Font registration failed: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::ExportFailed(format!("Font registration failed: {e}")))?;

        let mut layer = doc.get_page(page).get_layer(layer);
        let mut pages = 1;

        layer.use_text(
            pdf_text(&config.title),
            TITLE_FONT_SIZE,
            Mm(config.margin_mm),
            self.from_top(30.0),
            &bold,
        );
        layer.use_text(
            pdf_text(&format!(
                "PROJECT EXPORT • {}",
                exported_at.format("%Y-%m-%d")
            )),
            SUBTITLE_FONT_SIZE,
            Mm(config.margin_mm),
            self.from_top(38.0),
            &regular,
        );
        self.draw_rule(&layer, 45.0);

        let mut y = 60.0;
        let bottom = config.page_height_mm - config.margin_mm;
        for line in wrap_text(&pdf_text(text), self.chars_per_line(BODY_FONT_SIZE)) {
            if y > bottom {
                layer = self.add_page(&doc);
                pages += 1;
                y = config.margin_mm + LINE_HEIGHT_MM;
            }
            if !line.is_empty() {
                layer.use_text(line, BODY_FONT_SIZE, Mm(config.margin_mm), self.from_top(y), &regular);
            }
            y += LINE_HEIGHT_MM;
        }

        let mut images_embedded = 0;
        let mut images_failed = 0;
        for (index, entry) in entries.iter().enumerate() {
            let layer = self.add_page(&doc);
            pages += 1;
            layer.use_text(
                format!("Visual Manifest Variation {}", index + 1),
                HEADING_FONT_SIZE,
                Mm(config.margin_mm),
                self.from_top(25.0),
                &bold,
            );
            self.draw_rule(&layer, 30.0);

            match self.place_image(&layer, &entry.image) {
                Ok(()) => images_embedded += 1,
                Err(e) => {
                    error!(entry = %entry.id, "Leaving image area blank: {e}");
                    images_failed += 1;
                }
            }
        }

        let bytes = doc
            .save_to_bytes()
            .map_err(|e| ExportError::ExportFailed(format!("PDF save failed: {e}")))?;
        debug!(pages, images_embedded, images_failed, size = bytes.len(), "Rendered PDF");

        Ok(ExportedDocument {
            bytes,
            pages,
            images_embedded,
            images_failed,
        })
    }

    fn add_page(&self, doc: &PdfDocumentReference) -> PdfLayerReference {
        let (page, layer) = doc.add_page(
            Mm(self.config.page_width_mm),
            Mm(self.config.page_height_mm),
            "Layer 1",
        );
        doc.get_page(page).get_layer(layer)
    }

    /// PDF coordinates grow upwards from the bottom edge.
    fn from_top(&self, y_mm: f32) -> Mm {
        Mm(self.config.page_height_mm - y_mm)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn chars_per_line(&self, font_size: f32) -> usize {
        let glyph_mm = font_size * MM_PER_POINT * AVG_GLYPH_WIDTH_EM;
        (self.content_width_mm() / glyph_mm).floor().max(1.0) as usize
    }

    fn draw_rule(&self, layer: &PdfLayerReference, y_mm: f32) {
        let y = self.from_top(y_mm);
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(self.config.margin_mm), y), false),
                (
                    Point::new(Mm(self.config.page_width_mm - self.config.margin_mm), y),
                    false,
                ),
            ],
            is_closed: false,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn place_image(&self, layer: &PdfLayerReference, image: &ImageData) -> ExportResult<()> {
        let decoded = printpdf::image_crate::load_from_memory(&image.bytes)
            .map_err(|e| ExportError::ImageDecode(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (width_px, height_px) = rgb.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(ExportError::ImageDecode("image has no pixels".to_string()));
        }

        let dpi = self.config.image_dpi;
        let natural_width_mm = width_px as f32 / dpi * MM_PER_INCH;
        let natural_height_mm = height_px as f32 / dpi * MM_PER_INCH;
        let target_width_mm = self.content_width_mm();
        let target_height_mm = target_width_mm * 9.0 / 16.0;

        let transform = ImageTransform {
            translate_x: Some(Mm(self.config.margin_mm)),
            translate_y: Some(self.from_top(40.0 + target_height_mm)),
            scale_x: Some(target_width_mm / natural_width_mm),
            scale_y: Some(target_height_mm / natural_height_mm),
            dpi: Some(dpi),
            ..Default::default()
        };

        let pdf_image =
            Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(rgb));
        pdf_image.add_to_layer(layer.clone(), transform);
        Ok(())
    }
}
