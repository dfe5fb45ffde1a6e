//! PDF export of a curriculum.
//!
//! Rendered fully in memory so concurrent downloads never share a file.

use chrono::Utc;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use thiserror::Error;

use crate::curriculum::models::Curriculum;

/// Suggested filename for the downloaded attachment.
pub const PDF_FILENAME: &str = "CurricuForge_Output.pdf";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LAYER_NAME: &str = "Layer 1";

const TITLE_PT: f32 = 20.0;
const HEADING_PT: f32 = 14.0;
const BODY_PT: f32 = 11.0;
const FOOTER_PT: f32 = 8.0;

/// 1pt = 0.3528mm.
const MM_PER_PT: f32 = 0.3528;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.5;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),

    #[error("PDF serialization error: {0}")]
    Save(String),
}

/// Top-down text cursor that starts a new A4 page when it reaches the bottom margin.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(format!("{e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(format!("{e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    /// Writes one line at `indent_mm` from the left margin, then advances.
    /// The caller keeps `text` within the printable width.
    fn line(&mut self, text: &str, size_pt: f32, bold: bool, indent_mm: f32) {
        // 1.5 line spacing.
        let advance = size_pt * MM_PER_PT * 1.5;
        if self.y - advance < MARGIN_MM {
            self.new_page();
        }
        self.y -= advance;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size_pt, Mm(MARGIN_MM + indent_mm), Mm(self.y), font);
    }

    /// Word-wraps `text` to the printable width and writes each resulting line.
    fn paragraph(&mut self, text: &str, size_pt: f32, bold: bool, indent_mm: f32) {
        for line in wrap_text(text, max_chars_per_line(size_pt, indent_mm)) {
            self.line(&line, size_pt, bold, indent_mm);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| RenderError::Save(format!("{e:?}")))
    }
}

/// Lays out the curriculum summary, then each semester and its courses.
pub fn render_curriculum_pdf(curriculum: &Curriculum) -> Result<Vec<u8>, RenderError> {
    let title = format!("{} Curriculum", curriculum.domain);
    let mut writer = PageWriter::new(&title)?;

    writer.paragraph(&title, TITLE_PT, true, 0.0);
    writer.gap(2.0);
    writer.paragraph(&format!("Level: {}", curriculum.level), BODY_PT, false, 0.0);
    writer.paragraph(
        &format!("Industry Focus: {}", curriculum.industry_orientation),
        BODY_PT,
        false,
        0.0,
    );
    writer.paragraph(
        &format!("Total Semesters: {}", curriculum.semesters),
        BODY_PT,
        false,
        0.0,
    );
    writer.paragraph(
        &format!("Weekly Hours: {}", curriculum.weekly_hours),
        BODY_PT,
        false,
        0.0,
    );

    for block in &curriculum.courses {
        writer.gap(4.0);
        writer.paragraph(
            &format!("Semester {}", block.semester),
            HEADING_PT,
            true,
            0.0,
        );
        for course in &block.courses {
            let text = course_line(
                &course.name,
                course.course_type.as_str(),
                course.hours_per_week,
            );
            writer.paragraph(&text, BODY_PT, false, 5.0);
            if !course.description.is_empty() {
                writer.paragraph(&course.description, BODY_PT - 1.0, false, 10.0);
            }
        }
    }

    writer.gap(6.0);
    writer.line(
        &format!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC")),
        FOOTER_PT,
        false,
        0.0,
    );

    tracing::debug!("Rendered curriculum PDF: {} page(s)", writer.pages);
    writer.finish()
}

fn course_line(name: &str, course_type: &str, hours: i64) -> String {
    format!("{name} ({course_type}, {hours} h/week)")
}

/// Characters that fit between `indent_mm` and the right margin at `size_pt`.
fn max_chars_per_line(size_pt: f32, indent_mm: f32) -> usize {
    let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM - indent_mm;
    let char_mm = size_pt * MM_PER_PT * AVG_CHAR_EM;
    ((usable_mm / char_mm).floor() as usize).max(1)
}

/// Greedy word wrap on whitespace. Words longer than `max_chars` are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            let piece_len = piece.len();
            if current_len > 0 && current_len + 1 + piece_len > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(piece);
            current_len += piece_len;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
