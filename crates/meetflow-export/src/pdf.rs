//! PDF rendering via `printpdf`, a structural (not byte-identical) port of
//! `original_source/backend/utils/pdf_generator.py`'s sections: title,
//! generation timestamp, summary (skipped for transcript-only exports),
//! and the transcript body as wrapped paragraphs per speaker turn.

use crate::filenames::format_timestamp;
use chrono::{DateTime, Utc};
use meetflow_align::{display_speaker, AlignedSegment};
use meetflow_error::{AppError, AppResult};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfDocumentReference};
use std::collections::HashMap;
use std::io::{BufWriter, Cursor};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.0;
const FONT_SIZE: f32 = 11.0;
const WRAP_COLUMNS: usize = 95;

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct PageWriter {
    doc: PdfDocumentReference,
    pages: Vec<(printpdf::PdfPageIndex, printpdf::PdfLayerIndex)>,
    font: printpdf::IndirectFontRef,
    cursor_y: f32,
}

impl PageWriter {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Internal(format!("failed to load PDF font: {e}")))?;
        Ok(Self {
            doc,
            pages: vec![(page, layer)],
            font,
            cursor_y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn current_layer(&self) -> printpdf::PdfLayerReference {
        let (page, layer) = *self.pages.last().unwrap();
        self.doc.get_page(page).get_layer(layer)
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.pages.push((page, layer));
        self.cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
    }

    fn write_line(&mut self, text: &str, size: f32) {
        if self.cursor_y < MARGIN_MM {
            self.new_page();
        }
        self.current_layer()
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.cursor_y), &self.font);
        self.cursor_y -= LINE_HEIGHT_MM;
    }

    fn write_blank(&mut self) {
        self.cursor_y -= LINE_HEIGHT_MM;
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        let mut writer = BufWriter::new(Cursor::new(Vec::new()));
        self.doc
            .save(&mut writer)
            .map_err(|e| AppError::Internal(format!("failed to render PDF: {e}")))?;
        let buffer = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("failed to flush PDF buffer: {e}")))?;
        Ok(buffer.into_inner())
    }
}

fn render(
    meeting_title: &str,
    generated_on: DateTime<Utc>,
    summary: Option<&str>,
    segments: &[AlignedSegment],
) -> AppResult<Vec<u8>> {
    let mut writer = PageWriter::new(meeting_title)?;
    writer.write_line(meeting_title, FONT_SIZE + 6.0);
    writer.write_line(
        &format!("Generated on {}", generated_on.format("%B %d, %Y at %I:%M %p")),
        FONT_SIZE - 2.0,
    );
    writer.write_blank();

    if let Some(summary) = summary {
        writer.write_line("Summary", FONT_SIZE + 2.0);
        for line in summary.lines() {
            for wrapped in wrap(line, WRAP_COLUMNS) {
                writer.write_line(&wrapped, FONT_SIZE);
            }
        }
        writer.write_blank();
    }

    writer.write_line("Transcript", FONT_SIZE + 2.0);
    let overrides = HashMap::new();
    for segment in segments {
        let speaker = display_speaker(&segment.speaker, &overrides);
        let start = format_timestamp(&segment.start);
        let end = format_timestamp(&segment.end);
        let header = format!("{speaker} ({start} - {end})");
        writer.write_line(&header, FONT_SIZE);
        for wrapped in wrap(&segment.text, WRAP_COLUMNS) {
            writer.write_line(&wrapped, FONT_SIZE);
        }
        writer.write_blank();
    }

    writer.finish()
}

#[must_use]
pub fn generate_summary_pdf(
    meeting_title: &str,
    summary: &str,
    segments: &[AlignedSegment],
    generated_on: DateTime<Utc>,
) -> AppResult<Vec<u8>> {
    render(meeting_title, generated_on, Some(summary), segments)
}

#[must_use]
pub fn generate_transcript_pdf(
    meeting_title: &str,
    segments: &[AlignedSegment],
    generated_on: DateTime<Utc>,
) -> AppResult<Vec<u8>> {
    render(meeting_title, generated_on, None, segments)
}
