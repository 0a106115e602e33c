//! # `knowbatch-pdf`: PDF Report Export
//!
//! Lays out [`ReportContent`] as plain text lines on A4 pages with `printpdf`.
//! Tables are drawn row by row with ` | ` between cells. Long lines are
//! wrapped and the document paginates as needed.
//!
//! The builtin Helvetica font only covers Latin text. Reports in other
//! scripts need a TTF/OTF file passed via [`PdfOptions::font_path`].

use chrono::{DateTime, Local};
use knowbatch::report::report_file_name;
use knowbatch_markdown::ReportContent;
use printpdf::{
    BuiltinFont, FontId, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage,
    PdfSaveOptions, Pt, TextItem, TextMatrix, TextRenderingMode,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum PdfExportError {
    #[error("Failed to read font file '{path}': {source}")]
    FontRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse font: {0}")]
    FontParse(String),
    #[error("Failed to write PDF report '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Layout ---

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const TITLE_SIZE_PT: f32 = 16.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Page and font settings for the exporter.
#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub font_size: f32,
    /// A TTF/OTF font replacing the builtin Helvetica.
    pub font_path: Option<PathBuf>,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            font_path: None,
        }
    }
}

impl PdfOptions {
    fn line_height_mm(&self) -> f32 {
        self.font_size * 1.4 / PT_PER_MM
    }

    /// A rough column budget per line. One column is half an em, so Latin
    /// glyphs take one and wide glyphs take two.
    fn columns_per_line(&self) -> usize {
        let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) * PT_PER_MM;
        ((usable_pt / (self.font_size * 0.5)) as usize).max(10)
    }

    fn lines_per_page(&self) -> usize {
        (((PAGE_HEIGHT_MM - 2.0 * MARGIN_MM) / self.line_height_mm()) as usize).max(1)
    }
}

/// Flattens the content into the text lines drawn below the title.
pub fn content_lines(content: &ReportContent) -> Vec<String> {
    match content {
        ReportContent::Table(table) => {
            let mut lines = vec![table.headers.join(" | ")];
            lines.push("-".repeat(lines[0].width().clamp(3, 80)));
            lines.extend(table.rows.iter().map(|row| row.join(" | ")));
            lines
        }
        ReportContent::Text(text) => text.lines().map(str::to_string).collect(),
    }
}

/// Wraps one line at word boundaries to `width` display columns.
///
/// Wide glyphs such as CJK ideographs take two columns. Words wider than
/// `width` are split across lines.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in line.split_whitespace() {
        let pieces = if word.width() > width {
            split_to_width(word, width)
        } else {
            vec![word.to_string()]
        };
        for piece in pieces {
            let piece_width = piece.width();
            if current_width > 0 && current_width + 1 + piece_width > width {
                wrapped.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(&piece);
            current_width += piece_width;
        }
    }

    if current_width > 0 || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

fn split_to_width(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0;
    for c in word.chars() {
        let char_width = c.width().unwrap_or(0);
        if !piece.is_empty() && piece_width + char_width > width {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(c);
        piece_width += char_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Builds the PDF bytes for `content`.
pub fn export_pdf(
    content: &ReportContent,
    title: &str,
    options: &PdfOptions,
) -> Result<Vec<u8>, PdfExportError> {
    let mut doc = PdfDocument::new(title);
    let layer_id = doc.add_layer(&Layer::new("Report"));
    let font = load_font(options.font_path.as_deref())?;
    let font_id = doc.add_font(&font);

    let width = options.columns_per_line();
    let lines: Vec<String> = content_lines(content)
        .iter()
        .flat_map(|line| wrap_line(line, width))
        .collect();

    // The title takes two body lines on the first page.
    let per_page = options.lines_per_page();
    let first_page = per_page.saturating_sub(2).max(1);
    let mut chunks: Vec<&[String]> = vec![&lines[..first_page.min(lines.len())]];
    if lines.len() > first_page {
        chunks.extend(lines[first_page..].chunks(per_page));
    }

    for (page_index, chunk) in chunks.into_iter().enumerate() {
        let mut ops = vec![Op::BeginLayer {
            layer_id: layer_id.clone(),
        }];
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        if page_index == 0 {
            push_text(&mut ops, &font_id, title, TITLE_SIZE_PT, y);
            y -= 2.0 * options.line_height_mm();
        }
        for line in chunk {
            y -= options.line_height_mm();
            if !line.is_empty() {
                push_text(&mut ops, &font_id, line, options.font_size, y);
            }
        }
        ops.push(Op::EndLayer {
            layer_id: layer_id.clone(),
        });
        doc.pages
            .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
    }

    let page_count = doc.pages.len();
    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        warn!("PDF generation produced {} warnings: {warnings:?}", warnings.len());
    }
    info!("Rendered PDF with {page_count} pages ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Exports `content` to `out_dir/report_<timestamp>.pdf`.
pub fn write_pdf_report(
    content: &ReportContent,
    title: &str,
    out_dir: &Path,
    options: &PdfOptions,
    now: &DateTime<Local>,
) -> Result<PathBuf, PdfExportError> {
    let bytes = export_pdf(content, title, options)?;
    let path = out_dir.join(report_file_name("pdf", now));
    let io_error = |source| PdfExportError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(out_dir).map_err(io_error)?;
    fs::write(&path, bytes).map_err(io_error)?;
    info!("PDF report written to '{}'", path.display());
    Ok(path)
}

fn load_font(font_path: Option<&Path>) -> Result<ParsedFont, PdfExportError> {
    let bytes = match font_path {
        Some(path) => fs::read(path).map_err(|source| PdfExportError::FontRead {
            path: path.display().to_string(),
            source,
        })?,
        None => BuiltinFont::Helvetica.get_subset_font().bytes,
    };
    ParsedFont::from_bytes(&bytes, 0, &mut Vec::new()).ok_or_else(|| {
        PdfExportError::FontParse(match font_path {
            Some(path) => format!("'{}' is not a usable TTF/OTF font", path.display()),
            None => "builtin Helvetica".to_string(),
        })
    })
}

fn push_text(ops: &mut Vec<Op>, font: &FontId, text: &str, size: f32, y_mm: f32) {
    ops.extend([
        Op::SetFontSize {
            size: Pt(size),
            font: font.clone(),
        },
        Op::StartTextSection,
        Op::SetTextMatrix {
            matrix: TextMatrix::Translate(Mm(MARGIN_MM).into(), Mm(y_mm).into()),
        },
        Op::SetTextRenderingMode {
            mode: TextRenderingMode::Fill,
        },
        Op::WriteText {
            items: vec![TextItem::Text(text.to_string())],
            font: font.clone(),
        },
        Op::EndTextSection,
    ]);
}
