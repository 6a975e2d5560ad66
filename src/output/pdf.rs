//! PDF rendering
//!
//! Each page record becomes an A4 document: a metadata header (title, source
//! URL, fetch time, keywords, "page X of Y") followed by the body text,
//! wrapped and paginated over as many sheets as needed.

use crate::output::naming::pdf_filename;
use crate::output::text::SafeText;
use crate::output::traits::{
    DocumentEmitter, KeywordSet, PageRecord, PageTotal, RenderError, RenderResult,
};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const FOOTER_Y_MM: f32 = 12.0;

const BODY_SIZE: f32 = 10.0;
const BODY_LEADING_MM: f32 = 5.0;
const BODY_WIDTH_CHARS: usize = 92;

const META_SIZE: f32 = 9.0;
const META_WIDTH_CHARS: usize = 100;

const TITLE_SIZE: f32 = 14.0;
const TITLE_WIDTH_CHARS: usize = 64;

const FOOTER_SIZE: f32 = 8.0;

/// Display name in every document footer
const PRODUCER: &str = "site2pdf";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Title,
    Meta,
    Body,
}

impl Style {
    fn size(self) -> f32 {
        match self {
            Self::Title => TITLE_SIZE,
            Self::Meta => META_SIZE,
            Self::Body => BODY_SIZE,
        }
    }

    fn leading(self) -> f32 {
        match self {
            Self::Title => 7.0,
            Self::Meta => 4.5,
            Self::Body => BODY_LEADING_MM,
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    text: SafeText,
    style: Style,
}

/// Writes one PDF per record into an output directory
#[derive(Debug, Clone)]
pub struct PdfEmitter {
    output_dir: PathBuf,
}

impl PdfEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

}

impl DocumentEmitter for PdfEmitter {
    fn emit(
        &self,
        record: &PageRecord,
        keywords: &KeywordSet,
        total: PageTotal,
    ) -> RenderResult<PathBuf> {
        let filename = pdf_filename(
            record.sequence_number,
            &record.fetched_at,
            &keywords.terms,
            &record.url,
        );
        let path = self.output_dir.join(&filename);
        let partial = self.output_dir.join(format!(".{}.part", filename));

        let label = total.label(record.sequence_number);
        let sheets = paginate(layout(record, keywords, &label));

        let result = render(&sheets, &label, record, &partial)
            .and_then(|_| fs::rename(&partial, &path).map_err(RenderError::from));
        if result.is_err() {
            let _ = fs::remove_file(&partial);
        }
        result?;

        Ok(path)
    }
}

/// Turns a record into styled, wrapped lines
fn layout(record: &PageRecord, keywords: &KeywordSet, label: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut push = |raw: &str, style: Style, width: usize| {
        for text in SafeText::new(raw).wrap(width) {
            lines.push(Line { text, style });
        }
    };

    let heading = record
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(label);
    push(heading, Style::Title, TITLE_WIDTH_CHARS);
    push(label, Style::Meta, META_WIDTH_CHARS);
    push(&format!("URL: {}", record.url), Style::Meta, META_WIDTH_CHARS);
    push(
        &format!(
            "Fetched: {}",
            record.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Style::Meta,
        META_WIDTH_CHARS,
    );
    if !keywords.terms.is_empty() {
        push(
            &format!("Keywords: {}", keywords.terms.join(", ")),
            Style::Meta,
            META_WIDTH_CHARS,
        );
    }
    push(&"-".repeat(META_WIDTH_CHARS), Style::Meta, META_WIDTH_CHARS);
    push("", Style::Body, BODY_WIDTH_CHARS);

    if record.raw_text.trim().is_empty() {
        push("(no text content)", Style::Body, BODY_WIDTH_CHARS);
    } else {
        for paragraph in record.raw_text.lines() {
            push(paragraph, Style::Body, BODY_WIDTH_CHARS);
            push("", Style::Body, BODY_WIDTH_CHARS);
        }
    }

    // No trailing blank line
    while lines
        .last()
        .is_some_and(|line| line.text.is_empty() && lines.len() > 1)
    {
        lines.pop();
    }

    lines
}

/// Distributes lines over sheets, top margin to footer
fn paginate(lines: Vec<Line>) -> Vec<Vec<Line>> {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    let bottom = FOOTER_Y_MM + 8.0;

    let mut sheets = vec![Vec::new()];
    let mut y = top;
    for line in lines {
        let leading = line.style.leading();
        if y - leading < bottom {
            // Blank lines never open a sheet
            if line.text.is_empty() {
                continue;
            }
            sheets.push(Vec::new());
            y = top;
        }
        y -= leading;
        if let Some(sheet) = sheets.last_mut() {
            sheet.push(line);
        }
    }

    sheets
}

fn render(sheets: &[Vec<Line>], label: &str, record: &PageRecord, path: &Path) -> RenderResult<()> {
    let doc_title = SafeText::new(record.title.as_deref().unwrap_or(record.url.as_str()));
    let (doc, first_page, first_layer) = PdfDocument::new(
        doc_title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
        oblique: builtin_font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    let sheet_count = sheets.len();
    let mut first = Some((first_page, first_layer));
    for (index, sheet) in sheets.iter().enumerate() {
        let (page, layer) = match first.take() {
            Some(indices) => indices,
            None => doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1"),
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in sheet {
            y -= line.style.leading();
            if line.text.is_empty() {
                continue;
            }
            layer.use_text(
                line.text.as_str(),
                line.style.size(),
                Mm(MARGIN_MM),
                Mm(y),
                fonts.for_style(line.style),
            );
        }

        let footer = SafeText::new(&format!(
            "{} | Sheet {}/{} | {}",
            label,
            index + 1,
            sheet_count,
            PRODUCER
        ));
        layer.use_text(
            footer.as_str(),
            FOOTER_SIZE,
            Mm(MARGIN_MM),
            Mm(FOOTER_Y_MM),
            &fonts.oblique,
        );
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    Ok(())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn for_style(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Title => &self.bold,
            Style::Meta => &self.oblique,
            Style::Body => &self.regular,
        }
    }
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> RenderResult<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
