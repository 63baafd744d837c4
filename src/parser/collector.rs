//! Span collection from PDF pages.
//!
//! Interprets each page's content stream, tracking the text and graphics
//! matrices, and emits [`Span`]s: runs of text sharing one font and size on a
//! single line, positioned in top-down page coordinates and ordered top to
//! bottom, left to right.

use std::collections::HashMap;
use std::path::Path;

use crate::detect::{parse_header, read_header};
use crate::error::{Error, Result};
use crate::model::{normalize_text, BBox, Span};

use super::backend::{
    number, BackendFontInfo, LopdfBackend, PageBox, PageId, PdfBackend, PdfValue,
};
use super::options::{ErrorMode, ParseOptions};

/// Anything that can produce the ordered spans of one document.
pub trait SpanSource {
    fn collect_spans(&self) -> Result<Vec<Span>>;
}

impl SpanSource for [Span] {
    fn collect_spans(&self) -> Result<Vec<Span>> {
        Ok(self.to_vec())
    }
}

impl SpanSource for Vec<Span> {
    fn collect_spans(&self) -> Result<Vec<Span>> {
        Ok(self.clone())
    }
}

/// Collects spans from a PDF through a [`PdfBackend`].
pub struct PdfSpanCollector<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ParseOptions,
}

impl PdfSpanCollector<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        read_header(path)?;
        let backend = LopdfBackend::load_file(path)?;
        log::debug!("Opened {} (PDF {})", path.display(), backend.version());
        Ok(Self { backend, options })
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Open a PDF held in memory with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        parse_header(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self { backend, options })
    }
}

impl<B: PdfBackend> PdfSpanCollector<B> {
    /// Wrap an already-loaded backend.
    pub fn with_backend(backend: B, options: ParseOptions) -> Self {
        Self { backend, options }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Collect the spans of a single page.
    pub fn page_spans(&self, page_num: u32) -> Result<Vec<Span>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;
        self.extract_page(page_num, page_id)
    }

    fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Vec<Span>> {
        let fonts: HashMap<Vec<u8>, BackendFontInfo> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();
        let ops = self.backend.page_operations(page_id)?;
        let page_box = self.backend.page_box(page_id);

        let runs = interpret(&self.backend, page_id, &ops, &fonts);
        let lines = group_runs_into_lines(runs);
        let spans = lines
            .into_iter()
            .flat_map(|line| merge_line(line, page_num, &page_box))
            .collect::<Vec<_>>();

        log::debug!("Page {}: {} spans", page_num, spans.len());
        Ok(spans)
    }
}

impl<B: PdfBackend> SpanSource for PdfSpanCollector<B> {
    fn collect_spans(&self) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        let mut selected = 0usize;
        let mut failed = 0usize;
        let mut last_error = None;

        for (page_num, page_id) in self.backend.pages() {
            if !self.options.pages.includes(page_num) {
                continue;
            }
            selected += 1;

            match self.extract_page(page_num, page_id) {
                Ok(page_spans) => spans.extend(page_spans),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_num, e);
                    failed += 1;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Lenient mode tolerates bad pages, not a document with none readable.
        if let Some(e) = last_error {
            if failed == selected {
                return Err(Error::PdfParse(format!(
                    "no readable pages ({} of {} failed): {}",
                    failed, selected, e
                )));
            }
        }

        Ok(spans)
    }
}

// ---------------------------------------------------------------------------
// Content stream interpretation
// ---------------------------------------------------------------------------

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: number(&operands[0])?,
            b: number(&operands[1])?,
            c: number(&operands[2])?,
            d: number(&operands[3])?,
            e: number(&operands[4])?,
            f: number(&operands[5])?,
        })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Pre-translate by `(tx, ty)` in this matrix's input space.
    fn translated(&self, tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx * self.a + ty * self.c + self.e,
            f: tx * self.b + ty * self.d + self.f,
            ..*self
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state carried across operators of one page.
#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = self.tlm.translated(tx, ty);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        // Without a TL operator, fall back to the font size as leading.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.move_line(0.0, -leading);
    }

    /// Estimated advance of `text` in unscaled text space.
    fn advance(&self, text: &str) -> f32 {
        let mut advance = 0.0;
        for c in text.chars() {
            let em = if is_spaceless_script_char(c) { 1.0 } else { 0.5 };
            advance += em * self.font_size + self.char_spacing;
            if c == ' ' {
                advance += self.word_spacing;
            }
        }
        advance * self.horizontal_scaling
    }
}

/// A shown string positioned in PDF user space.
#[derive(Debug, Clone)]
struct GlyphRun {
    text: String,
    x: f32,
    baseline: f32,
    width: f32,
    size: f32,
    font_name: String,
    is_bold: bool,
    is_italic: bool,
}

/// TJ adjustments beyond this many thousandths of an em read as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

fn interpret<B: PdfBackend>(
    backend: &B,
    page_id: PageId,
    ops: &[crate::parser::backend::ContentOp],
    fonts: &HashMap<Vec<u8>, BackendFontInfo>,
) -> Vec<GlyphRun> {
    let mut runs = Vec::new();
    let mut ctm = Matrix::IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut state = TextState::default();
    let mut in_text = false;

    for op in ops {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => ctm = ctm_stack.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    ctm = m.then(&ctm);
                }
            }
            "BT" => {
                in_text = true;
                state.tm = Matrix::IDENTITY;
                state.tlm = Matrix::IDENTITY;
            }
            "ET" => in_text = false,
            "Tf" => {
                if let (Some(PdfValue::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1).and_then(number))
                {
                    state.font = name.clone();
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(number) {
                    state.leading = l;
                }
            }
            "Tc" => {
                if let Some(v) = operands.first().and_then(number) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = operands.first().and_then(number) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = operands.first().and_then(number) {
                    state.horizontal_scaling = v / 100.0;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.tm = m;
                    state.tlm = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" if in_text => {
                if let Some(PdfValue::Str(bytes)) = operands.first() {
                    let text = backend.decode_text(page_id, &state.font, bytes);
                    show_text(&mut runs, &mut state, &ctm, fonts, text, 0.0);
                }
            }
            "TJ" if in_text => {
                if let Some(PdfValue::Array(items)) = operands.first() {
                    let mut combined = String::new();
                    let mut kerning = 0.0;
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => {
                                combined.push_str(&backend.decode_text(
                                    page_id,
                                    &state.font,
                                    bytes,
                                ));
                            }
                            other => {
                                let adjustment = -number(other).unwrap_or(0.0);
                                kerning += adjustment / 1000.0 * state.font_size;
                                if adjustment > TJ_SPACE_THRESHOLD {
                                    push_word_space(&mut combined);
                                }
                            }
                        }
                    }
                    show_text(&mut runs, &mut state, &ctm, fonts, combined, kerning);
                }
            }
            "'" | "\"" => {
                if op.operator == "\"" {
                    if let Some(v) = operands.first().and_then(number) {
                        state.word_spacing = v;
                    }
                    if let Some(v) = operands.get(1).and_then(number) {
                        state.char_spacing = v;
                    }
                }
                state.next_line();
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if in_text {
                    if let Some(PdfValue::Str(bytes)) = operands.get(text_idx) {
                        let text = backend.decode_text(page_id, &state.font, bytes);
                        show_text(&mut runs, &mut state, &ctm, fonts, text, 0.0);
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

fn push_word_space(text: &mut String) {
    if let Some(last) = text.chars().last() {
        if !last.is_whitespace() && last != '\u{00A0}' && !is_spaceless_script_char(last) {
            text.push(' ');
        }
    }
}

/// Record a shown string and advance the text matrix past it.
fn show_text(
    runs: &mut Vec<GlyphRun>,
    state: &mut TextState,
    ctm: &Matrix,
    fonts: &HashMap<Vec<u8>, BackendFontInfo>,
    text: String,
    extra_advance: f32,
) {
    let advance = state.advance(&text) + extra_advance * state.horizontal_scaling;
    let rendering = state.tm.then(ctm);

    if !text.trim().is_empty() {
        let (font_name, is_bold, is_italic) = match fonts.get(&state.font) {
            Some(info) => (info.base_font.clone(), info.is_bold, info.is_italic),
            None => (String::from_utf8_lossy(&state.font).to_string(), false, false),
        };
        runs.push(GlyphRun {
            text,
            x: rendering.e,
            baseline: rendering.f,
            width: advance * rendering.horizontal_scale(),
            size: state.font_size * rendering.vertical_scale(),
            font_name,
            is_bold,
            is_italic,
        });
    }

    state.tm = state.tm.translated(advance, 0.0);
}

// ---------------------------------------------------------------------------
// Line grouping and span merging
// ---------------------------------------------------------------------------

/// Group runs into lines by baseline, top to bottom, each sorted left to right.
fn group_runs_into_lines(mut runs: Vec<GlyphRun>) -> Vec<Vec<GlyphRun>> {
    // PDF y grows upward, so descending baseline is top-down reading order.
    runs.sort_by(|a, b| {
        b.baseline
            .total_cmp(&a.baseline)
            .then_with(|| a.x.total_cmp(&b.x))
    });

    let mut lines: Vec<Vec<GlyphRun>> = Vec::new();
    let mut current: Vec<GlyphRun> = Vec::new();
    let mut current_y: Option<f32> = None;

    for run in runs {
        let tolerance = run.size * 0.3;
        match current_y {
            Some(y) if (run.baseline - y).abs() <= tolerance => current.push(run),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(run.baseline);
                current.push(run);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

/// Merge neighbouring same-style runs of one line into spans.
fn merge_line(line: Vec<GlyphRun>, page: u32, page_box: &PageBox) -> Vec<Span> {
    let mut merged: Vec<GlyphRun> = Vec::new();
    let mut last_raw: Option<(String, f32)> = None;

    for run in line {
        // Fake bold: the same string painted twice at nearly the same spot.
        if let Some((text, x)) = &last_raw {
            if *text == run.text && (run.x - x).abs() < 1.0 {
                if let Some(prev) = merged.last_mut() {
                    prev.is_bold = true;
                }
                continue;
            }
        }
        last_raw = Some((run.text.clone(), run.x));

        if let Some(prev) = merged.last_mut() {
            let gap = run.x - (prev.x + prev.width);
            let same_style = prev.font_name == run.font_name
                && (prev.size - run.size).abs() < 0.1
                && prev.is_bold == run.is_bold
                && prev.is_italic == run.is_italic;

            if same_style && gap <= prev.size.max(run.size) * 1.5 {
                if needs_space(&prev.text, &run.text, gap, run.size) {
                    prev.text.push(' ');
                }
                prev.text.push_str(&run.text);
                prev.width = (run.x + run.width - prev.x).max(prev.width);
                continue;
            }
        }
        merged.push(run);
    }

    merged
        .into_iter()
        .filter_map(|run| to_span(run, page, page_box))
        .collect()
}

fn needs_space(prev: &str, next: &str, gap: f32, size: f32) -> bool {
    if gap <= size * 0.15 {
        return false;
    }
    let prev_last = prev.chars().last();
    let next_first = next.chars().next();
    if prev_last.map(char::is_whitespace).unwrap_or(true)
        || next_first.map(char::is_whitespace).unwrap_or(true)
    {
        return false;
    }
    // No space between CJK characters
    !(prev_last.map(is_spaceless_script_char).unwrap_or(false)
        && next_first.map(is_spaceless_script_char).unwrap_or(false))
}

fn to_span(run: GlyphRun, page: u32, page_box: &PageBox) -> Option<Span> {
    let text = normalize_text(&run.text);
    if text.is_empty() {
        return None;
    }

    // Approximate ascender/descender split of the em box.
    let top = page_box.top - (run.baseline + run.size * 0.8);
    let bottom = page_box.top - (run.baseline - run.size * 0.2);
    let x0 = run.x - page_box.left;
    let bbox = BBox::new(x0, top, x0 + run.width, bottom);

    Some(
        Span::new(text, run.size, run.font_name, bbox, page)
            .with_bold(run.is_bold)
            .with_italic(run.is_italic),
    )
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
