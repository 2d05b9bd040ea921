//! Rules Renderer - Markdown Pages to SVG
//!
//! Splits the rules document on the literal `---` token and renders each
//! page onto a fixed 103x160 canvas with a page footer. The split is
//! textual, so `---` inside a page body (a horizontal rule, say) splits it
//! too. Kept as-is from the original pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{info, warn};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::pipeline::BuildError;
use crate::style::{BlockKind, SizeTier, FOOTER_GAP, PAGE_HEIGHT, PAGE_PADDING, PAGE_WIDTH};

/// Literal page separator token.
pub const PAGE_SEPARATOR: &str = "---";

/// The two embedded font faces, regular and bold.
pub struct FontSet {
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
}

impl FontSet {
    /// Load `verdana.woff` and `verdana-bold.woff` from the font directory.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        Ok(Self {
            regular: read_font(&dir.join("verdana.woff"))?,
            bold: read_font(&dir.join("verdana-bold.woff"))?,
        })
    }
}

fn read_font(path: &Path) -> Result<Vec<u8>, BuildError> {
    fs::read(path).map_err(|source| BuildError::FontRead {
        path: path.to_path_buf(),
        source,
    })
}

/// One block-level row after the kind mapping, before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRow {
    pub kind: BlockKind,
    pub text: String,
}

/// A page written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    pub number: usize,
    pub path: PathBuf,
}

pub struct RulesRenderer {
    fonts: FontSet,
}

impl RulesRenderer {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// Render every page of `document` into `out_dir` as
    /// `rules_<n>.svg`, 1-based, returning the written pages in order.
    pub fn render_document(
        &self,
        document: &str,
        out_dir: &Path,
    ) -> Result<Vec<RenderedPage>, BuildError> {
        let pages: Vec<&str> = document.split(PAGE_SEPARATOR).collect();
        let total = pages.len();
        let mut rendered = Vec::with_capacity(total);
        for (idx, page) in pages.iter().enumerate() {
            let number = idx + 1;
            let svg = self.render_page(page, number, total);
            let path = out_dir.join(format!("rules_{}.svg", number));
            fs::write(&path, &svg).map_err(|source| BuildError::PageWrite {
                path: path.clone(),
                source,
            })?;
            info!("rendered page {}/{} -> {}", number, total, path.display());
            rendered.push(RenderedPage { number, path });
        }
        Ok(rendered)
    }

    /// Render one page to SVG markup. Pure: the same (markdown, number,
    /// total) and font bytes always produce the same output bytes.
    pub fn render_page(&self, markdown: &str, number: usize, total: usize) -> String {
        let rows = page_rows(markdown);
        let lines = layout_rows(&rows);

        let body_bottom = PAGE_HEIGHT - PAGE_PADDING - SizeTier::Base.px() - FOOTER_GAP;
        if lines.iter().any(|l| l.baseline > body_bottom) {
            warn!("page {} body overflows the canvas", number);
        }

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = PAGE_WIDTH,
            h = PAGE_HEIGHT
        ));
        svg.push('\n');
        svg.push_str("<defs><style>");
        push_font_face(&mut svg, &self.fonts.regular, 400);
        push_font_face(&mut svg, &self.fonts.bold, 800);
        svg.push_str("text{font-family:'Verdana';fill:#000000;}");
        svg.push_str("</style></defs>\n");
        svg.push_str(&format!(
            r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
            PAGE_WIDTH, PAGE_HEIGHT
        ));
        svg.push('\n');
        for line in &lines {
            svg.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{}" font-weight="{}">{}</text>"#,
                line.x,
                line.baseline,
                line.size,
                line.weight,
                escape_xml(&line.text)
            ));
            svg.push('\n');
        }
        let footer = format!("Page {} of {}", number, total);
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" font-weight="400" text-anchor="middle">{}</text>"#,
            PAGE_WIDTH / 2.0,
            PAGE_HEIGHT - PAGE_PADDING,
            SizeTier::Base.px(),
            escape_xml(&footer)
        ));
        svg.push_str("\n</svg>\n");
        svg
    }
}

fn push_font_face(svg: &mut String, data: &[u8], weight: u16) {
    svg.push_str(&format!(
        "@font-face{{font-family:'Verdana';font-weight:{};src:url(data:font/woff;base64,{}) format('woff');}}",
        weight,
        BASE64.encode(data)
    ));
}

/// Fold the markdown event stream into styled block rows.
///
/// Headings 1/3/4, paragraphs and list items get their mapped styles;
/// everything else passes through as unstyled text. Inline markup
/// (emphasis, code spans) contributes its text content only.
pub fn page_rows(markdown: &str) -> Vec<BlockRow> {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut rows = Vec::new();
    let mut current: Option<BlockRow> = None;
    let mut in_item = false;

    for event in parser {
        match event {
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut rows);
                in_item = true;
                current = Some(BlockRow {
                    kind: BlockKind::ListItem,
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Item) => {
                flush(&mut current, &mut rows);
                in_item = false;
            }
            Event::Start(tag) if !in_item => {
                if let Some(kind) = block_kind(&tag) {
                    flush(&mut current, &mut rows);
                    current = Some(BlockRow {
                        kind,
                        text: String::new(),
                    });
                }
            }
            Event::End(end) if !in_item => {
                if closes_block(&end) {
                    flush(&mut current, &mut rows);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                append(&mut current, &text);
            }
            Event::Html(text) | Event::InlineHtml(text) => {
                // Unknown markup passes through as plain text.
                append(&mut current, &text);
            }
            Event::SoftBreak | Event::HardBreak => {
                append(&mut current, " ");
            }
            _ => {}
        }
    }
    flush(&mut current, &mut rows);
    rows
}

fn block_kind(tag: &Tag) -> Option<BlockKind> {
    match tag {
        Tag::Heading {
            level: HeadingLevel::H1,
            ..
        } => Some(BlockKind::Heading1),
        Tag::Heading {
            level: HeadingLevel::H3,
            ..
        } => Some(BlockKind::Heading3),
        Tag::Heading {
            level: HeadingLevel::H4,
            ..
        } => Some(BlockKind::Heading4),
        // Unmapped heading levels render unstyled.
        Tag::Heading { .. } => Some(BlockKind::Plain),
        Tag::Paragraph => Some(BlockKind::Paragraph),
        Tag::CodeBlock(_) => Some(BlockKind::Plain),
        // Lists are containers; their items carry the text.
        _ => None,
    }
}

fn closes_block(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::CodeBlock
    )
}

fn append(current: &mut Option<BlockRow>, text: &str) {
    match current {
        Some(row) => row.text.push_str(text),
        None => {
            // Stray inline content outside any block renders unstyled.
            *current = Some(BlockRow {
                kind: BlockKind::Plain,
                text: text.to_string(),
            });
        }
    }
}

fn flush(current: &mut Option<BlockRow>, rows: &mut Vec<BlockRow>) {
    if let Some(row) = current.take() {
        let trimmed = row.text.trim();
        if !trimmed.is_empty() {
            rows.push(BlockRow {
                kind: row.kind,
                text: trimmed.to_string(),
            });
        }
    }
}

struct SvgLine {
    text: String,
    x: f32,
    baseline: f32,
    size: f32,
    weight: u16,
}

/// Place block rows top-down, wrapping each against the content width.
fn layout_rows(rows: &[BlockRow]) -> Vec<SvgLine> {
    let content_width = PAGE_WIDTH - 2.0 * PAGE_PADDING;
    let mut cursor = PAGE_PADDING;
    let mut lines = Vec::new();
    for row in rows {
        let style = row.kind.style();
        let text = if style.bullet {
            format!("\u{2022} {}", row.text)
        } else {
            row.text.clone()
        };
        for wrapped in wrap_text(&text, style.char_advance(), content_width) {
            lines.push(SvgLine {
                text: wrapped,
                x: PAGE_PADDING,
                baseline: cursor + style.size.px(),
                size: style.size.px(),
                weight: style.weight.numeric_value(),
            });
            cursor += style.line_height();
        }
        cursor += style.margin_bottom;
    }
    lines
}

/// Greedy wrap against a flat per-character advance. Words longer than a
/// full line are split hard rather than overflowing the canvas.
fn wrap_text(text: &str, advance: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / advance).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        loop {
            let word_len = word.chars().count();
            if line_len == 0 {
                if word_len <= max_chars {
                    line.push_str(word);
                    line_len = word_len;
                    break;
                }
                let split = word
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                lines.push(word[..split].to_string());
                word = &word[split..];
            } else if line_len + 1 + word_len <= max_chars {
                line.push(' ');
                line.push_str(word);
                line_len += 1 + word_len;
                break;
            } else {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
