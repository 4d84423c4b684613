use serde::Serialize;

use crate::content::block_parser::parse_blocks;
use crate::content::content_renderer::{ContentRenderer, RenderOptions};
use crate::content::html_renderer::HtmlRenderer;
use crate::content::normalizer::normalize;
use crate::content::toc::{derive_toc, TocEntry};
use crate::error::{BlogError, Result};

pub mod block_parser;
pub mod content_renderer;
pub mod html_renderer;
pub mod inline_parser;
pub mod normalizer;
pub mod toc;

/// Inline content of a block. Serialized with a `kind` tag so the
/// structured document can be consumed outside of the HTML renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Inline {
    Text { text: String },
    CodeInline { code: String },
    EmphasisStrong { children: Vec<Inline> },
    EmphasisItalic { children: Vec<Inline> },
    Link { children: Vec<Inline>, url: String },
    Image { alt: String, src: String },
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Block {
    Heading { level: u8, id: String, children: Vec<Inline> },
    Paragraph { children: Vec<Inline> },
    CodeBlock { language: Option<String>, code: String },
    Blockquote { children: Vec<Inline> },
    ListItem { children: Vec<Inline> },
    /// Embedded markup line, only produced when raw markup is allowed.
    RawLine { markup: String },
}

impl Inline {
    pub fn text(text: &str) -> Inline {
        Inline::Text { text: text.to_string() }
    }
}

impl Block {
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { children, .. }
            | Block::Paragraph { children }
            | Block::Blockquote { children }
            | Block::ListItem { children } => plain_text(children),
            Block::CodeBlock { code, .. } => code.clone(),
            Block::RawLine { .. } => String::new(),
        }
    }
}

/// Flattens inline nodes to the text a reader would see.
pub fn plain_text(nodes: &[Inline]) -> String {
    let mut buf = String::new();
    push_plain_text(nodes, &mut buf);
    buf
}

fn push_plain_text(nodes: &[Inline], buf: &mut String) {
    for node in nodes {
        match node {
            Inline::Text { text } => buf.push_str(text),
            Inline::CodeInline { code } => buf.push_str(code),
            Inline::EmphasisStrong { children }
            | Inline::EmphasisItalic { children }
            | Inline::Link { children, .. } => push_plain_text(children, buf),
            Inline::Image { alt, .. } => buf.push_str(alt),
            Inline::LineBreak => buf.push(' '),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub blocks: Vec<Block>,
    pub toc: Vec<TocEntry>,
    pub markup: String,
}

impl RenderedDocument {
    /// Checks that every outline entry points at a heading rendered with the same id.
    pub fn verify_anchors(&self) -> Result<()> {
        let heading_ids: Vec<&str> = self.blocks.iter()
            .filter_map(|block| match block {
                Block::Heading { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();

        if heading_ids.len() != self.toc.len() {
            return Err(BlogError::Render(format!(
                "outline has {} entries for {} headings", self.toc.len(), heading_ids.len())));
        }

        for (entry, id) in self.toc.iter().zip(heading_ids) {
            if entry.id != id {
                return Err(BlogError::Render(format!("anchor mismatch: {} != {}", entry.id, id)));
            }
            let attr = format!(r#"id="{}""#, entry.id);
            if !self.markup.contains(&attr) {
                return Err(BlogError::Render(format!("missing anchor {} in markup", entry.id)));
            }
        }

        Ok(())
    }
}

/// Runs the whole pipeline: normalize, parse into blocks, derive the outline
/// and render markup. Never fails; absent content yields an empty document.
pub fn render(content: Option<&str>, options: &RenderOptions) -> RenderedDocument {
    let normalized = normalize(content);
    let blocks = parse_blocks(&normalized, options.raw_markup);
    let toc = derive_toc(&blocks);
    let markup = HtmlRenderer::new(options.style).render(&blocks);

    RenderedDocument {
        blocks,
        toc,
        markup,
    }
}

/// Markdown stripped to its visible text, blocks separated by a space.
pub fn to_plain_text(content: &str) -> String {
    let normalized = normalize(Some(content));
    let blocks = parse_blocks(&normalized, Default::default());
    blocks.iter()
        .map(|block| block.plain_text())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
