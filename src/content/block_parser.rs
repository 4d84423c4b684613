use lazy_static::lazy_static;
use regex::Regex;

use crate::content::content_renderer::RawMarkup;
use crate::content::html_renderer::is_unsafe_url;
use crate::content::inline_parser::parse_inline;
use crate::content::toc::anchor_id;
use crate::content::{plain_text, Block, Inline};

const FENCE: &str = "```";
const CLOBBER_PREFIX: &str = "custom-";

lazy_static! {
    static ref HEADING_REGEX: Regex = Regex::new(r"^(#{1,3})\s+(.+)$").unwrap();
    static ref RAW_LINE_REGEX: Regex = Regex::new(r"^</?[A-Za-z][^<>]*>(.*>)?$").unwrap();
    static ref UNSAFE_MARKUP_REGEX: Regex = Regex::new(
        r#"(?i)<\s*/?\s*(script|iframe|object|embed|style|link|meta|base)\b|[\s/"']on[a-z]+\s*=|javascript:|vbscript:"#
    ).unwrap();
    static ref ATTR_VALUE_REGEX: Regex = Regex::new(r#"=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap();
    static ref CHAR_REF_REGEX: Regex = Regex::new(r"(?i)&(?:#|[a-z][a-z0-9]*;)").unwrap();
    static ref CLOBBER_REGEX: Regex = Regex::new(r#"(?i)(\s(?:id|name)\s*=\s*")"#).unwrap();
}

/// A fenced code region spanning lines `start..=end`.
#[derive(Debug, PartialEq)]
pub struct Fence {
    pub start: usize,
    pub end: usize,
    pub language: Option<String>,
    pub code: String,
}

/// Finds code fences in a document.
///
/// The closing line of every position is indexed once up front, so an
/// unterminated opener costs a lookup instead of a scan to the end.
pub struct FenceScanner<'a> {
    lines: &'a [&'a str],
    next_closer: Vec<Option<usize>>,
}

impl<'a> FenceScanner<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        let mut next_closer = vec![None; lines.len() + 1];
        for idx in (0..lines.len()).rev() {
            next_closer[idx] = if lines[idx].trim_end().ends_with(FENCE) {
                Some(idx)
            } else {
                next_closer[idx + 1]
            };
        }

        FenceScanner {
            lines,
            next_closer,
        }
    }

    /// Tries to read a code fence opening at line `start`.
    ///
    /// Handles the single-line form (```` ```code``` ````) and the multi-line form
    /// closed by the first later line ending in three backticks. Returns `None`
    /// for unterminated fences, which then stay ordinary text.
    pub fn scan(&self, start: usize) -> Option<Fence> {
        let rest = self.lines.get(start)?.trim_start().strip_prefix(FENCE)?;

        if let Some(close) = rest.find(FENCE) {
            if !rest[close + FENCE.len()..].trim().is_empty() {
                return None;
            }
            return Some(Fence {
                start,
                end: start,
                language: None,
                code: rest[..close].to_string(),
            });
        }

        let end = self.next_closer[start + 1]?;

        let info = rest.trim();
        let (language, mut code_lines) = if info.is_empty() {
            (None, vec![])
        } else if is_language_tag(info) {
            (Some(info.to_string()), vec![])
        } else {
            (None, vec![rest])
        };

        code_lines.extend_from_slice(&self.lines[start + 1..end]);
        if let Some(before) = self.lines[end].trim_end().strip_suffix(FENCE) {
            if !before.trim().is_empty() {
                code_lines.push(before);
            }
        }

        Some(Fence {
            start,
            end,
            language,
            code: code_lines.join("\n"),
        })
    }
}

fn is_language_tag(info: &str) -> bool {
    info.chars().all(|c| c.is_ascii_alphanumeric() || "+-_.#".contains(c))
}

/// Splits normalized markdown into blocks.
///
/// Block rules are checked per physical line, top to bottom. Lines that match
/// none of them accumulate into a paragraph until a blank line or another
/// block starts; inline rules then run on each paragraph line.
pub fn parse_blocks(text: &str, raw_markup: RawMarkup) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let fences = FenceScanner::new(&lines);
    let mut blocks = vec![];
    let mut paragraph: Vec<&str> = vec![];

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(fence) = fences.scan(i) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::CodeBlock {
                language: fence.language,
                code: fence.code,
            });
            i = fence.end + 1;
            continue;
        }

        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
        } else if let Some(block) = parse_line_block(line, raw_markup) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(block);
        } else {
            paragraph.push(line);
        }
        i += 1;
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    blocks
}

fn parse_line_block(line: &str, raw_markup: RawMarkup) -> Option<Block> {
    if let Some(caps) = HEADING_REGEX.captures(line) {
        let text = caps.get(2).map_or("", |m| m.as_str()).trim();
        if !text.is_empty() {
            let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
            let children = parse_inline(text);
            let id = anchor_id(&plain_text(&children));
            return Some(Block::Heading { level, id, children });
        }
    }

    if let Some(quote) = line.strip_prefix("> ") {
        return Some(Block::Blockquote { children: parse_inline(quote.trim_end()) });
    }

    if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(Block::ListItem { children: parse_inline(item.trim()) });
    }

    if raw_markup == RawMarkup::Allow {
        return parse_raw_line(line);
    }

    None
}

/// Embedded markup is only let through when it is a whole line of tags and
/// carries nothing that could run script. `id` and `name` values get a
/// prefix so they cannot clobber the page's own anchors.
fn parse_raw_line(line: &str) -> Option<Block> {
    let trimmed = line.trim();
    if !RAW_LINE_REGEX.is_match(trimmed) || UNSAFE_MARKUP_REGEX.is_match(trimmed) || has_unsafe_attr(trimmed) {
        return None;
    }
    let markup = CLOBBER_REGEX.replace_all(trimmed, format!("${{1}}{}", CLOBBER_PREFIX));
    Some(Block::RawLine { markup: markup.to_string() })
}

/// Character references are refused in attribute values, so a scheme can only
/// be spelled out in plain text, where the url check sees it.
fn has_unsafe_attr(line: &str) -> bool {
    ATTR_VALUE_REGEX.captures_iter(line).any(|caps| {
        let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        CHAR_REF_REGEX.is_match(value) || is_unsafe_url(value)
    })
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }

    let mut children = vec![];
    for (idx, line) in paragraph.iter().enumerate() {
        if idx > 0 {
            children.push(Inline::LineBreak);
        }
        children.extend(parse_inline(line.trim_end()));
    }
    paragraph.clear();

    blocks.push(Block::Paragraph { children });
}
