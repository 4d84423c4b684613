use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::content::Block;

const FALLBACK_ANCHOR: &str = "section";

lazy_static! {
    static ref NON_SLUG_REGEX: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Lowercases the text and collapses every run outside `[a-z0-9]` to one `-`,
/// trimming hyphens at both ends. May return an empty string.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_SLUG_REGEX.replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Anchor id of a heading. Same as [slugify], except that a heading with no
/// slug characters at all still gets a usable id.
pub fn anchor_id(text: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        FALLBACK_ANCHOR.to_string()
    } else {
        slug
    }
}

/// Collects level 1-3 headings in document order. Ids are taken from the
/// heading blocks, the same values the renderer writes out.
pub fn derive_toc(blocks: &[Block]) -> Vec<TocEntry> {
    blocks.iter()
        .filter_map(|block| match block {
            Block::Heading { level, id, .. } if (1..=3).contains(level) => Some(TocEntry {
                id: id.clone(),
                text: block.plain_text(),
                level: *level,
            }),
            _ => None,
        })
        .collect()
}

pub fn should_show_toc(toc: &[TocEntry], min_headings: usize) -> bool {
    !toc.is_empty() && toc.len() >= min_headings
}

#[cfg(test)]
mod tests {
    use crate::content::block_parser::parse_blocks;

    use super::*;

    fn toc_of(text: &str) -> Vec<TocEntry> {
        derive_toc(&parse_blocks(text, Default::default()))
    }

    fn entry(id: &str, text: &str, level: u8) -> TocEntry {
        TocEntry { id: id.to_string(), text: text.to_string(), level }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Title One"), "title-one");
        assert_eq!(slugify("A & B!"), "a-b");
        assert_eq!(slugify("  --Rust 2024: what's new?-- "), "rust-2024-what-s-new");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_anchor_fallback() {
        assert_eq!(anchor_id("???"), "section");
        assert_eq!(anchor_id("Intro"), "intro");
    }

    #[test]
    fn test_single_heading() {
        assert_eq!(toc_of("# Title One"), vec![entry("title-one", "Title One", 1)]);
        assert_eq!(toc_of("## A & B!"), vec![entry("a-b", "A & B!", 2)]);
    }

    #[test]
    fn test_plain_text_of_marked_heading() {
        assert_eq!(toc_of("### The **bold** `move`"), vec![entry("the-bold-move", "The bold move", 3)]);
    }

    #[test]
    fn test_no_headings() {
        assert!(toc_of("just text\n\n- list\n\n> quote").is_empty());
        assert!(toc_of("#### too deep").is_empty());
        assert!(toc_of("```\n# in code\n```").is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(toc_of("## Setup\n\n## Setup"), vec![
            entry("setup", "Setup", 2),
            entry("setup", "Setup", 2),
        ]);
    }

    #[test]
    fn test_no_cap_on_entries() {
        let text: Vec<String> = (0..25).map(|i| format!("## Part {}", i)).collect();
        assert_eq!(toc_of(&text.join("\n")).len(), 25);
    }

    #[test]
    fn test_should_show_toc() {
        let one = vec![entry("a", "A", 1)];
        let two = vec![entry("a", "A", 1), entry("b", "B", 2)];
        assert!(!should_show_toc(&[], 2));
        assert!(!should_show_toc(&one, 2));
        assert!(should_show_toc(&two, 2));
        assert!(should_show_toc(&one, 0));
    }
}
