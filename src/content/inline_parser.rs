use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::content::Inline;

lazy_static! {
    static ref STRONG_REGEX: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref ITALIC_REGEX: Regex = Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap();
    static ref LINK_REGEX: Regex = Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").unwrap();
    static ref IMAGE_REGEX: Regex = Regex::new(r"!\[([^\]]*)\]\(([^)\s]*)\)").unwrap();
}

type Rule = fn(&str, &Captures) -> Option<Inline>;

/// Parses the inline markers of one line of text.
///
/// Code spans are cut out first so their content stays literal. The remaining
/// text goes through bold, italic, links and images, in that order. Markers
/// without a closing pair are kept as plain text.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut nodes = split_code_spans(text);
    for (regex, rule) in [
        (&*STRONG_REGEX, strong as Rule),
        (&*ITALIC_REGEX, italic as Rule),
        (&*LINK_REGEX, link as Rule),
        (&*IMAGE_REGEX, image as Rule),
    ] {
        nodes = apply_rule(nodes, regex, rule);
    }
    nodes
}

fn strong(_: &str, caps: &Captures) -> Option<Inline> {
    Some(Inline::EmphasisStrong { children: text_children(&caps[1]) })
}

fn italic(_: &str, caps: &Captures) -> Option<Inline> {
    Some(Inline::EmphasisItalic { children: text_children(&caps[1]) })
}

fn link(text: &str, caps: &Captures) -> Option<Inline> {
    let start = caps.get(0)?.start();
    // `![..](..)` belongs to the image rule
    if text[..start].ends_with('!') {
        return None;
    }
    Some(Inline::Link { children: text_children(&caps[1]), url: caps[2].to_string() })
}

fn image(_: &str, caps: &Captures) -> Option<Inline> {
    Some(Inline::Image { alt: caps[1].to_string(), src: caps[2].to_string() })
}

fn text_children(text: &str) -> Vec<Inline> {
    let mut children = vec![];
    push_text(&mut children, text);
    children
}

fn apply_rule(nodes: Vec<Inline>, regex: &Regex, rule: Rule) -> Vec<Inline> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Inline::Text { text } => split_text(&text, regex, rule, &mut out),
            Inline::EmphasisStrong { children } => out.push(Inline::EmphasisStrong {
                children: apply_rule(children, regex, rule),
            }),
            Inline::EmphasisItalic { children } => out.push(Inline::EmphasisItalic {
                children: apply_rule(children, regex, rule),
            }),
            Inline::Link { children, url } => out.push(Inline::Link {
                children: apply_rule(children, regex, rule),
                url,
            }),
            other => out.push(other),
        }
    }
    out
}

fn split_text(text: &str, regex: &Regex, rule: Rule, out: &mut Vec<Inline>) {
    let mut last = 0;
    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if let Some(node) = rule(text, &caps) {
            push_text(out, &text[last..whole.start()]);
            out.push(node);
            last = whole.end();
        }
    }
    push_text(out, &text[last..]);
}

fn split_code_spans(text: &str) -> Vec<Inline> {
    let bytes = text.as_bytes();
    let mut out = vec![];
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run = backtick_run(bytes, i);
        match closing_run(bytes, i + run, run) {
            Some(close) => {
                push_text(&mut out, &text[plain_start..i]);
                out.push(Inline::CodeInline { code: text[i + run..close].to_string() });
                i = close + run;
                plain_start = i;
            }
            None => i += run,
        }
    }
    push_text(&mut out, &text[plain_start..]);

    out
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| **b == b'`').count()
}

/// Finds the next run of exactly `len` backticks at or after `from`.
fn closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'`' {
            let run = backtick_run(bytes, j);
            if run == len {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

/// Appends text, merging with a preceding text node and skipping empty strings.
fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text { text: prev }) = out.last_mut() {
        prev.push_str(text);
        return;
    }
    out.push(Inline::text(text));
}
