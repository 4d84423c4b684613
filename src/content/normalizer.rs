use crate::content::block_parser::FenceScanner;

const BOM: char = '\u{feff}';
const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

/// Prepares stored post content for the block parser.
///
/// Absent or blank content becomes an empty string. Line endings are unified
/// to `\n` and whole-line HTML comments (such as the `<!-- more -->` break
/// tag) are dropped, except inside fenced code, which passes through verbatim.
pub fn normalize(content: Option<&str>) -> String {
    let Some(content) = content else {
        return String::new();
    };
    let content = content.strip_prefix(BOM).unwrap_or(content);
    if content.trim().is_empty() {
        return String::new();
    }

    let content = content.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = content.split('\n').collect();
    let fences = FenceScanner::new(&lines);

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if let Some(fence) = fences.scan(i) {
            kept.extend_from_slice(&lines[fence.start..=fence.end]);
            i = fence.end + 1;
            continue;
        }

        if !is_comment_line(lines[i]) {
            kept.push(lines[i]);
        }
        i += 1;
    }

    kept.join("\n")
}

fn is_comment_line(line: &str) -> bool {
    let line = line.trim();
    if line.len() < COMMENT_START.len() + COMMENT_END.len() {
        return false;
    }
    match line.strip_prefix(COMMENT_START).and_then(|l| l.strip_suffix(COMMENT_END)) {
        Some(inner) => !inner.contains(COMMENT_END),
        None => false,
    }
}
