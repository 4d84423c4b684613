use crate::content::content_renderer::{ContentRenderer, Element, StyleProfile};
use crate::content::{Block, Inline};

const UNSAFE_URL: &str = "#";
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];
const ALLOWED_DATA_PREFIX: &str = "data:image/";

/// Maps blocks to HTML. All text coming from the document is escaped, so the
/// only tags in the output are the ones written here (plus raw lines, which
/// the parser only produces when explicitly allowed).
pub struct HtmlRenderer {
    style: StyleProfile,
}

impl ContentRenderer for HtmlRenderer {
    fn render(&self, blocks: &[Block]) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(blocks.len());
        let mut in_list = false;

        for block in blocks {
            let is_item = matches!(block, Block::ListItem { .. });
            if is_item && !in_list {
                lines.push(format!("<ul{}>", self.class_attr(Element::List)));
            } else if !is_item && in_list {
                lines.push("</ul>".to_string());
            }
            in_list = is_item;
            lines.push(self.render_block(block));
        }
        if in_list {
            lines.push("</ul>".to_string());
        }

        lines.join("\n")
    }
}

impl HtmlRenderer {
    pub fn new(style: StyleProfile) -> Self {
        HtmlRenderer { style }
    }

    fn class_attr(&self, element: Element) -> String {
        match self.style.class_for(element) {
            Some(class) => format!(r#" class="{}""#, class),
            None => String::new(),
        }
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Heading { level, id, children } => format!(
                r#"<h{level} id="{}"{}>{}</h{level}>"#,
                escape_html(id),
                self.class_attr(Element::Heading(*level)),
                self.render_inline(children),
                level = level,
            ),
            Block::Paragraph { children } => format!(
                "<p{}>{}</p>", self.class_attr(Element::Paragraph), self.render_inline(children)),
            Block::CodeBlock { language, code } => {
                let mut code_classes = vec![];
                if let Some(language) = language {
                    code_classes.push(format!("language-{}", escape_html(language)));
                }
                if let Some(class) = self.style.class_for(Element::CodeBlockBody) {
                    code_classes.push(class.to_string());
                }
                let code_attr = if code_classes.is_empty() {
                    String::new()
                } else {
                    format!(r#" class="{}""#, code_classes.join(" "))
                };
                format!("<pre{}><code{}>{}</code></pre>",
                        self.class_attr(Element::CodeBlock), code_attr, escape_html(code))
            }
            Block::Blockquote { children } => format!(
                "<blockquote{}>{}</blockquote>", self.class_attr(Element::Blockquote), self.render_inline(children)),
            Block::ListItem { children } => format!(
                "<li{}>{}</li>", self.class_attr(Element::ListItem), self.render_inline(children)),
            Block::RawLine { markup } => markup.clone(),
        }
    }

    fn render_inline(&self, nodes: &[Inline]) -> String {
        let mut buf = String::new();
        for node in nodes {
            match node {
                Inline::Text { text } => buf.push_str(&escape_html(text)),
                Inline::CodeInline { code } => {
                    buf.push_str(&format!("<code{}>{}</code>", self.class_attr(Element::CodeInline), escape_html(code)))
                }
                Inline::EmphasisStrong { children } => {
                    buf.push_str(&format!("<strong{}>{}</strong>", self.class_attr(Element::Strong), self.render_inline(children)))
                }
                Inline::EmphasisItalic { children } => {
                    buf.push_str(&format!("<em{}>{}</em>", self.class_attr(Element::Emphasis), self.render_inline(children)))
                }
                Inline::Link { children, url } => {
                    let label = if children.is_empty() {
                        escape_html(url)
                    } else {
                        self.render_inline(children)
                    };
                    buf.push_str(&format!(
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer"{}>{}</a>"#,
                        escape_html(&safe_url(url)), self.class_attr(Element::Link), label))
                }
                Inline::Image { alt, src } => {
                    let src = safe_url(src);
                    if src.is_empty() || src == UNSAFE_URL {
                        buf.push_str(&escape_html(alt));
                    } else {
                        buf.push_str(&format!(r#"<img src="{}" alt="{}"{}>"#,
                                              escape_html(&src), escape_html(alt), self.class_attr(Element::Image)))
                    }
                }
                Inline::LineBreak => buf.push_str("<br>"),
            }
        }
        buf
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whether `url` uses a script-capable scheme. Inline data is only kept for images.
pub fn is_unsafe_url(url: &str) -> bool {
    let scheme: String = url.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_lowercase();

    if scheme.starts_with(ALLOWED_DATA_PREFIX) {
        return false;
    }
    BLOCKED_SCHEMES.iter().any(|s| scheme.starts_with(s))
}

/// Replaces script-capable URLs with `#`.
pub fn safe_url(url: &str) -> String {
    let url = url.trim();
    if is_unsafe_url(url) {
        return UNSAFE_URL.to_string();
    }
    url.to_string()
}
