use serde::Deserialize;

use crate::content::Block;

/// Visual mapping applied by the renderer. `Plain` emits bare semantic tags,
/// `Tailwind` decorates them with the site's utility classes.
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StyleProfile {
    #[default]
    Plain,
    Tailwind,
}

/// Elements the renderer can attach a style class to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Heading(u8),
    Paragraph,
    CodeBlock,
    CodeBlockBody,
    CodeInline,
    Blockquote,
    List,
    ListItem,
    Link,
    Image,
    Strong,
    Emphasis,
}

impl StyleProfile {
    pub fn class_for(&self, element: Element) -> Option<&'static str> {
        match self {
            StyleProfile::Plain => None,
            StyleProfile::Tailwind => Some(match element {
                Element::Heading(1) => "text-5xl font-bold text-white mb-10 mt-20 scroll-mt-20 border-b border-cyan-400 pb-6",
                Element::Heading(2) => "text-3xl font-bold text-white mb-8 mt-16 scroll-mt-20 border-b border-white/10 pb-4",
                Element::Heading(_) => "text-2xl font-bold text-white mb-6 mt-12 scroll-mt-20",
                Element::Paragraph => "text-gray-300 mb-8 leading-relaxed text-lg",
                Element::CodeBlock => "bg-white/5 border border-white/10 rounded-xl p-6 my-8 overflow-x-auto",
                Element::CodeBlockBody => "text-cyan-400 font-mono text-sm block",
                Element::CodeInline => "bg-white/10 px-2 py-1 rounded text-cyan-400 font-mono text-sm border border-white/20 inline",
                Element::Blockquote => "border-l-4 border-cyan-400 pl-6 my-8 text-gray-300 italic bg-white/5 rounded-r-xl py-4",
                Element::List => "mb-8",
                Element::ListItem => "text-gray-300 mb-3 ml-6 list-disc",
                Element::Link => "text-cyan-400 hover:text-cyan-300 underline decoration-cyan-400/50",
                Element::Image => "my-8 rounded-xl max-w-full h-auto shadow-lg border border-white/10",
                Element::Strong => "font-bold text-white",
                Element::Emphasis => "italic text-gray-300",
            }),
        }
    }
}

/// Whether lines of embedded markup pass through the pipeline.
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RawMarkup {
    #[default]
    Disallow,
    Allow,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub style: StyleProfile,
    pub raw_markup: RawMarkup,
}

pub trait ContentRenderer {
    fn render(&self, blocks: &[Block]) -> String;
}
