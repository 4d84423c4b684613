use std::fs;

use anyhow::{Context, Result};

use folio::content::content_renderer::{RawMarkup, RenderOptions, StyleProfile};
use folio::content::{render, RenderedDocument};

use crate::{RenderArgs, RenderFormat, RenderStyle};

fn options_of(args: &RenderArgs) -> RenderOptions {
    RenderOptions {
        style: match args.style {
            RenderStyle::Plain => StyleProfile::Plain,
            RenderStyle::Tailwind => StyleProfile::Tailwind,
        },
        raw_markup: if args.allow_raw_markup { RawMarkup::Allow } else { RawMarkup::Disallow },
    }
}

fn format_toc(document: &RenderedDocument) -> String {
    document.toc.iter()
        .map(|entry| format!("{}- {} (#{})", "  ".repeat(entry.level.saturating_sub(1) as usize), entry.text, entry.id))
        .collect::<Vec<String>>()
        .join("\n")
}

fn format_output(document: &RenderedDocument, format: RenderFormat) -> Result<String> {
    let output = match format {
        RenderFormat::Html => document.markup.clone(),
        RenderFormat::Json => serde_json::to_string_pretty(document)?,
        RenderFormat::Toc => format_toc(document),
    };
    Ok(output)
}

pub fn render_cmd(args: RenderArgs) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Error reading {}", args.file))?;

    let document = render(Some(&content), &options_of(&args));
    document.verify_anchors()?;

    println!("{}", format_output(&document, args.format)?);
    Ok(())
}
