use std::fmt::{Display, Formatter};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::bootstrap::bootstrap_cmd;
use crate::post::post_cmd;
use crate::render::render_cmd;

mod bootstrap;
mod decompress;
mod post;
mod render;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Bootstrap a new site
    Bootstrap(BootstrapArgs),
    /// Render a markdown file the way the server does
    Render(RenderArgs),
    /// Add a post to a data file
    Post(PostArgs),
}

#[derive(Parser, Debug)]
struct BootstrapArgs {
    /// Directory where the new site will be generated
    #[arg(short, long)]
    out_dir: String,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Markdown file to render
    file: String,

    #[arg(short, long, default_value_t = RenderFormat::Html)]
    format: RenderFormat,

    #[arg(short, long, default_value_t = RenderStyle::Plain)]
    style: RenderStyle,

    /// Let lines of embedded markup through
    #[arg(long)]
    allow_raw_markup: bool,
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// JSON data file the server reads posts from
    #[arg(short, long)]
    data_file: String,

    /// Markdown file with the post content. A sample body is used when missing
    #[arg(short, long)]
    content_file: Option<String>,

    /// Comma separated tags
    #[arg(long)]
    tags: Option<String>,

    #[arg(short, long)]
    published: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderFormat {
    /// Rendered markup only
    Html,
    /// Blocks, outline and markup as JSON
    Json,
    /// Outline only, one heading per line
    Toc,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderStyle {
    Plain,
    Tailwind,
}

impl Display for RenderFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderFormat::Html => "html",
            RenderFormat::Json => "json",
            RenderFormat::Toc => "toc",
        };
        write!(f, "{}", name)
    }
}

impl Display for RenderStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderStyle::Plain => "plain",
            RenderStyle::Tailwind => "tailwind",
        };
        write!(f, "{}", name)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args {
        Args::Bootstrap(args) => bootstrap_cmd(args),
        Args::Render(args) => render_cmd(args),
        Args::Post(args) => post_cmd(args),
    }
}
