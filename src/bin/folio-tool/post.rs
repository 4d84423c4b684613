use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use folio::post::{parse_tags, NewPost, MORE_TAG};
use folio::post_store::{JsonFileStore, PostStore};

use crate::PostArgs;

fn render_body(title: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "# {}", title);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "{}", MORE_TAG);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## Details");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "And this is the rest of your post");

    buf
}

fn new_post(args: &PostArgs, content: Option<String>) -> NewPost {
    NewPost {
        title: args.title.clone(),
        content: content.unwrap_or_else(|| render_body(&args.title)),
        published: Some(args.published),
        tags: args.tags.as_deref().map(parse_tags),
    }
}

pub fn post_cmd(args: PostArgs) -> Result<()> {
    let content = match &args.content_file {
        Some(file) => Some(fs::read_to_string(file).with_context(|| format!("Error reading {}", file))?),
        None => None,
    };

    let mut store = JsonFileStore::open(Path::new(&args.data_file))
        .with_context(|| format!("Error opening post data {}", args.data_file))?;
    let post = store.create(new_post(&args, content))?;

    println!("Post created: {} ({})", post.title, post.id);
    println!("  slug: {}", post.slug());
    println!("  status: {}", if post.published { "published" } else { "draft" });
    Ok(())
}
