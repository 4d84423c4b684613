use ramhorns::Template;

use crate::content::toc::{should_show_toc, TocEntry};
use crate::content::RenderedDocument;
use crate::error::Result;
use crate::post::BlogPost;
use crate::text_utils::{format_date_time, format_long_date};
use crate::view::{parse_template, view_tags, ViewTag};

#[derive(ramhorns::Content)]
struct ViewTocEntry<'a> {
    id: &'a str,
    text: &'a str,
    level: u32,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    id: &'a str,
    slug: String,
    tags: Vec<ViewTag<'a>>,
    date: String,
    time: String,
    long_date: String,
    was_updated: bool,
    updated_date: String,
    reading_time: i64,
    draft: bool,
    post_title: &'a str,
    post_content: &'a str,
    show_toc: bool,
    toc: Vec<ViewTocEntry<'a>>,
}

/// Outline display policy: shown from `min_headings` entries on, cut at `max_entries`.
#[derive(Copy, Clone, Debug)]
pub struct TocPolicy {
    pub min_headings: usize,
    pub max_entries: usize,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
    pub toc_policy: TocPolicy,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str, toc_policy: TocPolicy) -> Result<PostRenderer> {
        let template = parse_template("post view", view_tpl_src)?;

        Ok(PostRenderer {
            template,
            toc_policy,
        })
    }

    pub fn render(&self, post: &BlogPost, document: &RenderedDocument) -> String {
        let (date, time) = format_date_time(&post.created_at);
        let toc: Vec<ViewTocEntry> = document.toc.iter()
            .take(self.toc_policy.max_entries)
            .map(|entry: &TocEntry| ViewTocEntry {
                id: entry.id.as_str(),
                text: entry.text.as_str(),
                level: entry.level as u32,
            })
            .collect();

        self.template.render(&ViewItem {
            id: post.id.0.as_str(),
            slug: post.slug(),
            tags: view_tags(&post.tags),
            date,
            time,
            long_date: format_long_date(&post.created_at),
            was_updated: post.was_updated(),
            updated_date: format_long_date(&post.updated_at),
            reading_time: post.reading_time() as i64,
            draft: !post.published,
            post_title: post.title.as_str(),
            post_content: document.markup.as_str(),
            show_toc: should_show_toc(&document.toc, self.toc_policy.min_headings),
            toc,
        })
    }
}
