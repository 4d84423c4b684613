use ramhorns::Template;

use crate::error::{BlogError, Result};
use crate::post::BlogPost;
use crate::text_utils::{format_date_time, format_long_date};

pub mod index_renderer;
pub mod list_renderer;
pub mod post_renderer;

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag<'a> {
    tag: &'a str,
}

pub(crate) fn view_tags(tags: &[String]) -> Vec<ViewTag<'_>> {
    tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect()
}

/// A post as shown in lists: landing page and blog index.
#[derive(ramhorns::Content)]
pub(crate) struct PostItem<'a> {
    id: &'a str,
    date: String,
    time: String,
    long_date: String,
    link: String,
    slug: String,
    title: &'a str,
    summary: String,
    reading_time: i64,
    tags: Vec<ViewTag<'a>>,
}

impl<'a> PostItem<'a> {
    pub(crate) fn from(post: &'a BlogPost, excerpt_length: usize) -> Self {
        let (date, time) = format_date_time(&post.created_at);
        PostItem {
            id: post.id.0.as_str(),
            date,
            time,
            long_date: format_long_date(&post.created_at),
            link: format!("/blog/{}", post.id),
            slug: post.slug(),
            title: post.title.as_str(),
            summary: post.excerpt(excerpt_length),
            reading_time: post.reading_time() as i64,
            tags: view_tags(&post.tags),
        }
    }
}

pub(crate) fn parse_template<'a>(name: &str, src: &'a str) -> Result<Template<'a>> {
    Template::new(src)
        .map_err(|e| BlogError::Template(format!("Error parsing {} template: {}", name, e)))
}
