use ramhorns::Template;

use crate::error::Result;
use crate::post::BlogPost;
use crate::view::{parse_template, view_tags, PostItem, ViewTag};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    post_list: Vec<PostItem<'a>>,
    tags: Vec<ViewTag<'a>>,
    page_list: Vec<ViewPagination<'a>>,
    show_pagination: bool,
    search: &'a str,
    has_search: bool,
    empty: bool,
}

#[derive(ramhorns::Content)]
struct ViewPagination<'a> {
    current: bool,
    number: u32,
    search: &'a str,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
    pub page_count: u32,
    pub excerpt_length: usize,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str, page_count: u32, excerpt_length: usize) -> Result<ListRenderer> {
        let template = parse_template("list", list_tpl_src)?;

        Ok(ListRenderer {
            template,
            page_count,
            excerpt_length,
        })
    }

    /// `tags` are expected ordered by frequency.
    pub fn render(&self, posts: &[BlogPost], cur_page: u32, tags: &[String], search: Option<&str>) -> String {
        let post_list: Vec<PostItem> = posts.iter()
            .map(|post| PostItem::from(post, self.excerpt_length))
            .collect();

        let search = search.unwrap_or("");
        let page_list: Vec<ViewPagination> = (1..=self.page_count)
            .map(|number| ViewPagination {
                current: number == cur_page,
                number,
                search,
            })
            .collect();

        self.template.render(&ListPage {
            empty: post_list.is_empty(),
            post_list,
            tags: view_tags(tags),
            page_list,
            show_pagination: self.page_count > 1,
            search,
            has_search: !search.is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::post::PostId;

    use super::*;

    fn post(id: &str, title: &str, content: &str) -> BlogPost {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        BlogPost {
            id: PostId::from(id),
            title: title.to_string(),
            content: content.to_string(),
            published: true,
            tags: vec!["rust".to_string()],
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_render_list() {
        let template_src = "{{#post_list}}[{{link}}|{{title}}|{{date}}|{{summary}}|{{reading_time}}|{{#tags}}{{tag}}{{/tags}}]{{/post_list}}\
{{#show_pagination}}{{#page_list}}({{#current}}*{{/current}}{{number}}){{/page_list}}{{/show_pagination}}";
        let renderer = ListRenderer::new(template_src, 3, 20).unwrap();
        let posts = vec![post("p1", "<First>", "Some **bold** text that is long enough")];

        let res = renderer.render(&posts, 2, &[], None);
        assert_eq!(res, "[/blog/p1|&lt;First&gt;|2024-01-02|Some bold text that...|1|rust](1)(*2)(3)");
    }

    #[test]
    fn test_render_empty_search() {
        let template_src = "{{#has_search}}Results for {{search}}{{/has_search}}{{#empty}} - nothing{{/empty}}{{#show_pagination}}pages{{/show_pagination}}";
        let renderer = ListRenderer::new(template_src, 1, 150).unwrap();

        let res = renderer.render(&[], 1, &[], Some("<x>"));
        assert_eq!(res, "Results for &lt;x&gt; - nothing");
    }
}
