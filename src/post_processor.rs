use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ntex::web;
use ntex_files::NamedFile;
use spdlog::info;

use crate::config::Config;
use crate::content::content_renderer::RenderOptions;
use crate::content::{render, RenderedDocument};
use crate::content_cache::{ContentCache, Expire, RenderKey};
use crate::error::{BlogError, Result};
use crate::paginator::Paginator;
use crate::post::{BlogPost, PostId};
use crate::post_store::{PostFilter, PostStore};
use crate::query_string::QueryString;
use crate::view::index_renderer::{Activity, IndexRenderer};
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::{PostRenderer, TocPolicy};

pub const INDEX_TEMPLATE: &str = "index.tpl";
pub const LIST_TEMPLATE: &str = "postlist.tpl";
pub const VIEW_TEMPLATE: &str = "view.tpl";

const LATEST_POST_COUNT: usize = 3;

pub fn read_template(tpl_dir: &Path, file_name: &str) -> Result<String> {
    let full_path = tpl_dir.join(file_name);
    std::fs::read_to_string(&full_path)
        .map_err(|e| BlogError::Template(format!("Error loading template {}: {}", full_path.display(), e)))
}

pub fn get_file(root_dir: &Path, file: &str) -> std::result::Result<NamedFile, web::Error> {
    if file.contains("..") || file.starts_with('/') {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = root_dir.join(file);
    Ok(NamedFile::open(file_path)?)
}

/// Looks a post up as seen by the caller: drafts only exist for the admin.
pub fn find_post(store: &dyn PostStore, id: &PostId, is_admin: bool) -> Result<BlogPost> {
    match store.get(id) {
        Some(post) if post.published || is_admin => Ok(post),
        _ => Err(BlogError::NotFound(format!("post {}", id))),
    }
}

/// Renders the post content, reusing the cached document of the same post version.
pub fn rendered_document(cache: &mut ContentCache<RenderedDocument>, post: &BlogPost,
                         options: &RenderOptions) -> Result<Arc<RenderedDocument>> {
    cache.get_or(RenderKey::of(post), Expire::Never, || {
        info!("Rendering post {} updated at {}", post.id, post.updated_at);
        let document = render(Some(&post.content), options);
        document.verify_anchors()?;
        Ok(document)
    })
}

/// Tags ordered by how many posts use them, then by name.
pub fn collect_tags(posts: &[BlogPost]) -> Vec<String> {
    let mut tag_map: HashMap<&str, u32> = HashMap::new();
    for post in posts {
        for tag in post.tags.iter() {
            *tag_map.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tag_list: Vec<(&str, u32)> = tag_map.into_iter().collect();
    tag_list.sort_by(|(ka, va), (kb, vb)| vb.cmp(va).then_with(|| ka.cmp(kb)));
    tag_list.into_iter().map(|(k, _)| k.to_string()).collect()
}

pub fn render_index(config: &Config, store: &dyn PostStore, now: DateTime<Utc>) -> Result<String> {
    let index_tpl_src = read_template(&config.paths.template_dir, INDEX_TEMPLATE)?;
    let renderer = IndexRenderer::new(&index_tpl_src, config.defaults.excerpt_length)?;

    let published = store.list(&PostFilter::published_only());
    let latest = &published[..published.len().min(LATEST_POST_COUNT)];
    let activity = Activity {
        activity_start_year: config.personal.activity_start_year,
        blog_start_date: config.personal.blog_start_date.into(),
    };

    Ok(renderer.render(&config.profile, activity, store.stats(), latest, now))
}

/// Published posts matching the query's search term, one page at a time.
pub fn render_post_list(config: &Config, store: &dyn PostStore, query: &QueryString) -> Result<String> {
    let search = query.get_search();
    let posts = store.list(&PostFilter {
        published: Some(true),
        search: search.clone(),
    });
    let tags = collect_tags(&posts);

    let paginator = Paginator::from(&posts, config.defaults.page_size);
    let cur_page = paginator.clamp_page(query.get_page());
    let page: &[BlogPost] = if paginator.page_count() == 0 {
        &[]
    } else {
        paginator.get_page(cur_page).map_err(BlogError::InvalidInput)?
    };

    let template_src = read_template(&config.paths.template_dir, LIST_TEMPLATE)?;
    let renderer = ListRenderer::new(&template_src, paginator.page_count(), config.defaults.excerpt_length)?;

    Ok(renderer.render(page, cur_page, &tags, search.as_deref()))
}

pub fn render_post_page(config: &Config, cache: &mut ContentCache<RenderedDocument>, post: &BlogPost) -> Result<String> {
    let document = rendered_document(cache, post, &config.render.options())?;

    let template_src = read_template(&config.paths.template_dir, VIEW_TEMPLATE)?;
    let renderer = PostRenderer::new(&template_src, TocPolicy {
        min_headings: config.defaults.toc_min_headings,
        max_entries: config.defaults.toc_max_entries,
    })?;

    Ok(renderer.render(post, &document))
}
