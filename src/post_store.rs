use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use spdlog::{debug, info};

use crate::error::{BlogError, Result};
use crate::post::{normalize_tags, BlogPost, NewPost, PostId, PostUpdate};

/// Selection applied by [PostStore::list]
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn published_only() -> Self {
        PostFilter { published: Some(true), search: None }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        if let Some(published) = self.published {
            if post.published != published {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                post.title.to_lowercase().contains(&term) || post.content.to_lowercase().contains(&term)
            }
        }
    }
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostStats {
    pub total_blogs: usize,
    pub published_blogs: usize,
    pub draft_blogs: usize,
}

pub trait PostStore {
    fn get(&self, id: &PostId) -> Option<BlogPost>;
    /// Matching posts, newest first.
    fn list(&self, filter: &PostFilter) -> Vec<BlogPost>;
    fn create(&mut self, new_post: NewPost) -> Result<BlogPost>;
    fn update(&mut self, id: &PostId, update: PostUpdate) -> Result<BlogPost>;
    fn delete(&mut self, id: &PostId) -> Result<()>;
    fn stats(&self) -> PostStats;
}

/// Posts kept in memory and written back to a single JSON file after every change.
pub struct JsonFileStore {
    path: Option<PathBuf>,
    posts: HashMap<PostId, BlogPost>,
}

impl JsonFileStore {
    /// Loads `path`, starting empty when the file does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        let posts: Vec<BlogPost> = if path.exists() {
            let content = fs::read_to_string(path)?;
            if content.trim().is_empty() {
                vec![]
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            vec![]
        };

        info!("Loaded {} posts from {}", posts.len(), path.display());
        Ok(JsonFileStore {
            path: Some(path.to_path_buf()),
            posts: posts.into_iter().map(|p| (p.id.clone(), p)).collect(),
        })
    }

    pub fn in_memory() -> Self {
        JsonFileStore {
            path: None,
            posts: HashMap::new(),
        }
    }

    /// Writes `posts` to disk first and only then makes them the store content,
    /// so a failed write leaves the store as it was.
    fn commit(&mut self, posts: HashMap<PostId, BlogPost>) -> Result<()> {
        self.persist(&posts)?;
        self.posts = posts;
        Ok(())
    }

    fn persist(&self, posts: &HashMap<PostId, BlogPost>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut posts: Vec<&BlogPost> = posts.values().collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        let json = serde_json::to_string_pretty(&posts)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        debug!("Saved {} posts to {}", posts.len(), path.display());

        Ok(())
    }

    fn create_at(&mut self, new_post: NewPost, now: DateTime<Utc>) -> Result<BlogPost> {
        new_post.validate()?;

        let post = BlogPost {
            id: PostId::new_random(),
            title: new_post.title.trim().to_string(),
            content: new_post.content,
            published: new_post.published.unwrap_or(false),
            tags: new_post.tags.map(|t| normalize_tags(t.iter().map(String::as_str))).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let mut posts = self.posts.clone();
        posts.insert(post.id.clone(), post.clone());
        self.commit(posts)?;
        info!("Created post {} - {}", post.id, post.title);
        Ok(post)
    }

    fn update_at(&mut self, id: &PostId, update: PostUpdate, now: DateTime<Utc>) -> Result<BlogPost> {
        update.validate()?;

        let mut posts = self.posts.clone();
        let Some(post) = posts.get_mut(id) else {
            return Err(BlogError::NotFound(format!("post {}", id)));
        };

        if let Some(title) = update.title {
            post.title = title.trim().to_string();
        }
        if let Some(content) = update.content {
            post.content = content;
        }
        if let Some(published) = update.published {
            post.published = published;
        }
        if let Some(tags) = update.tags {
            post.tags = normalize_tags(tags.iter().map(String::as_str));
        }
        post.updated_at = now.max(post.created_at);

        let post = post.clone();
        self.commit(posts)?;
        info!("Updated post {} - {}", post.id, post.title);
        Ok(post)
    }
}

impl PostStore for JsonFileStore {
    fn get(&self, id: &PostId) -> Option<BlogPost> {
        self.posts.get(id).cloned()
    }

    fn list(&self, filter: &PostFilter) -> Vec<BlogPost> {
        let mut posts: Vec<BlogPost> = self.posts.values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        posts
    }

    fn create(&mut self, new_post: NewPost) -> Result<BlogPost> {
        self.create_at(new_post, Utc::now())
    }

    fn update(&mut self, id: &PostId, update: PostUpdate) -> Result<BlogPost> {
        self.update_at(id, update, Utc::now())
    }

    fn delete(&mut self, id: &PostId) -> Result<()> {
        let mut posts = self.posts.clone();
        if posts.remove(id).is_none() {
            return Err(BlogError::NotFound(format!("post {}", id)));
        }
        self.commit(posts)?;
        info!("Deleted post {}", id);
        Ok(())
    }

    fn stats(&self) -> PostStats {
        let total_blogs = self.posts.len();
        let published_blogs = self.posts.values().filter(|p| p.published).count();
        PostStats {
            total_blogs,
            published_blogs,
            draft_blogs: total_blogs - published_blogs,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use crate::test_data::POSTS_JSON;

    use super::*;

    fn new_post(title: &str, content: &str) -> NewPost {
        NewPost { title: title.to_string(), content: content.to_string(), ..Default::default() }
    }

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap()
    }

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-{}", uuid::Uuid::new_v4()));
        dir.join(name)
    }

    #[test]
    fn test_create_defaults() {
        let mut store = JsonFileStore::in_memory();
        let post = store.create(new_post(" Hello ", "# Hi")).unwrap();
        assert_eq!(post.title, "Hello");
        assert!(!post.published);
        assert!(post.tags.is_empty());
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(store.get(&post.id), Some(post));
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let mut store = JsonFileStore::in_memory();
        assert!(matches!(store.create(new_post("", "body")), Err(BlogError::InvalidInput(_))));
        assert!(matches!(store.create(new_post("title", "")), Err(BlogError::InvalidInput(_))));
        assert_eq!(store.stats().total_blogs, 0);
    }

    #[test]
    fn test_list_order_and_filters() {
        let mut store = JsonFileStore::in_memory();
        let old = store.create_at(new_post("Old Rust post", "about ownership"), date(1)).unwrap();
        let mid = store.create_at(NewPost { published: Some(true), ..new_post("Middle", "Tokio and RUST") }, date(2)).unwrap();
        let new = store.create_at(NewPost { published: Some(true), ..new_post("Newest", "gardening") }, date(3)).unwrap();

        let ids = |posts: Vec<BlogPost>| posts.into_iter().map(|p| p.id).collect::<Vec<_>>();

        assert_eq!(ids(store.list(&PostFilter::default())), vec![new.id.clone(), mid.id.clone(), old.id.clone()]);
        assert_eq!(ids(store.list(&PostFilter::published_only())), vec![new.id.clone(), mid.id.clone()]);
        assert_eq!(ids(store.list(&PostFilter { published: Some(false), search: None })), vec![old.id.clone()]);

        let search = PostFilter { published: None, search: Some("rust".to_string()) };
        assert_eq!(ids(store.list(&search)), vec![mid.id.clone(), old.id.clone()]);

        let blank = PostFilter { published: None, search: Some("  ".to_string()) };
        assert_eq!(store.list(&blank).len(), 3);
    }

    #[test]
    fn test_update_is_partial() {
        let mut store = JsonFileStore::in_memory();
        let post = store.create_at(new_post("Title", "body"), date(1)).unwrap();

        let update = PostUpdate { published: Some(true), tags: Some(vec!["a".to_string(), " a".to_string()]), ..Default::default() };
        let updated = store.update_at(&post.id, update, date(2)).unwrap();
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "body");
        assert!(updated.published);
        assert_eq!(updated.tags, ["a"]);
        assert_eq!(updated.updated_at, date(2));
        assert!(updated.was_updated());
    }

    #[test]
    fn test_update_never_before_creation() {
        let mut store = JsonFileStore::in_memory();
        let post = store.create_at(new_post("Title", "body"), date(5)).unwrap();
        let updated = store.update_at(&post.id, PostUpdate::default(), date(5) - Duration::hours(1)).unwrap();
        assert_eq!(updated.updated_at, updated.created_at);
    }

    #[test]
    fn test_missing_post() {
        let mut store = JsonFileStore::in_memory();
        let id = PostId::from("nope");
        assert!(store.get(&id).is_none());
        assert!(matches!(store.update(&id, PostUpdate::default()), Err(BlogError::NotFound(_))));
        assert!(matches!(store.delete(&id), Err(BlogError::NotFound(_))));
    }

    #[test]
    fn test_delete_and_stats() {
        let mut store = JsonFileStore::in_memory();
        let a = store.create(NewPost { published: Some(true), ..new_post("A", "a") }).unwrap();
        store.create(new_post("B", "b")).unwrap();
        store.create(new_post("C", "c")).unwrap();
        assert_eq!(store.stats(), PostStats { total_blogs: 3, published_blogs: 1, draft_blogs: 2 });

        store.delete(&a.id).unwrap();
        assert_eq!(store.stats(), PostStats { total_blogs: 2, published_blogs: 0, draft_blogs: 2 });
        assert!(store.get(&a.id).is_none());

        let json = serde_json::to_value(store.stats()).unwrap();
        assert_eq!(json["draftBlogs"], 2);
    }

    #[test]
    fn test_persist_and_reopen() {
        let path = temp_file("posts.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let post = store.create(new_post("Saved", "content")).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(&post.id), Some(post));
        assert!(!path.with_extension("json.tmp").exists());

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let path = temp_file("posts.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        let post = store.create(new_post("Saved", "content")).unwrap();

        // a directory where the temp file goes makes every write fail
        fs::create_dir_all(path.with_extension("json.tmp")).unwrap();

        assert!(matches!(store.create(new_post("Lost", "content")), Err(BlogError::Storage(_))));
        assert_eq!(store.stats().total_blogs, 1);

        let update = PostUpdate { title: Some("Renamed".to_string()), ..Default::default() };
        assert!(matches!(store.update(&post.id, update), Err(BlogError::Storage(_))));
        assert_eq!(store.get(&post.id).unwrap().title, "Saved");

        assert!(matches!(store.delete(&post.id), Err(BlogError::Storage(_))));
        assert_eq!(store.get(&post.id), Some(post.clone()));

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list(&PostFilter::default()), vec![post]);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_open_existing_file() {
        let path = temp_file("posts.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, POSTS_JSON).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.stats(), PostStats { total_blogs: 2, published_blogs: 1, draft_blogs: 1 });
        let post = store.get(&PostId::from("a63bd715-a3fe-4788-b0e1-2a3153778544")).unwrap();
        assert_eq!(post.tags, ["career", "engineering"]);

        let draft = store.get(&PostId::from("0f5f8a36-2a38-4c57-a4b0-5f1d3c9e7b21")).unwrap();
        assert!(draft.tags.is_empty());

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
