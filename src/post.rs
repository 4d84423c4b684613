use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::toc::slugify;
use crate::content::to_plain_text;
use crate::error::{BlogError, Result};
use crate::text_utils::{reading_time, truncate_chars};

/// Everything before this line is the post summary
pub const MORE_TAG: &str = "<!-- more -->";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new_random() -> PostId {
        PostId(uuid::Uuid::new_v4().to_string())
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        PostId(id.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Display for BlogPost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, created={}, published={}\ntitle={}\ncontent:\n{}",
               self.id,
               self.created_at,
               self.published,
               self.title,
               self.content
        )
    }
}

impl BlogPost {
    /// Title slug; posts whose title has no slug characters fall back to the id.
    pub fn slug(&self) -> String {
        let slug = slugify(&self.title);
        if slug.is_empty() {
            self.id.to_string()
        } else {
            slug
        }
    }

    /// Plain-text summary: content up to the `<!-- more -->` line, stripped of
    /// markdown and cut at `max_chars`.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let summary = match self.content.find(MORE_TAG) {
            Some(idx) => &self.content[..idx],
            None => self.content.as_str(),
        };
        truncate_chars(&to_plain_text(summary), max_chars)
    }

    pub fn reading_time(&self) -> usize {
        reading_time(&self.content)
    }

    pub fn was_updated(&self) -> bool {
        self.updated_at > self.created_at
    }
}

/// Payload of a create request.
#[derive(Deserialize, Debug, Default)]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl NewPost {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(BlogError::InvalidInput("Title and content are required".to_string()));
        }
        Ok(())
    }
}

/// Partial update, absent fields are left alone.
#[derive(Deserialize, Debug, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl PostUpdate {
    pub fn validate(&self) -> Result<()> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.content) {
            return Err(BlogError::InvalidInput("Title and content cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Parses the comma separated tag input of the admin form.
pub fn parse_tags(tags: &str) -> Vec<String> {
    normalize_tags(tags.split(','))
}

/// Trims tags and drops empty and repeated ones, keeping the first occurrence.
pub fn normalize_tags<'a, I: IntoIterator<Item = &'a str>>(tags: I) -> Vec<String> {
    let mut res: Vec<String> = vec![];
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !res.iter().any(|t| t == tag) {
            res.push(tag.to_string());
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::test_data::POST_DATA_MD;

    use super::*;

    fn post(title: &str, content: &str) -> BlogPost {
        let created = Utc.with_ymd_and_hms(2022, 4, 2, 12, 5, 0).unwrap();
        BlogPost {
            id: PostId::from("a63bd715"),
            title: title.to_string(),
            content: content.to_string(),
            published: true,
            tags: vec![],
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(post("Hello, World!", "").slug(), "hello-world");
        assert_eq!(post("  Rust & WebAssembly  ", "").slug(), "rust-webassembly");
        assert_eq!(post("???", "").slug(), "a63bd715");
    }

    #[test]
    fn test_excerpt_stops_at_more_tag() {
        let post = post("t", POST_DATA_MD);
        assert_eq!(post.excerpt(1000), "What I learned after 20+ years of software development \
How to be a great software engineer? \
Someone asked me this question today and I didn't have an answer. \
After thinking for a while, I came up with a list of what I try to do myself.");
    }

    #[test]
    fn test_excerpt_truncated() {
        let post = post("t", "Some **bold** words and `code` here");
        assert_eq!(post.excerpt(14), "Some bold word...");
        assert_eq!(post.excerpt(150), "Some bold words and code here");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(post("t", "").reading_time(), 0);
        assert_eq!(post("t", "a few words").reading_time(), 1);
        assert_eq!(post("t", &"lorem ".repeat(450)).reading_time(), 3);
    }

    #[test]
    fn test_serde_shape() {
        let post = post("Title", "body");
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], "a63bd715");
        assert_eq!(json["createdAt"], "2022-04-02T12:05:00Z");
        assert!(json.get("created_at").is_none());

        let back: BlogPost = serde_json::from_value(json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn test_new_post_validation() {
        let new_post = NewPost { title: "t".to_string(), content: " ".to_string(), ..Default::default() };
        match new_post.validate() {
            Err(BlogError::InvalidInput(msg)) => assert_eq!(msg, "Title and content are required"),
            other => panic!("unexpected {:?}", other),
        }
        let new_post = NewPost { title: "t".to_string(), content: "c".to_string(), ..Default::default() };
        assert!(new_post.validate().is_ok());
    }

    #[test]
    fn test_update_validation() {
        assert!(PostUpdate::default().validate().is_ok());
        let update = PostUpdate { title: Some("".to_string()), ..Default::default() };
        assert!(matches!(update.validate(), Err(BlogError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("rust, web ,, rust,  async"), ["rust", "web", "async"]);
        assert!(parse_tags("").is_empty());
    }
}
