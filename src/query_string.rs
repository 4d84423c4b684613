use std::collections::HashMap;

use crate::post_store::PostFilter;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get_page(&self) -> u32 {
        let val = self.items.get("page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        if val == 0 { return 1; }
        val
    }

    /// Search term, `None` when missing or blank
    pub fn get_search(&self) -> Option<String> {
        self.items.get("search")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// `published` is only true for the literal `true`. Missing means no filter.
    pub fn get_published(&self) -> Option<bool> {
        self.items.get("published").map(|v| v == "true")
    }

    pub fn to_filter(&self) -> PostFilter {
        PostFilter {
            published: self.get_published(),
            search: self.get_search(),
        }
    }
}
