//! Post and listing page models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::rich_text::RichText;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Unique identifier, also the URL slug
    pub uid: String,

    /// First publication date (absent for unpublished previews)
    pub published_at: Option<DateTime<Utc>>,

    /// Post title
    pub title: String,

    /// Short line shown under the title
    pub subtitle: String,

    /// Author display name
    pub author: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub author: String,

    /// Banner image URL, empty when the post has none
    pub banner_url: String,

    /// Body sections in display order
    pub sections: Vec<Section>,
}

/// A headed block of rich text within a post body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: RichText,
}

/// Opaque token identifying the next page of a listing.
///
/// Only the content source that issued it knows how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw token. Empty tokens mean "no further pages" and yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<PostSummary>,
    pub next_cursor: Option<Cursor>,
}

impl PageResult {
    pub fn new(items: Vec<PostSummary>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cursor_means_no_more_pages() {
        assert!(Cursor::new("").is_none());
        assert!(Cursor::new("  ").is_none());
        assert_eq!(Cursor::new("X").map(|c| c.to_string()), Some("X".to_string()));
    }

    #[test]
    fn test_page_has_more() {
        assert!(!PageResult::default().has_more());
        assert!(PageResult::new(Vec::new(), Cursor::new("next")).has_more());
    }
}
