//! Content API: the `ContentSource` seam and its Prismic implementation

mod error;
mod prismic;
mod wire;

use async_trait::async_trait;
use std::sync::Arc;

use crate::content::{Cursor, PageResult, PostDetail};

pub use error::FetchError;
pub use prismic::PrismicClient;

/// Read-only access to the posts held by a CMS.
///
/// All operations are idempotent reads.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of the post listing
    async fn fetch_initial_page(&self) -> Result<PageResult, FetchError>;

    /// The page identified by a cursor from an earlier page
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, FetchError>;

    /// A single post, or `None` when no post has this uid
    async fn fetch_post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError>;
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    async fn fetch_initial_page(&self) -> Result<PageResult, FetchError> {
        (**self).fetch_initial_page().await
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, FetchError> {
        (**self).fetch_page(cursor).await
    }

    async fn fetch_post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError> {
        (**self).fetch_post_by_uid(uid).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory content source for tests

    use super::*;
    use crate::content::{PostSummary, RichText, RichTextBlock, Section};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages keyed by cursor and posts keyed by uid
    #[derive(Default)]
    pub struct StaticSource {
        pub first: PageResult,
        pub pages: HashMap<String, PageResult>,
        pub posts: HashMap<String, PostDetail>,
        pub failing_posts: Vec<String>,
        pub failing_cursors: Mutex<Vec<String>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn new(first: PageResult) -> Self {
            Self {
                first,
                ..Default::default()
            }
        }

        pub fn with_page(mut self, cursor: &str, page: PageResult) -> Self {
            self.pages.insert(cursor.to_string(), page);
            self
        }

        pub fn with_post(mut self, post: PostDetail) -> Self {
            self.posts.insert(post.uid.clone(), post);
            self
        }

        /// Make every lookup of `uid` fail
        pub fn with_failing_post(mut self, uid: &str) -> Self {
            self.failing_posts.push(uid.to_string());
            self
        }

        /// Make the next fetch of `cursor` fail once
        pub fn fail_once(&self, cursor: &str) {
            if let Ok(mut failing) = self.failing_cursors.lock() {
                failing.push(cursor.to_string());
            }
        }
    }

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch_initial_page(&self) -> Result<PageResult, FetchError> {
            Ok(self.first.clone())
        }

        async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, FetchError> {
            if let Ok(mut requested) = self.requested.lock() {
                requested.push(cursor.to_string());
            }
            if let Ok(mut failing) = self.failing_cursors.lock() {
                if let Some(pos) = failing.iter().position(|c| c == cursor.as_str()) {
                    failing.remove(pos);
                    return Err(FetchError::Status {
                        status: 503,
                        url: cursor.to_string(),
                    });
                }
            }
            self.pages
                .get(cursor.as_str())
                .cloned()
                .ok_or_else(|| FetchError::InvalidCursor(cursor.to_string()))
        }

        async fn fetch_post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError> {
            if self.failing_posts.iter().any(|u| u == uid) {
                return Err(FetchError::Status {
                    status: 503,
                    url: uid.to_string(),
                });
            }
            Ok(self.posts.get(uid).cloned())
        }
    }

    pub fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            published_at: Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).single(),
            title: format!("Post {}", uid),
            subtitle: format!("About {}", uid),
            author: "Joseph Oliveira".to_string(),
        }
    }

    pub fn detail(uid: &str, body: &str) -> PostDetail {
        PostDetail {
            uid: uid.to_string(),
            published_at: Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).single(),
            title: format!("Post {}", uid),
            author: "Joseph Oliveira".to_string(),
            banner_url: "https://images.prismic.io/banner.png".to_string(),
            sections: vec![Section {
                heading: "Introduction".to_string(),
                body: RichText(vec![RichTextBlock::paragraph(body)]),
            }],
        }
    }
}
