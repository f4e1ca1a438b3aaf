//! List posts from the CMS

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::ContentSource;
use crate::content::PostSummary;
use crate::helpers::{format_publication_date, locale_for, timezone_for};
use crate::paginator::Paginator;
use crate::Blog;

/// Print the first page of posts, or every page with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let output = list_posts(blog, blog.content_source()?, all).await?;
    print!("{}", output);
    Ok(())
}

/// Build the listing text for `run`
pub async fn list_posts(
    blog: &Blog,
    source: Arc<dyn ContentSource>,
    all: bool,
) -> Result<String> {
    let paginator = Paginator::start(source)
        .await
        .context("Failed to fetch posts")?;

    if all {
        let pages = paginator.load_all().await.context("Failed to fetch posts")?;
        tracing::debug!("Loaded {} additional pages", pages.len());
    }

    Ok(format_listing(blog, &paginator.items(), paginator.has_more()))
}

fn format_listing(blog: &Blog, posts: &[PostSummary], has_more: bool) -> String {
    let config = &blog.config;
    let locale = locale_for(&config.language);
    let zone = timezone_for(&config.timezone);

    let mut output = format!("Posts ({}):\n", posts.len());
    for post in posts {
        let date = format_publication_date(
            post.published_at.as_ref(),
            &config.date_format,
            locale,
            zone,
        );
        output.push_str(&format!(
            "  {:<11} - {} [{}] by {}\n",
            date, post.title, post.uid, post.author
        ));
    }
    if has_more {
        output.push_str("More posts available, use --all to list everything\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{summary, StaticSource};
    use crate::config::SiteConfig;
    use crate::content::{Cursor, PageResult};

    fn source() -> Arc<dyn ContentSource> {
        let first = PageResult::new(vec![summary("a")], Cursor::new("X"));
        Arc::new(StaticSource::new(first).with_page(
            "X",
            PageResult::new(vec![summary("b")], None),
        ))
    }

    #[tokio::test]
    async fn test_first_page_only() {
        let blog = Blog::with_config(".", SiteConfig::default());
        let output = list_posts(&blog, source(), false).await.unwrap();
        assert!(output.starts_with("Posts (1):"));
        assert!(output.contains("25 mar 2021 - Post a [a] by Joseph Oliveira"));
        assert!(output.contains("--all"));
    }

    #[tokio::test]
    async fn test_all_pages() {
        let blog = Blog::with_config(".", SiteConfig::default());
        let output = list_posts(&blog, source(), true).await.unwrap();
        assert!(output.starts_with("Posts (2):"));
        assert!(output.contains("[b]"));
        assert!(!output.contains("--all"));
    }
}
