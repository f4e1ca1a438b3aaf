//! Show a single post

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use crate::api::ContentSource;
use crate::content::reading_time::count_words;
use crate::content::{PostDetail, PrismicRichText, ReadingTime, RichTextRenderer};
use crate::helpers::{format_publication_date, locale_for, timezone_for};
use crate::Blog;

/// Print a post's metadata, reading time and outline
pub async fn run(blog: &Blog, uid: &str) -> Result<()> {
    let output = show_post(blog, blog.content_source()?, uid).await?;
    print!("{}", output);
    Ok(())
}

/// Build the text printed by `run`
pub async fn show_post(blog: &Blog, source: Arc<dyn ContentSource>, uid: &str) -> Result<String> {
    let post = source
        .fetch_post_by_uid(uid)
        .await
        .with_context(|| format!("Failed to fetch post {:?}", uid))?;

    match post {
        Some(post) => Ok(describe(blog, &post)),
        None => bail!("No post with uid {:?}", uid),
    }
}

fn describe(blog: &Blog, post: &PostDetail) -> String {
    let config = &blog.config;
    let renderer = PrismicRichText;
    let minutes = ReadingTime::new(
        config.reading.words_per_minute,
        config.reading.default_minutes,
    )
    .estimate(Some(post.sections.as_slice()), &renderer);
    let date = format_publication_date(
        post.published_at.as_ref(),
        &config.date_format,
        locale_for(&config.language),
        timezone_for(&config.timezone),
    );

    let mut output = format!("{}\n", post.title);
    output.push_str(&format!("  uid:          {}\n", post.uid));
    output.push_str(&format!("  author:       {}\n", post.author));
    output.push_str(&format!("  published:    {}\n", date));
    output.push_str(&format!("  reading time: {} min\n", minutes));
    if !post.banner_url.is_empty() {
        output.push_str(&format!("  banner:       {}\n", post.banner_url));
    }
    output.push_str(&format!("Sections ({}):\n", post.sections.len()));
    for section in &post.sections {
        let words = count_words(&renderer.to_plain_text(&section.body));
        output.push_str(&format!("  {} ({} words)\n", section.heading, words));
    }
    output
}
