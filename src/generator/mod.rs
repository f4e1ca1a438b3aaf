//! Generator module - renders the CMS content to static HTML using built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Locale;
use chrono_tz::Tz;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tera::Context;

use crate::api::ContentSource;
use crate::content::{PostDetail, PostSummary, PrismicRichText, ReadingTime, RichTextRenderer};
use crate::helpers::{
    date_xml, format_publication_date, full_url_for, locale_for, meta_generator, page_data_path,
    post_path, timezone_for, url_for, PAGE_DATA_DIR,
};
use crate::i18n::I18n;
use crate::paginator::Paginator;
use crate::templates::{
    PageFragment, PostCardData, PostPageData, SectionData, SiteData, TemplateRenderer,
    Translations, STYLESHEET,
};
use crate::Blog;

/// Summary of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts in the listing, duplicates included
    pub listed: usize,
    /// Listing pages written (index plus fragments)
    pub pages: usize,
    /// Post pages written
    pub posts: usize,
    /// Listed uids the CMS no longer resolves
    pub missing: Vec<String>,
    /// Listed uids whose fetch failed
    pub failed: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    rich_text: PrismicRichText,
    reading_time: ReadingTime,
    translations: Translations,
    i18n: I18n,
    locale: Locale,
    zone: Tz,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        let config = &blog.config;
        let mut i18n = I18n::new(&config.language);
        i18n.load_languages(blog.base_dir.join(&config.languages_dir))?;

        Ok(Self {
            blog: blog.clone(),
            source,
            renderer: TemplateRenderer::new()?,
            rich_text: PrismicRichText,
            reading_time: ReadingTime::new(
                config.reading.words_per_minute,
                config.reading.default_minutes,
            ),
            translations: i18n.get_all_translations(),
            i18n,
            locale: locale_for(&config.language),
            zone: timezone_for(&config.timezone),
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;
        write_file(&self.blog.public_dir.join("css/style.css"), STYLESHEET)?;

        // Walk the whole listing, remembering where each page starts
        let paginator = Paginator::start(self.source.clone())
            .await
            .context("Failed to fetch the first listing page")?;
        let first_page_len = paginator.len();
        let page_sizes = paginator
            .load_all()
            .await
            .context("Failed to fetch the listing")?;
        let items = paginator.items();
        tracing::info!(
            "Fetched {} posts in {} pages",
            items.len(),
            page_sizes.len() + 1
        );

        let pages = split_pages(&items, first_page_len, &page_sizes);
        self.generate_listing(&pages)?;

        let mut report = GenerateReport {
            listed: items.len(),
            pages: pages.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        for summary in &items {
            if !seen.insert(summary.uid.as_str()) {
                continue;
            }
            match self.build_post_page(&summary.uid).await {
                Ok(Some(_)) => report.posts += 1,
                Ok(None) => {
                    tracing::warn!("Post {:?} is listed but could not be found", summary.uid);
                    report.missing.push(summary.uid.clone());
                }
                Err(e) => {
                    tracing::error!("Failed to build post {:?}: {:#}", summary.uid, e);
                    report.failed.push(summary.uid.clone());
                }
            }
        }

        let not_found = self.render_not_found()?;
        write_file(&self.blog.public_dir.join("404.html"), &not_found)?;

        Ok(report)
    }

    /// Fetch one post, render it and write `post/<uid>/index.html`.
    ///
    /// Returns the page, or `None` when the CMS has no such post.
    pub async fn build_post_page(&self, uid: &str) -> Result<Option<String>> {
        let Some(post) = self
            .source
            .fetch_post_by_uid(uid)
            .await
            .with_context(|| format!("Failed to fetch post {:?}", uid))?
        else {
            return Ok(None);
        };

        let html = self.render_post(&post)?;
        let output_path = self
            .blog
            .public_dir
            .join(post_path(&post.uid))
            .join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(Some(html))
    }

    /// Render a post page
    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let reading_minutes = self
            .reading_time
            .estimate(Some(post.sections.as_slice()), &self.rich_text);

        let data = PostPageData {
            uid: post.uid.clone(),
            permalink: full_url_for(&self.blog.config, &post_path(&post.uid)),
            title: post.title.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            date: self.format_date(post.published_at.as_ref()),
            datetime: post
                .published_at
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
            reading_time: self.i18n.get_count("reading_time", reading_minutes),
            reading_minutes,
            sections: post
                .sections
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    html: self.rich_text.to_safe_html(&section.body),
                })
                .collect(),
        };

        let mut context = self.create_base_context();
        context.insert("post", &data);
        self.renderer.render("post.html", &context)
    }

    /// Render the page shown for unknown posts
    pub fn render_not_found(&self) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.create_base_context())
    }

    /// Write `index.html` for the first page and a JSON fragment for every
    /// following page
    fn generate_listing(&self, pages: &[&[PostSummary]]) -> Result<()> {
        let fragment_dir = self.blog.public_dir.join(PAGE_DATA_DIR);
        if fragment_dir.exists() {
            fs::remove_dir_all(&fragment_dir)?;
        }

        let next_url = |page: usize| {
            (page < pages.len()).then(|| url_for(&self.blog.config, &page_data_path(page)))
        };

        let first: Vec<PostCardData> = pages
            .first()
            .map(|items| self.build_cards(items))
            .unwrap_or_default();
        let mut context = self.create_base_context();
        context.insert("posts", &first);
        context.insert("next_page", &next_url(1));
        let html = self.renderer.render("index.html", &context)?;
        write_file(&self.blog.public_dir.join("index.html"), &html)?;

        for (page, items) in pages.iter().enumerate().skip(1) {
            let cards = self.build_cards(items);
            let mut context = Context::new();
            context.insert("posts", &cards);
            let fragment = PageFragment {
                html: self.renderer.render("partials/post_cards.html", &context)?,
                items: cards,
                next: next_url(page + 1),
            };

            let output_path = self.blog.public_dir.join(page_data_path(page));
            write_file(&output_path, &serde_json::to_string(&fragment)?)?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        tracing::info!("Generated listing with {} pages", pages.len());
        Ok(())
    }

    fn build_cards(&self, items: &[PostSummary]) -> Vec<PostCardData> {
        items
            .iter()
            .map(|post| PostCardData {
                uid: post.uid.clone(),
                url: url_for(&self.blog.config, &post_path(&post.uid)),
                title: post.title.clone(),
                subtitle: post.subtitle.clone(),
                author: post.author.clone(),
                date: self.format_date(post.published_at.as_ref()),
                datetime: post
                    .published_at
                    .as_ref()
                    .map(date_xml)
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn format_date(&self, date: Option<&chrono::DateTime<chrono::Utc>>) -> String {
        format_publication_date(date, &self.blog.config.date_format, self.locale, self.zone)
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let site = SiteData {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            author: config.author.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: url_for(config, ""),
            stylesheet: url_for(config, "css/style.css"),
            generator: meta_generator(),
        };

        let mut context = Context::new();
        context.insert("site", &site);
        context.insert("t", &self.translations);
        context
    }
}

/// Cut the flat listing back into the pages it was fetched in
fn split_pages<'a>(
    items: &'a [PostSummary],
    first_page_len: usize,
    page_sizes: &[usize],
) -> Vec<&'a [PostSummary]> {
    let mut pages = Vec::with_capacity(page_sizes.len() + 1);
    let mut start = 0;
    for size in std::iter::once(first_page_len).chain(page_sizes.iter().copied()) {
        let end = (start + size).min(items.len());
        pages.push(&items[start..end]);
        start = end;
    }
    pages
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{detail, summary, StaticSource};
    use crate::config::SiteConfig;
    use crate::content::{Cursor, PageResult};

    fn page(uids: &[&str], next: &str) -> PageResult {
        PageResult::new(uids.iter().map(|u| summary(u)).collect(), Cursor::new(next))
    }

    fn blog(dir: &Path) -> Blog {
        Blog::with_config(dir, SiteConfig::default())
    }

    #[test]
    fn test_split_pages() {
        let items: Vec<_> = ["a", "b", "c", "d"].iter().map(|u| summary(u)).collect();
        let pages = split_pages(&items, 2, &[1, 1]);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[2][0].uid, "d");
    }

    #[tokio::test]
    async fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource::new(page(&["a", "b"], "X"))
            .with_page("X", page(&["c"], ""))
            .with_post(detail("a", "one two three"))
            .with_post(detail("b", "<b>four</b>"));
        let blog = blog(dir.path());
        let generator = Generator::new(&blog, Arc::new(source)).unwrap();

        let report = generator.generate().await.unwrap();
        assert_eq!(report.listed, 3);
        assert_eq!(report.pages, 2);
        assert_eq!(report.posts, 2);
        assert_eq!(report.missing, vec!["c".to_string()]);

        let public = &blog.public_dir;
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("/post/a/"));
        assert!(index.contains("/post/b/"));
        assert!(!index.contains("/post/c/"));
        assert!(index.contains(r#"data-next="/page-data/1.json""#));
        assert!(index.contains("25 mar 2021"));

        let fragment: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("page-data/1.json")).unwrap())
                .unwrap();
        assert_eq!(fragment["items"][0]["uid"], "c");
        assert!(fragment["html"].as_str().unwrap().contains("/post/c/"));
        assert!(fragment["next"].is_null());

        let post = fs::read_to_string(public.join("post/b/index.html")).unwrap();
        assert!(post.contains("&lt;b&gt;four&lt;/b&gt;"));
        assert!(post.contains("1 min"));
        assert!(public.join("404.html").exists());
        assert!(public.join("css/style.css").exists());
    }

    #[tokio::test]
    async fn test_single_page_listing_has_no_fragments() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("public/page-data/7.json");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "{}").unwrap();

        let source = StaticSource::new(page(&["a"], "")).with_post(detail("a", "text"));
        let blog = blog(dir.path());
        let generator = Generator::new(&blog, Arc::new(source)).unwrap();

        let report = generator.generate().await.unwrap();
        assert_eq!(report.pages, 1);
        assert!(!stale.exists());
        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(!index.contains("load-more"));
    }

    #[tokio::test]
    async fn test_failed_post_does_not_abort_build() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource::new(page(&["a", "b"], ""))
            .with_post(detail("a", "text"))
            .with_failing_post("b");
        let blog = blog(dir.path());
        let generator = Generator::new(&blog, Arc::new(source)).unwrap();

        let report = generator.generate().await.unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.failed, vec!["b".to_string()]);
        assert!(report.missing.is_empty());
        assert!(blog.public_dir.join("post/a/index.html").exists());
        assert!(!blog.public_dir.join("post/b/index.html").exists());
        assert!(blog.public_dir.join("404.html").exists());
    }

    #[tokio::test]
    async fn test_render_post_reading_time() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path());
        let generator = Generator::new(&blog, Arc::new(StaticSource::default())).unwrap();

        let words = vec!["word"; 200].join(" ");
        let html = generator.render_post(&detail("long", &words)).unwrap();
        assert!(html.contains("2 min"));
        assert!(html.contains("Introduction"));
        assert!(html.contains("https://images.prismic.io/banner.png"));
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost:4000/post/long/">"#));
    }
}
