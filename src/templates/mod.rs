//! Built-in spacetraveling theme templates using Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Theme stylesheet, written to `css/style.css`
pub const STYLESHEET: &str = include_str!("spacetraveling/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Text values are escaped explicitly; rendered rich text is inserted as-is
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("not_found.html", include_str!("spacetraveling/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("spacetraveling/partials/post_card.html"),
            ),
            (
                "partials/post_cards.html",
                include_str!("spacetraveling/partials/post_cards.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub stylesheet: String,
    pub generator: String,
}

/// A post in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
}

/// A post on its own page
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    /// Absolute URL of the page
    pub permalink: String,
    pub title: String,
    pub author: String,
    pub banner_url: String,
    pub date: String,
    pub datetime: String,
    pub reading_time: String,
    pub reading_minutes: u32,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Rendered rich text
    pub html: String,
}

/// JSON document fetched by the "load more" button
#[derive(Debug, Clone, Serialize)]
pub struct PageFragment {
    pub items: Vec<PostCardData>,
    /// Rendered cards, appended to the listing as-is
    pub html: String,
    /// URL of the following fragment
    pub next: Option<String>,
}

/// Interface strings keyed by translation key
pub type Translations = HashMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "spacetraveling".to_string(),
            subtitle: "Blog de tecnologia".to_string(),
            author: "Joseph & Co".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            root: "/".to_string(),
            stylesheet: "/css/style.css".to_string(),
            generator: String::new(),
        }
    }

    fn card() -> PostCardData {
        PostCardData {
            uid: "hooks".to_string(),
            url: "/post/hooks/".to_string(),
            title: "Hooks & <Effects>".to_string(),
            subtitle: "Sync".to_string(),
            author: "Joseph".to_string(),
            date: "25 mar 2021".to_string(),
            datetime: "2021-03-25T19:25:28.000+00:00".to_string(),
        }
    }

    fn translations() -> Translations {
        crate::i18n::I18n::new("pt-BR").get_all_translations()
    }

    #[test]
    fn test_index_with_load_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("t", &translations());
        context.insert("posts", &vec![card()]);
        context.insert("next_page", &Some("/page-data/1.json"));

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"href="/post/hooks/""#));
        assert!(html.contains("Hooks &amp; &lt;Effects&gt;"));
        assert!(html.contains(r#"data-next="/page-data/1.json""#));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains(r#"data-loading="Carregando...""#));
        assert!(html.contains(r#"<p class="subtitle">Blog de tecnologia</p>"#));
        assert!(html.contains(r#"<meta name="author" content="Joseph &amp; Co">"#));
    }

    #[test]
    fn test_index_without_more_pages_hides_button() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("t", &translations());
        context.insert("posts", &vec![card()]);
        context.insert("next_page", &None::<String>);

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("load-more"));
    }

    #[test]
    fn test_not_found_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("t", &translations());

        let html = renderer.render("not_found.html", &context).unwrap();
        assert!(html.contains("Post não encontrado"));
    }
}
