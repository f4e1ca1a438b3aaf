//! prismic-blog: a static blog generator for a Prismic headless CMS
//!
//! Posts are fetched from the CMS, the listing is walked page by page with a
//! cursor-driven [`paginator::Paginator`], and every page is rendered with
//! embedded Tera templates.

pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod paginator;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use api::{ContentSource, PrismicClient};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Build the content source described by the configuration
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        let client = PrismicClient::new(&self.config.api)?;
        Ok(Arc::new(client))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateReport> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
