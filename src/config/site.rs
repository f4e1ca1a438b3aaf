//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::reading_time::{DEFAULT_MINUTES, DEFAULT_WORDS_PER_MINUTE};

/// Environment variable that overrides `api.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub languages_dir: String,

    // Date format (Moment.js style)
    pub date_format: String,

    // Content API
    pub api: ApiConfig,

    // Reading time
    pub reading: ReadingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            languages_dir: "languages".to_string(),

            date_format: "DD MMM YYYY".to_string(),

            api: ApiConfig::default(),
            reading: ReadingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_access_token(std::env::var(ACCESS_TOKEN_ENV).ok());
    }

    fn apply_access_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            self.api.access_token = Some(token);
        }
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prismic API root, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the posts
    pub document_type: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 20,
            timeout_secs: 30,
        }
    }
}

/// Reading time configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
    /// Shown for posts without a body
    pub default_minutes: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            default_minutes: DEFAULT_MINUTES,
        }
    }
}
