//! Initialize a new blog

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# prismic-blog configuration

# Site
title: spacetraveling
subtitle: ''
description: ''
author: ''
language: pt-BR
# IANA zone used to display dates, UTC when empty
timezone: ''

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
languages_dir: languages

# Date format (Moment.js style)
date_format: DD MMM YYYY

# Content API
## The access token can also be set with PRISMIC_ACCESS_TOKEN
api:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  access_token:
  document_type: posts
  page_size: 20
  timeout_secs: 30

# Reading time
reading:
  words_per_minute: 200
  default_minutes: 4
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir.join("languages"))?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}
