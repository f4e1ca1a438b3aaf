//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Fetch all content and generate the static site
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let source = blog.content_source()?;
    let generator = Generator::new(blog, source)?;
    let report = generator.generate().await?;

    if !report.missing.is_empty() {
        tracing::warn!(
            "{} listed posts could not be fetched: {}",
            report.missing.len(),
            report.missing.join(", ")
        );
    }

    if !report.failed.is_empty() {
        tracing::warn!(
            "{} listed posts failed to build: {}",
            report.failed.len(),
            report.failed.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts and {} listing pages in {:.2}s",
        report.posts,
        report.pages,
        duration.as_secs_f64()
    );

    Ok(report)
}
