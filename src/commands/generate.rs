//! Generate static files

use anyhow::Result;

use crate::detail::DetailFlow;
use crate::generator::Generator;
use crate::Blog;

/// Generate the static site
pub async fn run(blog: &Blog) -> Result<()> {
    let detail = blog.detail_flow();
    run_with_flow(blog, &detail).await
}

/// Generate the static site, pre-rendering posts into an existing flow
pub async fn run_with_flow(blog: &Blog, detail: &DetailFlow) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let summary = generator.generate(detail).await?;

    tracing::info!(
        "Rendered listing with {} posts and {} post pages",
        summary.listed_posts,
        summary.post_pages
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
