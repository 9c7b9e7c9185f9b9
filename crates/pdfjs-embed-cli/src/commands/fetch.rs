use anyhow::{Context, Result};
use pdfjs_embed::{VendorLayout, VersionTag};
use pdfjs_embed_fetch::{Downloader, FetchPlan, Fetcher};

/// Replace the vendored modern and legacy builds with `version`.
pub async fn run(
    version: VersionTag,
    base_url: &str,
    layout: &VendorLayout,
    max_redirects: usize,
) -> Result<()> {
    let plan = FetchPlan::new(version, base_url, layout, &std::env::temp_dir());
    let downloader = Downloader::new()?.with_max_redirects(max_redirects);

    let fetched = Fetcher::new(plan, downloader)
        .run()
        .await
        .context("failed to get pdfjs")?;

    for target in &fetched {
        tracing::info!(
            variant = %target.variant,
            dir = %target.extract_dir.display(),
            bytes = target.bytes,
            "unpacked"
        );
    }

    println!("vendor download complete");
    Ok(())
}
