use std::path::Path;

use anyhow::{Context, Result};
use pdfjs_embed::{CopyPlan, CopyReport, PatchMode, VendorLayout, ViewerConfig, create};

/// Copy the selected viewer build into `out_dir`, applying the patches.
pub fn execute(
    config: &ViewerConfig,
    layout: &VendorLayout,
    out_dir: &Path,
    mode: PatchMode,
) -> Result<CopyReport> {
    let plugins = create(config, layout);

    for plugin in &plugins {
        for rule in plugin.copy_rules() {
            tracing::debug!(
                plugin = plugin.name(),
                sources = ?rule.source.patterns(),
                dest = %rule.dest,
                "copy rule"
            );
        }
    }

    let plan = CopyPlan::from_plugins(&plugins, out_dir).with_context(|| {
        format!(
            "could not plan viewer copy (has `pdfjs-embed fetch` populated {}?)",
            layout.root().display()
        )
    })?;

    plan.execute(mode)
        .with_context(|| format!("failed to copy viewer into {}", out_dir.display()))
}

pub fn run(
    config: &ViewerConfig,
    layout: &VendorLayout,
    out_dir: &Path,
    mode: PatchMode,
) -> Result<()> {
    let report = execute(config, layout, out_dir, mode)?;

    for missed in &report.missed {
        eprintln!(
            "warning: `{}` not found in {}; copied unmodified",
            missed.needle, missed.file
        );
    }

    println!(
        "Copied {} files into {} ({} patched).",
        report.copied,
        out_dir.join(config.output_path()).display(),
        report.patched
    );

    Ok(())
}
