use anyhow::Result;
use pdfjs_embed::{VendorLayout, ViewerConfig, create};

/// Render the plugin descriptor list as pretty JSON.
pub fn render(config: &ViewerConfig, layout: &VendorLayout) -> Result<String> {
    let plugins = create(config, layout);
    Ok(serde_json::to_string_pretty(&plugins)?)
}

pub fn run(config: &ViewerConfig, layout: &VendorLayout) -> Result<()> {
    println!("{}", render(config, layout)?);
    Ok(())
}
