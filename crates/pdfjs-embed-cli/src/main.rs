mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfjs_embed::{PDFJS_VERSION, RELEASE_BASE_URL, VendorLayout, VersionTag};
use pdfjs_embed_fetch::DEFAULT_MAX_REDIRECTS;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdfjs-embed")]
#[command(about = "Vendor the PDF.js viewer and copy it into a web build")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the modern and legacy viewer builds into the vendor directory
    Fetch {
        /// PDF.js release to download
        #[arg(long, default_value = PDFJS_VERSION)]
        version_tag: String,
        /// Vendor root that receives `pdfjs/` and `pdfjs-legacy/`
        #[arg(long, default_value = "vendor")]
        vendor_dir: PathBuf,
        /// Release download base URL
        #[arg(long, default_value = RELEASE_BASE_URL, hide = true)]
        base_url: String,
        /// Maximum redirect hops per download
        #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
        max_redirects: usize,
    },
    /// Print the plugin descriptors for the current configuration as JSON
    Plugins {
        /// Config file (defaults to ./pdfjs-embed.toml, then the global config)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Vendor root (overrides `vendor_dir` from the config)
        #[arg(long)]
        vendor_dir: Option<PathBuf>,
    },
    /// Copy the vendored viewer into a build output directory
    Copy {
        /// Build output directory
        #[arg(long)]
        out_dir: PathBuf,
        /// Config file (defaults to ./pdfjs-embed.toml, then the global config)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Vendor root (overrides `vendor_dir` from the config)
        #[arg(long)]
        vendor_dir: Option<PathBuf>,
        /// Fail when a patch target is missing from the vendored files
        #[arg(long)]
        strict: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Fetch {
            version_tag,
            vendor_dir,
            base_url,
            max_redirects,
        } => {
            let layout = VendorLayout::new(vendor_dir);
            commands::fetch::run(
                VersionTag::new(version_tag),
                &base_url,
                &layout,
                max_redirects,
            )
            .await
        }
        Command::Plugins { config, vendor_dir } => {
            let cwd = std::env::current_dir().context("could not determine current directory")?;
            let app = config::load_config(config.as_deref(), &cwd)?;
            commands::plugins::run(&app.viewer, &app.layout(vendor_dir.as_deref()))
        }
        Command::Copy {
            out_dir,
            config,
            vendor_dir,
            strict,
        } => {
            let cwd = std::env::current_dir().context("could not determine current directory")?;
            let app = config::load_config(config.as_deref(), &cwd)?;
            commands::copy::run(
                &app.viewer,
                &app.layout(vendor_dir.as_deref()),
                &out_dir,
                app.patch_mode(strict),
            )
        }
    }
}
