use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pdfjs_embed::{PatchMode, VendorLayout, ViewerConfig};
use serde::Deserialize;

/// Name of the project-local config file.
pub const LOCAL_CONFIG: &str = "pdfjs-embed.toml";

/// Contents of a `pdfjs-embed.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Vendor root holding `pdfjs/` and `pdfjs-legacy/`.
    pub vendor_dir: Option<PathBuf>,
    /// Fail the copy when a patch target is missing.
    pub strict: bool,
    #[serde(flatten)]
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Vendor layout, preferring the command-line override.
    pub fn layout(&self, override_dir: Option<&Path>) -> VendorLayout {
        match override_dir.or(self.vendor_dir.as_deref()) {
            Some(dir) => VendorLayout::new(dir),
            None => VendorLayout::default(),
        }
    }

    pub fn patch_mode(&self, strict_flag: bool) -> PatchMode {
        if strict_flag || self.strict {
            PatchMode::Strict
        } else {
            PatchMode::Lenient
        }
    }
}

/// Global config file path: `~/.config/pdfjs-embed/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfjs-embed").join("config.toml"))
}

fn parse(path: &Path) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
}

/// Resolve the configuration.
///
/// An explicit path must exist and parse. Otherwise `./pdfjs-embed.toml` is
/// used if present, then the global config; a broken global config is
/// reported and replaced by defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return parse(path);
    }

    let local = cwd.join(LOCAL_CONFIG);
    if local.is_file() {
        return parse(&local);
    }

    if let Some(path) = global_config_path()
        && path.is_file()
    {
        match parse(&path) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!("{e:#}, using defaults"),
        }
    }

    Ok(AppConfig::default())
}

#[cfg(test)]
mod tests {
    use pdfjs_embed::Variant;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_flattened_viewer_config() {
        let toml_str = r#"
vendor_dir = "third_party/vendor"
strict = true
legacy = true
allow_cross_origin = true
custom_output_path = "viewer"

[options]
cMapUrl = "/cmaps/"

[open_options]
withCredentials = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.vendor_dir, Some(PathBuf::from("third_party/vendor")));
        assert!(config.strict);
        assert_eq!(config.viewer.variant(), Variant::Legacy);
        assert!(config.viewer.allow_cross_origin);
        assert_eq!(config.viewer.output_path(), "viewer");
        assert_eq!(config.viewer.options["cMapUrl"], json!("/cmaps/"));
        assert_eq!(config.viewer.open_options["withCredentials"], json!(true));
    }

    #[test]
    fn layout_prefers_command_line_override() {
        let config = AppConfig {
            vendor_dir: Some(PathBuf::from("from-config")),
            ..Default::default()
        };
        assert_eq!(config.layout(None).root(), Path::new("from-config"));
        assert_eq!(
            config.layout(Some(Path::new("from-flag"))).root(),
            Path::new("from-flag")
        );
        assert_eq!(AppConfig::default().layout(None).root(), Path::new("vendor"));
    }

    #[test]
    fn strict_from_flag_or_file() {
        let config = AppConfig::default();
        assert_eq!(config.patch_mode(false), PatchMode::Lenient);
        assert_eq!(config.patch_mode(true), PatchMode::Strict);

        let strict = AppConfig {
            strict: true,
            ..Default::default()
        };
        assert_eq!(strict.patch_mode(false), PatchMode::Strict);
    }

    #[test]
    fn local_config_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCAL_CONFIG), "legacy = true\n").unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert!(config.viewer.legacy);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("nope.toml")), dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn explicit_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "legacy = 3").unwrap();

        let err = load_config(Some(&path), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.toml"));
    }
}
