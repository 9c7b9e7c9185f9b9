use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layout::Variant;

/// Output directory used when `custom_output_path` is not set.
pub const DEFAULT_OUTPUT_PATH: &str = "pdfjs";

/// User configuration for the embedded viewer.
///
/// Every field is optional in the serialized form. The camelCase spellings
/// used by JavaScript configs are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Vendor the legacy build (older browsers) instead of the modern one.
    pub legacy: bool,

    /// Forwarded verbatim to `PDFViewerApplicationOptions.setAll`.
    pub options: Map<String, Value>,

    /// Strip the viewer's same-origin check on the `file` parameter.
    #[serde(alias = "allowCrossOrigin")]
    pub allow_cross_origin: bool,

    /// Merged over the arguments of every `PDFViewerApplication.open` call.
    #[serde(alias = "openOptions")]
    pub open_options: Map<String, Value>,

    /// Directory inside the build output that receives the viewer files.
    #[serde(alias = "customOutputPath", skip_serializing_if = "Option::is_none")]
    pub custom_output_path: Option<String>,
}

impl ViewerConfig {
    pub fn variant(&self) -> Variant {
        if self.legacy {
            Variant::Legacy
        } else {
            Variant::Modern
        }
    }

    pub fn output_path(&self) -> &str {
        self.custom_output_path
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    /// Load a config file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };

        parsed.map_err(|e| e.with_path(path))
    }
}

/// Errors raised while reading a viewer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config{}: {message}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
}

impl ConfigError {
    fn with_path(self, at: &Path) -> Self {
        match self {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(at.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}
