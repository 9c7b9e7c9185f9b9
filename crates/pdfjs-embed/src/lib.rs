pub mod config;
pub mod copy;
pub mod layout;
pub mod patch;
pub mod plugin;
pub mod rename;
pub mod rule;

pub use config::{ConfigError, DEFAULT_OUTPUT_PATH, ViewerConfig};
pub use copy::{CopyError, CopyPlan, CopyReport, MissedPatch, PlannedCopy};
pub use layout::{
    PDFJS_VERSION, RELEASE_BASE_URL, VIEWER_HTML, VIEWER_SCRIPT, Variant, VendorLayout,
    VersionTag,
};
pub use patch::{PatchError, PatchMode, PatchOutcome, Patched, Transform};
pub use plugin::{PLUGIN_NAME, PluginDescriptor, create};
pub use rename::relative_destination;
pub use rule::{CopyRule, CopySource, Rename};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
