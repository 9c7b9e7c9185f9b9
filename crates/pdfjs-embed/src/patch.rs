//! Text patches applied to vendored viewer files while they are copied.
//!
//! Patches never touch the vendor snapshot itself; they rewrite the content
//! on its way into the build output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Same-origin check on the `file` query parameter in `web/viewer.mjs`.
pub const CROSS_ORIGIN_CHECK: &str = "validateFileURL(file);";

/// Anchor for the configuration script in `web/viewer.html`.
pub const HEAD_CLOSE: &str = "</head>";

/// How a patch reacts when its target text is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchMode {
    /// Log a warning and copy the file unmodified.
    #[default]
    Lenient,
    /// Fail the copy.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// Disabled by configuration; content passed through.
    Skipped,
    /// The anchor text was not found; content passed through.
    TargetMissing { needle: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub content: String,
    pub outcome: PatchOutcome,
}

impl Patched {
    fn unchanged(content: &str, outcome: PatchOutcome) -> Self {
        Self {
            content: content.to_owned(),
            outcome,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("patch target `{needle}` not found in {file}")]
    TargetNotFound { file: String, needle: &'static str },
}

/// Remove the first occurrence of the viewer's cross-origin check.
///
/// With `allow_cross_origin` unset the content is returned as-is.
pub fn strip_cross_origin_check(content: &str, allow_cross_origin: bool) -> Patched {
    if !allow_cross_origin {
        return Patched::unchanged(content, PatchOutcome::Skipped);
    }

    if !content.contains(CROSS_ORIGIN_CHECK) {
        return Patched::unchanged(
            content,
            PatchOutcome::TargetMissing {
                needle: CROSS_ORIGIN_CHECK,
            },
        );
    }

    Patched {
        content: content.replacen(CROSS_ORIGIN_CHECK, "", 1),
        outcome: PatchOutcome::Applied,
    }
}

/// Insert the viewer configuration script before the first `</head>`.
///
/// Not idempotent: running it on its own output injects a second block.
pub fn inject_viewer_config(
    content: &str,
    options: &Map<String, Value>,
    open_options: &Map<String, Value>,
) -> Patched {
    let Some(at) = content.find(HEAD_CLOSE) else {
        return Patched::unchanged(content, PatchOutcome::TargetMissing { needle: HEAD_CLOSE });
    };

    let script = viewer_config_script(options, open_options);
    let mut patched = String::with_capacity(content.len() + script.len());
    patched.push_str(&content[..at]);
    patched.push_str(&script);
    patched.push_str(&content[at..]);

    Patched {
        content: patched,
        outcome: PatchOutcome::Applied,
    }
}

/// The `<script>` block that applies `options` once the viewer has loaded and
/// merges `open_options` over every `open` call (overrides win).
pub fn viewer_config_script(
    options: &Map<String, Value>,
    open_options: &Map<String, Value>,
) -> String {
    let app_options = script_literal(options);
    let custom_options = script_literal(open_options);

    format!(
        r#"<script>
document.addEventListener("webviewerloaded", (event) => {{
    const viewerWindow = event.detail.source;
    const AppOptions = viewerWindow.PDFViewerApplicationOptions;
    const PDFViewerApplication = viewerWindow.PDFViewerApplication;

    const appOptions = {app_options};
    AppOptions.setAll(appOptions);

    const originalOpen = PDFViewerApplication.open;
    const customOptions = {custom_options};

    PDFViewerApplication.open = function (args) {{
        return originalOpen.call(this, {{ ...args, ...customOptions }});
    }};
}});
</script>
"#
    )
}

/// JSON object literal that is safe to embed inside a `<script>` element.
fn script_literal(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string().replace("</", "<\\/")
}

/// Content transform attached to a copy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Transform {
    StripCrossOriginCheck {
        enabled: bool,
    },
    InjectViewerConfig {
        options: Map<String, Value>,
        open_options: Map<String, Value>,
    },
}

impl Transform {
    /// Apply to the text of `file`. Missing anchors warn in lenient mode and
    /// fail in strict mode.
    pub fn apply(
        &self,
        file: &str,
        content: &str,
        mode: PatchMode,
    ) -> Result<Patched, PatchError> {
        let patched = match self {
            Transform::StripCrossOriginCheck { enabled } => {
                strip_cross_origin_check(content, *enabled)
            }
            Transform::InjectViewerConfig {
                options,
                open_options,
            } => inject_viewer_config(content, options, open_options),
        };

        if let PatchOutcome::TargetMissing { needle } = patched.outcome {
            match mode {
                PatchMode::Strict => {
                    return Err(PatchError::TargetNotFound {
                        file: file.to_owned(),
                        needle,
                    });
                }
                PatchMode::Lenient => {
                    tracing::warn!(
                        file,
                        needle,
                        "patch target not found, copying unmodified"
                    );
                }
            }
        }

        Ok(patched)
    }
}
