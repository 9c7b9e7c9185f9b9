use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::layout::{VIEWER_HTML, VIEWER_SCRIPT, VendorLayout};
use crate::patch::Transform;
use crate::rule::{CopyRule, Rename};

pub const PLUGIN_NAME: &str = "pdfjs-embed";

/// An entry to splice into the host build's plugin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum PluginDescriptor {
    /// No-op entry that only names the integration.
    Named { name: String },
    /// Copy registrations, applied in order. Later targets win when two
    /// targets produce the same destination.
    StaticCopy { targets: Vec<CopyRule> },
}

impl PluginDescriptor {
    pub fn name(&self) -> &str {
        match self {
            PluginDescriptor::Named { name } => name,
            PluginDescriptor::StaticCopy { .. } => "static-copy",
        }
    }

    pub fn copy_rules(&self) -> &[CopyRule] {
        match self {
            PluginDescriptor::Named { .. } => &[],
            PluginDescriptor::StaticCopy { targets } => targets,
        }
    }
}

/// Build the plugin list for `config`, reading viewer files from `layout`.
pub fn create(config: &ViewerConfig, layout: &VendorLayout) -> Vec<PluginDescriptor> {
    vec![
        PluginDescriptor::Named {
            name: PLUGIN_NAME.to_owned(),
        },
        PluginDescriptor::StaticCopy {
            targets: copy_rules(config, layout),
        },
    ]
}

/// The three copy rules: bulk copy, script patch, HTML patch, in that order.
///
/// Both patch rules target files that the bulk rule also covers; their
/// position after it is what makes the patched copies win.
pub fn copy_rules(config: &ViewerConfig, layout: &VendorLayout) -> Vec<CopyRule> {
    let viewer_dir = layout.variant_dir(config.variant());
    let output = config.output_path();
    let rename = Rename::relative_to(&viewer_dir);

    vec![
        CopyRule::tree(&viewer_dir, output, rename.clone()),
        CopyRule::file(
            viewer_dir.join(VIEWER_SCRIPT),
            output,
            Transform::StripCrossOriginCheck {
                enabled: config.allow_cross_origin,
            },
            rename.clone(),
        ),
        CopyRule::file(
            viewer_dir.join(VIEWER_HTML),
            output,
            Transform::InjectViewerConfig {
                options: config.options.clone(),
                open_options: config.open_options.clone(),
            },
            rename,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use serde_json::json;

    use crate::rule::CopySource;

    use super::*;

    fn layout() -> VendorLayout {
        VendorLayout::new("/app/vendor")
    }

    #[test]
    fn first_descriptor_is_named_marker() {
        let plugins = create(&ViewerConfig::default(), &layout());
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name(), PLUGIN_NAME);
        assert!(plugins[0].copy_rules().is_empty());
        assert_eq!(plugins[1].copy_rules().len(), 3);
    }

    #[test]
    fn modern_variant_by_default() {
        let rules = copy_rules(&ViewerConfig::default(), &layout());
        assert_eq!(
            rules[0].source,
            CopySource::Tree {
                root: PathBuf::from("/app/vendor/pdfjs")
            }
        );
        assert!(rules.iter().all(|r| r.dest == "pdfjs"));
    }

    #[test]
    fn legacy_and_custom_output() {
        let config = ViewerConfig {
            legacy: true,
            custom_output_path: Some("assets/viewer".into()),
            ..Default::default()
        };
        let rules = copy_rules(&config, &layout());
        assert_eq!(
            rules[1].source,
            CopySource::Files {
                files: vec![PathBuf::from("/app/vendor/pdfjs-legacy/web/viewer.mjs")]
            }
        );
        assert_eq!(
            rules[2].source,
            CopySource::Files {
                files: vec![PathBuf::from("/app/vendor/pdfjs-legacy/web/viewer.html")]
            }
        );
        assert!(rules.iter().all(|r| r.dest == "assets/viewer"));
    }

    #[test]
    fn all_rules_share_one_rename() {
        let rules = copy_rules(&ViewerConfig::default(), &layout());
        let file = Path::new("/app/vendor/pdfjs/web/viewer.html");
        for rule in &rules {
            assert_eq!(rule.rename, rules[0].rename);
            assert_eq!(rule.rename.apply(file).as_deref(), Some("web/viewer.html"));
        }
    }

    #[test]
    fn transforms_carry_config() {
        let config = ViewerConfig {
            allow_cross_origin: true,
            options: json!({"cMapUrl": "/cmaps/"}).as_object().unwrap().clone(),
            open_options: json!({"withCredentials": true}).as_object().unwrap().clone(),
            ..Default::default()
        };
        let rules = copy_rules(&config, &layout());

        assert!(rules[0].transform.is_none());
        assert_eq!(
            rules[1].transform,
            Some(Transform::StripCrossOriginCheck { enabled: true })
        );
        match &rules[2].transform {
            Some(Transform::InjectViewerConfig {
                options,
                open_options,
            }) => {
                assert_eq!(options["cMapUrl"], json!("/cmaps/"));
                assert_eq!(open_options["withCredentials"], json!(true));
            }
            other => panic!("expected InjectViewerConfig, got {other:?}"),
        }
    }

    #[test]
    fn descriptors_serialize_for_host_splicing() {
        let plugins = create(&ViewerConfig::default(), &layout());
        let json = serde_json::to_value(&plugins).unwrap();
        assert_eq!(json[0]["plugin"], "named");
        assert_eq!(json[0]["name"], PLUGIN_NAME);
        assert_eq!(json[1]["plugin"], "static-copy");
        assert_eq!(json[1]["targets"].as_array().unwrap().len(), 3);
    }
}
