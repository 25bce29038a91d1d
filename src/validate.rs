use std::path::{Path, PathBuf};

use anyhow::Result;
use gltf::json::validation::Validate;
use serde::Serialize;

use crate::object_url::ObjectUrlStore;
use crate::render::{LoadRequest, SceneHandle};

const REPORT_TEMPLATE: &str = "validation_report.txt";

pub trait Validator {
    fn validate(&mut self, request: LoadRequest<'_>, scene: &SceneHandle) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, Serialize)]
pub struct Issue {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub pointer: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issues {
    pub num_errors: usize,
    pub num_warnings: usize,
    pub num_infos: usize,
    pub messages: Vec<Issue>,
}

impl Issues {
    fn push(&mut self, severity: Severity, code: &str, message: String, pointer: Option<String>) {
        match severity {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => self.num_infos += 1,
        }

        self.messages.push(Issue {
            code: code.to_string(),
            message,
            severity,
            pointer,
        });
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub version: String,
    pub generator: Option<String>,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    pub node_count: usize,
    pub mesh_count: usize,
    pub material_count: usize,
    pub image_count: usize,
    pub animation_count: usize,
    pub resources: Vec<String>,
}

/// Shaped after the JSON report of the Khronos glTF validator.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub uri: String,
    pub mime_type: &'static str,
    pub issues: Issues,
    pub info: Option<AssetInfo>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.num_errors > 0
    }
}

pub fn build_report(request: LoadRequest<'_>, scene: &SceneHandle) -> ValidationReport {
    let uri = match ObjectUrlStore::is_object_url(request.url) {
        true => scene.asset_id.clone(),
        false => request.url.to_string(),
    };
    let mime_type = match scene.document.starts_with(b"glTF") {
        true => "model/gltf-binary",
        false => "model/gltf+json",
    };

    let mut issues = Issues::default();

    let gltf = match gltf::Gltf::from_slice_without_validation(&scene.document) {
        Ok(gltf) => gltf,
        Err(error) => {
            issues.push(Severity::Error, "PARSE_ERROR", error.to_string(), None);
            return ValidationReport {
                uri,
                mime_type,
                issues,
                info: None,
            };
        }
    };

    let root = gltf.document.as_json();
    root.validate(root, gltf::json::Path::new, &mut |path, error| {
        issues.push(
            Severity::Error,
            &format!("{error:?}"),
            error.to_string(),
            Some(path().to_string()),
        );
    });

    let mut unused: Vec<&String> = request
        .resources
        .iter()
        .filter(|(key, resource)| !resource.is_scene_file() && !scene.used_keys.contains(key))
        .map(|(key, _)| key)
        .collect();
    unused.sort();

    for key in unused {
        issues.push(
            Severity::Warning,
            "UNUSED_RESOURCE",
            format!("{key} is not referenced by the asset"),
            None,
        );
    }

    if !root.extensions_used.is_empty() {
        issues.push(
            Severity::Info,
            "EXTENSIONS_USED",
            root.extensions_used.join(", "),
            Some("/extensionsUsed".to_string()),
        );
    }

    let info = AssetInfo {
        version: root.asset.version.clone(),
        generator: root.asset.generator.clone(),
        extensions_used: root.extensions_used.clone(),
        extensions_required: root.extensions_required.clone(),
        node_count: root.nodes.len(),
        mesh_count: root.meshes.len(),
        material_count: root.materials.len(),
        image_count: root.images.len(),
        animation_count: root.animations.len(),
        resources: scene.used_keys.clone(),
    };

    ValidationReport {
        uri,
        mime_type,
        issues,
        info: Some(info),
    }
}

/// Checks loaded assets and logs a text report, optionally writing it to disk as well.
pub struct GltfValidator {
    templates: tera::Tera,
    report_dir: Option<PathBuf>,
    reports: Vec<ValidationReport>,
}

impl GltfValidator {
    pub fn new(report_dir: Option<PathBuf>) -> Result<Self> {
        let mut templates = tera::Tera::default();
        templates.add_raw_template(
            REPORT_TEMPLATE,
            include_str!("../templates/validation_report.txt"),
        )?;

        if let Some(report_dir) = &report_dir {
            std::fs::create_dir_all(report_dir)?;
        }

        Ok(Self {
            templates,
            report_dir,
            reports: vec![],
        })
    }

    pub fn render(&self, report: &ValidationReport) -> Result<String> {
        let context = tera::Context::from_serialize(report)?;
        Ok(self.templates.render(REPORT_TEMPLATE, &context)?)
    }

    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.reports.last()
    }

    /// File stem of the next report: `<sequence>-<asset stem>`, unique per validator.
    fn report_stem(&self, asset_id: &str) -> String {
        let stem = asset_id.split('.').next().unwrap_or(asset_id);
        format!("{}-{stem}", self.reports.len())
    }

    fn write_report(&self, report_dir: &Path, asset_id: &str, text: &str, report: &ValidationReport) -> Result<()> {
        let stem = self.report_stem(asset_id);

        std::fs::write(
            report_dir.join(format!("{stem}.report.json")),
            serde_json::to_string_pretty(report)?,
        )?;
        std::fs::write(report_dir.join(format!("{stem}.report.txt")), text)?;

        Ok(())
    }
}

impl Validator for GltfValidator {
    fn validate(&mut self, request: LoadRequest<'_>, scene: &SceneHandle) -> Result<()> {
        let report = build_report(request, scene);
        let text = self.render(&report)?;

        match report.has_errors() {
            true => log::warn!("{text}"),
            false => log::info!("{text}"),
        }

        if let Some(report_dir) = &self.report_dir {
            self.write_report(report_dir, &scene.asset_id, &text, &report)?;
        }

        self.reports.push(report);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::resource::{Resource, ResourceMap};

    const VALID: &str = r#"{
        "asset": {"version": "2.0", "generator": "hand written"},
        "scenes": [{"nodes": [0]}],
        "nodes": [{"name": "Root"}],
        "buffers": [{"uri": "scene.bin", "byteLength": 4}]
    }"#;

    const BROKEN_INDEX: &str = r#"{
        "asset": {"version": "2.0"},
        "scenes": [{"nodes": [3]}],
        "nodes": [{"name": "Root"}]
    }"#;

    fn handle(document: &str, used_keys: &[&str]) -> SceneHandle {
        SceneHandle {
            index: 0,
            asset_id: "scene.gltf".to_string(),
            document: Arc::from(document.as_bytes()),
            used_keys: used_keys.iter().map(|key| key.to_string()).collect(),
            node_count: 1,
            image_count: 0,
        }
    }

    fn report(document: &str, keys: &[&str], used_keys: &[&str]) -> ValidationReport {
        let resources: ResourceMap = keys
            .iter()
            .map(|key| (key.to_string(), Resource::from_path_bytes(key, vec![])))
            .collect();
        let store = ObjectUrlStore::new();
        let request = LoadRequest {
            url: "models/scene.gltf",
            root_path: "models/",
            resources: &resources,
            object_urls: &store,
        };

        build_report(request, &handle(document, used_keys))
    }

    #[test]
    fn valid_asset_has_no_errors() {
        let report = report(
            VALID,
            &["models/scene.gltf", "models/scene.bin"],
            &["models/scene.bin"],
        );

        assert!(!report.has_errors());
        assert_eq!(report.issues.num_warnings, 0);
        assert_eq!(report.issues.num_infos, 0);
        assert_eq!(report.mime_type, "model/gltf+json");

        let info = report.info.unwrap();
        assert_eq!(info.version, "2.0");
        assert_eq!(info.generator.as_deref(), Some("hand written"));
        assert_eq!(info.node_count, 1);
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let report = report(BROKEN_INDEX, &[], &[]);

        assert!(report.has_errors());
        assert!(report.issues.messages[0]
            .pointer
            .as_deref()
            .unwrap()
            .contains("scenes"));
    }

    #[test]
    fn unreferenced_resources_are_warnings() {
        let report = report(
            VALID,
            &["models/scene.gltf", "models/scene.bin", "models/extra.png"],
            &["models/scene.bin"],
        );

        assert_eq!(report.issues.num_warnings, 1);
        assert_eq!(report.issues.messages[0].code, "UNUSED_RESOURCE");
        assert!(report.issues.messages[0].message.contains("models/extra.png"));
    }

    #[test]
    fn unparseable_documents_have_no_info() {
        let report = report("not json", &[], &[]);

        assert!(report.has_errors());
        assert_eq!(report.issues.messages[0].code, "PARSE_ERROR");
        assert!(report.info.is_none());
    }

    #[test]
    fn text_report_lists_counts_and_messages() {
        let validator = GltfValidator::new(None).unwrap();
        let report = report(
            VALID,
            &["models/scene.gltf", "models/scene.bin", "models/extra.png"],
            &["models/scene.bin"],
        );

        let text = validator.render(&report).unwrap();

        assert!(text.contains("Validation report: models/scene.gltf (model/gltf+json)"));
        assert!(text.contains("generator: hand written"));
        assert!(text.contains("Errors: 0, warnings: 1, infos: 0"));
        assert!(text.contains("[warning] UNUSED_RESOURCE: models/extra.png is not referenced"));
        assert!(text.contains("Resources: models/scene.bin"));
    }

    #[test]
    fn reports_are_written_to_the_report_directory() {
        let report_dir = std::env::temp_dir().join(format!(
            "gltf-dropview-reports-{}",
            std::process::id()
        ));
        let mut validator = GltfValidator::new(Some(report_dir.clone())).unwrap();
        let resources = ResourceMap::new();
        let store = ObjectUrlStore::new();
        let request = LoadRequest {
            url: "scene.gltf",
            root_path: "",
            resources: &resources,
            object_urls: &store,
        };

        validator.validate(request, &handle(VALID, &[])).unwrap();

        let json = std::fs::read_to_string(report_dir.join("0-scene.report.json")).unwrap();
        let text_exists = report_dir.join("0-scene.report.txt").exists();
        std::fs::remove_dir_all(&report_dir).unwrap();

        assert!(json.contains("\"numErrors\": 0"));
        assert!(text_exists);
        assert!(validator.last_report().is_some());
    }

    #[test]
    fn assets_with_the_same_name_keep_separate_reports() {
        let report_dir = std::env::temp_dir().join(format!(
            "gltf-dropview-same-name-{}",
            std::process::id()
        ));
        let mut validator = GltfValidator::new(Some(report_dir.clone())).unwrap();
        let resources = ResourceMap::new();
        let store = ObjectUrlStore::new();

        for url in ["Sofa/scene.gltf", "Chair/scene.gltf"] {
            let request = LoadRequest {
                url,
                root_path: "",
                resources: &resources,
                object_urls: &store,
            };
            validator.validate(request, &handle(VALID, &[])).unwrap();
        }

        let first = std::fs::read_to_string(report_dir.join("0-scene.report.json")).unwrap();
        let second = std::fs::read_to_string(report_dir.join("1-scene.report.json")).unwrap();
        std::fs::remove_dir_all(&report_dir).unwrap();

        assert!(first.contains("Sofa/scene.gltf"));
        assert!(second.contains("Chair/scene.gltf"));
    }
}
