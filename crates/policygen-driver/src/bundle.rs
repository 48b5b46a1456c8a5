//! Built-in generator: bundles manifests with common labels and annotations.
//!
//! Config format:
//!
//! ```yaml
//! apiVersion: policygen.io/v1
//! kind: BundleGenerator
//! metadata:
//!   name: sample
//! manifests:
//!   - path: deployment.yaml
//!   - path: manifests/
//! commonLabels:
//!   app: web
//! commonAnnotations:
//!   owner: team-a
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use policygen_kio::{ByteReader, ByteWriter, ResourceDocument};
use serde::Deserialize;

use crate::generate::{GenerationContext, Generator, GeneratorError, ManifestRef};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleConfig {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    manifests: Vec<ManifestEntry>,
    #[serde(default)]
    common_labels: BTreeMap<String, String>,
    #[serde(default)]
    common_annotations: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    path: PathBuf,
}

/// Emits every referenced manifest document with the config's common metadata applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundleGenerator;

impl BundleGenerator {
    pub fn new() -> Self {
        Self
    }

    fn manifests(config: &BundleConfig, context: &GenerationContext) -> Vec<ManifestRef> {
        let refs = if context.manifests.is_empty() {
            config
                .manifests
                .iter()
                .map(|entry| ManifestRef::Path(entry.path.clone()))
                .collect()
        } else {
            context.manifests.clone()
        };

        refs.into_iter()
            .map(|manifest| match manifest {
                ManifestRef::Path(path) => ManifestRef::Path(context.working_dir.join(path)),
                stdin @ ManifestRef::Stdin(_) => stdin,
            })
            .collect()
    }
}

impl Generator for BundleGenerator {
    fn generate(&self, context: &GenerationContext) -> Result<Vec<u8>, GeneratorError> {
        let config: BundleConfig = serde_yaml::from_slice(&context.config)
            .map_err(|e| GeneratorError::invalid_config(format!("invalid config: {e}")))?;

        if config.metadata.name.trim().is_empty() {
            return Err(GeneratorError::invalid_config("metadata.name must be set"));
        }

        let manifests = Self::manifests(&config, context);
        if manifests.is_empty() {
            return Err(GeneratorError::invalid_config(format!(
                "{}: at least one manifest is required",
                config.metadata.name
            )));
        }

        let mut documents = Vec::new();
        for manifest in &manifests {
            documents.extend(load_manifest(manifest)?);
        }

        for doc in &mut documents {
            for (key, value) in &config.common_labels {
                doc.set_label(key, value);
            }
            for (key, value) in &config.common_annotations {
                doc.set_annotation(key, value);
            }
        }

        tracing::debug!(
            name = %config.metadata.name,
            manifests = manifests.len(),
            documents = documents.len(),
            "bundled manifests"
        );

        ByteWriter::new()
            .to_bytes(&documents)
            .map_err(|e| GeneratorError::failed(format!("failed to encode output: {e}")))
    }
}

fn load_manifest(manifest: &ManifestRef) -> Result<Vec<ResourceDocument>, GeneratorError> {
    match manifest {
        ManifestRef::Stdin(bytes) => parse_manifest(bytes, manifest),
        ManifestRef::Path(path) if path.is_dir() => {
            let mut documents = Vec::new();
            for file in yaml_files(path)? {
                documents.extend(load_manifest(&ManifestRef::Path(file))?);
            }
            Ok(documents)
        }
        ManifestRef::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                GeneratorError::failed(format!("failed to read manifest {}: {e}", path.display()))
            })?;
            parse_manifest(&bytes, manifest)
        }
    }
}

fn parse_manifest(
    bytes: &[u8],
    manifest: &ManifestRef,
) -> Result<Vec<ResourceDocument>, GeneratorError> {
    ByteReader::new()
        .omit_reader_annotations(true)
        .read_bytes(bytes)
        .map(|envelope| envelope.documents)
        .map_err(|e| GeneratorError::failed(format!("failed to parse manifest {manifest}: {e}")))
}

/// `*.yaml` and `*.yml` files directly inside `dir`, sorted by name.
fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, GeneratorError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        GeneratorError::failed(format!("failed to read manifest directory {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| GeneratorError::failed(format!("failed to read {}: {e}", dir.display())))?
            .path();
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
