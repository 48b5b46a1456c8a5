//! Staging of streamed resources into a transient manifest file.
//!
//! When the driver runs as a transformer, the incoming resources are written to
//! a temporary file in the working directory and passed to the generator by
//! path. The file is removed when the [`StagingArtifact`] is dropped, which
//! also happens while unwinding from a panic.

use std::path::Path;

use policygen_kio::{ByteWriter, Envelope, ResourceDocument, LOCAL_CONFIG_ANNOTATION};
use tempfile::NamedTempFile;

use crate::error::{DriverError, Result};
use crate::generate::ManifestRef;

/// Annotations orchestration tooling uses to track resource identity. They mean
/// nothing to the generator and are removed before staging.
pub const BOOKKEEPING_ANNOTATIONS: [&str; 4] = [
    "config.k8s.io/id",
    "internal.config.kubernetes.io/annotations-migration-resource-id",
    "internal.config.kubernetes.io/id",
    "kustomize.config.k8s.io/id",
];

pub const STAGING_PREFIX: &str = "transformer-input-";
pub const STAGING_SUFFIX: &str = ".yaml";

/// Whether the envelope's resources have to be staged as a manifest.
///
/// A first document marked `local-config: "true"` means the resources are only
/// the generator's own config, so the run is a pure generator invocation. An
/// envelope without documents has nothing to stage.
pub fn requires_staging(envelope: &Envelope) -> bool {
    match envelope.first_document() {
        None => false,
        Some(_) => envelope.first_annotation(LOCAL_CONFIG_ANNOTATION).as_deref() != Some("true"),
    }
}

/// A staged manifest file, deleted on drop.
#[derive(Debug)]
pub struct StagingArtifact {
    file: NamedTempFile,
}

impl StagingArtifact {
    /// Write `documents`, minus the bookkeeping annotations, to a new file in `dir`.
    pub fn create(dir: &Path, documents: &[ResourceDocument]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)
            .map_err(DriverError::StagingCreate)?;

        // On error `file` is dropped here, which removes it.
        ByteWriter::new()
            .clear_annotations(BOOKKEEPING_ANNOTATIONS)
            .write(documents, &mut file)
            .map_err(DriverError::StagingWrite)?;
        file.as_file_mut()
            .sync_all()
            .map_err(|e| DriverError::StagingWrite(e.into()))?;

        tracing::debug!(
            path = %file.path().display(),
            documents = documents.len(),
            "staged transformer input"
        );

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn manifest_ref(&self) -> ManifestRef {
        ManifestRef::Path(self.path().to_path_buf())
    }
}

impl Drop for StagingArtifact {
    fn drop(&mut self) {
        tracing::debug!(path = %self.file.path().display(), "removing staged transformer input");
    }
}
