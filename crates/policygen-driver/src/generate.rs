//! The generation collaborator seam and the invoker that calls it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::{ConfigOrigin, DriverError, Result};

/// A manifest handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestRef {
    Path(PathBuf),
    /// Content piped to the process's standard input, read once up front.
    Stdin(Vec<u8>),
}

impl fmt::Display for ManifestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestRef::Path(path) => write!(f, "{}", path.display()),
            ManifestRef::Stdin(_) => write!(f, "stdin"),
        }
    }
}

/// Everything one generator call gets. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    /// Serialized generator config (YAML or JSON).
    pub config: Vec<u8>,
    /// Directory relative manifest paths in the config resolve against.
    pub working_dir: PathBuf,
    /// Manifests overriding the ones the config names. Empty means "use the config's".
    pub manifests: Vec<ManifestRef>,
}

impl GenerationContext {
    pub fn new(config: impl Into<Vec<u8>>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
            working_dir: working_dir.into(),
            manifests: Vec::new(),
        }
    }

    pub fn manifest(mut self, manifest: ManifestRef) -> Self {
        self.manifests.push(manifest);
        self
    }
}

#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The config was rejected before anything was generated.
    #[error("{0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Failed(String),
}

impl GeneratorError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        GeneratorError::InvalidConfig(message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        GeneratorError::Failed(message.into())
    }
}

/// Turns a generator config plus manifests into a YAML stream of output documents.
pub trait Generator {
    fn generate(&self, context: &GenerationContext)
        -> std::result::Result<Vec<u8>, GeneratorError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(
        &self,
        context: &GenerationContext,
    ) -> std::result::Result<Vec<u8>, GeneratorError> {
        (**self).generate(context)
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(
        &self,
        context: &GenerationContext,
    ) -> std::result::Result<Vec<u8>, GeneratorError> {
        (**self).generate(context)
    }
}

/// Run one generation, consuming the context.
pub fn invoke<G: Generator + ?Sized>(
    generator: &G,
    context: GenerationContext,
    origin: &ConfigOrigin,
) -> Result<Vec<u8>> {
    let manifests: Vec<String> = context.manifests.iter().map(ToString::to_string).collect();
    tracing::debug!(
        %origin,
        working_dir = %context.working_dir.display(),
        ?manifests,
        "invoking generator"
    );

    let output = generator.generate(&context).map_err(|e| match e {
        GeneratorError::InvalidConfig(message) => DriverError::config(origin.clone(), message),
        GeneratorError::Failed(message) => DriverError::generation(origin.clone(), message),
    })?;

    tracing::debug!(%origin, bytes = output.len(), "generator finished");
    Ok(output)
}
