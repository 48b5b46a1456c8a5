//! Driver that runs the generator in batch or streamed mode

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use policygen_kio::{ByteReader, ByteWriter, RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND};

use crate::error::{ConfigOrigin, DriverError, Result};
use crate::generate::{self, GenerationContext, Generator, ManifestRef};
use crate::input::InputSource;
use crate::mode::Mode;
use crate::staging::{requires_staging, StagingArtifact};

/// Options for a driver run
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    /// Directory configs resolve paths against and staging files are written to.
    /// Defaults to the process's current directory.
    pub working_dir: Option<PathBuf>,
}

impl DriverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Drives one invocation: reads input, calls the generator, packages the output.
pub struct Driver<G> {
    generator: G,
    options: DriverOptions,
}

impl<G: Generator> Driver<G> {
    pub fn new(generator: G, options: DriverOptions) -> Self {
        Self { generator, options }
    }

    /// Run in the given mode and write the complete result to `output`.
    ///
    /// Nothing is written unless every step succeeded.
    pub fn run<I: InputSource>(
        &self,
        mode: Mode,
        input: &mut I,
        output: &mut impl Write,
    ) -> Result<()> {
        let bytes = match mode {
            Mode::Batch(paths) => self.run_batch(&paths, input)?,
            Mode::Streamed => self.run_streamed(input)?,
        };

        output
            .write_all(&bytes)
            .and_then(|_| output.flush())
            .map_err(|e| DriverError::OutputWrite(e.into()))
    }

    /// Generate from each config file in order and concatenate the raw output.
    ///
    /// If `input` has content waiting, it is read once and handed to every
    /// generation as the only manifest.
    pub fn run_batch<I: InputSource>(&self, paths: &[PathBuf], input: &mut I) -> Result<Vec<u8>> {
        tracing::debug!(configs = paths.len(), "running in batch mode");

        let mut piped = None;
        let mut output = Vec::new();
        for path in paths {
            output.extend(self.process_config_file(path, input, &mut piped)?);
        }
        Ok(output)
    }

    /// Read a `ResourceList`, generate from its function config and wrap the
    /// result in a new `ResourceList`.
    pub fn run_streamed(&self, input: &mut impl Read) -> Result<Vec<u8>> {
        tracing::debug!("running in streamed mode");

        let envelope = ByteReader::new().read(input).map_err(DriverError::Decode)?;
        let config = envelope
            .function_config_json()
            .map_err(DriverError::Serialization)?;
        let working_dir = self.working_dir()?;

        let generated = {
            let staging = if requires_staging(&envelope) {
                Some(StagingArtifact::create(&working_dir, &envelope.documents)?)
            } else {
                tracing::debug!("first resource is local config, running as a generator");
                None
            };

            let mut context = GenerationContext::new(config, working_dir);
            if let Some(artifact) = &staging {
                context = context.manifest(artifact.manifest_ref());
            }

            generate::invoke(&self.generator, context, &ConfigOrigin::FunctionConfig)?
        };

        reenvelope(&generated)
    }

    /// `piped` holds stdin content once it has been read, so later configs reuse it.
    fn process_config_file<I: InputSource>(
        &self,
        path: &Path,
        input: &mut I,
        piped: &mut Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let working_dir = self.working_dir()?;

        let config = std::fs::read(path).map_err(|source| DriverError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;

        let mut context = GenerationContext::new(config, working_dir);

        if piped.is_none() {
            let pending = input.pending_len().map_err(DriverError::InputProbe)?;
            if pending != 0 {
                tracing::debug!(bytes = pending, "stdin has content, using it as the manifest");
                let mut bytes = Vec::new();
                input
                    .read_to_end(&mut bytes)
                    .map_err(DriverError::InputProbe)?;
                *piped = Some(bytes);
            }
        }
        if let Some(bytes) = piped {
            context = context.manifest(ManifestRef::Stdin(bytes.clone()));
        }

        generate::invoke(&self.generator, context, &ConfigOrigin::File(path.to_path_buf()))
    }

    fn working_dir(&self) -> Result<PathBuf> {
        match &self.options.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(DriverError::WorkingDirectory),
        }
    }
}

/// Wrap a generated YAML stream in a `config.kubernetes.io/v1` `ResourceList`.
///
/// Output that already is a `ResourceList` keeps its `functionConfig`.
pub fn reenvelope(generated: &[u8]) -> Result<Vec<u8>> {
    let envelope = ByteReader::new()
        .read_bytes(generated)
        .map_err(DriverError::OutputDecode)?;

    let mut writer = ByteWriter::new().wrapping(RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND);
    if let Some(config) = envelope.function_config {
        writer = writer.function_config(config);
    }

    writer
        .to_bytes(&envelope.documents)
        .map_err(DriverError::OutputWrite)
}
