//! Error types for the generator driver

use std::fmt;
use std::path::PathBuf;

use policygen_kio::KioError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

/// Where a generator config came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// The `functionConfig` of a streamed `ResourceList`.
    FunctionConfig,
    /// A config file named on the command line.
    File(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::FunctionConfig => write!(f, "the function config"),
            ConfigOrigin::File(path) => write!(f, "'{}'", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to read the input resource list: {0}")]
    Decode(#[source] KioError),

    #[error("unable to marshal configuration: {0}")]
    Serialization(#[source] KioError),

    #[error("failed to determine the current directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("failed to read file '{}': {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read stdin: {0}")]
    InputProbe(#[source] std::io::Error),

    #[error("error creating an input file: {0}")]
    StagingCreate(#[source] std::io::Error),

    #[error("error writing stdin to the input file: {0}")]
    StagingWrite(#[source] KioError),

    #[error("error processing the generator config from {origin}: {message}")]
    Config { origin: ConfigOrigin, message: String },

    #[error("error generating output from {origin}: {message}")]
    Generation { origin: ConfigOrigin, message: String },

    #[error("error reading generator output: {0}")]
    OutputDecode(#[source] KioError),

    #[error("error writing generator output: {0}")]
    OutputWrite(#[source] KioError),
}

impl DriverError {
    pub fn config(origin: ConfigOrigin, message: impl Into<String>) -> Self {
        DriverError::Config {
            origin,
            message: message.into(),
        }
    }

    pub fn generation(origin: ConfigOrigin, message: impl Into<String>) -> Self {
        DriverError::Generation {
            origin,
            message: message.into(),
        }
    }
}
