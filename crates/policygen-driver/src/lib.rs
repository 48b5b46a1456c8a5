//! Policy generator driver
//!
//! Runs a generator either over config files named on the command line, or as
//! a KRM function reading a `ResourceList` from stdin and writing one to stdout.
//! When run as a function over non-config resources, those resources are staged
//! to a temporary file and handed to the generator as its manifest.

pub mod bundle;
pub mod driver;
pub mod error;
pub mod exit;
pub mod generate;
pub mod input;
pub mod mode;
pub mod staging;

pub use bundle::BundleGenerator;
pub use driver::{reenvelope, Driver, DriverOptions};
pub use error::{ConfigOrigin, DriverError, Result};
pub use exit::{ExitPolicy, Verdict};
pub use generate::{GenerationContext, Generator, GeneratorError, ManifestRef};
pub use input::{InputSource, StdinSource};
pub use mode::Mode;
pub use staging::{requires_staging, StagingArtifact, BOOKKEEPING_ANNOTATIONS};
