//! Resource stream codec for KRM functions.
//!
//! Decodes a YAML stream (or a `ResourceList` envelope) into an ordered
//! [`Envelope`] of [`ResourceDocument`]s and writes documents back out, either
//! as a bare stream or wrapped in a `ResourceList`.

mod document;
mod error;
mod reader;
mod writer;

pub use document::{strip_annotations, Envelope, ResourceDocument};
pub use error::KioError;
pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, KioError>;

/// API version written on `ResourceList` envelopes.
pub const RESOURCE_LIST_API_VERSION: &str = "config.kubernetes.io/v1";

/// Older API version still accepted on input.
pub const LEGACY_RESOURCE_LIST_API_VERSION: &str = "config.kubernetes.io/v1alpha1";

/// Kind of the envelope document.
pub const RESOURCE_LIST_KIND: &str = "ResourceList";

/// Marks a document as configuration for the function rather than content.
pub const LOCAL_CONFIG_ANNOTATION: &str = "config.kubernetes.io/local-config";

/// Position of a document in the stream it was read from.
pub const INDEX_ANNOTATION: &str = "config.kubernetes.io/index";

/// Internal twin of [`INDEX_ANNOTATION`].
pub const INTERNAL_INDEX_ANNOTATION: &str = "internal.config.kubernetes.io/index";
