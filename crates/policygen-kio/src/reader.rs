//! Decoding of resource streams and `ResourceList` envelopes.

use std::io::Read;

use serde::Deserialize;
use serde_yaml::Value;

use crate::document::{Envelope, ResourceDocument};
use crate::error::KioError;
use crate::{
    Result, INDEX_ANNOTATION, INTERNAL_INDEX_ANNOTATION, LEGACY_RESOURCE_LIST_API_VERSION,
    RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND,
};

/// Reads resources from a YAML stream.
///
/// A stream holding a single `ResourceList` is unwrapped: its `items` become the
/// documents and its `functionConfig` the envelope's sideband. Any other stream
/// is read as one resource per YAML document.
#[derive(Debug, Clone, Default)]
pub struct ByteReader {
    omit_reader_annotations: bool,
}

impl ByteReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip tagging documents with their stream position.
    pub fn omit_reader_annotations(mut self, omit: bool) -> Self {
        self.omit_reader_annotations = omit;
        self
    }

    pub fn read(&self, input: &mut impl Read) -> Result<Envelope> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        self.read_bytes(&bytes)
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Envelope> {
        let values = split_documents(bytes)?;

        let mut envelope = match values.iter().position(is_resource_list) {
            Some(_) if values.len() > 1 => {
                return Err(KioError::resource_list(
                    "a ResourceList must be the only document in the stream",
                ));
            }
            Some(_) => unwrap_resource_list(values.into_iter().next().unwrap_or(Value::Null))?,
            None => Envelope::new(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| ResourceDocument::from_value(value, index))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        if !self.omit_reader_annotations {
            for (index, doc) in envelope.documents.iter_mut().enumerate() {
                let position = index.to_string();
                for key in [INDEX_ANNOTATION, INTERNAL_INDEX_ANNOTATION] {
                    if !doc.has_annotation(key) {
                        doc.introduce_annotation(key, &position);
                    }
                }
            }
        }

        tracing::trace!(
            documents = envelope.documents.len(),
            function_config = envelope.function_config.is_some(),
            "decoded resource stream"
        );

        Ok(envelope)
    }
}

/// Split a YAML stream into its non-empty documents.
fn split_documents(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            values.push(value);
        }
    }
    Ok(values)
}

fn is_resource_list(value: &Value) -> bool {
    let api_version = value.get("apiVersion").and_then(Value::as_str);
    let kind = value.get("kind").and_then(Value::as_str);

    kind == Some(RESOURCE_LIST_KIND)
        && matches!(
            api_version,
            Some(RESOURCE_LIST_API_VERSION) | Some(LEGACY_RESOURCE_LIST_API_VERSION)
        )
}

fn unwrap_resource_list(value: Value) -> Result<Envelope> {
    let Value::Mapping(mut list) = value else {
        return Err(KioError::NotAMapping { index: 0 });
    };

    let items = match list.remove("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items,
        Some(_) => return Err(KioError::resource_list("items must be a sequence")),
    };

    let documents = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| ResourceDocument::from_value(item, index))
        .collect::<Result<Vec<_>>>()?;

    let function_config = match list.remove("functionConfig") {
        None | Some(Value::Null) => None,
        Some(config) => Some(config),
    };

    Ok(Envelope {
        documents,
        function_config,
    })
}
