//! Encoding of documents as a YAML stream or a wrapped `ResourceList`.

use std::io::Write;

use serde_yaml::{Mapping, Value};

use crate::document::{strip_annotations, ResourceDocument};
use crate::Result;

/// Writes resources back out.
///
/// Position annotations that [`crate::ByteReader`] added itself are removed.
/// Everything else, including position annotations present in the input,
/// survives unless listed in `clear_annotations`.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    clear_annotations: Vec<String>,
    wrapping: Option<Wrapping>,
    function_config: Option<Value>,
}

#[derive(Debug, Clone)]
struct Wrapping {
    api_version: String,
    kind: String,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotation keys removed from every document before writing.
    pub fn clear_annotations<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear_annotations.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Wrap the output in a list document with the given `apiVersion` and `kind`.
    pub fn wrapping(mut self, api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        self.wrapping = Some(Wrapping {
            api_version: api_version.into(),
            kind: kind.into(),
        });
        self
    }

    /// Function config emitted alongside the items. Only written when wrapping.
    pub fn function_config(mut self, config: Value) -> Self {
        self.function_config = Some(config);
        self
    }

    pub fn write(&self, documents: &[ResourceDocument], output: &mut impl Write) -> Result<()> {
        let bytes = self.to_bytes(documents)?;
        output.write_all(&bytes)?;
        output.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self, documents: &[ResourceDocument]) -> Result<Vec<u8>> {
        let values: Vec<Value> = documents
            .iter()
            .map(|doc| {
                let cleared: Vec<&str> = self
                    .clear_annotations
                    .iter()
                    .chain(doc.introduced_annotations())
                    .map(String::as_str)
                    .collect();
                strip_annotations(doc, &cleared).into_value()
            })
            .collect();

        match &self.wrapping {
            Some(wrapping) => self.encode_wrapped(wrapping, values),
            None => encode_stream(values),
        }
    }

    fn encode_wrapped(&self, wrapping: &Wrapping, items: Vec<Value>) -> Result<Vec<u8>> {
        let mut list = Mapping::new();
        list.insert(
            Value::String("apiVersion".to_string()),
            Value::String(wrapping.api_version.clone()),
        );
        list.insert(
            Value::String("kind".to_string()),
            Value::String(wrapping.kind.clone()),
        );
        list.insert(Value::String("items".to_string()), Value::Sequence(items));
        if let Some(config) = &self.function_config {
            list.insert(Value::String("functionConfig".to_string()), config.clone());
        }

        Ok(serde_yaml::to_string(&Value::Mapping(list))?.into_bytes())
    }
}

fn encode_stream(values: Vec<Value>) -> Result<Vec<u8>> {
    let mut out = String::new();
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(value)?);
    }
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteReader;

    const STREAM: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: cm
  annotations:
    config.k8s.io/id: "1"
    team: payments
data:
  key: value
---
apiVersion: v1
kind: Secret
metadata:
  name: s
"#;

    #[test]
    fn test_write_stream_clears_annotations() {
        let envelope = ByteReader::new().read_bytes(STREAM.as_bytes()).unwrap();

        let out = ByteWriter::new()
            .clear_annotations(["config.k8s.io/id"])
            .to_bytes(&envelope.documents)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\n  annotations:\n    team: payments\ndata:\n  key: value\n---\napiVersion: v1\nkind: Secret\nmetadata:\n  name: s\n"
        );
    }

    #[test]
    fn test_write_wrapped() {
        let envelope = ByteReader::new().read_bytes(STREAM.as_bytes()).unwrap();

        let out = ByteWriter::new()
            .wrapping("config.kubernetes.io/v1", "ResourceList")
            .to_bytes(&envelope.documents[1..])
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "apiVersion: config.kubernetes.io/v1\nkind: ResourceList\nitems:\n- apiVersion: v1\n  kind: Secret\n  metadata:\n    name: s\n"
        );
    }

    #[test]
    fn test_write_wrapped_empty() {
        let out = ByteWriter::new()
            .wrapping("config.kubernetes.io/v1", "ResourceList")
            .to_bytes(&[])
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "apiVersion: config.kubernetes.io/v1\nkind: ResourceList\nitems: []\n"
        );
    }

    #[test]
    fn test_write_keeps_index_annotations_from_input() {
        let input = "kind: A\nmetadata:\n  name: a\n  annotations:\n    config.kubernetes.io/index: '7'\n";
        let envelope = ByteReader::new().read_bytes(input.as_bytes()).unwrap();

        let out = ByteWriter::new().to_bytes(&envelope.documents).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "kind: A\nmetadata:\n  name: a\n  annotations:\n    config.kubernetes.io/index: '7'\n"
        );
    }

    #[test]
    fn test_write_stream_empty() {
        assert!(ByteWriter::new().to_bytes(&[]).unwrap().is_empty());
    }
}
