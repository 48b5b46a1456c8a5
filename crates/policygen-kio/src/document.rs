//! Resource documents and the envelope that carries them.

use serde_yaml::{Mapping, Value};

use crate::error::KioError;
use crate::Result;

/// A single resource: a YAML mapping with `metadata.annotations` access.
///
/// Field order is the order the document was read in and is kept on write.
/// Equality compares fields only.
#[derive(Debug, Clone)]
pub struct ResourceDocument {
    fields: Mapping,
    /// Annotations added by [`crate::ByteReader`] rather than present in the input.
    introduced: Vec<String>,
}

impl PartialEq for ResourceDocument {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl ResourceDocument {
    pub fn new(fields: Mapping) -> Self {
        Self {
            fields,
            introduced: Vec::new(),
        }
    }

    /// Wrap a decoded value, rejecting anything that is not a mapping.
    ///
    /// `index` is the document's position in its stream and only feeds the error.
    pub fn from_value(value: Value, index: usize) -> Result<Self> {
        match value {
            Value::Mapping(fields) => Ok(Self::new(fields)),
            _ => Err(KioError::NotAMapping { index }),
        }
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.fields)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.fields.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.fields.get("kind").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata()
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
    }

    /// Look up an annotation value.
    ///
    /// Unquoted scalars (`true`, `3`) are returned in their textual form, the
    /// way they appear in the source document.
    pub fn annotation(&self, key: &str) -> Option<String> {
        self.annotations_mapping()
            .and_then(|annotations| annotations.get(key))
            .and_then(scalar_text)
    }

    /// All annotations with a scalar value, in document order.
    pub fn annotations(&self) -> Vec<(String, String)> {
        let Some(annotations) = self.annotations_mapping() else {
            return Vec::new();
        };

        annotations
            .iter()
            .filter_map(|(key, value)| Some((key.as_str()?.to_string(), scalar_text(value)?)))
            .collect()
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations_mapping()
            .map(|annotations| annotations.contains_key(key))
            .unwrap_or(false)
    }

    /// Set an annotation, creating `metadata.annotations` when missing.
    pub fn set_annotation(&mut self, key: &str, value: &str) {
        let metadata = child_mapping_mut(&mut self.fields, "metadata");
        let annotations = child_mapping_mut(metadata, "annotations");
        annotations.insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }

    /// Set a label, creating `metadata.labels` when missing.
    pub fn set_label(&mut self, key: &str, value: &str) {
        let metadata = child_mapping_mut(&mut self.fields, "metadata");
        let labels = child_mapping_mut(metadata, "labels");
        labels.insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }

    /// Annotation keys the reader added to this document.
    pub fn introduced_annotations(&self) -> &[String] {
        &self.introduced
    }

    /// Set an annotation the input did not carry, so writers drop it again.
    pub(crate) fn introduce_annotation(&mut self, key: &str, value: &str) {
        self.set_annotation(key, value);
        if !self.introduced.iter().any(|k| k == key) {
            self.introduced.push(key.to_string());
        }
    }

    /// Remove annotations by key. An annotations mapping left empty is removed too.
    pub fn remove_annotations(&mut self, keys: &[&str]) {
        let Some(Value::Mapping(metadata)) = self.fields.get_mut("metadata") else {
            return;
        };
        let Some(Value::Mapping(annotations)) = metadata.get("annotations") else {
            return;
        };
        if !keys.iter().any(|key| annotations.contains_key(*key)) {
            return;
        }

        let kept: Mapping = annotations
            .iter()
            .filter(|(key, _)| !key.as_str().is_some_and(|key| keys.contains(&key)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if kept.is_empty() {
            // Rebuild instead of removing so the remaining metadata keeps its order.
            let rebuilt: Mapping = metadata
                .iter()
                .filter(|(key, _)| key.as_str() != Some("annotations"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            *metadata = rebuilt;
        } else {
            metadata.insert(Value::String("annotations".to_string()), Value::Mapping(kept));
        }
    }

    fn metadata(&self) -> Option<&Mapping> {
        self.fields.get("metadata").and_then(Value::as_mapping)
    }

    fn annotations_mapping(&self) -> Option<&Mapping> {
        self.metadata()
            .and_then(|metadata| metadata.get("annotations"))
            .and_then(Value::as_mapping)
    }
}

/// Return a copy of `doc` without the given annotation keys.
pub fn strip_annotations(doc: &ResourceDocument, keys: &[&str]) -> ResourceDocument {
    let mut stripped = doc.clone();
    stripped.remove_annotations(keys);
    stripped
}

/// An ordered list of resources plus the optional function config sideband.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub documents: Vec<ResourceDocument>,
    pub function_config: Option<Value>,
}

impl Envelope {
    pub fn new(documents: Vec<ResourceDocument>) -> Self {
        Self {
            documents,
            function_config: None,
        }
    }

    pub fn with_function_config(mut self, config: Value) -> Self {
        self.function_config = Some(config);
        self
    }

    pub fn first_document(&self) -> Option<&ResourceDocument> {
        self.documents.first()
    }

    /// Annotation value on the first document, if there is one.
    pub fn first_annotation(&self, key: &str) -> Option<String> {
        self.first_document().and_then(|doc| doc.annotation(key))
    }

    /// Serialize the function config as JSON. A missing config encodes as `null`.
    pub fn function_config_json(&self) -> Result<Vec<u8>> {
        let config = self.function_config.as_ref().unwrap_or(&Value::Null);
        Ok(serde_json::to_vec(config)?)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn child_mapping_mut<'a>(parent: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    if !matches!(parent.get(key), Some(Value::Mapping(_))) {
        parent.insert(Value::String(key.to_string()), Value::Mapping(Mapping::new()));
    }

    match parent.get_mut(key) {
        Some(Value::Mapping(child)) => child,
        _ => unreachable!("{key} was just set to a mapping"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ResourceDocument {
        let value: Value = serde_yaml::from_str(yaml).expect("valid yaml");
        ResourceDocument::from_value(value, 0).expect("mapping")
    }

    #[test]
    fn test_annotation_lookup() {
        let d = doc(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: cm
  annotations:
    config.kubernetes.io/local-config: "true"
    unquoted: true
"#,
        );

        assert_eq!(d.name(), Some("cm"));
        assert_eq!(d.kind(), Some("ConfigMap"));
        assert_eq!(d.annotation("config.kubernetes.io/local-config").as_deref(), Some("true"));
        assert_eq!(d.annotation("unquoted").as_deref(), Some("true"));
        assert_eq!(d.annotation("missing"), None);
    }

    #[test]
    fn test_strip_annotations_keeps_others_in_order() {
        let d = doc(
            r#"
kind: ConfigMap
metadata:
  name: cm
  annotations:
    a: "1"
    config.k8s.io/id: "1"
    b: "2"
"#,
        );

        let stripped = strip_annotations(&d, &["config.k8s.io/id"]);

        assert_eq!(
            stripped.annotations(),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        // the input is left untouched
        assert!(d.has_annotation("config.k8s.io/id"));
    }

    #[test]
    fn test_strip_last_annotation_drops_mapping() {
        let d = doc(
            r#"
kind: ConfigMap
metadata:
  annotations:
    config.k8s.io/id: "1"
  name: cm
"#,
        );

        let stripped = strip_annotations(&d, &["config.k8s.io/id"]);
        let metadata = stripped.fields().get("metadata").and_then(Value::as_mapping).unwrap();

        assert!(!metadata.contains_key("annotations"));
        assert_eq!(stripped.name(), Some("cm"));
    }

    #[test]
    fn test_set_annotation_creates_metadata() {
        let mut d = doc("kind: Secret\n");
        d.set_annotation("owner", "team-a");
        d.set_label("app", "web");

        assert_eq!(d.annotation("owner").as_deref(), Some("team-a"));
        let labels = d
            .fields()
            .get("metadata")
            .and_then(|metadata| metadata.get("labels"))
            .and_then(Value::as_mapping)
            .unwrap();
        assert_eq!(labels.get("app").and_then(Value::as_str), Some("web"));
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = ResourceDocument::from_value(Value::String("x".into()), 3).unwrap_err();
        assert!(matches!(err, KioError::NotAMapping { index: 3 }));
    }

    #[test]
    fn test_function_config_json() {
        let config: Value =
            serde_yaml::from_str("kind: PolicyGenerator\nmetadata:\n  name: p\n").unwrap();
        let envelope = Envelope::default().with_function_config(config);

        let json = envelope.function_config_json().unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"kind":"PolicyGenerator","metadata":{"name":"p"}}"#
        );

        assert_eq!(Envelope::default().function_config_json().unwrap(), b"null");
    }

    #[test]
    fn test_function_config_with_complex_key_fails() {
        let config: Value = serde_yaml::from_str("? [a, b]\n: value\n").unwrap();
        let envelope = Envelope::default().with_function_config(config);

        assert!(matches!(envelope.function_config_json(), Err(KioError::Json(_))));
    }
}
