//! Integration tests for reading and re-writing resource envelopes

use policygen_kio::{
    ByteReader, ByteWriter, Envelope, INDEX_ANNOTATION, INTERNAL_INDEX_ANNOTATION,
    LOCAL_CONFIG_ANNOTATION, RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND,
};

const INPUT: &str = r#"
apiVersion: config.kubernetes.io/v1
kind: ResourceList
items:
- apiVersion: apps/v1
  kind: Deployment
  metadata:
    name: web
    namespace: prod
    annotations:
      config.kubernetes.io/local-config: "true"
      owner: team-a
      internal.config.kubernetes.io/id: "3"
  spec:
    replicas: 2
- apiVersion: v1
  kind: Service
  metadata:
    name: web
- apiVersion: v1
  kind: ConfigMap
  metadata:
    name: settings
    labels:
      tier: backend
functionConfig:
  apiVersion: policy.open-cluster-management.io/v1
  kind: PolicyGenerator
  metadata:
    name: sample
"#;

fn read(bytes: &[u8]) -> Envelope {
    ByteReader::new().read_bytes(bytes).expect("decode failed")
}

#[test]
fn test_round_trip_preserves_order_and_annotations() {
    let first = read(INPUT.as_bytes());

    let encoded = ByteWriter::new()
        .wrapping(RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND)
        .to_bytes(&first.documents)
        .expect("encode failed");
    let second = read(&encoded);

    assert_eq!(first.documents, second.documents);

    let names: Vec<_> = second.documents.iter().map(|d| d.kind().unwrap()).collect();
    assert_eq!(names, vec!["Deployment", "Service", "ConfigMap"]);

    let deployment = &second.documents[0];
    assert_eq!(deployment.annotation("owner").as_deref(), Some("team-a"));
    assert_eq!(deployment.annotation("internal.config.kubernetes.io/id").as_deref(), Some("3"));
}

#[test]
fn test_unwrapped_round_trip() {
    let first = read(INPUT.as_bytes());

    let encoded = ByteWriter::new().to_bytes(&first.documents).expect("encode failed");
    let second = read(&encoded);

    assert_eq!(first.documents, second.documents);
    assert!(second.function_config.is_none());
}

#[test]
fn test_first_annotation() {
    let envelope = read(INPUT.as_bytes());
    assert_eq!(envelope.first_annotation(LOCAL_CONFIG_ANNOTATION).as_deref(), Some("true"));
    assert_eq!(envelope.first_annotation("missing"), None);

    assert_eq!(Envelope::default().first_annotation(LOCAL_CONFIG_ANNOTATION), None);
}

#[test]
fn test_function_config_carried_when_wrapping() {
    let envelope = read(INPUT.as_bytes());
    let config = envelope.function_config.clone().expect("function config");

    let encoded = ByteWriter::new()
        .wrapping(RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND)
        .function_config(config.clone())
        .to_bytes(&envelope.documents)
        .expect("encode failed");

    assert_eq!(read(&encoded).function_config, Some(config));
}

#[test]
fn test_json_input() {
    let input = r#"{"apiVersion":"config.kubernetes.io/v1","kind":"ResourceList","items":[{"kind":"A","metadata":{"name":"a"}}],"functionConfig":{"kind":"Gen"}}"#;

    let envelope = read(input.as_bytes());
    assert_eq!(envelope.documents.len(), 1);
    assert_eq!(envelope.function_config_json().unwrap(), br#"{"kind":"Gen"}"#);
}

#[test]
fn test_index_annotations_from_input_survive_round_trip() {
    let input = r#"
apiVersion: config.kubernetes.io/v1
kind: ResourceList
items:
- kind: ConfigMap
  metadata:
    name: a
    annotations:
      config.kubernetes.io/index: "7"
      internal.config.kubernetes.io/index: "7"
- kind: ConfigMap
  metadata:
    name: b
"#;

    let first = read(input.as_bytes());
    let encoded = ByteWriter::new()
        .wrapping(RESOURCE_LIST_API_VERSION, RESOURCE_LIST_KIND)
        .to_bytes(&first.documents)
        .expect("encode failed");

    let reread = ByteReader::new()
        .omit_reader_annotations(true)
        .read_bytes(&encoded)
        .expect("decode failed");

    let a = &reread.documents[0];
    assert_eq!(a.annotation(INDEX_ANNOTATION).as_deref(), Some("7"));
    assert_eq!(a.annotation(INTERNAL_INDEX_ANNOTATION).as_deref(), Some("7"));
    // the reader tagged b itself, so the writer dropped the tags again
    assert!(reread.documents[1].annotations().is_empty());
}
