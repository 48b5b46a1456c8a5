//! Error types for the resource codec

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unable to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document {index} is not a mapping")]
    NotAMapping { index: usize },

    #[error("invalid ResourceList: {0}")]
    InvalidResourceList(String),
}

impl KioError {
    pub fn resource_list(message: impl Into<String>) -> Self {
        KioError::InvalidResourceList(message.into())
    }
}
