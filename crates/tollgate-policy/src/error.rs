use thiserror::Error;

/// Errors raised while decoding policy documents.
///
/// Contract violations here mean the document cannot be evaluated at all
/// (malformed plan structure, wrong kind string). Rule violations by a
/// well-formed document are collected gate failures, not errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to decode {doc}: {source}")]
    Decode {
        doc: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract violation: {0}")]
    Contract(String),
}
