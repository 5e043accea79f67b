use thiserror::Error;

/// Errors raised while decoding catalog-family documents.
///
/// These are document-level problems (the input cannot be understood at
/// all), distinct from the collected gate failures a well-formed but
/// inconsistent catalog produces.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to decode {doc}: {source}")]
    Decode {
        doc: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract violation: {0}")]
    Contract(String),
}
