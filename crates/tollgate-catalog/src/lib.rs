//! Token catalog and fail-signal registry: documents, consistency
//! validation, and disposition lookup.
//!
//! The catalog names every governed token; the registry declares each
//! fail signal's severity schedule. [`validate_catalog`] cross-checks the
//! pair and collects every inconsistency in one pass. [`SignalIndex`] is
//! the one place a failure code turns into a tier disposition; every
//! evaluator in the workspace routes through it.

pub mod doc;
pub mod error;
pub mod index;
pub mod validate;

pub use doc::{
    FAILSIGNAL_REGISTRY_KIND, FailSignal, FailSignalRegistry, SourceBinding, TOKEN_CATALOG_KIND,
    Token, TokenCatalog, decode_failsignal_registry, decode_token_catalog,
};
pub use error::CatalogError;
pub use index::SignalIndex;
pub use validate::validate_catalog;
