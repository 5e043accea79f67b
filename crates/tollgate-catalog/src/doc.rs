//! Token catalog and fail-signal registry documents.
//!
//! The catalog names every governed token and binds it to a fail signal
//! and a proof hook. The registry declares each signal's severity
//! schedule. Both are versioned JSON documents with a `schema` integer
//! and a kind discriminator.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tollgate_kernel::{ModeMatrix, Tier};

pub const TOKEN_CATALOG_KIND: &str = "tollgate.token_catalog.v1";
pub const FAILSIGNAL_REGISTRY_KIND: &str = "tollgate.failsignal_registry.v1";

/// How a token's rollup value is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceBinding {
    Script,
    ContractTest,
    Generated,
}

/// One governed boolean token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token_id: String,

    /// Signal raised when this token rolls up 0.
    pub fail_signal_code: String,

    /// Opaque command reference executed by the hook runner.
    pub proof_hook_ref: String,

    pub source_binding: SourceBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenCatalog {
    pub schema: u32,
    pub catalog_kind: String,
    pub tokens: Vec<Token>,
}

impl TokenCatalog {
    /// First token declared under `token_id`.
    pub fn token(&self, token_id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.token_id == token_id)
    }
}

/// One declared fail signal and its severity schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailSignal {
    /// Stable code, `E_[A-Z0-9_]+`.
    pub code: String,

    /// Blocking signals MUST carry a `negativeTestRef`.
    pub blocking: bool,

    /// Tier this signal primarily gates.
    pub tier: Tier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_test_ref: Option<String>,

    pub mode_matrix: ModeMatrix,

    /// Audit ordering weight. Kept as a raw value so a malformed
    /// declaration surfaces as a collected validation failure instead of
    /// aborting the decode.
    #[serde(default)]
    pub precedence: Value,
}

impl FailSignal {
    /// Declared precedence, when it is a non-negative JSON integer.
    pub fn precedence_u32(&self) -> Option<u32> {
        self.precedence
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn has_negative_test_ref(&self) -> bool {
        self.negative_test_ref
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailSignalRegistry {
    pub schema: u32,
    pub registry_kind: String,
    pub signals: Vec<FailSignal>,
}

impl FailSignalRegistry {
    /// First signal declared under `code`.
    pub fn signal(&self, code: &str) -> Option<&FailSignal> {
        self.signals.iter().find(|s| s.code == code)
    }
}

pub fn decode_token_catalog(value: &Value) -> Result<TokenCatalog, CatalogError> {
    let catalog: TokenCatalog =
        serde_json::from_value(value.clone()).map_err(|source| CatalogError::Decode {
            doc: "token catalog",
            source,
        })?;
    if catalog.schema != 1 {
        return Err(CatalogError::Contract(format!(
            "token catalog schema must be 1, got {}",
            catalog.schema
        )));
    }
    if catalog.catalog_kind != TOKEN_CATALOG_KIND {
        return Err(CatalogError::Contract(format!(
            "catalogKind must be {TOKEN_CATALOG_KIND:?}, got {:?}",
            catalog.catalog_kind
        )));
    }
    Ok(catalog)
}

pub fn decode_failsignal_registry(value: &Value) -> Result<FailSignalRegistry, CatalogError> {
    let registry: FailSignalRegistry =
        serde_json::from_value(value.clone()).map_err(|source| CatalogError::Decode {
            doc: "fail-signal registry",
            source,
        })?;
    if registry.schema != 1 {
        return Err(CatalogError::Contract(format!(
            "fail-signal registry schema must be 1, got {}",
            registry.schema
        )));
    }
    if registry.registry_kind != FAILSIGNAL_REGISTRY_KIND {
        return Err(CatalogError::Contract(format!(
            "registryKind must be {FAILSIGNAL_REGISTRY_KIND:?}, got {:?}",
            registry.registry_kind
        )));
    }
    Ok(registry)
}
