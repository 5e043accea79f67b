//! Optional `tollgate.toml` working-directory config.
//!
//! Explicit flags always win; the config only supplies defaults for
//! document paths and the hook timeout. A `--config` path must exist;
//! the implicit working-directory file is allowed to be absent.

use crate::support::emit_error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "tollgate.toml";
pub const DEFAULT_HOOK_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_CATALOG_PATH: &str = ".tollgate/token-catalog.json";
pub const DEFAULT_REGISTRY_PATH: &str = ".tollgate/failsignal-registry.json";
pub const DEFAULT_PROFILE_PATH: &str = ".tollgate/execution-profile.json";
pub const DEFAULT_PLAN_PATH: &str = ".tollgate/stage-plan.json";
pub const DEFAULT_RECORD_PATH: &str = ".tollgate/promotion-record.json";
pub const DEFAULT_CANON_PATH: &str = ".tollgate/alias-canon.json";
pub const DEFAULT_LOCK_PATH: &str = ".tollgate/catalog.lock.json";
pub const DEFAULT_ROLLUPS_PATH: &str = ".tollgate/rollups.json";
pub const DEFAULT_CLAIMED_PATH: &str = ".tollgate/required-sets.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub documents: Documents,
    pub hooks: Hooks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Documents {
    pub catalog: Option<String>,
    pub registry: Option<String>,
    pub profile: Option<String>,
    pub plan: Option<String>,
    pub record: Option<String>,
    pub canon: Option<String>,
    pub lock: Option<String>,
    pub declaration: Option<String>,
    pub rollups: Option<String>,
    pub claimed: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hooks {
    pub timeout_ms: u64,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HOOK_TIMEOUT_MS,
        }
    }
}

pub fn load_config(explicit: Option<&str>) -> Config {
    match explicit {
        Some(path) => parse_config_or_exit(path),
        None => {
            if Path::new(DEFAULT_CONFIG_PATH).exists() {
                parse_config_or_exit(DEFAULT_CONFIG_PATH)
            } else {
                Config::default()
            }
        }
    }
}

fn parse_config_or_exit(path: &str) -> Config {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|err| emit_error(format!("failed to read config at {path}: {err}")));
    toml::from_str(&text)
        .unwrap_or_else(|err| emit_error(format!("failed to parse config at {path}: {err}")))
}

/// Flag beats config beats the builtin default.
pub fn resolve_path(flag: Option<String>, configured: Option<&String>, default_path: &str) -> String {
    flag.or_else(|| configured.cloned())
        .unwrap_or_else(|| default_path.to_string())
}
