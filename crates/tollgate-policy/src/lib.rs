//! Policy evaluation for tollgate: execution profiles, required-set
//! expansion, staged promotion checks, freeze baselines, and alias
//! canon resolution.
//!
//! Everything here is a pure function over decoded documents plus
//! injected context (tier, date, flag states). Reading files, running
//! hooks, and choosing exit codes belong to the store, rollup, and cli
//! crates.

pub mod alias;
pub mod error;
pub mod freeze;
pub mod profile;
pub mod required_set;
pub mod stage;

pub use alias::{ALIAS_CANON_KIND, AliasCanon, AliasResolution, decode_alias_canon, resolve_alias};
pub use error::PolicyError;
pub use freeze::{FREEZE_TOKEN_KEY, FreezeOutcome, evaluate_freeze};
pub use profile::{
    ConditionalGate, EXECUTION_PROFILE_KIND, ExecutionProfile, ScopeFlag, TierSetDecl, TierSets,
    decode_execution_profile,
};
pub use required_set::{RequiredSets, audit_required_sets, generate_required_sets};
pub use stage::{
    MetricSchema, MetricType, PROMOTION_RECORD_KIND, PromotionRecord, STAGE_PLAN_KIND, StagePlan,
    decode_promotion_record, decode_stage_plan, validate_promotion,
};
