//! The Tollgate kernel: tiers, dispositions, failure witnesses, and
//! canonical digests.
//!
//! Document-agnostic. The kernel does not know what gates check; it fixes
//! how detected failures are classified, disposed per tier, and reported:
//!
//! - a [`Tier`] names the pipeline stage an evaluation runs under
//! - a signal's [`ModeMatrix`] assigns each tier an advisory or blocking
//!   [`Mode`]; detected failures dispose to WARN or FAIL accordingly
//! - evaluations collect ALL applicable failures into a [`GateReport`]
//!   whose ordering is deterministic
//! - [`canonical::digest_hex`] fixes the content digest every immutability
//!   surface uses
//!
//! The builtin signal table in [`signals`] is the authority for codes the
//! engine itself emits.

pub mod canonical;
pub mod signals;
pub mod tier;
pub mod witness;

pub use canonical::{canonical_bytes, digest_hex, is_digest_hex};
pub use signals::{BUILTIN_SIGNALS, BuiltinSignal, builtin_registry_json, builtin_signal, code};
pub use tier::{Disposition, Mode, ModeMatrix, Tier};
pub use witness::{DisposedFailure, FailureKind, GateFailure, GateReport, outcome_token};
