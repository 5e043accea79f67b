//! Disposition lookup shared by every evaluator.
//!
//! Resolution order for a failure code: registry-declared signal, then the
//! kernel's builtin table, then fail-closed (blocking in every tier).
//! Detection and disposition stay separate: checks report that a failure
//! exists, this index decides how severely the evaluated tier treats it.

use crate::doc::FailSignalRegistry;
use std::collections::BTreeMap;
use tollgate_kernel::{
    DisposedFailure, GateFailure, Mode, ModeMatrix, Tier, builtin_signal,
};

#[derive(Debug, Clone, Default)]
pub struct SignalIndex {
    declared: BTreeMap<String, (ModeMatrix, u32)>,
}

impl SignalIndex {
    /// An index holding only the builtin table.
    ///
    /// Engine self-checks dispose through this so a registry under
    /// validation cannot soften its own validation failures.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    /// Index a registry's declared signals. The first declaration of a
    /// code wins, matching [`FailSignalRegistry::signal`].
    pub fn from_registry(registry: &FailSignalRegistry) -> Self {
        let mut declared = BTreeMap::new();
        for signal in &registry.signals {
            declared
                .entry(signal.code.clone())
                .or_insert((signal.mode_matrix, signal.precedence_u32().unwrap_or(0)));
        }
        Self { declared }
    }

    /// Mode matrix and precedence for `code`.
    pub fn resolve(&self, code: &str) -> (ModeMatrix, u32) {
        if let Some((matrix, precedence)) = self.declared.get(code) {
            return (*matrix, *precedence);
        }
        if let Some(builtin) = builtin_signal(code) {
            return (builtin.mode_matrix, builtin.precedence);
        }
        (ModeMatrix::uniform(Mode::Blocking), 0)
    }

    /// Dispose one detected failure under the mode its matrix assigns in
    /// `tier`.
    pub fn dispose(&self, failure: GateFailure, tier: Tier) -> DisposedFailure {
        let (matrix, precedence) = self.resolve(&failure.code);
        DisposedFailure::new(failure, matrix.mode_for(tier), precedence)
    }

    /// Dispose a batch of detected failures in `tier`.
    pub fn dispose_all(&self, failures: Vec<GateFailure>, tier: Tier) -> Vec<DisposedFailure> {
        failures
            .into_iter()
            .map(|failure| self.dispose(failure, tier))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{FAILSIGNAL_REGISTRY_KIND, FailSignal};
    use serde_json::json;
    use tollgate_kernel::{Disposition, FailureKind, code};

    fn registry_with(signals: Vec<FailSignal>) -> FailSignalRegistry {
        FailSignalRegistry {
            schema: 1,
            registry_kind: FAILSIGNAL_REGISTRY_KIND.to_string(),
            signals,
        }
    }

    fn declared(code: &str, matrix: ModeMatrix, precedence: u32) -> FailSignal {
        FailSignal {
            code: code.to_string(),
            blocking: true,
            tier: Tier::PrCore,
            negative_test_ref: Some("tests/negative/declared.rs".to_string()),
            mode_matrix: matrix,
            precedence: json!(precedence),
        }
    }

    #[test]
    fn declared_signal_beats_builtin() {
        // The builtin table blocks E_ALIAS_UNKNOWN everywhere; a registry
        // declaration downgrades it for this index.
        let index = SignalIndex::from_registry(&registry_with(vec![declared(
            code::ALIAS_UNKNOWN,
            ModeMatrix::uniform(Mode::Advisory),
            9,
        )]));
        let (matrix, precedence) = index.resolve(code::ALIAS_UNKNOWN);
        assert_eq!(matrix.mode_for(Tier::Promotion), Mode::Advisory);
        assert_eq!(precedence, 9);
    }

    #[test]
    fn builtin_fallback_applies_without_declaration() {
        let index = SignalIndex::builtin_only();
        let (matrix, _) = index.resolve(code::ALIAS_SUNSET_EXPIRED);
        assert_eq!(matrix.mode_for(Tier::PrCore), Mode::Advisory);
        assert_eq!(matrix.mode_for(Tier::Promotion), Mode::Blocking);
    }

    #[test]
    fn unknown_code_disposes_fail_closed() {
        let index = SignalIndex::builtin_only();
        for tier in Tier::ALL {
            let disposed = index.dispose(
                GateFailure::new("E_NOBODY_DECLARED_THIS", FailureKind::Policy, "mystery", None),
                tier,
            );
            assert_eq!(disposed.mode, Mode::Blocking);
            assert_eq!(disposed.disposition, Disposition::Fail);
            assert_eq!(disposed.precedence, 0);
        }
    }

    #[test]
    fn dispose_is_tier_sensitive() {
        let index = SignalIndex::from_registry(&registry_with(vec![declared(
            "E_TIERED",
            ModeMatrix {
                pr_core: Mode::Advisory,
                release: Mode::Blocking,
                promotion: Mode::Blocking,
            },
            3,
        )]));
        let detect = || GateFailure::new("E_TIERED", FailureKind::Policy, "hit", None);
        assert_eq!(
            index.dispose(detect(), Tier::PrCore).disposition,
            Disposition::Warn
        );
        assert_eq!(
            index.dispose(detect(), Tier::Release).disposition,
            Disposition::Fail
        );
    }

    #[test]
    fn first_declaration_of_a_code_wins() {
        let index = SignalIndex::from_registry(&registry_with(vec![
            declared("E_TWICE", ModeMatrix::uniform(Mode::Advisory), 1),
            declared("E_TWICE", ModeMatrix::uniform(Mode::Blocking), 2),
        ]));
        let (matrix, precedence) = index.resolve("E_TWICE");
        assert_eq!(matrix.mode_for(Tier::PrCore), Mode::Advisory);
        assert_eq!(precedence, 1);
    }
}
