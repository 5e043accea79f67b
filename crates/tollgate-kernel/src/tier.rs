//! Evaluation tiers, severity modes, and dispositions.
//!
//! A tier names the pipeline stage an evaluation runs under. A signal's
//! mode matrix assigns each tier a severity mode; a detected failure under
//! an advisory mode disposes to WARN, under a blocking mode to FAIL.
//! Dispositions combine by keeping the worst.

use serde::{Deserialize, Serialize};

/// The pipeline tier an evaluation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    PrCore,
    Release,
    Promotion,
}

impl Tier {
    /// All tiers, in pipeline order.
    pub const ALL: [Tier; 3] = [Tier::PrCore, Tier::Release, Tier::Promotion];

    /// Wire name, matching the serde/camelCase form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::PrCore => "prCore",
            Tier::Release => "release",
            Tier::Promotion => "promotion",
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prCore" => Ok(Tier::PrCore),
            "release" => Ok(Tier::Release),
            "promotion" => Ok(Tier::Promotion),
            other => Err(format!(
                "unknown tier '{other}' (expected prCore, release, or promotion)"
            )),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity mode of a signal within one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Advisory,
    Blocking,
}

impl Mode {
    /// Disposition of a detected failure under this mode.
    pub fn dispose(self) -> Disposition {
        match self {
            Mode::Advisory => Disposition::Warn,
            Mode::Blocking => Disposition::Fail,
        }
    }
}

/// Per-tier severity modes for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeMatrix {
    pub pr_core: Mode,
    pub release: Mode,
    pub promotion: Mode,
}

impl ModeMatrix {
    /// The same mode in every tier.
    pub const fn uniform(mode: Mode) -> Self {
        Self {
            pr_core: mode,
            release: mode,
            promotion: mode,
        }
    }

    /// The mode this matrix assigns to `tier`.
    pub fn mode_for(&self, tier: Tier) -> Mode {
        match tier {
            Tier::PrCore => self.pr_core,
            Tier::Release => self.release,
            Tier::Promotion => self.promotion,
        }
    }
}

/// Outcome severity of an evaluation.
///
/// Ordering is by severity, so `max` combines two dispositions into the
/// worse one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Disposition {
    Pass,
    Warn,
    Fail,
}

impl Disposition {
    /// Combine with another disposition, keeping the worse of the two.
    pub fn combine(self, other: Disposition) -> Disposition {
        self.max(other)
    }

    /// WARN does not block: only FAIL makes an evaluation not ok.
    pub fn is_ok(&self) -> bool {
        *self != Disposition::Fail
    }

    /// Uppercase label for human-readable output.
    pub fn label(&self) -> &'static str {
        match self {
            Disposition::Pass => "PASS",
            Disposition::Warn => "WARN",
            Disposition::Fail => "FAIL",
        }
    }
}
