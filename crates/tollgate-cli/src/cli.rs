use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "tollgate",
    about = "Tollgate: deterministic policy gates over governed catalog documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Required set selected for a rollup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetArg {
    #[value(name = "core")]
    Core,
    #[value(name = "release")]
    Release,
    #[value(name = "active")]
    Active,
    #[value(name = "freezeMode")]
    FreezeMode,
}

impl SetArg {
    pub fn as_str(self) -> &'static str {
        match self {
            SetArg::Core => "core",
            SetArg::Release => "release",
            SetArg::Active => "active",
            SetArg::FreezeMode => "freezeMode",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-check the token catalog against the fail-signal registry
    CatalogCheck {
        /// Token catalog JSON path
        #[arg(long)]
        catalog: Option<String>,

        /// Fail-signal registry JSON path
        #[arg(long)]
        registry: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the four required token sets from an execution profile
    RequiredSet {
        /// Execution profile JSON path
        #[arg(long)]
        profile: Option<String>,

        /// Materialize the artifact at this path (atomic replace)
        #[arg(long)]
        out: Option<String>,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Audit a materialized required-set artifact against the profile
    RequiredSetCheck {
        /// Execution profile JSON path
        #[arg(long)]
        profile: Option<String>,

        /// Materialized required-set artifact path
        #[arg(long)]
        claimed: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve one failure code's mode and disposition at a tier
    Disposition {
        /// Failure code to resolve, e.g. E_ALIAS_SUNSET_EXPIRED
        code: String,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Fail-signal registry JSON path (builtin schedules when omitted)
        #[arg(long)]
        registry: Option<String>,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a promotion record against its stage plan and profile
    PromotionCheck {
        /// Stage plan JSON path
        #[arg(long)]
        plan: Option<String>,

        /// Promotion record JSON path
        #[arg(long)]
        record: Option<String>,

        /// Execution profile JSON path
        #[arg(long)]
        profile: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "promotion")]
        tier: String,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate the freeze baseline over observed rollup values
    FreezeCheck {
        /// Execution profile JSON path
        #[arg(long)]
        profile: Option<String>,

        /// Rollup values JSON path ({tokenId: 0|1})
        #[arg(long)]
        rollups: Option<String>,

        /// Treat freeze mode as enabled regardless of the profile flag
        #[arg(long)]
        freeze: bool,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write an immutability lock for a canonical document
    LockWrite {
        /// Canonical document JSON path
        #[arg(long)]
        declaration: Option<String>,

        /// Canonical source name recorded in the lock
        #[arg(long, default_value = "token-catalog")]
        name: String,

        /// Lock artifact path (atomic replace)
        #[arg(long)]
        out: Option<String>,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a canonical document against its lock
    LockVerify {
        /// Canonical document JSON path
        #[arg(long)]
        declaration: Option<String>,

        /// Lock artifact JSON path
        #[arg(long)]
        lock: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a token id through the alias canon
    AliasResolve {
        /// Token id to resolve
        id: String,

        /// Alias canon JSON path
        #[arg(long)]
        canon: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Evaluation date, YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        today: Option<String>,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run proof hooks for one required set and dispose the rollups
    RollupRun {
        /// Required set to roll up
        #[arg(long, value_enum, default_value = "core")]
        set: SetArg,

        /// Token catalog JSON path
        #[arg(long)]
        catalog: Option<String>,

        /// Fail-signal registry JSON path
        #[arg(long)]
        registry: Option<String>,

        /// Execution profile JSON path
        #[arg(long)]
        profile: Option<String>,

        /// Evaluation tier: prCore, release, or promotion
        #[arg(long, default_value = "prCore")]
        tier: String,

        /// Per-hook timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Config file path (default: tollgate.toml in the working directory)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the builtin failure-signal registry
    SignalRegistry {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
