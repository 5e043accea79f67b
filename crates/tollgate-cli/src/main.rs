mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::CatalogCheck {
            catalog,
            registry,
            tier,
            config,
            json,
        } => commands::catalog_check::run(catalog, registry, tier, config, json),
        Commands::RequiredSet {
            profile,
            out,
            config,
            json,
        } => commands::required_set::run_generate(profile, out, config, json),
        Commands::RequiredSetCheck {
            profile,
            claimed,
            tier,
            config,
            json,
        } => commands::required_set::run_check(profile, claimed, tier, config, json),
        Commands::Disposition {
            code,
            tier,
            registry,
            config,
            json,
        } => commands::disposition::run(code, tier, registry, config, json),
        Commands::PromotionCheck {
            plan,
            record,
            profile,
            tier,
            config,
            json,
        } => commands::promotion_check::run(plan, record, profile, tier, config, json),
        Commands::FreezeCheck {
            profile,
            rollups,
            freeze,
            tier,
            config,
            json,
        } => commands::freeze_check::run(profile, rollups, freeze, tier, config, json),
        Commands::LockWrite {
            declaration,
            name,
            out,
            config,
            json,
        } => commands::lock::run_write(declaration, name, out, config, json),
        Commands::LockVerify {
            declaration,
            lock,
            tier,
            config,
            json,
        } => commands::lock::run_verify(declaration, lock, tier, config, json),
        Commands::AliasResolve {
            id,
            canon,
            tier,
            today,
            config,
            json,
        } => commands::alias_resolve::run(id, canon, tier, today, config, json),
        Commands::RollupRun {
            set,
            catalog,
            registry,
            profile,
            tier,
            timeout_ms,
            config,
            json,
        } => commands::rollup_run::run(
            set, catalog, registry, profile, tier, timeout_ms, config, json,
        ),
        Commands::SignalRegistry { json } => commands::signal_registry::run(json),
    }
}
