pub mod alias_resolve;
pub mod catalog_check;
pub mod disposition;
pub mod freeze_check;
pub mod lock;
pub mod promotion_check;
pub mod required_set;
pub mod rollup_run;
pub mod signal_registry;
