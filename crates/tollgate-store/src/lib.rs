//! Document IO for tollgate: reading governed documents, writing
//! artifacts atomically, and pinning documents under digest locks.

pub mod atomic;
pub mod document;
pub mod error;
pub mod lock;
pub mod required_sets_file;

pub use atomic::write_json_atomic;
pub use document::read_json_value;
pub use error::StoreError;
pub use lock::{CatalogLock, LOCK_KIND, compute_lock, decode_lock, verify_lock};
pub use required_sets_file::{
    REQUIRED_SETS_KIND, RequiredSetsDoc, audit_required_sets_doc, build_required_sets_doc,
    decode_required_sets_doc,
};
