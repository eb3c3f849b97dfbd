pub mod engine;
pub mod export;
pub mod index;
pub mod io;
pub mod prompt;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;

pub mod prelude {
    pub use crate::index::{Index, group_by_key};
    pub use crate::reconcile::{ConflictCase, Disposition, Reconciliation, Resolver, reconcile};
    pub use crate::record::{IdentityKey, KeyEncoding, Record};
}
