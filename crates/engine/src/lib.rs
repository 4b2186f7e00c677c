pub mod directory;
pub mod lifecycle;
pub mod resolver;
pub mod selection;

#[cfg(test)]
pub(crate) mod testutil;

pub use directory::{list_snapshots, list_volumes, MatchPolicy};
pub use lifecycle::{
    create_snapshot, delete_snapshots, ConfirmationGate, DeleteBatch, DeleteCriteria,
    DeleteOutcome,
};
pub use resolver::resolve_reference;
pub use selection::Selection;
