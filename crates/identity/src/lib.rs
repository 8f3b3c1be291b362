//! DID checkers for Voty
//!
//! A DID's suffix selects the checker that knows which chain the DID lives
//! on and how to tell whether an address controls it at a snapshot.

pub mod bit;
pub mod checker;
pub mod mock;
pub mod registry;

pub use bit::{BitDidChecker, BitPermission, BitSnapshotIndex, EVM_ALGORITHM_IDS};
pub use checker::DidChecker;
pub use mock::MemoryBitIndex;
pub use registry::DidRegistry;
