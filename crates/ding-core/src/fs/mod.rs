//! File system abstractions for ding.
//!
//! [`entry::DirectoryEntry`] describes one listed entry,
//! [`gateway::FilesystemGateway`] is the seam every disk access goes
//! through, and [`ops`] holds listing, ordering and write-probe helpers.

pub mod entry;
pub mod gateway;
pub mod ops;

pub use entry::DirectoryEntry;
pub use gateway::{FilesystemGateway, LocalFs};
