//! Minimal host runtime.
//!
//! The integration expects a host that stores config entries, keeps flows
//! alive between steps and runs one refresh loop per configured stop. This
//! module is that host.

mod entry;
mod flows;
mod registry;
mod store;

pub use entry::{ConfigEntry, EntryId, NewEntry};
pub use flows::{FlowSessions, PendingFlow};
pub use registry::{Integration, RegistryError};
pub use store::{ConfigEntryStore, StoreError};
