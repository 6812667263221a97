//! vmf-inventory
//!
//! Boundary between the folder reconciler and the remote virtualization
//! inventory. This crate defines the object-reference model, the typed
//! resolution result, the long-running task handle and the
//! [`InventoryClient`] trait that concrete clients implement.
//!
//! No IO lives here. Concrete clients (live SOAP/REST, in-memory) are
//! provided by other crates.

mod client;
mod error;
mod types;

pub use client::InventoryClient;
pub use error::{faults, InventoryError};
pub use types::{EntityProperties, FolderObject, ObjectKind, ObjectRef, Resolved, TaskHandle};
