//! Deletion guard.
//!
//! Destroying a folder in the inventory destroys everything beneath it. A
//! folder removed from the declared configuration must only disappear when
//! it holds nothing; there is no recursive or force mode.

use tracing::warn;
use vmf_inventory::ObjectRef;

use crate::FolderError;

/// Refuse deletion when `children` is non-empty.
pub fn ensure_empty(folder: &ObjectRef, children: &[ObjectRef]) -> Result<(), FolderError> {
    if children.is_empty() {
        return Ok(());
    }
    warn!(
        %folder,
        children = children.len(),
        first_child = %children[0],
        "refusing to delete non-empty folder"
    );
    Err(FolderError::NotEmpty {
        children: children.len(),
    })
}
