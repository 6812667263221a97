use vmf_inventory::InventoryError;

use crate::reconciler::UpdateReport;

/// Every failure the folder driver reports.
///
/// Remote failures are carried unchanged as the error source; the variant
/// names the operation that failed. All errors are terminal for the current
/// call: the driver never retries.
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    #[error("invalid folder spec: {0}")]
    InvalidSpec(String),

    /// The datacenter of an existing folder was changed. The folder must be
    /// destroyed and recreated by the caller.
    #[error("datacenter cannot change from '{from}' to '{to}' on an existing folder")]
    DatacenterChanged { from: String, to: String },

    #[error("cannot find parent folder '{path}'")]
    ParentNotFound { path: String },

    #[error("cannot look up parent folder '{path}'")]
    ParentLookupFailed {
        path: String,
        #[source]
        source: InventoryError,
    },

    #[error("cannot create folder")]
    CreateFailed(#[source] InventoryError),

    #[error("cannot read folder")]
    ReadFailed(#[source] InventoryError),

    /// A reference resolved to an object that is not a folder.
    #[error("object {reference} is a {actual}, not a Folder")]
    NotAFolder { reference: String, actual: String },

    /// The observed parent is not under `<datacenter>/vm`.
    #[error("observed parent '{path}' is outside datacenter '{datacenter}'")]
    OutsideDatacenter { path: String, datacenter: String },

    #[error("cannot rename folder")]
    RenameFailed(#[source] InventoryError),

    #[error("cannot move folder")]
    MoveFailed(#[source] InventoryError),

    #[error("Folder is not empty")]
    NotEmpty { children: usize },

    #[error("cannot delete folder")]
    DeleteFailed(#[source] InventoryError),
}

impl FolderError {
    /// The inventory error underneath, if this failure came from a remote call.
    pub fn remote(&self) -> Option<&InventoryError> {
        match self {
            FolderError::ParentLookupFailed { source, .. } => Some(source),
            FolderError::CreateFailed(e)
            | FolderError::ReadFailed(e)
            | FolderError::RenameFailed(e)
            | FolderError::MoveFailed(e)
            | FolderError::DeleteFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a later invocation may succeed without the declaration
    /// changing. Policy and validation errors never qualify, nor do
    /// cancellations (the caller chose to stop).
    pub fn is_retryable(&self) -> bool {
        match self {
            FolderError::InvalidSpec(_)
            | FolderError::DatacenterChanged { .. }
            | FolderError::NotAFolder { .. }
            | FolderError::OutsideDatacenter { .. }
            | FolderError::NotEmpty { .. } => false,
            FolderError::ParentNotFound { .. } => true,
            other => other.remote().is_some_and(|e| !e.is_interrupted()),
        }
    }
}

/// A failed update, with the per-field outcome up to the failure.
#[derive(Debug, thiserror::Error)]
#[error("folder update failed")]
pub struct UpdateFailure {
    pub report: UpdateReport,
    #[source]
    pub error: FolderError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use vmf_inventory::faults;

    #[test]
    fn not_empty_message_is_stable() {
        assert_eq!(
            FolderError::NotEmpty { children: 2 }.to_string(),
            "Folder is not empty"
        );
    }

    #[test]
    fn remote_error_is_kept_as_source() {
        let err =
            FolderError::RenameFailed(InventoryError::rejected(faults::NO_PERMISSION, "denied"));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "NoPermission: denied");
        assert!(err.remote().is_some());
    }

    #[test]
    fn policy_errors_are_not_retryable() {
        assert!(!FolderError::NotEmpty { children: 1 }.is_retryable());
        assert!(!FolderError::InvalidSpec("x".into()).is_retryable());
        assert!(!FolderError::DeleteFailed(InventoryError::Cancelled).is_retryable());
        assert!(FolderError::DeleteFailed(InventoryError::Transport("reset".into())).is_retryable());
    }
}
