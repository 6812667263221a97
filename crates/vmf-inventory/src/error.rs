/// Errors returned by an [`crate::InventoryClient`].
///
/// `NotFound` is an error only where the operation requires the object; the
/// resolution calls report absence through [`crate::Resolved::NotFound`]
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// The referenced object does not exist.
    #[error("managed object not found: {0}")]
    NotFound(String),

    /// The inventory refused the request (duplicate name, permission, ...).
    #[error("{fault}: {message}")]
    Rejected { fault: String, message: String },

    /// The request was accepted but its task finished in error.
    #[error("task {task} failed: {message}")]
    TaskFailed { task: String, message: String },

    /// Network or session failure talking to the inventory.
    #[error("transport error: {0}")]
    Transport(String),

    /// The calling context was cancelled.
    #[error("operation cancelled by caller")]
    Cancelled,

    /// The calling context's deadline elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl InventoryError {
    pub fn rejected(fault: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            fault: fault.into(),
            message: message.into(),
        }
    }

    /// `true` for errors raised by the calling context, not the inventory.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Fault names used by inventories when rejecting a request.
pub mod faults {
    pub const DUPLICATE_NAME: &str = "DuplicateName";
    pub const NO_PERMISSION: &str = "NoPermission";
    pub const INVALID_ARGUMENT: &str = "InvalidArgument";
    pub const INVALID_STATE: &str = "InvalidState";
    pub const NOT_SUPPORTED: &str = "NotSupported";
}
