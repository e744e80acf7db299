use thiserror::Error;

pub type Result<T> = std::result::Result<T, InfofixError>;

/// Business-rule violations raised while validating a ticket transition.
///
/// These are always recoverable: the caller presents them and blocks the
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A rejection note is required to reject a ticket")]
    MissingReason,

    #[error("A transfer note is required to move a ticket to {to_store}")]
    MissingTransferNote { to_store: String },

    #[error("A hold reason is required to put a ticket on hold")]
    MissingHoldReason,
}

#[derive(Debug, Error)]
pub enum InfofixError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Shop not initialized")]
    ShopNotInitialized,

    #[error("Invalid ticket ID format: {0}")]
    InvalidTicketId(String),

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Unknown store: {0}")]
    UnknownStore(String),

    #[error("Ticket {0} is not awaiting approval")]
    NotPendingApproval(String),

    #[error("{role} is not allowed to {action}")]
    PermissionDenied { role: String, action: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl InfofixError {
    pub(crate) fn denied(role: impl ToString, action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            role: role.to_string(),
            action: action.into(),
        }
    }
}
