//! Master error types.

use mew_ha_kernel::KernelError;
use thiserror::Error;

/// Errors surfaced by the coordination core.
///
/// Deadlocks and unavailable resources are not errors; they come back as
/// [`mew_ha_core::LockOutcome`] values.
#[derive(Debug, Error)]
pub enum MasterError {
    /// A registry or context-switch invariant was violated. Fatal.
    #[error("coordination fault: {message}")]
    Coordination {
        message: String,
        #[source]
        source: Option<KernelError>,
    },

    /// The operation is deliberately not implemented.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    /// The master was built without a required collaborator.
    #[error("missing collaborator: {collaborator}")]
    MissingCollaborator { collaborator: &'static str },
}

impl MasterError {
    pub fn coordination(message: impl Into<String>) -> Self {
        Self::Coordination {
            message: message.into(),
            source: None,
        }
    }

    pub fn coordination_with(message: impl Into<String>, source: KernelError) -> Self {
        Self::Coordination {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    pub fn missing_collaborator(collaborator: &'static str) -> Self {
        Self::MissingCollaborator { collaborator }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, MasterError::Unsupported { .. })
    }

    pub fn is_coordination_fault(&self) -> bool {
        matches!(self, MasterError::Coordination { .. })
    }

    /// Whether the caller must treat the error as unrecoverable.
    pub fn is_fatal(&self) -> bool {
        !self.is_unsupported()
    }

    /// The kernel signal behind a coordination fault, if any.
    pub fn kernel_source(&self) -> Option<&KernelError> {
        match self {
            MasterError::Coordination { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

/// Result type for master operations.
pub type MasterResult<T> = Result<T, MasterError>;
