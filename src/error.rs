use std::fmt;

use crate::limits::ValidationError;

#[derive(Debug)]
pub enum CheckError {
    Configuration(String),
    ArgumentMismatch { resolutions: usize, limitations: usize },
    Validation(ValidationError),
    Transport(String),
    ResponseFormat(String),
    Invocation(String),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Configuration(msg) =>
                write!(f, "configuration error: {}", msg),
            CheckError::ArgumentMismatch { resolutions, limitations } =>
                write!(
                    f,
                    "each resolution needs a matching limitation, got {} resolution(s) and {} limitation(s)",
                    resolutions, limitations
                ),
            CheckError::Validation(e) =>
                write!(f, "invalid limit: {}", e),
            CheckError::Transport(msg) =>
                write!(f, "failed to reach Tautulli: {}", msg),
            CheckError::ResponseFormat(msg) =>
                write!(f, "unexpected Tautulli response: {}", msg),
            CheckError::Invocation(msg) =>
                write!(f, "kill script failed: {}", msg),
        }
    }
}

impl CheckError {
    /// True when the check itself started and could not finish, as opposed
    /// to the run being rejected before any request.
    pub fn interrupted_check(&self) -> bool {
        matches!(
            self,
            CheckError::Transport(_) | CheckError::ResponseFormat(_) | CheckError::Invocation(_)
        )
    }
}

// Display already carries the validation message.
impl std::error::Error for CheckError {}

impl From<ValidationError> for CheckError {
    fn from(e: ValidationError) -> Self {
        CheckError::Validation(e)
    }
}
