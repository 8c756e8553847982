use thiserror::Error;

use crate::shell::WindowHandle;

/// Failures reported by the native windowing layer.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("querying {attribute} of window {window:?} failed: {reason}")]
    WindowQuery {
        window: WindowHandle,
        attribute: &'static str,
        reason: String,
    },

    #[error("SetWindowCompositionAttribute rejected window {window:?}")]
    CompositionAttribute { window: WindowHandle },

    #[error("{0} is not available on this system")]
    Unsupported(&'static str),

    #[error("COM call {call} failed: {reason}")]
    Com { call: &'static str, reason: String },
}

impl ShellError {
    pub fn query(window: WindowHandle, attribute: &'static str, reason: impl ToString) -> Self {
        Self::WindowQuery {
            window,
            attribute,
            reason: reason.to_string(),
        }
    }
}

pub type ShellResult<T> = std::result::Result<T, ShellError>;
