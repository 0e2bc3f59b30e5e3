/// Outcome of a field operation, rendered by the command layer.
///
/// A failed result is still a normal return value: the command aborts
/// cleanly and the message (or a generic one) is shown to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    success: bool,
    message: Option<String>,
}

impl ProcessResult {
    /// Successful result without a message.
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Successful result with a message.
    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    /// Failed result without a message.
    pub fn failure() -> Self {
        Self {
            success: false,
            message: None,
        }
    }

    /// Failed result with a message.
    pub fn failure_with(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Message to show, if the operation produced one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
