use std::fmt;

pub type AttemptId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// One named part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPart {
    pub name: String,
    pub value: PayloadValue,
}

impl PayloadPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PayloadValue::Text(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Emitted exactly once per accepted submit command.
    SubmissionCompleted {
        attempt_id: AttemptId,
        result: Result<SubmitReceipt, SubmitError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitError {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmitError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidPayload,
    HttpStatus(u16),
    Timeout,
    Network,
    Aborted,
}

impl FailureKind {
    /// True when a request was attempted but never produced a response status.
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            FailureKind::HttpStatus(_) | FailureKind::InvalidPayload
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Aborted => write!(f, "aborted"),
        }
    }
}
