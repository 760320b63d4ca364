use crate::{AttemptId, FieldValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited a form field.
    FieldChanged { name: String, value: FieldValue },
    /// User activated the trigger control and the page let the submit through.
    SubmitClicked,
    /// Engine finished (or abandoned) the request for an attempt.
    SubmissionResolved {
        attempt_id: AttemptId,
        outcome: SubmissionOutcome,
    },
}

/// How a submission attempt ended, as far as the controller cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Server answered with a 2xx status.
    Accepted { status: u16 },
    /// Server answered with any other status.
    Rejected { status: u16 },
    /// The exchange never completed.
    TransportFailed { reason: String },
    /// The payload could not be encoded; nothing was sent.
    NotSent { reason: String },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }
}
