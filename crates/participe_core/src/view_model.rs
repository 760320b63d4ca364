use crate::{FieldValue, Lifecycle, SubmissionOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub status_text: String,
    pub status_class: &'static str,
    pub trigger_enabled: bool,
    pub lifecycle: Lifecycle,
    pub fields: Vec<FieldView>,
    /// Diagnostic only; never shown in the status element.
    pub last_outcome: Option<SubmissionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: String,
    pub value: FieldValue,
}
