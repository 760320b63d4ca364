use url::Url;

use crate::{AttemptId, FormEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue exactly one POST of `entries` to `action`.
    SendSubmission {
        attempt_id: AttemptId,
        action: Url,
        entries: Vec<FormEntry>,
    },
}
