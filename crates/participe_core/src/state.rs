use url::Url;

use crate::view_model::{AppViewModel, FieldView};
use crate::{FieldValue, Form, FormEntry, StatusDisplay, SubmissionOutcome};

pub type AttemptId = u64;

/// Linear lifecycle of the current (or most recent) submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Sending {
        attempt_id: AttemptId,
    },
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    form: Form,
    status: StatusDisplay,
    lifecycle: Lifecycle,
    trigger_enabled: bool,
    next_attempt_id: AttemptId,
    last_outcome: Option<SubmissionOutcome>,
    dirty: bool,
}

impl AppState {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            status: StatusDisplay::default(),
            lifecycle: Lifecycle::Idle,
            trigger_enabled: true,
            next_attempt_id: 1,
            last_outcome: None,
            dirty: true,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            status_text: self.status.text().to_string(),
            status_class: self.status.css_class(),
            trigger_enabled: self.trigger_enabled,
            lifecycle: self.lifecycle,
            fields: self
                .form
                .fields()
                .iter()
                .map(|field| FieldView {
                    name: field.name().to_string(),
                    value: field.value().clone(),
                })
                .collect(),
            last_outcome: self.last_outcome.clone(),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn status(&self) -> &StatusDisplay {
        &self.status
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Sending { .. })
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        let changed = self.form.get(name).is_some_and(|current| *current != value);
        if changed {
            self.form.set_field(name, value);
            self.dirty = true;
        }
        changed
    }

    /// Starts an attempt unless one is already outstanding.
    ///
    /// Order matters: status first, then the trigger, then the payload snapshot.
    pub(crate) fn begin_attempt(&mut self) -> Option<(AttemptId, Url, Vec<FormEntry>)> {
        if !self.trigger_enabled || self.is_sending() {
            return None;
        }

        self.status.sending();
        self.trigger_enabled = false;
        let entries = self.form.entries();

        let attempt_id = self.next_attempt_id;
        self.next_attempt_id += 1;
        self.lifecycle = Lifecycle::Sending { attempt_id };
        self.dirty = true;

        Some((attempt_id, self.form.action().clone(), entries))
    }

    /// Applies the outcome of the in-flight attempt. Anything else is ignored.
    pub(crate) fn resolve_attempt(
        &mut self,
        attempt_id: AttemptId,
        outcome: SubmissionOutcome,
    ) -> bool {
        if self.lifecycle != (Lifecycle::Sending { attempt_id }) {
            return false;
        }

        if outcome.is_success() {
            self.status.succeeded();
            self.form.reset();
            self.lifecycle = Lifecycle::Succeeded;
        } else {
            self.status.failed();
            self.lifecycle = Lifecycle::Failed;
        }
        self.last_outcome = Some(outcome);
        self.trigger_enabled = true;
        self.dirty = true;
        true
    }
}
