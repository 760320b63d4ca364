//! Participe core: pure submission state machine and view-model helpers.
mod effect;
mod form;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{FieldValue, FileBlob, Form, FormEntry, FormField};
pub use msg::{Msg, SubmissionOutcome};
pub use state::{AppState, AttemptId, Lifecycle};
pub use status::{StatusDisplay, StatusStyle, FAILURE_TEXT, SENDING_TEXT, SUCCESS_TEXT};
pub use update::update;
pub use view_model::{AppViewModel, FieldView};
