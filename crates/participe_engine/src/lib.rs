//! Participe engine: submission IO and effect execution.
mod engine;
mod submit;
mod types;

pub use engine::{EngineError, EngineHandle};
pub use submit::{ReqwestSubmitter, SubmitSettings, Submitter};
pub use types::{
    AttemptId, EngineEvent, FailureKind, PayloadPart, PayloadValue, SubmitError, SubmitReceipt,
};
