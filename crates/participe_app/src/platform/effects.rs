use std::collections::HashMap;

use participe_core::{AttemptId, Effect, FieldValue, FormEntry, Msg, SubmissionOutcome};
use participe_engine::{
    EngineError, EngineEvent, EngineHandle, FailureKind, PayloadPart, PayloadValue, SubmitError,
    SubmitReceipt, SubmitSettings,
};
use participe_logging::{participe_error, participe_info, participe_warn};
use url::Url;

pub struct EffectRunner {
    engine: EngineHandle,
    in_flight: HashMap<AttemptId, Url>,
}

impl EffectRunner {
    pub fn new(settings: SubmitSettings) -> Result<Self, EngineError> {
        Ok(Self::with_engine(EngineHandle::new(settings)?))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self {
            engine,
            in_flight: HashMap::new(),
        }
    }

    /// Hands effects to the engine. Returns messages that resolve
    /// immediately because the engine could not take the work.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::SendSubmission {
                    attempt_id,
                    action,
                    entries,
                } => {
                    participe_info!(
                        "SendSubmission attempt_id={} fields={} action={}",
                        attempt_id,
                        entries.len(),
                        action
                    );
                    let parts = entries.into_iter().map(to_payload_part).collect();
                    match self.engine.submit(attempt_id, action.as_str(), parts) {
                        Ok(()) => {
                            self.in_flight.insert(attempt_id, action);
                        }
                        Err(err) => {
                            participe_error!(
                                "attempt_id={} transport failure posting to {}: {}",
                                attempt_id,
                                action,
                                err
                            );
                            immediate.push(Msg::SubmissionResolved {
                                attempt_id,
                                outcome: SubmissionOutcome::TransportFailed {
                                    reason: err.to_string(),
                                },
                            });
                        }
                    }
                }
            }
        }
        immediate
    }

    /// Blocks for the next engine event. `None` once the engine is gone.
    pub fn next_msg(&mut self) -> Option<Msg> {
        let event = self.engine.recv()?;
        Some(self.map_event(event))
    }

    /// Non-blocking variant of [`EffectRunner::next_msg`].
    pub fn poll_msg(&mut self) -> Option<Msg> {
        let event = self.engine.try_recv()?;
        Some(self.map_event(event))
    }

    fn map_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::SubmissionCompleted { attempt_id, result } => {
                let action = self.in_flight.remove(&attempt_id);
                Msg::SubmissionResolved {
                    attempt_id,
                    outcome: to_outcome(attempt_id, action.as_ref(), result),
                }
            }
        }
    }
}

fn to_outcome(
    attempt_id: AttemptId,
    action: Option<&Url>,
    result: Result<SubmitReceipt, SubmitError>,
) -> SubmissionOutcome {
    let target = action.map(Url::as_str).unwrap_or("<unknown>");
    match result {
        Ok(receipt) => {
            participe_info!("attempt_id={} accepted with {}", attempt_id, receipt.status);
            SubmissionOutcome::Accepted {
                status: receipt.status,
            }
        }
        Err(SubmitError {
            kind: FailureKind::HttpStatus(status),
            message,
        }) => {
            participe_warn!(
                "attempt_id={} rejected by {}: {}",
                attempt_id,
                target,
                message
            );
            SubmissionOutcome::Rejected { status }
        }
        Err(err) if err.kind.is_transport() => {
            participe_error!(
                "attempt_id={} transport failure posting to {}: {}",
                attempt_id,
                target,
                err
            );
            SubmissionOutcome::TransportFailed {
                reason: err.to_string(),
            }
        }
        Err(err) => {
            participe_error!(
                "attempt_id={} request to {} not sent: {}",
                attempt_id,
                target,
                err
            );
            SubmissionOutcome::NotSent {
                reason: err.to_string(),
            }
        }
    }
}

fn to_payload_part(entry: FormEntry) -> PayloadPart {
    let value = match entry.value {
        FieldValue::Text(text) => PayloadValue::Text(text),
        FieldValue::File(blob) => PayloadValue::File {
            file_name: blob.file_name,
            content_type: blob.content_type,
            bytes: blob.bytes,
        },
    };
    PayloadPart {
        name: entry.name,
        value,
    }
}

#[cfg(test)]
mod tests {
    use participe_core::FileBlob;

    use super::*;

    fn error(kind: FailureKind) -> SubmitError {
        SubmitError {
            kind,
            message: "boom".into(),
        }
    }

    #[test]
    fn server_statuses_and_transport_errors_map_to_distinct_outcomes() {
        assert_eq!(
            to_outcome(1, None, Ok(SubmitReceipt { status: 204 })),
            SubmissionOutcome::Accepted { status: 204 }
        );
        assert_eq!(
            to_outcome(2, None, Err(error(FailureKind::HttpStatus(500)))),
            SubmissionOutcome::Rejected { status: 500 }
        );
        for kind in [
            FailureKind::Network,
            FailureKind::Timeout,
            FailureKind::Aborted,
            FailureKind::InvalidUrl,
        ] {
            assert!(matches!(
                to_outcome(3, None, Err(error(kind))),
                SubmissionOutcome::TransportFailed { .. }
            ));
        }
    }

    #[test]
    fn unencodable_payload_is_not_logged_as_transport_failure() {
        participe_logging::initialize_for_tests();
        let action = Url::parse("http://payload.invalid/participe").unwrap();

        let outcome = to_outcome(
            41,
            Some(&action),
            Err(error(FailureKind::InvalidPayload)),
        );

        assert!(matches!(outcome, SubmissionOutcome::NotSent { .. }));
        assert!(!outcome.is_success());
        let records: Vec<_> = participe_logging::captured_records()
            .into_iter()
            .filter(|record| record.message.contains("attempt_id=41 "))
            .collect();
        assert!(records
            .iter()
            .any(|record| record.message.contains("not sent")));
        assert!(!records
            .iter()
            .any(|record| record.message.contains("transport failure")));
    }

    #[test]
    fn file_entries_become_binary_parts() {
        let part = to_payload_part(FormEntry {
            name: "anexo".into(),
            value: FieldValue::File(FileBlob {
                file_name: "mapa.pdf".into(),
                content_type: Some("application/pdf".into()),
                bytes: vec![b'%', b'P', b'D', b'F'],
            }),
        });

        assert_eq!(
            part,
            PayloadPart {
                name: "anexo".into(),
                value: PayloadValue::File {
                    file_name: "mapa.pdf".into(),
                    content_type: Some("application/pdf".into()),
                    bytes: vec![b'%', b'P', b'D', b'F'],
                },
            }
        );
    }
}
