use std::time::Duration;

use participe_logging::participe_debug;
use reqwest::multipart::{Form, Part};

use crate::{AttemptId, FailureKind, PayloadPart, PayloadValue, SubmitError, SubmitReceipt};

#[derive(Debug, Clone)]
pub struct SubmitSettings {
    pub connect_timeout: Duration,
    /// `None` lets a hung request stay outstanding.
    pub request_timeout: Option<Duration>,
}

impl Default for SubmitSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        action: &str,
        parts: Vec<PayloadPart>,
    ) -> Result<SubmitReceipt, SubmitError>;
}

/// Posts each payload once as `multipart/form-data`. No retries.
#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: SubmitSettings,
}

impl ReqwestSubmitter {
    pub fn new(settings: SubmitSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| SubmitError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        action: &str,
        parts: Vec<PayloadPart>,
    ) -> Result<SubmitReceipt, SubmitError> {
        let parsed = reqwest::Url::parse(action)
            .map_err(|err| SubmitError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;
        let form = build_multipart(parts)?;

        let response = client
            .post(parsed)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        participe_debug!("attempt_id={} answered {}", attempt_id, status);
        if !status.is_success() {
            return Err(SubmitError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        Ok(SubmitReceipt {
            status: status.as_u16(),
        })
    }
}

fn build_multipart(parts: Vec<PayloadPart>) -> Result<Form, SubmitError> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        let PayloadPart { name, value } = part;
        match value {
            PayloadValue::Text(text) => Ok(form.text(name, text)),
            PayloadValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut file_part = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = content_type {
                    file_part = file_part.mime_str(&mime).map_err(|err| {
                        SubmitError::new(
                            FailureKind::InvalidPayload,
                            format!("field {name}: {err}"),
                        )
                    })?;
                }
                Ok(form.part(name, file_part))
            }
        }
    })
}

fn map_reqwest_error(err: reqwest::Error) -> SubmitError {
    if err.is_timeout() {
        return SubmitError::new(FailureKind::Timeout, err.to_string());
    }
    SubmitError::new(FailureKind::Network, err.to_string())
}
