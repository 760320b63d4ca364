use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use participe_core::{update, AppState, FieldValue, FileBlob, Lifecycle, Msg, SubmissionOutcome};
use participe_logging::{participe_debug, participe_error, participe_info, participe_warn};

use super::cli::Args;
use super::config::{self, ConfigOrigin};
use super::effects::EffectRunner;
use super::logging;
use super::ui::constants::FORM_ID;
use super::ui::page::{BindError, Page, PageBindings, PageError, SubmitEvent, ValidityError};
use super::ui::render;

pub fn run_app(args: Args) -> anyhow::Result<ExitCode> {
    let (mut config, origin) = config::load(&args.config)?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    logging::initialize(&config.logging);
    match origin {
        ConfigOrigin::File => participe_info!("Loaded config from {:?}", args.config),
        ConfigOrigin::Defaults => {
            participe_info!("No config at {:?}; using defaults", args.config)
        }
    }

    let endpoint = config.endpoint_url()?;
    let runner =
        EffectRunner::new(config.submit_settings()).context("starting submission engine")?;
    let mut session =
        FormSession::open(Page::participation(endpoint), runner).context("binding page")?;

    for (name, value) in args.fields {
        session.type_field(&name, FieldValue::Text(value))?;
    }
    for (name, path) in args.files {
        let blob = read_file_blob(&path)?;
        session.type_field(&name, FieldValue::File(blob))?;
    }

    for click in 1..=args.clicks {
        match session.click_submit() {
            ClickResult::Submitted => participe_debug!("click {} submitted the form", click),
            ClickResult::Ignored => participe_info!("click {} ignored; trigger disabled", click),
            ClickResult::Invalid(err) => {
                println!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        }
        session.pump_pending();
    }
    session.run_until_idle();

    let (text, class) = session.page().status(&session.bindings().status);
    println!("[{class}] {text}");

    Ok(if session.state().lifecycle() == Lifecycle::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum ClickResult {
    Submitted,
    /// The trigger was disabled; nothing happened.
    Ignored,
    /// Native constraints blocked the submit event.
    Invalid(ValidityError),
}

/// Submission controller bound to one page.
pub struct FormSession {
    page: Page,
    bindings: PageBindings,
    state: AppState,
    runner: EffectRunner,
}

impl FormSession {
    /// Page-ready hook: binds the elements and renders the initial view.
    pub fn open(page: Page, runner: EffectRunner) -> Result<Self, BindError> {
        let bindings = PageBindings::locate(&page)?;
        let form = page
            .form_model(&bindings.form)
            .ok_or(BindError::Missing(FORM_ID))?;
        let mut session = Self {
            page,
            bindings,
            state: AppState::new(form),
            runner,
        };
        session.state.consume_dirty();
        session.render();
        Ok(session)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn bindings(&self) -> &PageBindings {
        &self.bindings
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn type_field(&mut self, name: &str, value: FieldValue) -> Result<(), PageError> {
        self.page
            .set_input(&self.bindings.form, name, value.clone())?;
        self.dispatch(Msg::FieldChanged {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    pub fn click_submit(&mut self) -> ClickResult {
        match self.page.request_submit(&self.bindings) {
            Ok(Some(mut event)) => {
                self.on_submit(&mut event);
                if !event.is_default_prevented() {
                    participe_warn!("submit default not prevented; page would navigate away");
                }
                ClickResult::Submitted
            }
            Ok(None) => ClickResult::Ignored,
            Err(err) => {
                participe_info!("submit blocked by form constraints: {}", err);
                ClickResult::Invalid(err)
            }
        }
    }

    fn on_submit(&mut self, event: &mut SubmitEvent) {
        event.prevent_default();
        self.dispatch(Msg::SubmitClicked);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let (mut state, effects) = update(self.state.clone(), msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        if was_dirty {
            self.render();
        }
        for msg in self.runner.enqueue(effects) {
            self.dispatch(msg);
        }
    }

    /// Applies engine results that already arrived, without blocking.
    pub fn pump_pending(&mut self) {
        while let Some(msg) = self.runner.poll_msg() {
            self.dispatch(msg);
        }
    }

    /// Blocks until no attempt is outstanding. A hung request blocks forever.
    pub fn run_until_idle(&mut self) {
        while let Lifecycle::Sending { attempt_id } = self.state.lifecycle() {
            match self.runner.next_msg() {
                Some(msg) => self.dispatch(msg),
                None => {
                    participe_error!(
                        "attempt_id={} transport failure: engine stopped before reporting",
                        attempt_id
                    );
                    self.dispatch(Msg::SubmissionResolved {
                        attempt_id,
                        outcome: SubmissionOutcome::TransportFailed {
                            reason: "engine stopped".to_string(),
                        },
                    });
                }
            }
        }
    }

    fn render(&mut self) {
        for command in render::render(&self.bindings, &self.state.view()) {
            if !self.page.apply(command) {
                participe_warn!("page rejected a render command");
            }
        }
    }
}

fn read_file_blob(path: &Path) -> anyhow::Result<FileBlob> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());
    participe_debug!("attaching {} as {:?}", file_name, content_type);
    Ok(FileBlob {
        file_name,
        content_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::path::PathBuf;

    use participe_core::{StatusStyle, FAILURE_TEXT, SUCCESS_TEXT};
    use participe_engine::SubmitSettings;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const FILLED: [(&str, &str); 3] = [
        ("nome", "Ana"),
        ("email", "ana@example.com"),
        ("mensagem", "Mais sombra no parquinho"),
    ];

    fn open_session(endpoint: &str) -> FormSession {
        participe_logging::initialize_for_tests();
        let page = Page::participation(Url::parse(endpoint).unwrap());
        let runner = EffectRunner::new(SubmitSettings::default()).unwrap();
        FormSession::open(page, runner).unwrap()
    }

    fn fill(session: &mut FormSession) {
        for (name, value) in FILLED {
            session.type_field(name, FieldValue::text(value)).unwrap();
        }
    }

    fn text_input<'a>(session: &'a FormSession, name: &str) -> &'a str {
        session
            .page()
            .input_value(&session.bindings().form, name)
            .and_then(FieldValue::as_text)
            .unwrap()
    }

    fn mock_status(rt: &Runtime, status: u16, expected_posts: u64) -> MockServer {
        rt.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/participe"))
                .respond_with(ResponseTemplate::new(status))
                .expect(expected_posts)
                .mount(&server)
                .await;
            server
        })
    }

    fn unused_local_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/participe")
    }

    fn assert_failure_shown_with_fields_kept(session: &FormSession) {
        let (text, class) = session.page().status(&session.bindings().status);
        assert_eq!(text, FAILURE_TEXT);
        assert_eq!(class, StatusStyle::Failure.css_class());
        for (name, value) in FILLED {
            assert_eq!(text_input(session, name), value);
        }
        assert!(session.page().is_enabled(&session.bindings().trigger));
        assert_eq!(session.page().enabled_transitions(), &[false, true]);
    }

    #[test]
    fn success_response_shows_success_and_clears_form() {
        let rt = Runtime::new().unwrap();
        let server = mock_status(&rt, 200, 1);
        let mut session = open_session(&format!("{}/participe", server.uri()));
        fill(&mut session);

        assert_eq!(session.click_submit(), ClickResult::Submitted);
        session.run_until_idle();

        let (text, class) = session.page().status(&session.bindings().status);
        assert_eq!(text, SUCCESS_TEXT);
        assert!(class.contains("sucesso"));
        for (name, _) in FILLED {
            assert_eq!(text_input(&session, name), "");
        }
        assert!(session.page().is_enabled(&session.bindings().trigger));
        assert_eq!(session.page().enabled_transitions(), &[false, true]);

        let requests = rt.block_on(server.received_requests()).unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"mensagem\""));
        assert!(body.contains("Mais sombra no parquinho"));
    }

    #[test]
    fn server_error_shows_failure_and_keeps_fields() {
        let rt = Runtime::new().unwrap();
        let server = mock_status(&rt, 500, 1);
        let endpoint = format!("{}/participe", server.uri());
        let mut session = open_session(&endpoint);
        fill(&mut session);

        assert_eq!(session.click_submit(), ClickResult::Submitted);
        session.run_until_idle();

        assert_failure_shown_with_fields_kept(&session);
        assert_eq!(session.state().lifecycle(), Lifecycle::Failed);

        let records: Vec<_> = participe_logging::captured_records()
            .into_iter()
            .filter(|record| record.message.contains(&endpoint))
            .collect();
        assert!(
            records.iter().any(|record| record.level == log::Level::Warn
                && record.message.contains("rejected by")
                && record.message.contains("500")),
            "server rejection not logged at warn: {records:?}"
        );
        assert!(
            !records.iter().any(|record| record.level == log::Level::Error),
            "server rejection logged as a transport failure: {records:?}"
        );
    }

    #[test]
    fn unreachable_server_matches_server_error_and_is_logged() {
        let endpoint = unused_local_url();
        let mut session = open_session(&endpoint);
        fill(&mut session);

        assert_eq!(session.click_submit(), ClickResult::Submitted);
        session.run_until_idle();

        assert_failure_shown_with_fields_kept(&session);
        assert!(matches!(
            session.state().view().last_outcome,
            Some(SubmissionOutcome::TransportFailed { .. })
        ));
        let logged = participe_logging::captured_records().into_iter().any(|record| {
            record.level == log::Level::Error
                && record.message.contains("transport failure")
                && record.message.contains(&endpoint)
        });
        assert!(logged, "transport failure diagnostic not captured");
    }

    #[test]
    fn rapid_second_click_is_ignored_while_sending() {
        let rt = Runtime::new().unwrap();
        let server = mock_status(&rt, 200, 1);
        let mut session = open_session(&format!("{}/participe", server.uri()));
        fill(&mut session);

        assert_eq!(session.click_submit(), ClickResult::Submitted);
        assert_eq!(session.click_submit(), ClickResult::Ignored);
        // Even a submit that bypasses the disabled button is refused by the core.
        session.dispatch(Msg::SubmitClicked);
        session.run_until_idle();

        let requests = rt.block_on(server.received_requests()).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(session.page().enabled_transitions(), &[false, true]);
    }

    #[test]
    fn invalid_form_never_posts() {
        let rt = Runtime::new().unwrap();
        let server = mock_status(&rt, 200, 0);
        let mut session = open_session(&format!("{}/participe", server.uri()));
        session.type_field("nome", FieldValue::text("Ana")).unwrap();

        assert_eq!(
            session.click_submit(),
            ClickResult::Invalid(ValidityError::ValueMissing("email".into()))
        );
        assert_eq!(session.state().lifecycle(), Lifecycle::Idle);
        assert!(session.page().enabled_transitions().is_empty());
    }

    #[test]
    fn resubmitting_after_failure_clears_failure_style() {
        let endpoint = unused_local_url();
        let mut session = open_session(&endpoint);
        fill(&mut session);
        session.click_submit();
        session.run_until_idle();

        assert_eq!(session.click_submit(), ClickResult::Submitted);

        let (text, class) = session.page().status(&session.bindings().status);
        assert_eq!(text, participe_core::SENDING_TEXT);
        assert_eq!(class, "status");
        assert!(!session.page().is_enabled(&session.bindings().trigger));
        session.run_until_idle();
        assert!(session.page().is_enabled(&session.bindings().trigger));
    }

    #[test]
    fn attached_file_is_read_with_guessed_type() {
        let temp = TempDir::new().unwrap();
        let file: PathBuf = temp.path().join("Mapa.PNG");
        fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

        let blob = read_file_blob(&file).unwrap();

        assert_eq!(blob.file_name, "Mapa.PNG");
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));
        assert_eq!(blob.bytes, vec![0x89, b'P', b'N', b'G']);
        assert!(read_file_blob(&temp.path().join("missing.txt")).is_err());
    }

    #[test]
    fn everyday_attachments_get_a_content_type() {
        let temp = TempDir::new().unwrap();
        let cases = [
            (
                "nota.docx",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
            ("planilha.csv", "text/csv"),
            ("mapa.svg", "image/svg+xml"),
            ("video.mp4", "video/mp4"),
            ("ata.pdf", "application/pdf"),
        ];

        for (name, expected) in cases {
            let file = temp.path().join(name);
            fs::write(&file, b"conteudo").unwrap();

            let blob = read_file_blob(&file).unwrap();

            assert_eq!(blob.content_type.as_deref(), Some(expected), "{name}");
        }
    }

    #[test]
    fn unknown_extension_has_no_content_type() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("rascunho.semtipo");
        fs::write(&file, b"?").unwrap();

        assert_eq!(read_file_blob(&file).unwrap().content_type, None);
    }
}
