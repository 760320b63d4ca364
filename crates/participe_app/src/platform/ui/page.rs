//! In-memory page document hosting the participation form.
//!
//! Mirrors the three elements the submission controller touches: the form,
//! the trigger button and the status label. Native constraint checks run
//! here, before a submit event ever reaches the controller.

use std::collections::BTreeMap;

use participe_core::{FieldValue, FileBlob, Form};
use thiserror::Error;
use url::Url;

use super::constants::{FORM_ID, STATUS_ID, TRIGGER_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    TextArea,
    File,
}

impl InputKind {
    fn default_value(self) -> FieldValue {
        match self {
            InputKind::File => FieldValue::File(FileBlob::default()),
            InputKind::Text | InputKind::Email | InputKind::TextArea => FieldValue::empty_text(),
        }
    }

    fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (InputKind::File, FieldValue::File(_))
                | (
                    InputKind::Text | InputKind::Email | InputKind::TextArea,
                    FieldValue::Text(_)
                )
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub name: String,
    pub kind: InputKind,
    pub required: bool,
    pub value: FieldValue,
}

impl InputElement {
    pub fn new(name: impl Into<String>, kind: InputKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
            value: kind.default_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Form {
        action: Url,
        inputs: Vec<InputElement>,
    },
    Button {
        enabled: bool,
    },
    Label {
        text: String,
        class: String,
    },
}

impl Element {
    fn kind_name(&self) -> &'static str {
        match self {
            Element::Form { .. } => "form",
            Element::Button { .. } => "button",
            Element::Label { .. } => "label",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    SetStatus {
        element_id: String,
        text: String,
        class: String,
    },
    SetEnabled {
        element_id: String,
        enabled: bool,
    },
    SetFieldValue {
        element_id: String,
        name: String,
        value: FieldValue,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("element #{0} not found")]
    Missing(&'static str),
    #[error("element #{id} is a {found}, expected a {expected}")]
    WrongKind {
        id: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("form has no field named {0:?}")]
    UnknownField(String),
    #[error("field {0:?} does not accept this kind of value")]
    KindMismatch(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidityError {
    #[error("field {0:?} is required")]
    ValueMissing(String),
    #[error("field {0:?} must be an e-mail address")]
    TypeMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormHandle(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerHandle(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHandle(String);

/// Validated handles to the elements the controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBindings {
    pub form: FormHandle,
    pub trigger: TriggerHandle,
    pub status: StatusHandle,
}

impl PageBindings {
    /// Page-ready lookup of the three elements by their fixed identifiers.
    pub fn locate(page: &Page) -> Result<Self, BindError> {
        expect_kind(page, FORM_ID, "form")?;
        expect_kind(page, TRIGGER_ID, "button")?;
        expect_kind(page, STATUS_ID, "label")?;
        Ok(Self {
            form: FormHandle(FORM_ID.to_string()),
            trigger: TriggerHandle(TRIGGER_ID.to_string()),
            status: StatusHandle(STATUS_ID.to_string()),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.form.0
    }

    pub fn trigger_id(&self) -> &str {
        &self.trigger.0
    }

    pub fn status_id(&self) -> &str {
        &self.status.0
    }
}

fn expect_kind(page: &Page, id: &'static str, expected: &'static str) -> Result<(), BindError> {
    let element = page.element(id).ok_or(BindError::Missing(id))?;
    let found = element.kind_name();
    if found != expected {
        return Err(BindError::WrongKind {
            id,
            expected,
            found,
        });
    }
    Ok(())
}

/// Submit event handed to the controller; the page navigates unless the
/// default is prevented.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    elements: BTreeMap<String, Element>,
    enabled_transitions: Vec<bool>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// The participation page: contact form, send button and status line.
    pub fn participation(action: Url) -> Self {
        let mut page = Self::new();
        page.insert(
            FORM_ID,
            Element::Form {
                action,
                inputs: vec![
                    InputElement::new("nome", InputKind::Text, true),
                    InputElement::new("email", InputKind::Email, true),
                    InputElement::new("mensagem", InputKind::TextArea, true),
                    InputElement::new("anexo", InputKind::File, false),
                ],
            },
        );
        page.insert(TRIGGER_ID, Element::Button { enabled: true });
        page.insert(
            STATUS_ID,
            Element::Label {
                text: String::new(),
                class: String::new(),
            },
        );
        page
    }

    pub fn insert(&mut self, id: impl Into<String>, element: Element) {
        self.elements.insert(id.into(), element);
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Builds the controller's form model from the current document.
    pub fn form_model(&self, handle: &FormHandle) -> Option<Form> {
        match self.elements.get(&handle.0)? {
            Element::Form { action, inputs } => Some(inputs.iter().fold(
                Form::new(action.clone()),
                |form, input| form.with_field(input.name.clone(), input.kind.default_value()),
            )),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn input_value(&self, handle: &FormHandle, name: &str) -> Option<&FieldValue> {
        match self.elements.get(&handle.0)? {
            Element::Form { inputs, .. } => inputs
                .iter()
                .find(|input| input.name == name)
                .map(|input| &input.value),
            _ => None,
        }
    }

    /// User typing into (or picking a file for) an input.
    pub fn set_input(
        &mut self,
        handle: &FormHandle,
        name: &str,
        value: FieldValue,
    ) -> Result<(), PageError> {
        let input = self
            .input_mut(&handle.0, name)
            .ok_or_else(|| PageError::UnknownField(name.to_string()))?;
        if !input.kind.accepts(&value) {
            return Err(PageError::KindMismatch(name.to_string()));
        }
        input.value = value;
        Ok(())
    }

    pub fn is_enabled(&self, handle: &TriggerHandle) -> bool {
        matches!(
            self.elements.get(&handle.0),
            Some(Element::Button { enabled: true })
        )
    }

    /// Text and class list of the status element.
    pub fn status(&self, handle: &StatusHandle) -> (&str, &str) {
        match self.elements.get(&handle.0) {
            Some(Element::Label { text, class }) => (text.as_str(), class.as_str()),
            _ => ("", ""),
        }
    }

    /// Every change of any button's enabled flag, in order.
    pub fn enabled_transitions(&self) -> &[bool] {
        &self.enabled_transitions
    }

    /// A click on the trigger. `Ok(None)` when the button is disabled.
    pub fn request_submit(
        &self,
        bindings: &PageBindings,
    ) -> Result<Option<SubmitEvent>, ValidityError> {
        if !self.is_enabled(&bindings.trigger) {
            return Ok(None);
        }
        self.check_validity(&bindings.form)?;
        Ok(Some(SubmitEvent::default()))
    }

    /// Native constraint validation: `required` and `type=email`.
    pub fn check_validity(&self, handle: &FormHandle) -> Result<(), ValidityError> {
        let Some(Element::Form { inputs, .. }) = self.elements.get(&handle.0) else {
            return Ok(());
        };
        for input in inputs {
            if input.value.is_empty() {
                if input.required {
                    return Err(ValidityError::ValueMissing(input.name.clone()));
                }
                continue;
            }
            if input.kind == InputKind::Email
                && !input.value.as_text().is_some_and(looks_like_email)
            {
                return Err(ValidityError::TypeMismatch(input.name.clone()));
            }
        }
        Ok(())
    }

    /// Returns false when the command names an element the page lacks.
    pub fn apply(&mut self, command: PageCommand) -> bool {
        match command {
            PageCommand::SetStatus {
                element_id,
                text,
                class,
            } => match self.elements.get_mut(&element_id) {
                Some(Element::Label {
                    text: current_text,
                    class: current_class,
                }) => {
                    *current_text = text;
                    *current_class = class;
                    true
                }
                _ => false,
            },
            PageCommand::SetEnabled {
                element_id,
                enabled,
            } => match self.elements.get_mut(&element_id) {
                Some(Element::Button { enabled: current }) => {
                    if *current != enabled {
                        *current = enabled;
                        self.enabled_transitions.push(enabled);
                    }
                    true
                }
                _ => false,
            },
            PageCommand::SetFieldValue {
                element_id,
                name,
                value,
            } => match self.input_mut(&element_id, &name) {
                Some(input) => {
                    input.value = value;
                    true
                }
                None => false,
            },
        }
    }

    fn input_mut(&mut self, form_id: &str, name: &str) -> Option<&mut InputElement> {
        match self.elements.get_mut(form_id)? {
            Element::Form { inputs, .. } => inputs.iter_mut().find(|input| input.name == name),
            _ => None,
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}
