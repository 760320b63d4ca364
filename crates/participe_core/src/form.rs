use std::fmt;

use url::Url;

/// Binary content attached to a file input.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FileBlob {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FileBlob),
}

impl FieldValue {
    pub fn empty_text() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::File(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::File(blob) => blob.file_name.is_empty() && blob.bytes.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    name: String,
    value: FieldValue,
    default: FieldValue,
}

impl FormField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

/// One `(name, value)` pair of a submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub name: String,
    pub value: FieldValue,
}

/// Named fields plus the address the form posts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    action: Url,
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(action: Url) -> Self {
        Self {
            action,
            fields: Vec::new(),
        }
    }

    /// Declares a field; redeclaring a name replaces the earlier field in place.
    pub fn with_field(mut self, name: impl Into<String>, default: FieldValue) -> Self {
        let field = FormField {
            name: name.into(),
            value: default.clone(),
            default,
        };
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn action(&self) -> &Url {
        &self.action
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Returns false, leaving the form untouched, for unknown names.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value = field.default.clone();
        }
    }

    /// Snapshot of the current values in declaration order.
    pub fn entries(&self) -> Vec<FormEntry> {
        self.fields
            .iter()
            .map(|field| FormEntry {
                name: field.name.clone(),
                value: field.value.clone(),
            })
            .collect()
    }
}
