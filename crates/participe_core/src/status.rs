pub const SENDING_TEXT: &str = "Enviando...";
pub const SUCCESS_TEXT: &str = "Mensagem enviada com sucesso!";
pub const FAILURE_TEXT: &str = "Erro ao enviar a mensagem. Tente novamente.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Neutral,
    Success,
    Failure,
}

impl StatusStyle {
    /// Class list applied to the status element.
    pub fn css_class(self) -> &'static str {
        match self {
            StatusStyle::Neutral => "status",
            StatusStyle::Success => "status sucesso",
            StatusStyle::Failure => "status erro",
        }
    }
}

/// Text and style of the status element. Each attempt overwrites both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusDisplay {
    text: String,
    style: Option<StatusStyle>,
}

impl StatusDisplay {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Option<StatusStyle> {
        self.style
    }

    pub fn css_class(&self) -> &'static str {
        self.style.map(StatusStyle::css_class).unwrap_or("")
    }

    pub(crate) fn show(&mut self, text: &str, style: StatusStyle) {
        self.text.clear();
        self.text.push_str(text);
        self.style = Some(style);
    }

    pub(crate) fn sending(&mut self) {
        self.show(SENDING_TEXT, StatusStyle::Neutral);
    }

    pub(crate) fn succeeded(&mut self) {
        self.show(SUCCESS_TEXT, StatusStyle::Success);
    }

    pub(crate) fn failed(&mut self) {
        self.show(FAILURE_TEXT, StatusStyle::Failure);
    }
}
