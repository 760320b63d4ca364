pub const FORM_ID: &str = "participate-form";
pub const TRIGGER_ID: &str = "btn-enviar";
pub const STATUS_ID: &str = "mensagemStatus";
