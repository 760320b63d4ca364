use participe_core::AppViewModel;

use super::page::{PageBindings, PageCommand};

/// Translates the view model into page commands.
///
/// The trigger's enabled flag is always the last command.
pub fn render(bindings: &PageBindings, view: &AppViewModel) -> Vec<PageCommand> {
    let mut cmds = Vec::with_capacity(view.fields.len() + 2);

    cmds.push(PageCommand::SetStatus {
        element_id: bindings.status_id().to_string(),
        text: view.status_text.clone(),
        class: view.status_class.to_string(),
    });

    cmds.extend(view.fields.iter().map(|field| PageCommand::SetFieldValue {
        element_id: bindings.form_id().to_string(),
        name: field.name.clone(),
        value: field.value.clone(),
    }));

    cmds.push(PageCommand::SetEnabled {
        element_id: bindings.trigger_id().to_string(),
        enabled: view.trigger_enabled,
    });

    cmds
}
