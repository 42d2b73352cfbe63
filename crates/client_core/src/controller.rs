//! The row edit controller: toggles rows between display and edit mode and
//! pushes confirmed edits and deletions to the server.

use std::sync::Arc;

use shared::{
    domain::RowKey,
    error::{ActionError, ErrorKind},
    protocol::MutationRequest,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    dates,
    lookup::{LookupData, SelectOption},
    schema::{ControlKind, DeleteEncoding, EntitySchema, FieldSpec},
    table::{CellContent, Control, Row, RowMode, Table},
    transport::{RecordSync, SyncError},
    ControllerEvent, Interaction, RefreshPolicy,
};

const EVENT_CAPACITY: usize = 64;
const UNKNOWN_SERVER_ERROR: &str = "unknown error";
const CONNECTION_FAILURE: &str = "An error occurred while contacting the server";

/// A user action on one row, mirroring the buttons rendered in each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Edit(RowKey),
    Cancel(RowKey),
    Save(RowKey),
    Delete(RowKey),
    SetField {
        key: RowKey,
        field: String,
        value: String,
    },
}

impl RowAction {
    pub fn name(&self) -> &'static str {
        match self {
            RowAction::Edit(_) => "edit",
            RowAction::Cancel(_) => "cancel",
            RowAction::Save(_) => "save",
            RowAction::Delete(_) => "delete",
            RowAction::SetField { .. } => "set_field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Local state changed; nothing was sent.
    Applied,
    /// The user declined the confirmation prompt; nothing was sent.
    Cancelled,
    RowPatched { key: RowKey },
    RowRemoved { key: RowKey },
    ReloadRequested,
}

pub struct TableController {
    schema: EntitySchema,
    lookup: Arc<LookupData>,
    table: Table,
    sync: Arc<dyn RecordSync>,
    interaction: Arc<dyn Interaction>,
    policy: RefreshPolicy,
    events: broadcast::Sender<ControllerEvent>,
}

impl TableController {
    pub fn new(
        schema: EntitySchema,
        lookup: Arc<LookupData>,
        table: Table,
        sync: Arc<dyn RecordSync>,
        interaction: Arc<dyn Interaction>,
    ) -> Result<Self, ActionError> {
        if schema.entity != table.entity() {
            return Err(ActionError::usage(format!(
                "schema for {} cannot drive a {} table",
                schema.entity,
                table.entity()
            )));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            schema,
            lookup,
            table,
            sync,
            interaction,
            policy: RefreshPolicy::default(),
            events,
        })
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn handle(&mut self, action: RowAction) -> Result<Outcome, ActionError> {
        debug!(entity = %self.schema.entity, action = action.name(), "row action");
        match action {
            RowAction::Edit(key) => self.begin_edit(&key).map(|()| Outcome::Applied),
            RowAction::Cancel(key) => self.cancel_edit(&key).map(|()| Outcome::Applied),
            RowAction::Save(key) => self.save(&key).await,
            RowAction::Delete(key) => self.delete(&key).await,
            RowAction::SetField { key, field, value } => self
                .set_field(&key, &field, &value)
                .map(|()| Outcome::Applied),
        }
    }

    /// Turns every editable cell of the row into a control holding its
    /// current value. Re-entering an editing row changes nothing.
    pub fn begin_edit(&mut self, key: &RowKey) -> Result<(), ActionError> {
        let row = self.table.row(key).ok_or_else(|| unknown_row(key))?;
        if row.is_editing() {
            return Ok(());
        }
        if self.schema.single_row_edit {
            if let Some(other) = self.table.editing_rows().next() {
                let err = ActionError::new(
                    ErrorKind::Guard,
                    format!(
                        "Finish editing the current row ('{}') first.",
                        other.key()
                    ),
                );
                return Err(self.fail(err));
            }
        }

        let controls: Vec<(usize, Control)> = row
            .cells()
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let spec = self.schema.field(&cell.field)?;
                let CellContent::Text(text) = &cell.content else {
                    return None;
                };
                Some((index, control_for(spec, &self.lookup, text)))
            })
            .collect();

        let row = self.row_mut(key)?;
        for (index, control) in controls {
            row.cells_mut()[index].content = CellContent::Control(control);
        }
        row.set_mode(RowMode::Editing);

        debug!(entity = %self.schema.entity, %key, "edit started");
        self.emit(ControllerEvent::EditStarted { key: key.clone() });
        Ok(())
    }

    pub fn set_field(&mut self, key: &RowKey, field: &str, value: &str) -> Result<(), ActionError> {
        let spec = self
            .schema
            .field(field)
            .ok_or_else(|| ActionError::usage(format!("'{field}' is not an editable field")))?
            .clone();
        let derived: Vec<FieldSpec> = self.schema.derived_from(field).cloned().collect();
        let lookup = Arc::clone(&self.lookup);

        let row = self.editing_row_mut(key)?;
        let cell = row
            .cell_mut(field)
            .ok_or_else(|| ActionError::usage(format!("row '{key}' has no '{field}' cell")))?;
        let control = cell
            .control_mut()
            .ok_or_else(|| ActionError::usage(format!("'{field}' is not being edited")))?;
        assign_value(control, &spec, value)?;
        let source_value = control.value.clone();

        for target in derived {
            if let ControlKind::Derived { source, .. } = &target.control {
                if let Some(control) = row.cell_mut(&target.name).and_then(|c| c.control_mut()) {
                    control.value = lookup.derive(*source, &source_value);
                }
            }
        }
        Ok(())
    }

    /// Restores every cell to the exact text it showed before editing.
    pub fn cancel_edit(&mut self, key: &RowKey) -> Result<(), ActionError> {
        let row = self.row_mut(key)?;
        if !row.is_editing() {
            return Ok(());
        }
        for cell in row.cells_mut() {
            if let CellContent::Control(control) = &cell.content {
                cell.content = CellContent::Text(control.original.clone());
            }
        }
        row.set_mode(RowMode::Display);

        debug!(entity = %self.schema.entity, %key, "edit cancelled");
        self.emit(ControllerEvent::EditCancelled { key: key.clone() });
        Ok(())
    }

    pub async fn save(&mut self, key: &RowKey) -> Result<Outcome, ActionError> {
        let row = self.table.row(key).ok_or_else(|| unknown_row(key))?;
        if !row.is_editing() {
            return Err(ActionError::usage(format!("row '{key}' is not being edited")));
        }
        if let Some(spec) = self.missing_required(row) {
            let err = ActionError::validation(format!(
                "The {} field cannot be empty.",
                spec.name.replace('_', " ")
            ));
            return Err(self.fail(err));
        }
        if let Some(taken) = self.renamed_onto_existing(row) {
            let err = ActionError::validation(format!(
                "A {} named '{taken}' already exists.",
                self.schema.entity.label()
            ));
            return Err(self.fail(err));
        }
        let request = self.update_request(row);

        let path = self.schema.update_path.clone();
        let prefix = self.schema.update_error_prefix.clone();
        self.submit(&path, &request, &prefix).await?;

        info!(entity = %self.schema.entity, %key, "record updated");
        match self.policy {
            RefreshPolicy::ReloadPage => Ok(self.request_reload()),
            RefreshPolicy::PatchRow => {
                let new_key = self.commit_row(key)?;
                self.emit(ControllerEvent::RowPatched {
                    previous_key: key.clone(),
                    key: new_key.clone(),
                });
                Ok(Outcome::RowPatched { key: new_key })
            }
        }
    }

    pub async fn delete(&mut self, key: &RowKey) -> Result<Outcome, ActionError> {
        let row = self.table.row(key).ok_or_else(|| unknown_row(key))?;
        if row.is_editing() {
            return Err(ActionError::usage(format!(
                "row '{key}' is being edited; save or cancel first"
            )));
        }
        let Some(path) = self.schema.delete_path.clone() else {
            return Err(ActionError::usage(format!(
                "{} rows cannot be deleted from this table",
                self.schema.entity.label()
            )));
        };

        let prompt = self.schema.delete_prompt_for(key.as_str());
        if !self.interaction.confirm(&prompt) {
            debug!(entity = %self.schema.entity, %key, "delete declined");
            return Ok(Outcome::Cancelled);
        }

        let param = self.schema.delete_key_param.clone();
        match self.schema.delete_encoding {
            DeleteEncoding::Json => {
                let request = MutationRequest::new().with(param, key.as_str());
                let prefix = self.schema.delete_error_prefix.clone();
                self.submit(&path, &request, &prefix).await?;
            }
            DeleteEncoding::Form => {
                self.submit_form(&path, &[(param, key.to_string())]).await?;
            }
        }

        info!(entity = %self.schema.entity, %key, "record deleted");
        match self.policy {
            RefreshPolicy::ReloadPage => Ok(self.request_reload()),
            RefreshPolicy::PatchRow => {
                self.table.remove(key);
                self.emit(ControllerEvent::RowRemoved { key: key.clone() });
                Ok(Outcome::RowRemoved { key: key.clone() })
            }
        }
    }

    fn missing_required<'a>(&'a self, row: &Row) -> Option<&'a FieldSpec> {
        self.schema.fields.iter().find(|spec| {
            spec.required
                && row
                    .cell(&spec.name)
                    .and_then(|cell| cell.control())
                    .is_some_and(|control| control.value.trim().is_empty())
        })
    }

    /// New key value when the edit renames the key field onto another row.
    fn renamed_onto_existing(&self, row: &Row) -> Option<RowKey> {
        let key_field = self.schema.key_field.as_deref()?;
        let value = row.cell(key_field)?.control()?.value.clone();
        let candidate = RowKey::new(value);
        (&candidate != row.key() && self.table.row(&candidate).is_some()).then_some(candidate)
    }

    /// Row key under the update key param, then every submitted field in
    /// schema order.
    fn update_request(&self, row: &Row) -> MutationRequest {
        let mut request = MutationRequest::new();
        request.insert(self.schema.update_key_param.clone(), row.key().as_str());
        for spec in self.schema.fields.iter().filter(|spec| spec.control.is_submitted()) {
            if let Some(control) = row.cell(&spec.name).and_then(|cell| cell.control()) {
                request.insert(spec.wire_name(), control.value.clone());
            }
        }
        request
    }

    async fn submit(
        &self,
        path: &str,
        request: &MutationRequest,
        prefix: &str,
    ) -> Result<(), ActionError> {
        match self.sync.post_mutation(path, request).await {
            Ok(response) if response.success => Ok(()),
            Ok(response) => {
                let reason = response
                    .error
                    .filter(|error| !error.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string());
                warn!(entity = %self.schema.entity, path, %reason, "server rejected mutation");
                Err(self.fail(ActionError::new(
                    ErrorKind::Rejected,
                    format!("{prefix}: {reason}"),
                )))
            }
            Err(err) => {
                error!(entity = %self.schema.entity, path, error = %err, "mutation request failed");
                Err(self.fail(ActionError::new(
                    ErrorKind::Transport,
                    connection_message(&err),
                )))
            }
        }
    }

    async fn submit_form(&self, path: &str, fields: &[(String, String)]) -> Result<(), ActionError> {
        self.sync.submit_entries(path, fields).await.map_err(|err| {
            error!(entity = %self.schema.entity, path, error = %err, "form request failed");
            self.fail(ActionError::new(
                ErrorKind::Transport,
                connection_message(&err),
            ))
        })
    }

    /// Turns the row's controls back into text showing the saved values and
    /// moves the row key when its key field was renamed.
    fn commit_row(&mut self, key: &RowKey) -> Result<RowKey, ActionError> {
        let key_field = self.schema.key_field.clone();
        let row = self.row_mut(key)?;

        let mut new_key = key.clone();
        for cell in row.cells_mut() {
            let CellContent::Control(control) = &cell.content else {
                continue;
            };
            if key_field.as_deref() == Some(cell.field.as_str()) {
                new_key = RowKey::new(control.value.clone());
            }
            cell.content = CellContent::Text(committed_text(control));
        }
        row.set_mode(RowMode::Display);
        row.set_key(new_key.clone());
        Ok(new_key)
    }

    fn request_reload(&self) -> Outcome {
        self.emit(ControllerEvent::ReloadRequested);
        Outcome::ReloadRequested
    }

    fn row_mut(&mut self, key: &RowKey) -> Result<&mut Row, ActionError> {
        self.table.row_mut(key).ok_or_else(|| unknown_row(key))
    }

    fn editing_row_mut(&mut self, key: &RowKey) -> Result<&mut Row, ActionError> {
        let row = self.row_mut(key)?;
        if !row.is_editing() {
            return Err(ActionError::usage(format!("row '{key}' is not being edited")));
        }
        Ok(row)
    }

    fn fail(&self, err: ActionError) -> ActionError {
        self.interaction.alert(err.message());
        self.emit(ControllerEvent::ActionFailed(err.clone()));
        err
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn unknown_row(key: &RowKey) -> ActionError {
    ActionError::usage(format!("no row with key '{key}'"))
}

fn connection_message(err: &SyncError) -> String {
    match (err.status(), err.detail()) {
        (Some(status), Some(detail)) => format!("{CONNECTION_FAILURE} ({status}): {detail}"),
        (Some(status), None) => format!("{CONNECTION_FAILURE} ({status})."),
        _ => format!("{CONNECTION_FAILURE}."),
    }
}

/// Builds the edit control for a cell currently showing `text`.
pub(crate) fn control_for(spec: &FieldSpec, lookup: &LookupData, text: &str) -> Control {
    let current = text.trim();
    let mut control = Control {
        kind: spec.control.clone(),
        value: current.to_string(),
        original: text.to_string(),
        options: Vec::new(),
    };

    match &spec.control {
        ControlKind::Date => control.value = dates::to_display(current),
        ControlKind::Select { source } => {
            if let Some(label) = &spec.placeholder {
                control.options.push(SelectOption {
                    value: String::new(),
                    label: label.clone(),
                });
            }
            control.options.extend(lookup.options(*source));
            control.value = control
                .options
                .iter()
                .find(|option| !current.is_empty() && (option.label == current || option.value == current))
                .or_else(|| control.options.first())
                .map(|option| option.value.clone())
                .unwrap_or_default();
        }
        ControlKind::Text | ControlKind::Number | ControlKind::ReadOnly | ControlKind::Derived { .. } => {}
    }
    control
}

/// Writes a user-supplied value into a control, enforcing its kind.
pub(crate) fn assign_value(control: &mut Control, spec: &FieldSpec, value: &str) -> Result<(), ActionError> {
    match &spec.control {
        ControlKind::ReadOnly | ControlKind::Derived { .. } => Err(ActionError::usage(format!(
            "'{}' is read-only",
            spec.name
        ))),
        ControlKind::Select { .. } => {
            let option = control
                .options
                .iter()
                .find(|option| option.value == value)
                .or_else(|| control.options.iter().find(|option| option.label == value))
                .ok_or_else(|| {
                    ActionError::validation(format!("'{value}' is not a valid choice for {}", spec.name))
                })?;
            control.value = option.value.clone();
            Ok(())
        }
        ControlKind::Number => {
            let trimmed = value.trim();
            if !trimmed.is_empty() && trimmed.parse::<f64>().is_err() {
                return Err(ActionError::validation(format!(
                    "'{value}' is not a number ({})",
                    spec.name
                )));
            }
            control.value = trimmed.to_string();
            Ok(())
        }
        ControlKind::Date => {
            let display = dates::to_display(value);
            if !display.trim().is_empty() && !dates::is_display_date(&display) {
                return Err(ActionError::validation(format!(
                    "'{value}' is not a date ({})",
                    spec.name
                )));
            }
            control.value = display.trim().to_string();
            Ok(())
        }
        ControlKind::Text => {
            control.value = value.to_string();
            Ok(())
        }
    }
}

/// Text a committed control leaves in its cell. Dates go back to the compact
/// form when that is how the row showed them.
fn committed_text(control: &Control) -> String {
    match control.kind {
        ControlKind::Date if dates::to_display(control.original.trim()) != control.original.trim() => {
            dates::to_compact(&control.value)
        }
        _ => control.display_value(),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
