//! Multi-line entry form of the data-entry page. Lines are added by copying
//! the first one and can be removed down to a single, cleared line.

use std::sync::Arc;

use shared::error::{ActionError, ErrorKind};
use tracing::{debug, info};

use crate::{
    controller::{assign_value, control_for},
    lookup::LookupData,
    schema::{ControlKind, EntitySchema},
    table::Control,
    transport::RecordSync,
};

pub const ENTRY_FORM_PATH: &str = "/data-entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRemoval {
    Removed,
    /// The form's last line was emptied instead of removed.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormRow {
    controls: Vec<(String, Control)>,
}

impl FormRow {
    fn control(&self, field: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, control)| control)
    }

    fn control_mut(&mut self, field: &str) -> Option<&mut Control> {
        self.controls
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, control)| control)
    }

    /// Selects fall back to their first option, everything else to empty.
    fn clear(&mut self) {
        for (_, control) in &mut self.controls {
            control.value = control
                .options
                .first()
                .map(|option| option.value.clone())
                .unwrap_or_default();
        }
    }
}

pub struct EntryForm {
    schema: EntitySchema,
    lookup: Arc<LookupData>,
    rows: Vec<FormRow>,
}

impl EntryForm {
    pub fn new(schema: EntitySchema, lookup: Arc<LookupData>) -> Self {
        let mut first = FormRow {
            controls: schema
                .fields
                .iter()
                .map(|spec| (spec.name.clone(), control_for(spec, &lookup, "")))
                .collect(),
        };
        first.clear();
        Self {
            schema,
            lookup,
            rows: vec![first],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, index: usize, field: &str) -> Option<&str> {
        self.rows
            .get(index)?
            .control(field)
            .map(|control| control.value.as_str())
    }

    /// Appends a blank copy of the first line and returns its index.
    pub fn add_row(&mut self) -> usize {
        let mut row = self.rows[0].clone();
        row.clear();
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Result<RowRemoval, ActionError> {
        if index >= self.rows.len() {
            return Err(ActionError::usage(format!("entry form has no line {index}")));
        }
        if self.rows.len() > 1 {
            self.rows.remove(index);
            Ok(RowRemoval::Removed)
        } else {
            self.rows[index].clear();
            Ok(RowRemoval::Cleared)
        }
    }

    pub fn set_value(&mut self, index: usize, field: &str, value: &str) -> Result<(), ActionError> {
        let spec = self
            .schema
            .field(field)
            .ok_or_else(|| ActionError::usage(format!("'{field}' is not an entry form field")))?;
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| ActionError::usage(format!("entry form has no line {index}")))?;
        let control = row
            .control_mut(field)
            .ok_or_else(|| ActionError::usage(format!("'{field}' is not an entry form field")))?;
        assign_value(control, spec, value)?;
        let source_value = control.value.clone();

        for target in self.schema.derived_from(field) {
            if let ControlKind::Derived { source, .. } = &target.control {
                if let Some(control) = row.control_mut(&target.name) {
                    control.value = self.lookup.derive(*source, &source_value);
                }
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        for (index, row) in self.rows.iter().enumerate() {
            for spec in self.schema.fields.iter().filter(|spec| spec.required) {
                let empty = row
                    .control(&spec.name)
                    .map_or(true, |control| control.value.trim().is_empty());
                if empty {
                    return Err(ActionError::validation(format!(
                        "Line {}: the {} field cannot be empty.",
                        index + 1,
                        spec.name.replace('_', " ")
                    )));
                }
            }
        }
        Ok(())
    }

    /// Form fields in line order, each named `field[]` so the server reads
    /// them back as parallel lists. Read-only controls are posted too; the
    /// server indexes every list by line.
    pub fn submission(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.controls
                    .iter()
                    .map(|(field, control)| (format!("{field}[]"), control.value.clone()))
            })
            .collect()
    }

    pub async fn submit(&self, sync: &dyn RecordSync) -> Result<(), ActionError> {
        self.validate()?;
        let fields = self.submission();
        debug!(lines = self.rows.len(), "submitting entry form");
        sync.submit_entries(ENTRY_FORM_PATH, &fields)
            .await
            .map_err(|err| {
                ActionError::new(
                    ErrorKind::Transport,
                    format!("Saving the entries failed: {err}"),
                )
            })?;
        info!(lines = self.rows.len(), "entry form submitted");
        Ok(())
    }
}
