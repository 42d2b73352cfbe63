//! Per-entity table configuration: which cells are editable, how each one is
//! rendered in edit mode, and how edits travel to the server.

use std::collections::HashSet;

use serde::Serialize;
use shared::domain::EntityKind;
use thiserror::Error;

/// Page-supplied option list a select control draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionSource {
    Suppliers,
    Factories,
    Zones,
    Representatives,
    Trucks,
    Banks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    Number,
    /// Stored as `YYYYMMDD`, edited as `YYYY-MM-DD`.
    Date,
    Select { source: OptionSource },
    /// Shown but not editable, and never submitted.
    ReadOnly,
    /// Read-only value looked up from another field of the same row. Never
    /// submitted.
    Derived { from: String, source: OptionSource },
}

impl ControlKind {
    pub fn is_submitted(&self) -> bool {
        !self.is_read_only()
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, ControlKind::ReadOnly | ControlKind::Derived { .. })
    }
}

/// How a delete request travels to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteEncoding {
    /// JSON body answered with `{success, error?}`.
    #[default]
    Json,
    /// URL-encoded page form; the server answers with a redirect.
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub control: ControlKind,
    /// Name used in the update body, when it differs from the cell's field.
    pub wire_name: Option<String>,
    pub required: bool,
    /// Leading empty option of a select, e.g. "Select Truck".
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySchema {
    pub entity: EntityKind,
    /// Row field whose value is the row key, when the key is itself editable.
    pub key_field: Option<String>,
    pub update_key_param: String,
    pub delete_key_param: String,
    pub fields: Vec<FieldSpec>,
    pub update_path: String,
    pub delete_path: Option<String>,
    pub delete_encoding: DeleteEncoding,
    pub delete_prompt: String,
    pub update_error_prefix: String,
    pub delete_error_prefix: String,
    pub single_row_edit: bool,
}

impl EntitySchema {
    pub fn builder(entity: EntityKind) -> SchemaBuilder {
        SchemaBuilder::new(entity)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields whose values are filled from `source_field`.
    pub fn derived_from<'a>(&'a self, source_field: &'a str) -> impl Iterator<Item = &'a FieldSpec> {
        self.fields.iter().filter(move |field| {
            matches!(&field.control, ControlKind::Derived { from, .. } if from == source_field)
        })
    }

    pub fn delete_prompt_for(&self, key: &str) -> String {
        self.delete_prompt.replace("{key}", key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema for {entity} declares no editable fields")]
    NoFields { entity: EntityKind },
    #[error("schema for {entity} declares field '{field}' twice")]
    DuplicateField { entity: EntityKind, field: String },
    #[error("derived field '{field}' of {entity} reads from undeclared field '{from}'")]
    UnknownDerivedSource {
        entity: EntityKind,
        field: String,
        from: String,
    },
    #[error("key field '{field}' of {entity} is not a declared field")]
    UnknownKeyField { entity: EntityKind, field: String },
    #[error("modifier '{modifier}' used before any field was declared")]
    ModifierWithoutField { modifier: &'static str },
}

/// Chained construction of an [`EntitySchema`]. Field modifiers
/// (`required`, `wire_name`, `placeholder`) apply to the last declared field.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    entity: EntityKind,
    key_field: Option<String>,
    update_key_param: String,
    delete_key_param: String,
    fields: Vec<FieldSpec>,
    update_path: String,
    delete_path: Option<String>,
    delete_encoding: DeleteEncoding,
    delete_prompt: String,
    update_error_prefix: String,
    delete_error_prefix: String,
    single_row_edit: bool,
    misplaced_modifier: Option<&'static str>,
}

impl SchemaBuilder {
    pub fn new(entity: EntityKind) -> Self {
        let name = entity.as_str();
        Self {
            entity,
            key_field: None,
            update_key_param: "id".to_string(),
            delete_key_param: "id".to_string(),
            fields: Vec::new(),
            update_path: format!("/update_{name}"),
            delete_path: Some(format!("/delete_{name}")),
            delete_encoding: DeleteEncoding::Json,
            delete_prompt: format!("Are you sure you want to delete the {} '{{key}}'?", entity.label()),
            update_error_prefix: "An error occurred during the update".to_string(),
            delete_error_prefix: "An error occurred during the deletion".to_string(),
            single_row_edit: true,
            misplaced_modifier: None,
        }
    }

    fn push(mut self, name: impl Into<String>, control: ControlKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            control,
            wire_name: None,
            required: false,
            placeholder: None,
        });
        self
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.push(name, ControlKind::Text)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.push(name, ControlKind::Number)
    }

    pub fn date(self, name: impl Into<String>) -> Self {
        self.push(name, ControlKind::Date)
    }

    pub fn select(self, name: impl Into<String>, source: OptionSource) -> Self {
        self.push(name, ControlKind::Select { source })
    }

    pub fn read_only(self, name: impl Into<String>) -> Self {
        self.push(name, ControlKind::ReadOnly)
    }

    pub fn derived(self, name: impl Into<String>, from: impl Into<String>, source: OptionSource) -> Self {
        self.push(
            name,
            ControlKind::Derived {
                from: from.into(),
                source,
            },
        )
    }

    fn modify_last(mut self, modifier: &'static str, apply: impl FnOnce(&mut FieldSpec)) -> Self {
        match self.fields.last_mut() {
            Some(field) => apply(field),
            None => self.misplaced_modifier = Some(modifier),
        }
        self
    }

    pub fn required(self) -> Self {
        self.modify_last("required", |field| field.required = true)
    }

    pub fn wire_name(self, wire_name: impl Into<String>) -> Self {
        let wire_name = wire_name.into();
        self.modify_last("wire_name", |field| field.wire_name = Some(wire_name))
    }

    pub fn placeholder(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.modify_last("placeholder", |field| field.placeholder = Some(label))
    }

    /// Marks the field that carries the row key, so a rename moves the key.
    pub fn key_field(mut self, name: impl Into<String>) -> Self {
        self.key_field = Some(name.into());
        self
    }

    pub fn update_key_param(mut self, name: impl Into<String>) -> Self {
        self.update_key_param = name.into();
        self
    }

    pub fn delete_key_param(mut self, name: impl Into<String>) -> Self {
        self.delete_key_param = name.into();
        self
    }

    pub fn update_path(mut self, path: impl Into<String>) -> Self {
        self.update_path = path.into();
        self
    }

    pub fn delete_path(mut self, path: impl Into<String>) -> Self {
        self.delete_path = Some(path.into());
        self
    }

    /// Deletes by posting `{delete_key_param}=<key>` as a page form.
    pub fn delete_as_form(mut self) -> Self {
        self.delete_encoding = DeleteEncoding::Form;
        self
    }

    pub fn without_delete(mut self) -> Self {
        self.delete_path = None;
        self
    }

    pub fn delete_prompt(mut self, template: impl Into<String>) -> Self {
        self.delete_prompt = template.into();
        self
    }

    pub fn error_prefixes(mut self, update: impl Into<String>, delete: impl Into<String>) -> Self {
        self.update_error_prefix = update.into();
        self.delete_error_prefix = delete.into();
        self
    }

    pub fn allow_concurrent_edits(mut self) -> Self {
        self.single_row_edit = false;
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        if let Some(modifier) = self.misplaced_modifier {
            return Err(SchemaError::ModifierWithoutField { modifier });
        }
        if self.fields.is_empty() {
            return Err(SchemaError::NoFields {
                entity: self.entity,
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity: self.entity,
                    field: field.name.clone(),
                });
            }
        }
        for field in &self.fields {
            if let ControlKind::Derived { from, .. } = &field.control {
                if !seen.contains(from.as_str()) {
                    return Err(SchemaError::UnknownDerivedSource {
                        entity: self.entity,
                        field: field.name.clone(),
                        from: from.clone(),
                    });
                }
            }
        }
        if let Some(key_field) = &self.key_field {
            if !seen.contains(key_field.as_str()) {
                return Err(SchemaError::UnknownKeyField {
                    entity: self.entity,
                    field: key_field.clone(),
                });
            }
        }

        Ok(EntitySchema {
            entity: self.entity,
            key_field: self.key_field,
            update_key_param: self.update_key_param,
            delete_key_param: self.delete_key_param,
            fields: self.fields,
            update_path: self.update_path,
            delete_path: self.delete_path,
            delete_encoding: self.delete_encoding,
            delete_prompt: self.delete_prompt,
            update_error_prefix: self.update_error_prefix,
            delete_error_prefix: self.delete_error_prefix,
            single_row_edit: self.single_row_edit,
        })
    }
}
