//! In-memory model of an editable HTML table: rows addressed by key, cells
//! holding either display text or an edit control.

use serde::{Deserialize, Serialize};
use shared::domain::{EntityKind, RowKey};
use thiserror::Error;

use crate::{lookup::SelectOption, schema::ControlKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    Display,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub kind: ControlKind,
    pub value: String,
    /// Cell text before edit mode began, restored on cancel.
    pub original: String,
    pub options: Vec<SelectOption>,
}

impl Control {
    pub fn is_read_only(&self) -> bool {
        self.kind.is_read_only()
    }

    pub fn selected(&self) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.value == self.value)
    }

    /// Text the cell shows once the edit is committed: a select shows the
    /// chosen option's label rather than its value.
    pub fn display_value(&self) -> String {
        match self.kind {
            ControlKind::Select { .. } => self
                .selected()
                .map(|option| option.label.clone())
                .unwrap_or_else(|| self.value.clone()),
            _ => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Control(Control),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub field: String,
    pub content: CellContent,
}

impl Cell {
    pub fn text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            content: CellContent::Text(text.into()),
        }
    }

    /// Display text, or the control's current value while editing.
    pub fn current(&self) -> &str {
        match &self.content {
            CellContent::Text(text) => text,
            CellContent::Control(control) => &control.value,
        }
    }

    pub fn control(&self) -> Option<&Control> {
        match &self.content {
            CellContent::Control(control) => Some(control),
            CellContent::Text(_) => None,
        }
    }

    pub fn control_mut(&mut self) -> Option<&mut Control> {
        match &mut self.content {
            CellContent::Control(control) => Some(control),
            CellContent::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: RowKey,
    cells: Vec<Cell>,
    mode: RowMode,
}

impl Row {
    pub fn new(key: RowKey, cells: Vec<Cell>) -> Self {
        Self {
            key,
            cells,
            mode: RowMode::Display,
        }
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    pub fn mode(&self) -> RowMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == RowMode::Editing
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, field: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.field == field)
    }

    pub(crate) fn cell_mut(&mut self, field: &str) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|cell| cell.field == field)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub(crate) fn set_mode(&mut self, mode: RowMode) {
        self.mode = mode;
    }

    pub(crate) fn set_key(&mut self, key: RowKey) {
        self.key = key;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub field: String,
    pub text: String,
}

/// One row as rendered by the server: key attribute plus cell texts in column
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub key: RowKey,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row key '{0}' appears more than once")]
    DuplicateKey(RowKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    entity: EntityKind,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            rows: Vec::new(),
        }
    }

    pub fn from_snapshots(
        entity: EntityKind,
        snapshots: impl IntoIterator<Item = RowSnapshot>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(entity);
        for snapshot in snapshots {
            table.push(snapshot)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, snapshot: RowSnapshot) -> Result<(), TableError> {
        if self.row(&snapshot.key).is_some() {
            return Err(TableError::DuplicateKey(snapshot.key));
        }
        let cells = snapshot
            .cells
            .into_iter()
            .map(|cell| Cell::text(cell.field, cell.text))
            .collect();
        self.rows.push(Row::new(snapshot.key, cells));
        Ok(())
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| &row.key == key)
    }

    pub(crate) fn row_mut(&mut self, key: &RowKey) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| &row.key == key)
    }

    pub fn editing_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.is_editing())
    }

    pub fn display_text(&self, key: &RowKey, field: &str) -> Option<&str> {
        self.row(key)?.cell(field).map(Cell::current)
    }

    pub(crate) fn remove(&mut self, key: &RowKey) -> Option<Row> {
        let index = self.rows.iter().position(|row| &row.key == key)?;
        Some(self.rows.remove(index))
    }

    /// Current view of every row, e.g. for writing the page back out.
    pub fn snapshots(&self) -> Vec<RowSnapshot> {
        self.rows
            .iter()
            .map(|row| RowSnapshot {
                key: row.key.clone(),
                cells: row
                    .cells
                    .iter()
                    .map(|cell| CellSnapshot {
                        field: cell.field.clone(),
                        text: cell.current().to_string(),
                    })
                    .collect(),
            })
            .collect()
    }
}
