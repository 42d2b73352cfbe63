//! Inline row editing for the logistics admin tables: one generic controller
//! configured per entity, synchronized with the server over JSON POSTs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::{domain::RowKey, error::ActionError};
use thiserror::Error;

pub mod controller;
pub mod dates;
pub mod entities;
pub mod form;
pub mod lookup;
pub mod schema;
pub mod table;
pub mod transport;

pub use controller::{Outcome, RowAction, TableController};
pub use form::{EntryForm, RowRemoval};
pub use lookup::{BankOption, LookupData, SelectOption, TruckOption};
pub use schema::{ControlKind, DeleteEncoding, EntitySchema, FieldSpec, OptionSource, SchemaBuilder, SchemaError};
pub use table::{Cell, CellContent, CellSnapshot, Control, Row, RowMode, RowSnapshot, Table};
pub use transport::{HttpRecordSync, RecordSync, SyncError};

/// Blocking prompts shown to whoever drives the table.
pub trait Interaction: Send + Sync {
    /// Returns `true` when the user accepts.
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

/// What the controller does once the server confirms a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Update or drop only the affected row; other rows keep their state.
    #[default]
    PatchRow,
    /// Leave the table alone and ask the host to reload the whole page.
    ReloadPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown refresh policy '{0}' (expected patch_row or reload_page)")]
pub struct UnknownRefreshPolicy(pub String);

impl FromStr for RefreshPolicy {
    type Err = UnknownRefreshPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "patch_row" | "patch" => Ok(RefreshPolicy::PatchRow),
            "reload_page" | "reload" => Ok(RefreshPolicy::ReloadPage),
            _ => Err(UnknownRefreshPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    EditStarted {
        key: RowKey,
    },
    EditCancelled {
        key: RowKey,
    },
    RowPatched {
        previous_key: RowKey,
        key: RowKey,
    },
    RowRemoved {
        key: RowKey,
    },
    ReloadRequested,
    ActionFailed(ActionError),
}
