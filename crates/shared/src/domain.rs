use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One managed record type; every table on the admin pages shows exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Bank,
    Factory,
    Representative,
    Supplier,
    TruckOwner,
    Zone,
    DataEntry,
    SupplierPayment,
    TruckOwnerPayment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Bank,
        EntityKind::Factory,
        EntityKind::Representative,
        EntityKind::Supplier,
        EntityKind::TruckOwner,
        EntityKind::Zone,
        EntityKind::DataEntry,
        EntityKind::SupplierPayment,
        EntityKind::TruckOwnerPayment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Bank => "bank",
            EntityKind::Factory => "factory",
            EntityKind::Representative => "representative",
            EntityKind::Supplier => "supplier",
            EntityKind::TruckOwner => "truck_owner",
            EntityKind::Zone => "zone",
            EntityKind::DataEntry => "data_entry",
            EntityKind::SupplierPayment => "supplier_payment",
            EntityKind::TruckOwnerPayment => "truck_owner_payment",
        }
    }

    /// Human noun used in prompts and alerts.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Bank => "bank",
            EntityKind::Factory => "factory",
            EntityKind::Representative => "representative",
            EntityKind::Supplier => "supplier",
            EntityKind::TruckOwner => "truck",
            EntityKind::Zone => "zone",
            EntityKind::DataEntry => "shipment record",
            EntityKind::SupplierPayment => "supplier payment",
            EntityKind::TruckOwnerPayment => "truck owner payment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity '{0}'")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

/// Stable identifier of a record as rendered on its row and sent back to the
/// server on update/delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
