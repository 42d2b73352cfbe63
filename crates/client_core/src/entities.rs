//! Built-in schemas for the admin pages, matching the server's update and
//! delete endpoints.

use shared::domain::EntityKind;

use crate::schema::{EntitySchema, OptionSource, SchemaError};

pub fn bank() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::Bank)
        .text("bank_name")
        .wire_name("new_bank_name")
        .required()
        .key_field("bank_name")
        .update_key_param("original_bank_name")
        .delete_key_param("bank_name")
        .build()
}

pub fn factory() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::Factory)
        .text("factory_name")
        .required()
        .key_field("factory_name")
        .delete_key_param("factory_name")
        .build()
}

/// Rows carry the numeric representative id for both update and delete.
pub fn representative() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::Representative)
        .text("representative_name")
        .required()
        .text("phone")
        .delete_prompt("Are you sure you want to delete the representative with id '{key}'?")
        .build()
}

pub fn supplier() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::Supplier)
        .text("supplier_name")
        .required()
        .text("phone")
        .key_field("supplier_name")
        .delete_key_param("supplier_name")
        .build()
}

pub fn truck_owner() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::TruckOwner)
        .text("truck_num")
        .required()
        .text("owner_name")
        .text("phone")
        .key_field("truck_num")
        .delete_key_param("truck_num")
        .delete_prompt("Are you sure you want to delete truck number {key}?")
        .error_prefixes("Error updating record", "Error deleting record")
        .build()
}

pub fn zone() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::Zone)
        .text("zone_name")
        .required()
        .key_field("zone_name")
        .delete_key_param("zone_name")
        .build()
}

/// Shipment rows on the data-entry page. Deletion goes through the page's own
/// form, which posts `delete_id` back to the page.
pub fn data_entry() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::DataEntry)
        .date("date")
        .required()
        .select("truck_num", OptionSource::Trucks)
        .placeholder("Select Truck")
        .derived("truck_owner", "truck_num", OptionSource::Trucks)
        .select("supplier", OptionSource::Suppliers)
        .placeholder("Select Supplier")
        .select("factory", OptionSource::Factories)
        .placeholder("Select Factory")
        .select("zone", OptionSource::Zones)
        .placeholder("Select Zone")
        .number("weight")
        .number("ohda")
        .number("factory_price")
        .number("sell_price")
        .select("representative", OptionSource::Representatives)
        .placeholder("Select Representative")
        .update_path("/update_record")
        .delete_path("/data-entry")
        .delete_key_param("delete_id")
        .delete_as_form()
        .delete_prompt("Are you sure you want to delete shipment record {key}?")
        .error_prefixes("Error saving changes", "Error deleting record")
        .build()
}

pub fn supplier_payment() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::SupplierPayment)
        .select("supplier_name", OptionSource::Suppliers)
        .select("payment_method", OptionSource::Banks)
        .date("date_id")
        .number("amount")
        .required()
        .number("transfer_fees")
        .text("notes")
        .delete_prompt("Are you sure you want to delete payment number {key}?")
        .error_prefixes("Update failed", "Delete failed")
        .build()
}

pub fn truck_owner_payment() -> Result<EntitySchema, SchemaError> {
    EntitySchema::builder(EntityKind::TruckOwnerPayment)
        .read_only("owner_name")
        .select("payment_method", OptionSource::Banks)
        .number("amount")
        .required()
        .number("transfer_fees")
        .text("notes")
        .delete_prompt("Are you sure you want to delete payment number {key}?")
        .error_prefixes("Update failed", "Delete failed")
        .build()
}

pub fn schema_for(kind: EntityKind) -> Result<EntitySchema, SchemaError> {
    match kind {
        EntityKind::Bank => bank(),
        EntityKind::Factory => factory(),
        EntityKind::Representative => representative(),
        EntityKind::Supplier => supplier(),
        EntityKind::TruckOwner => truck_owner(),
        EntityKind::Zone => zone(),
        EntityKind::DataEntry => data_entry(),
        EntityKind::SupplierPayment => supplier_payment(),
        EntityKind::TruckOwnerPayment => truck_owner_payment(),
    }
}

pub fn all() -> Result<Vec<EntitySchema>, SchemaError> {
    EntityKind::ALL.into_iter().map(schema_for).collect()
}
