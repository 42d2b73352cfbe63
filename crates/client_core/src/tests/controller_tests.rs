use super::*;
use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{domain::EntityKind, protocol::MutationResponse};

use crate::{
    entities,
    lookup::{BankOption, TruckOption},
    table::{CellSnapshot, RowSnapshot},
};

enum Scripted {
    Respond(MutationResponse),
    Status(StatusCode, Option<String>),
}

#[derive(Default)]
struct RecordingSync {
    requests: Mutex<Vec<(String, MutationRequest)>>,
    forms: Mutex<Vec<(String, Vec<(String, String)>)>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl RecordingSync {
    fn answering(answers: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<(String, MutationRequest)> {
        self.requests.lock().expect("requests").clone()
    }

    fn forms(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.forms.lock().expect("forms").clone()
    }
}

#[async_trait]
impl RecordSync for RecordingSync {
    async fn post_mutation(
        &self,
        path: &str,
        body: &MutationRequest,
    ) -> Result<MutationResponse, SyncError> {
        self.requests
            .lock()
            .expect("requests")
            .push((path.to_string(), body.clone()));
        match self.script.lock().expect("script").pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Status(status, detail)) => Err(SyncError::Status { status, detail }),
            None => Ok(MutationResponse::ok()),
        }
    }

    async fn submit_entries(&self, path: &str, fields: &[(String, String)]) -> Result<(), SyncError> {
        self.forms
            .lock()
            .expect("forms")
            .push((path.to_string(), fields.to_vec()));
        match self.script.lock().expect("script").pop_front() {
            Some(Scripted::Status(status, detail)) => Err(SyncError::Status { status, detail }),
            Some(Scripted::Respond(_)) | None => Ok(()),
        }
    }
}

struct ScriptedInteraction {
    accept: bool,
    prompts: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    fn accepting(accept: bool) -> Self {
        Self {
            accept,
            prompts: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().expect("alerts").clone()
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts").clone()
    }
}

impl Interaction for ScriptedInteraction {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().expect("prompts").push(message.to_string());
        self.accept
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().expect("alerts").push(message.to_string());
    }
}

fn lookup() -> LookupData {
    LookupData {
        suppliers: vec!["Nile Co".into(), "Delta Trading".into()],
        factories: vec!["Sugar Mill".into()],
        zones: vec!["North".into()],
        representatives: vec!["Omar".into()],
        trucks: vec![
            TruckOption {
                truck_num: "TRK-001".into(),
                owner_name: "Hassan".into(),
            },
            TruckOption {
                truck_num: "TRK-002".into(),
                owner_name: String::new(),
            },
        ],
        banks: vec![
            BankOption {
                bank_id: "3".into(),
                bank_name: "Cash".into(),
            },
            BankOption {
                bank_id: "7".into(),
                bank_name: "Bank Misr".into(),
            },
        ],
    }
}

fn snapshot(key: &str, cells: &[(&str, &str)]) -> RowSnapshot {
    RowSnapshot {
        key: RowKey::new(key),
        cells: cells
            .iter()
            .map(|(field, text)| CellSnapshot {
                field: field.to_string(),
                text: text.to_string(),
            })
            .collect(),
    }
}

struct Harness {
    controller: TableController,
    sync: Arc<RecordingSync>,
    interaction: Arc<ScriptedInteraction>,
}

fn harness(
    schema: EntitySchema,
    rows: Vec<RowSnapshot>,
    sync: RecordingSync,
    accept: bool,
) -> Harness {
    let sync = Arc::new(sync);
    let interaction = Arc::new(ScriptedInteraction::accepting(accept));
    let table = Table::from_snapshots(schema.entity, rows).expect("table");
    let controller = TableController::new(
        schema,
        Arc::new(lookup()),
        table,
        sync.clone(),
        interaction.clone(),
    )
    .expect("controller");
    Harness {
        controller,
        sync,
        interaction,
    }
}

fn bank_harness(sync: RecordingSync) -> Harness {
    harness(
        entities::bank().expect("schema"),
        vec![
            snapshot("Cash", &[("bank_name", "Cash")]),
            snapshot("Bank Misr", &[("bank_name", "Bank Misr")]),
        ],
        sync,
        true,
    )
}

fn payment_row() -> RowSnapshot {
    snapshot(
        "41",
        &[
            ("supplier_name", "  Nile Co "),
            ("payment_method", "Cash"),
            ("date_id", "20240315"),
            ("amount", "1500"),
            ("transfer_fees", "15"),
            ("notes", "first batch"),
            ("created_by", "admin"),
        ],
    )
}

#[test]
fn cancel_restores_exact_text() {
    let mut h = harness(
        entities::supplier_payment().expect("schema"),
        vec![payment_row()],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("41");
    let before = h.controller.table().row(&key).expect("row").clone();

    h.controller.begin_edit(&key).expect("edit");
    let row = h.controller.table().row(&key).expect("row");
    assert!(row.is_editing());
    let date = row.cell("date_id").and_then(|cell| cell.control()).expect("date");
    assert_eq!(date.value, "2024-03-15");
    let supplier = row
        .cell("supplier_name")
        .and_then(|cell| cell.control())
        .expect("supplier");
    assert_eq!(supplier.value, "Nile Co");
    assert!(row.cell("created_by").and_then(|cell| cell.control()).is_none());

    h.controller.cancel_edit(&key).expect("cancel");
    assert_eq!(h.controller.table().row(&key).expect("row"), &before);
    assert!(h.sync.requests().is_empty());
}

#[tokio::test]
async fn bank_rename_posts_original_and_new_name() {
    let mut h = bank_harness(RecordingSync::default());
    let key = RowKey::new("Cash");

    h.controller.begin_edit(&key).expect("edit");
    h.controller
        .set_field(&key, "bank_name", "CashPlus")
        .expect("set");
    let outcome = h.controller.save(&key).await.expect("save");

    let requests = h.sync.requests();
    assert_eq!(requests.len(), 1);
    let (path, body) = &requests[0];
    assert_eq!(path, "/update_bank");
    assert_eq!(
        body,
        &MutationRequest::new()
            .with("original_bank_name", "Cash")
            .with("new_bank_name", "CashPlus")
    );

    let renamed = RowKey::new("CashPlus");
    assert_eq!(outcome, Outcome::RowPatched { key: renamed.clone() });
    assert!(h.controller.table().row(&key).is_none());
    let row = h.controller.table().row(&renamed).expect("renamed row");
    assert_eq!(row.mode(), RowMode::Display);
    assert_eq!(
        h.controller.table().display_text(&renamed, "bank_name"),
        Some("CashPlus")
    );
}

#[tokio::test]
async fn rejected_update_alerts_and_stays_in_edit_mode() {
    let mut h = bank_harness(RecordingSync::answering(vec![Scripted::Respond(
        MutationResponse::rejected("duplicate name"),
    )]));
    let key = RowKey::new("Cash");
    let mut events = h.controller.subscribe_events();

    h.controller.begin_edit(&key).expect("edit");
    h.controller
        .set_field(&key, "bank_name", "CashPlus")
        .expect("set");
    let err = h.controller.save(&key).await.expect_err("rejected");

    assert_eq!(err.kind(), ErrorKind::Rejected);
    let alerts = h.interaction.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("duplicate name"), "alert: {}", alerts[0]);
    let row = h.controller.table().row(&key).expect("row");
    assert!(row.is_editing());
    assert_eq!(
        h.controller.table().display_text(&key, "bank_name"),
        Some("CashPlus")
    );

    assert_eq!(
        events.try_recv().expect("event"),
        ControllerEvent::EditStarted { key: key.clone() }
    );
    assert!(matches!(
        events.try_recv().expect("event"),
        ControllerEvent::ActionFailed(ActionError {
            kind: ErrorKind::Rejected,
            ..
        })
    ));
}

#[tokio::test]
async fn reload_policy_leaves_table_for_host() {
    let mut h = bank_harness(RecordingSync::default());
    h.controller = h.controller.with_refresh_policy(RefreshPolicy::ReloadPage);
    let mut events = h.controller.subscribe_events();
    let key = RowKey::new("Cash");

    h.controller.begin_edit(&key).expect("edit");
    let outcome = h.controller.save(&key).await.expect("save");

    assert_eq!(outcome, Outcome::ReloadRequested);
    assert!(h.controller.table().row(&key).expect("row").is_editing());
    assert_eq!(
        events.try_recv().expect("event"),
        ControllerEvent::EditStarted { key: key.clone() }
    );
    assert_eq!(
        events.try_recv().expect("event"),
        ControllerEvent::ReloadRequested
    );
}

#[tokio::test]
async fn confirmed_truck_delete_posts_truck_number() {
    let mut h = harness(
        entities::truck_owner().expect("schema"),
        vec![
            snapshot(
                "TRK-001",
                &[("truck_num", "TRK-001"), ("owner_name", "Hassan"), ("phone", "0100")],
            ),
            snapshot(
                "TRK-002",
                &[("truck_num", "TRK-002"), ("owner_name", "Ali"), ("phone", "0111")],
            ),
        ],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("TRK-001");

    let outcome = h.controller.delete(&key).await.expect("delete");

    assert_eq!(outcome, Outcome::RowRemoved { key: key.clone() });
    assert_eq!(
        h.sync.requests(),
        vec![(
            "/delete_truck_owner".to_string(),
            MutationRequest::new().with("truck_num", "TRK-001")
        )]
    );
    assert_eq!(
        h.interaction.prompts(),
        vec!["Are you sure you want to delete truck number TRK-001?".to_string()]
    );
    assert!(h.controller.table().row(&key).is_none());
    assert_eq!(h.controller.table().len(), 1);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let mut h = harness(
        entities::zone().expect("schema"),
        vec![snapshot("North", &[("zone_name", "North")])],
        RecordingSync::default(),
        false,
    );
    let before = h.controller.table().clone();

    let outcome = h
        .controller
        .delete(&RowKey::new("North"))
        .await
        .expect("declined");

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(h.sync.requests().is_empty());
    assert_eq!(h.controller.table(), &before);
    assert_eq!(h.interaction.prompts().len(), 1);
}

#[tokio::test]
async fn select_fields_submit_option_values() {
    let mut h = harness(
        entities::supplier_payment().expect("schema"),
        vec![payment_row()],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("41");

    h.controller.begin_edit(&key).expect("edit");
    let method = h
        .controller
        .table()
        .row(&key)
        .and_then(|row| row.cell("payment_method"))
        .and_then(|cell| cell.control())
        .expect("method")
        .clone();
    assert_eq!(method.value, "3");

    h.controller
        .set_field(&key, "payment_method", "Bank Misr")
        .expect("by label");
    h.controller
        .set_field(&key, "amount", " 1750 ")
        .expect("amount");
    h.controller.save(&key).await.expect("save");

    let requests = h.sync.requests();
    let (path, body) = &requests[0];
    assert_eq!(path, "/update_supplier_payment");
    assert_eq!(
        body.keys().collect::<Vec<_>>(),
        vec![
            "id",
            "supplier_name",
            "payment_method",
            "date_id",
            "amount",
            "transfer_fees",
            "notes"
        ]
    );
    assert_eq!(body.get("id"), Some("41"));
    assert_eq!(body.get("payment_method"), Some("7"));
    assert_eq!(body.get("amount"), Some("1750"));
    assert_eq!(body.get("date_id"), Some("2024-03-15"));

    let table = h.controller.table();
    assert_eq!(table.display_text(&key, "payment_method"), Some("Bank Misr"));
    assert_eq!(table.display_text(&key, "date_id"), Some("20240315"));
    assert_eq!(table.display_text(&key, "created_by"), Some("admin"));
}

#[test]
fn invalid_choices_and_numbers_are_refused() {
    let mut h = harness(
        entities::supplier_payment().expect("schema"),
        vec![payment_row()],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("41");
    h.controller.begin_edit(&key).expect("edit");

    let err = h
        .controller
        .set_field(&key, "supplier_name", "Unknown Supplier")
        .expect_err("not an option");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .controller
        .set_field(&key, "amount", "a lot")
        .expect_err("not a number");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .controller
        .set_field(&key, "created_by", "me")
        .expect_err("not editable");
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn second_row_cannot_enter_edit_mode() {
    let mut h = bank_harness(RecordingSync::default());
    let first = RowKey::new("Cash");
    let second = RowKey::new("Bank Misr");

    h.controller.begin_edit(&first).expect("edit");
    let err = h.controller.begin_edit(&second).expect_err("guard");

    assert_eq!(err.kind(), ErrorKind::Guard);
    assert_eq!(h.interaction.alerts().len(), 1);
    assert!(!h.controller.table().row(&second).expect("row").is_editing());

    h.controller.begin_edit(&first).expect("re-entering is a no-op");
    h.controller.cancel_edit(&first).expect("cancel");
    h.controller.begin_edit(&second).expect("free again");
}

#[test]
fn relaxed_schema_allows_parallel_edits() {
    let schema = EntitySchema::builder(EntityKind::Bank)
        .text("bank_name")
        .allow_concurrent_edits()
        .build()
        .expect("schema");
    let mut h = harness(
        schema,
        vec![
            snapshot("Cash", &[("bank_name", "Cash")]),
            snapshot("Bank Misr", &[("bank_name", "Bank Misr")]),
        ],
        RecordingSync::default(),
        true,
    );

    h.controller.begin_edit(&RowKey::new("Cash")).expect("first");
    h.controller
        .begin_edit(&RowKey::new("Bank Misr"))
        .expect("second");
    assert_eq!(h.controller.table().editing_rows().count(), 2);
}

#[tokio::test]
async fn empty_required_field_blocks_request() {
    let mut h = harness(
        entities::zone().expect("schema"),
        vec![snapshot("North", &[("zone_name", "North")])],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("North");

    h.controller.begin_edit(&key).expect("edit");
    h.controller.set_field(&key, "zone_name", "   ").expect("set");
    let err = h.controller.save(&key).await.expect_err("validation");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!err.reached_server());
    assert!(h.sync.requests().is_empty());
    assert_eq!(
        h.interaction.alerts(),
        vec!["The zone name field cannot be empty.".to_string()]
    );
    assert!(h.controller.table().row(&key).expect("row").is_editing());
}

#[tokio::test]
async fn transport_failure_uses_connection_message() {
    let mut h = harness(
        entities::zone().expect("schema"),
        vec![snapshot("North", &[("zone_name", "North")])],
        RecordingSync::answering(vec![Scripted::Status(
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
        )]),
        true,
    );
    let key = RowKey::new("North");

    h.controller.begin_edit(&key).expect("edit");
    let err = h.controller.save(&key).await.expect_err("transport");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.reached_server());
    let alerts = h.interaction.alerts();
    assert!(
        alerts[0].starts_with("An error occurred while contacting the server"),
        "alert: {}",
        alerts[0]
    );
    assert!(alerts[0].contains("500"));
    assert!(h.controller.table().row(&key).expect("row").is_editing());
}

#[tokio::test]
async fn failed_delete_leaves_row_untouched() {
    let mut h = harness(
        entities::zone().expect("schema"),
        vec![snapshot("North", &[("zone_name", "North")])],
        RecordingSync::answering(vec![Scripted::Respond(MutationResponse {
            success: false,
            error: None,
        })]),
        true,
    );
    let before = h.controller.table().clone();

    let err = h
        .controller
        .delete(&RowKey::new("North"))
        .await
        .expect_err("rejected");

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(
        h.interaction.alerts(),
        vec!["An error occurred during the deletion: unknown error".to_string()]
    );
    assert_eq!(h.controller.table(), &before);
}

#[tokio::test]
async fn data_entry_truck_change_updates_owner() {
    let mut h = harness(
        entities::data_entry().expect("schema"),
        vec![snapshot(
            "9001",
            &[
                ("date", "2024-03-15"),
                ("truck_num", "TRK-001"),
                ("truck_owner", "Hassan"),
                ("supplier", "Nile Co"),
                ("factory", "Sugar Mill"),
                ("zone", "North"),
                ("weight", "30"),
                ("ohda", "200"),
                ("factory_price", "1000"),
                ("sell_price", "1100"),
                ("representative", "Omar"),
            ],
        )],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("9001");

    h.controller.begin_edit(&key).expect("edit");
    h.controller
        .set_field(&key, "truck_num", "TRK-002")
        .expect("truck");
    assert_eq!(
        h.controller.table().display_text(&key, "truck_owner"),
        Some("")
    );
    h.controller
        .set_field(&key, "truck_num", "TRK-001")
        .expect("truck");
    assert_eq!(
        h.controller.table().display_text(&key, "truck_owner"),
        Some("Hassan")
    );

    let err = h
        .controller
        .set_field(&key, "truck_owner", "Someone")
        .expect_err("derived");
    assert_eq!(err.kind(), ErrorKind::Usage);

    h.controller.save(&key).await.expect("save");
    let requests = h.sync.requests();
    let (path, body) = &requests[0];
    assert_eq!(path, "/update_record");
    assert_eq!(body.get("id"), Some("9001"));
    assert_eq!(body.get("truck_owner"), None);
    assert_eq!(body.get("representative"), Some("Omar"));
    assert_eq!(body.len(), 11);
}

fn shipment_harness(accept: bool, sync: RecordingSync) -> Harness {
    harness(
        entities::data_entry().expect("schema"),
        vec![
            snapshot("9001", &[("date", "2024-03-15"), ("truck_num", "TRK-001")]),
            snapshot("9002", &[("date", "2024-03-16"), ("truck_num", "TRK-002")]),
        ],
        sync,
        accept,
    )
}

#[tokio::test]
async fn confirmed_shipment_delete_posts_page_form() {
    let mut h = shipment_harness(true, RecordingSync::default());
    let key = RowKey::new("9001");

    let outcome = h.controller.delete(&key).await.expect("delete");

    assert_eq!(outcome, Outcome::RowRemoved { key: key.clone() });
    assert_eq!(
        h.sync.forms(),
        vec![(
            "/data-entry".to_string(),
            vec![("delete_id".to_string(), "9001".to_string())]
        )]
    );
    assert!(h.sync.requests().is_empty());
    assert_eq!(
        h.interaction.prompts(),
        vec!["Are you sure you want to delete shipment record 9001?".to_string()]
    );
    assert!(h.controller.table().row(&key).is_none());
    assert_eq!(h.controller.table().len(), 1);
}

#[tokio::test]
async fn declined_shipment_delete_posts_nothing() {
    let mut h = shipment_harness(false, RecordingSync::default());
    let before = h.controller.table().clone();

    let outcome = h
        .controller
        .delete(&RowKey::new("9002"))
        .await
        .expect("declined");

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(h.sync.forms().is_empty());
    assert_eq!(h.controller.table(), &before);
}

#[tokio::test]
async fn failed_shipment_delete_keeps_row() {
    let mut h = shipment_harness(
        true,
        RecordingSync::answering(vec![Scripted::Status(StatusCode::BAD_GATEWAY, None)]),
    );
    let key = RowKey::new("9001");

    let err = h.controller.delete(&key).await.expect_err("transport");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(h.interaction.alerts()[0].contains("contacting the server"));
    assert!(h.controller.table().row(&key).is_some());
}

#[tokio::test]
async fn schema_without_delete_refuses_before_prompting() {
    let schema = EntitySchema::builder(EntityKind::Zone)
        .text("zone_name")
        .without_delete()
        .build()
        .expect("schema");
    let mut h = harness(
        schema,
        vec![snapshot("North", &[("zone_name", "North")])],
        RecordingSync::default(),
        true,
    );

    let err = h
        .controller
        .delete(&RowKey::new("North"))
        .await
        .expect_err("no endpoint");

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(h.interaction.prompts().is_empty());
    assert!(h.sync.requests().is_empty());
}

#[tokio::test]
async fn renaming_onto_another_rows_key_is_refused() {
    let mut h = bank_harness(RecordingSync::default());
    let key = RowKey::new("Cash");

    h.controller.begin_edit(&key).expect("edit");
    h.controller
        .set_field(&key, "bank_name", "Bank Misr")
        .expect("set");
    let err = h.controller.save(&key).await.expect_err("duplicate key");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(h.sync.requests().is_empty());
    assert_eq!(
        h.interaction.alerts(),
        vec!["A bank named 'Bank Misr' already exists.".to_string()]
    );
    let table = h.controller.table();
    assert!(table.row(&key).expect("row").is_editing());
    assert_eq!(
        table
            .rows()
            .iter()
            .filter(|row| row.key() == &RowKey::new("Bank Misr"))
            .count(),
        1
    );
}

#[tokio::test]
async fn saving_unchanged_key_is_not_a_collision() {
    let mut h = bank_harness(RecordingSync::default());
    let key = RowKey::new("Cash");

    h.controller.begin_edit(&key).expect("edit");
    let outcome = h.controller.save(&key).await.expect("save");

    assert_eq!(outcome, Outcome::RowPatched { key: key.clone() });
    assert_eq!(h.sync.requests().len(), 1);
}

#[tokio::test]
async fn truck_owner_payment_owner_is_read_only() {
    let mut h = harness(
        entities::truck_owner_payment().expect("schema"),
        vec![snapshot(
            "12",
            &[
                ("owner_name", "Hassan"),
                ("payment_method", "Cash"),
                ("amount", "500"),
                ("transfer_fees", "0"),
                ("notes", ""),
            ],
        )],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("12");

    h.controller.begin_edit(&key).expect("edit");
    let err = h
        .controller
        .set_field(&key, "owner_name", "Ali")
        .expect_err("read-only");
    assert_eq!(err.kind(), ErrorKind::Usage);

    h.controller.save(&key).await.expect("save");
    let requests = h.sync.requests();
    let (_, body) = &requests[0];
    assert_eq!(body.get("owner_name"), None);
    assert_eq!(body.get("payment_method"), Some("3"));
    assert_eq!(
        h.controller.table().display_text(&key, "owner_name"),
        Some("Hassan")
    );
}

#[tokio::test]
async fn delete_requires_display_mode() {
    let mut h = bank_harness(RecordingSync::default());
    let key = RowKey::new("Cash");

    h.controller.begin_edit(&key).expect("edit");
    let err = h.controller.delete(&key).await.expect_err("editing");

    assert_eq!(err.kind(), ErrorKind::Usage);
    assert!(h.interaction.prompts().is_empty());
    assert!(h.sync.requests().is_empty());
}

#[tokio::test]
async fn actions_dispatch_through_handle() {
    let mut h = harness(
        entities::representative().expect("schema"),
        vec![snapshot(
            "5",
            &[("representative_name", "Omar"), ("phone", "0122")],
        )],
        RecordingSync::default(),
        true,
    );
    let key = RowKey::new("5");

    h.controller
        .handle(RowAction::Edit(key.clone()))
        .await
        .expect("edit");
    h.controller
        .handle(RowAction::SetField {
            key: key.clone(),
            field: "phone".into(),
            value: "0155".into(),
        })
        .await
        .expect("set");
    let outcome = h
        .controller
        .handle(RowAction::Save(key.clone()))
        .await
        .expect("save");

    assert_eq!(outcome, Outcome::RowPatched { key: key.clone() });
    let requests = h.sync.requests();
    assert_eq!(
        requests[0].1,
        MutationRequest::new()
            .with("id", "5")
            .with("representative_name", "Omar")
            .with("phone", "0155")
    );

    let outcome = h
        .controller
        .handle(RowAction::Delete(key.clone()))
        .await
        .expect("delete");
    assert_eq!(outcome, Outcome::RowRemoved { key: key.clone() });
    assert_eq!(
        h.sync.requests()[1].1,
        MutationRequest::new().with("id", "5")
    );
}

#[test]
fn schema_and_table_must_agree() {
    let table = Table::new(EntityKind::Zone);
    let result = TableController::new(
        entities::bank().expect("schema"),
        Arc::new(LookupData::default()),
        table,
        Arc::new(RecordingSync::default()),
        Arc::new(ScriptedInteraction::accepting(true)),
    );
    assert!(result.is_err());
}
