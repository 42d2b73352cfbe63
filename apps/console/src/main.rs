use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    entities, ControlKind, DeleteEncoding, EntryForm, HttpRecordSync, Interaction, LookupData,
    Outcome, RefreshPolicy, RowAction, RowSnapshot, Table, TableController,
};
use serde::{Deserialize, Serialize};
use shared::domain::{EntityKind, RowKey};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(name = "rowedit", about = "Edit or delete rows of the logistics admin tables")]
struct Cli {
    /// Settings file; `rowedit.toml` in the working directory when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    /// Ask for a page reload after a write instead of patching the row.
    #[arg(long)]
    reload: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit one row and save it.
    Edit {
        #[arg(long)]
        entity: EntityKind,
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        key: String,
        /// `field=value`, repeatable.
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },
    /// Delete one row after confirmation.
    Delete {
        #[arg(long)]
        entity: EntityKind,
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        key: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Submit new shipment records through the multi-line entry form.
    Entry {
        #[arg(long)]
        snapshot: PathBuf,
        /// `field=value,field=value`, one per form line.
        #[arg(long = "row", required = true)]
        rows: Vec<String>,
    },
    /// List every table's fields and endpoints.
    Schemas,
}

/// A page as the host rendered it: option lists plus the table rows.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PageSnapshot {
    #[serde(default)]
    lookup: LookupData,
    #[serde(default)]
    rows: Vec<RowSnapshot>,
}

struct TerminalInteraction {
    assume_yes: bool,
}

impl Interaction for TerminalInteraction {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    if cli.reload {
        settings.refresh_policy = RefreshPolicy::ReloadPage;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Edit {
            entity,
            snapshot,
            key,
            assignments,
        } => {
            let mut controller = open_table(&settings, entity, &snapshot, false)?;
            let key = RowKey::new(key);
            controller.handle(RowAction::Edit(key.clone())).await?;
            for (field, value) in assignments {
                controller
                    .handle(RowAction::SetField {
                        key: key.clone(),
                        field,
                        value,
                    })
                    .await?;
            }
            let outcome = controller.handle(RowAction::Save(key)).await?;
            report(&controller, &outcome)?;
        }
        Command::Delete {
            entity,
            snapshot,
            key,
            yes,
        } => {
            let mut controller = open_table(&settings, entity, &snapshot, yes)?;
            let outcome = controller.handle(RowAction::Delete(RowKey::new(key))).await?;
            report(&controller, &outcome)?;
        }
        Command::Entry { snapshot, rows } => {
            let page = read_snapshot(&snapshot)?;
            let mut form = EntryForm::new(entities::data_entry()?, Arc::new(page.lookup));
            for (position, line) in rows.iter().enumerate() {
                let index = if position == 0 { 0 } else { form.add_row() };
                for part in line.split(',').filter(|part| !part.trim().is_empty()) {
                    let (field, value) = parse_assignment(part).map_err(|err| anyhow!(err))?;
                    form.set_value(index, &field, &value)?;
                }
            }
            let sync = HttpRecordSync::new(&settings.server_url)?;
            form.submit(&sync).await?;
            println!("submitted {} line(s)", form.len());
        }
        Command::Schemas => print_schemas()?,
    }

    Ok(())
}

fn open_table(
    settings: &config::Settings,
    entity: EntityKind,
    snapshot: &Path,
    assume_yes: bool,
) -> Result<TableController> {
    let page = read_snapshot(snapshot)?;
    let table = Table::from_snapshots(entity, page.rows)?;
    let sync = HttpRecordSync::new(&settings.server_url)?;
    info!(%entity, rows = table.len(), server = %sync.base_url(), "table loaded");

    let controller = TableController::new(
        entities::schema_for(entity)?,
        Arc::new(page.lookup),
        table,
        Arc::new(sync),
        Arc::new(TerminalInteraction { assume_yes }),
    )?;
    Ok(controller.with_refresh_policy(settings.refresh_policy))
}

fn read_snapshot(path: &Path) -> Result<PageSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("snapshot '{}' is not a page snapshot", path.display()))
}

fn report(controller: &TableController, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::RowPatched { key } => {
            let row = controller
                .table()
                .snapshots()
                .into_iter()
                .find(|row| &row.key == key)
                .ok_or_else(|| anyhow!("row '{key}' vanished after saving"))?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        Outcome::RowRemoved { key } => println!("deleted {key}"),
        Outcome::ReloadRequested => println!("saved; reload the page to see the change"),
        Outcome::Cancelled => println!("cancelled"),
        Outcome::Applied => {}
    }
    Ok(())
}

fn print_schemas() -> Result<()> {
    for schema in entities::all()? {
        println!(
            "{} ({}): update {} [{}]",
            schema.entity,
            schema.entity.label(),
            schema.update_path,
            schema.update_key_param
        );
        match &schema.delete_path {
            Some(path) => {
                let encoding = match schema.delete_encoding {
                    DeleteEncoding::Json => "json",
                    DeleteEncoding::Form => "form",
                };
                println!("  delete {path} [{}] as {encoding}", schema.delete_key_param);
            }
            None => println!("  no delete"),
        }
        for field in &schema.fields {
            let kind = match &field.control {
                ControlKind::Text => "text".to_string(),
                ControlKind::Number => "number".to_string(),
                ControlKind::Date => "date".to_string(),
                ControlKind::Select { source } => format!("select {source:?}"),
                ControlKind::ReadOnly => "read-only".to_string(),
                ControlKind::Derived { from, .. } => format!("derived from {from}"),
            };
            let required = if field.required { ", required" } else { "" };
            println!("  - {} as {} ({kind}{required})", field.name, field.wire_name());
        }
    }
    Ok(())
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((field.to_string(), value.to_string()))
}
