//! Workflow commands - CRUD, activation, export, tags.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use n8nctl_api::{Client, WorkflowFilter};
use serde_json::Value;

use crate::commands::{fail, read_document};
use crate::format;

#[derive(Subcommand)]
pub enum WorkflowAction {
    /// List workflows
    List {
        /// Only active workflows
        #[arg(long)]
        active: bool,

        /// Filter by tag name
        #[arg(long)]
        tag: Option<String>,

        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: u32,
    },

    /// Show a workflow
    Get {
        /// Workflow ID
        id: String,
    },

    /// Create a workflow from a JSON file
    Create {
        /// JSON file path
        file: PathBuf,
    },

    /// Update a workflow from a JSON file
    Update {
        /// Workflow ID
        id: String,
        /// JSON file path
        file: PathBuf,
    },

    /// Delete a workflow
    Delete {
        /// Workflow ID
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Activate a workflow
    Activate {
        /// Workflow ID
        id: String,
    },

    /// Deactivate a workflow
    Deactivate {
        /// Workflow ID
        id: String,
    },

    /// Export a workflow to a JSON file
    Export {
        /// Workflow ID
        id: String,
        /// Output path (default: workflow-<id>.json)
        output: Option<PathBuf>,
    },

    /// Show or replace the tags on a workflow
    Tags {
        /// Workflow ID
        id: String,
        /// Replace tags with this comma-separated list of tag IDs
        #[arg(long, value_delimiter = ',')]
        set: Option<Vec<String>>,
    },
}

pub fn cmd_workflow(client: &Client, action: WorkflowAction, json: bool) -> i32 {
    match action {
        WorkflowAction::List { active, tag, limit } => cmd_list(client, active, tag, limit, json),
        WorkflowAction::Get { id } => cmd_get(client, &id, json),
        WorkflowAction::Create { file } => cmd_create(client, &file, json),
        WorkflowAction::Update { id, file } => cmd_update(client, &id, &file, json),
        WorkflowAction::Delete { id, force } => cmd_delete(client, &id, force, json),
        WorkflowAction::Activate { id } => cmd_set_active(client, &id, true, json),
        WorkflowAction::Deactivate { id } => cmd_set_active(client, &id, false, json),
        WorkflowAction::Export { id, output } => cmd_export(client, &id, output.as_deref(), json),
        WorkflowAction::Tags { id, set } => cmd_tags(client, &id, set, json),
    }
}

fn cmd_list(client: &Client, active: bool, tag: Option<String>, limit: u32, json: bool) -> i32 {
    let filter = WorkflowFilter {
        active: active.then_some(true),
        tags: tag,
        limit: Some(limit),
        ..Default::default()
    };

    match client.list_workflows(&filter) {
        Ok(page) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&page.data).unwrap());
            } else {
                for workflow in &page.data {
                    println!("{}", format::workflow_line(workflow));
                }
                println!("\nTotal: {} workflows", page.data.len());
                if page.next_cursor.is_some() {
                    eprintln!("(more available, raise --limit)");
                }
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_get(client: &Client, id: &str, json: bool) -> i32 {
    match client.get_workflow(id) {
        Ok(workflow) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&workflow).unwrap());
            } else {
                println!("{}", format::workflow_line(&workflow));
                println!("\nNodes ({}):", workflow.nodes.len());
                for node in &workflow.nodes {
                    let name = node.get("name").and_then(Value::as_str).unwrap_or("?");
                    let kind = node.get("type").and_then(Value::as_str).unwrap_or("?");
                    println!("  - {} ({})", name, kind);
                }
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_create(client: &Client, file: &Path, json: bool) -> i32 {
    let document = match read_document(file) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match client.create_workflow(&document) {
        Ok(workflow) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&workflow).unwrap());
            } else {
                println!("Created workflow: {}", format::workflow_line(&workflow));
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_update(client: &Client, id: &str, file: &Path, json: bool) -> i32 {
    let document = match read_document(file) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match client.update_workflow(id, &document) {
        Ok(workflow) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&workflow).unwrap());
            } else {
                println!("Updated workflow: {}", format::workflow_line(&workflow));
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_delete(client: &Client, id: &str, force: bool, json: bool) -> i32 {
    if !force && !confirm(&format!("Delete workflow {}? [y/N] ", id)) {
        println!("Cancelled");
        return 0;
    }

    match client.delete_workflow(id) {
        Ok(_) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted workflow {}", id);
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_set_active(client: &Client, id: &str, active: bool, json: bool) -> i32 {
    match client.set_active(id, active) {
        Ok(workflow) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&workflow).unwrap());
            } else {
                let verb = if active { "Activated" } else { "Deactivated" };
                println!("{}: {}", verb, format::workflow_line(&workflow));
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_export(client: &Client, id: &str, output: Option<&Path>, json: bool) -> i32 {
    let workflow = match client.get_workflow(id) {
        Ok(workflow) => workflow,
        Err(e) => return fail(e, json),
    };

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("workflow-{}.json", id)));
    let pretty = serde_json::to_string_pretty(&workflow).unwrap();

    if let Err(e) = std::fs::write(&path, pretty) {
        eprintln!("Error writing {}: {}", path.display(), e);
        return 1;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": id, "path": path.display().to_string() })
        );
    } else {
        println!("Exported to {}", path.display());
    }
    0
}

fn cmd_tags(client: &Client, id: &str, set: Option<Vec<String>>, json: bool) -> i32 {
    let result = match set {
        Some(tag_ids) => client.set_workflow_tags(id, &tag_ids),
        None => client.workflow_tags(id),
    };

    match result {
        Ok(tags) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&tags).unwrap());
            } else if tags.is_empty() {
                println!("No tags");
            } else {
                for tag in &tags {
                    println!("[{}] {}", tag.id.as_deref().unwrap_or("-"), tag.name);
                }
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y")
}
