//! Webhook commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use n8nctl_api::Client;
use serde_json::Value;

use crate::commands::{fail, read_document};

#[derive(Subcommand)]
pub enum WebhookAction {
    /// Trigger a webhook
    Trigger {
        /// Webhook path (the part after /webhook/)
        path: String,

        /// Inline JSON payload
        #[arg(short, long, conflicts_with = "file")]
        data: Option<String>,

        /// JSON payload file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Use the test webhook endpoint
        #[arg(short, long)]
        test: bool,
    },
}

pub fn cmd_webhook(client: &Client, action: WebhookAction, json: bool) -> i32 {
    match action {
        WebhookAction::Trigger {
            path,
            data,
            file,
            test,
        } => cmd_trigger(client, &path, data.as_deref(), file.as_deref(), test, json),
    }
}

fn cmd_trigger(
    client: &Client,
    path: &str,
    data: Option<&str>,
    file: Option<&Path>,
    test: bool,
    json: bool,
) -> i32 {
    let payload = match resolve_payload(data, file) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match client.trigger_webhook(path, &payload, test) {
        Ok(reply) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "status": reply.status,
                        "body": reply.body,
                    }))
                    .unwrap()
                );
            } else {
                println!("HTTP {}", reply.status);
                println!("{}", serde_json::to_string_pretty(&reply.body).unwrap());
            }
            // The reply is shown either way; the exit code tracks the status
            if (200..300).contains(&reply.status) {
                0
            } else {
                1
            }
        }
        Err(e) => fail(e, json),
    }
}

fn resolve_payload(data: Option<&str>, file: Option<&Path>) -> Result<Value, String> {
    match (data, file) {
        (Some(raw), _) => {
            serde_json::from_str(raw).map_err(|e| format!("invalid --data JSON: {}", e))
        }
        (None, Some(path)) => read_document(path),
        (None, None) => Ok(serde_json::json!({})),
    }
}
