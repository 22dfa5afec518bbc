//! Credential commands.
//!
//! The public API only supports creating and deleting credentials plus
//! fetching per-type schemas; secrets are never readable back.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use n8nctl_api::types::Credential;
use n8nctl_api::Client;

use crate::commands::{fail, read_document};

#[derive(Subcommand)]
pub enum CredentialAction {
    /// Create a credential from a JSON file
    Create {
        /// JSON file path
        file: PathBuf,
    },

    /// Delete a credential
    Delete {
        /// Credential ID
        id: String,
    },

    /// Show the expected fields for a credential type
    Schema {
        /// Credential type name (e.g. githubApi)
        type_name: String,
    },
}

pub fn cmd_credential(client: &Client, action: CredentialAction, json: bool) -> i32 {
    match action {
        CredentialAction::Create { file } => cmd_create(client, &file, json),
        CredentialAction::Delete { id } => cmd_delete(client, &id, json),
        CredentialAction::Schema { type_name } => cmd_schema(client, &type_name, json),
    }
}

fn credential_line(credential: &Credential) -> String {
    format!(
        "[{}] {} ({})",
        credential.id.as_deref().unwrap_or("-"),
        credential.name.as_deref().unwrap_or("-"),
        credential.type_name.as_deref().unwrap_or("?")
    )
}

fn cmd_create(client: &Client, file: &Path, json: bool) -> i32 {
    let document = match read_document(file) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match client.create_credential(&document) {
        Ok(credential) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&credential).unwrap());
            } else {
                println!("Created credential: {}", credential_line(&credential));
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_delete(client: &Client, id: &str, json: bool) -> i32 {
    match client.delete_credential(id) {
        Ok(_) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted credential {}", id);
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_schema(client: &Client, type_name: &str, json: bool) -> i32 {
    match client.credential_schema(type_name) {
        Ok(schema) => {
            // Schema is a raw JSON document either way
            println!("{}", serde_json::to_string_pretty(&schema).unwrap());
            0
        }
        Err(e) => fail(e, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_line() {
        let credential: Credential =
            serde_json::from_str(r#"{"id": "c1", "name": "github", "type": "githubApi"}"#).unwrap();
        assert_eq!(credential_line(&credential), "[c1] github (githubApi)");

        let bare: Credential = serde_json::from_str("{}").unwrap();
        assert_eq!(credential_line(&bare), "[-] - (?)");
    }
}
