//! Tag commands.

use clap::Subcommand;
use n8nctl_api::types::Tag;
use n8nctl_api::Client;

use crate::commands::fail;

#[derive(Subcommand)]
pub enum TagAction {
    /// List tags
    List {
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: u32,
    },

    /// Show a tag
    Get {
        /// Tag ID
        id: String,
    },

    /// Create a tag
    Create {
        /// Tag name
        name: String,
    },

    /// Rename a tag
    Rename {
        /// Tag ID
        id: String,
        /// New name
        name: String,
    },

    /// Delete a tag
    Delete {
        /// Tag ID
        id: String,
    },
}

pub fn cmd_tag(client: &Client, action: TagAction, json: bool) -> i32 {
    match action {
        TagAction::List { limit } => cmd_list(client, limit, json),
        TagAction::Get { id } => one(client.get_tag(&id), json),
        TagAction::Create { name } => one(client.create_tag(&name), json),
        TagAction::Rename { id, name } => one(client.rename_tag(&id, &name), json),
        TagAction::Delete { id } => cmd_delete(client, &id, json),
    }
}

fn tag_line(tag: &Tag) -> String {
    format!("[{}] {}", tag.id.as_deref().unwrap_or("-"), tag.name)
}

fn cmd_list(client: &Client, limit: u32, json: bool) -> i32 {
    match client.list_tags(Some(limit)) {
        Ok(page) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&page.data).unwrap());
            } else {
                for tag in &page.data {
                    println!("{}", tag_line(tag));
                }
                println!("\nTotal: {} tags", page.data.len());
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn cmd_delete(client: &Client, id: &str, json: bool) -> i32 {
    match client.delete_tag(id) {
        Ok(_) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted tag {}", id);
            }
            0
        }
        Err(e) => fail(e, json),
    }
}

fn one(result: n8nctl_api::Result<Tag>, json: bool) -> i32 {
    match result {
        Ok(tag) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&tag).unwrap());
            } else {
                println!("{}", tag_line(&tag));
            }
            0
        }
        Err(e) => fail(e, json),
    }
}
