use clap::{Parser, Subcommand};
use n8nctl_api::config::{Config, Overrides};
use std::path::PathBuf;

mod commands;
mod format;

#[derive(Parser)]
#[command(name = "n8nctl")]
#[command(about = "CLI client for the n8n REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// n8n instance URL (default: http://localhost:5678)
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key (falls back to N8N_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Config file path (default: ~/.config/n8nctl/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workflows
    Workflow {
        #[command(subcommand)]
        action: commands::workflow::WorkflowAction,
    },

    /// Inspect and manage executions
    Execution {
        #[command(subcommand)]
        action: commands::execution::ExecutionAction,
    },

    /// Trigger webhooks
    Webhook {
        #[command(subcommand)]
        action: commands::webhook::WebhookAction,
    },

    /// Manage credentials
    Credential {
        #[command(subcommand)]
        action: commands::credential::CredentialAction,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: commands::tag::TagAction,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let overrides = Overrides {
        url: cli.url,
        api_key: cli.api_key,
        config_path: cli.config,
    };
    let config = match Config::resolve(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let client = n8nctl_api::Client::new(&config);

    let exit_code = match cli.command {
        Commands::Workflow { action } => commands::workflow::cmd_workflow(&client, action, cli.json),
        Commands::Execution { action } => {
            commands::execution::cmd_execution(&client, action, cli.json)
        }
        Commands::Webhook { action } => commands::webhook::cmd_webhook(&client, action, cli.json),
        Commands::Credential { action } => {
            commands::credential::cmd_credential(&client, action, cli.json)
        }
        Commands::Tag { action } => commands::tag::cmd_tag(&client, action, cli.json),
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
