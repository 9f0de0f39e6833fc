//! b2c-guest - command-line front end for the B2C guest-user client.

#![deny(clippy::all)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use b2c_guest::{
    AzureError, AzureModel, Config, CredentialProvider, GraphServiceClient, TokenProvider,
    UserManagement,
};

#[derive(Parser)]
#[command(name = "b2c-guest", version, about = "Provision Azure AD B2C guest users")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a guest user that signs in with its email address
    CreateUser {
        #[arg(long)]
        email: String,
        /// Initial password; prefer the B2C_GUEST_PASSWORD environment variable
        #[arg(long, env = "B2C_GUEST_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Acquire an access token and report its expiry
    Token,
    /// Fetch a user by object ID
    GetUser { id: String },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        // .env file is optional - only log if it's not a "file not found" error
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            eprintln!("\nPlease set the following environment variables:");
            eprintln!("  AZURE_HOST=<tenant>.onmicrosoft.com");
            eprintln!("  AZURE_CLIENT_ID=<your-azure-ad-client-id>");
            eprintln!("  AZURE_CLIENT_SECRET=<your-client-secret>");
            eprintln!("  AZURE_TENANT_ID=<your-tenant-id>");
            eprintln!("  AZURE_AUTHORITY_URL=https://login.microsoftonline.com/<tenant-id>");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level);
    info!("Starting {} v{}", config.app.name, env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli.command, &config).await {
        match e.downcast_ref::<AzureError>() {
            Some(azure_error) => {
                error!("{:#}", e);
                eprintln!("{}", azure_error.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let credentials = Arc::new(config.credentials());

    match command {
        Command::CreateUser {
            email,
            password,
            first_name,
            last_name,
        } => {
            let model = AzureModel::new(credentials, &config.http)?;
            let user = model
                .create_user(&email, &password, &first_name, &last_name)
                .await
                .context("Failed to create guest user")?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Token => {
            let provider = CredentialProvider::new(credentials, &config.http)?;
            let token = provider.acquire_token().await?;
            // Never print the token itself
            println!(
                "Token acquired ({} chars), expires at {}",
                token.secret().len(),
                token.expires_at().to_rfc3339()
            );
        }
        Command::GetUser { id } => {
            let client = GraphServiceClient::initialize(credentials, &config.api, &config.http)?;
            let user = client.get_user(&id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }

    Ok(())
}
