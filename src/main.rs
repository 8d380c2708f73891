//! apertus-keys - inspect and manage stored Apertus keys
//!
//! Resolves the upstream target of stored keys and lists the models a
//! provider's keys serve, without calling the upstream.

#![allow(missing_docs)]

use apertus_gateway::core::providers::apertus::provider_identity;
use apertus_gateway::utils::logging::{init_logging, mask_secret};
use apertus_gateway::{
    ApertusProvider, Config, GatewayError, Key, ProviderConfig, RequestType, Result, StorageLayer,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "apertus-keys", version, about)]
struct Cli {
    /// YAML configuration file; environment variables are used when absent
    #[arg(short, long, env = "APERTUS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the configured provider under its identity
    Register,
    /// Store a key read from a JSON descriptor file
    AddKey {
        /// Path to the key descriptor
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the URL and model a request made with a stored key would use
    Resolve {
        /// Stored key identifier
        #[arg(long)]
        key_id: String,
        /// Model the caller asks for
        #[arg(long)]
        model: String,
        #[arg(long, default_value = "chat_completion")]
        request_type: RequestType,
    },
    /// List the models served by a provider's stored keys
    Models {
        /// Provider name; defaults to the configured provider's identity
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };
    init_logging(&config.logging)?;

    let storage = StorageLayer::new(&config.storage).await?;
    let db = storage.db();
    let configured_identity = provider_identity(config.provider.custom_provider_config.as_ref());

    match cli.command {
        Command::Register => {
            db.upsert_provider(&configured_identity, &config.provider)
                .await?;
            info!(provider = %configured_identity, "provider registered");
            println!("registered provider {}", configured_identity);
        }
        Command::AddKey { file } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let key: Key = serde_json::from_str(&content)?;
            let key = db.create_key(&key).await?;
            println!(
                "stored key {} ({}) for provider {}",
                key.id,
                mask_secret(&key.value),
                key.provider
            );
        }
        Command::Resolve {
            key_id,
            model,
            request_type,
        } => {
            let key = db
                .find_key_by_key_id(&key_id)
                .await?
                .ok_or_else(|| GatewayError::not_found(format!("key '{}' not found", key_id)))?;
            let provider = provider_for(&storage, &config, &key.provider).await?;
            println!("url:   {}", provider.request_url(&key, request_type));
            println!("model: {}", provider.outgoing_model(&key, &model));
        }
        Command::Models { provider } => {
            let name = provider.unwrap_or(configured_identity);
            let keys = db.list_keys_by_provider(&name).await?;
            let listing = provider_for(&storage, &config, &name)
                .await?
                .list_models(&keys)?;
            for model in listing.data {
                println!("{}", model.id);
            }
        }
    }

    Ok(())
}

/// Stored configuration for `name`, falling back to the loaded one
async fn provider_for(storage: &StorageLayer, config: &Config, name: &str) -> Result<ApertusProvider> {
    let provider_config: ProviderConfig = match storage.db().find_provider_by_name(name).await? {
        Some(stored) => stored,
        None => config.provider.clone(),
    };
    Ok(ApertusProvider::new(provider_config)?)
}
