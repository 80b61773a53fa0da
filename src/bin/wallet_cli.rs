//! CLI for wallet verification
//!
//! Generates keys, signs and recovers challenge messages offline, and runs the
//! full client flow against a verification endpoint with a key-file wallet.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secp256k1::SecretKey;
use serde_json::json;

use wallet_verify::client::{HttpTransport, LocalWallet, VerificationFlow, WalletAgent};
use wallet_verify::config::AppConfig;
use wallet_verify::crypto::SignatureManager;
use wallet_verify::protocol::challenge_message;

#[derive(Parser)]
#[command(name = "wallet-cli")]
#[command(about = "Sign and verify wallet ownership challenges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new secret key file
    Generate {
        /// Output file for the hex-encoded secret key
        #[arg(short, long, default_value = "./wallet.key")]
        output: PathBuf,
    },
    /// Print the challenge message for an address
    Challenge {
        #[arg(short, long)]
        address: String,

        #[arg(long)]
        protocol: Option<String>,
    },
    /// Sign a message with a key file
    Sign {
        /// Secret key file path
        #[arg(short, long)]
        key: PathBuf,

        /// Message to sign (defaults to the challenge for the key's address)
        #[arg(short, long)]
        message: Option<String>,

        #[arg(long)]
        protocol: Option<String>,
    },
    /// Recover the signer of a message
    Recover {
        #[arg(short, long)]
        message: String,

        #[arg(short, long)]
        signature: String,

        /// Claimed address to compare against
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Run the full verification flow against an endpoint
    Verify {
        /// Secret key file path
        #[arg(short, long)]
        key: PathBuf,

        /// Verification endpoint URL (defaults to VERIFY_ENDPOINT)
        #[arg(short, long)]
        endpoint: Option<String>,

        #[arg(long)]
        protocol: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate { output } => generate_key(&output)?,
        Commands::Challenge { address, protocol } => {
            let protocol = protocol.unwrap_or(config.protocol_name);
            println!("{}", challenge_message(&protocol, &address));
        }
        Commands::Sign {
            key,
            message,
            protocol,
        } => {
            let protocol = protocol.unwrap_or(config.protocol_name);
            sign(&key, message, &protocol)?;
        }
        Commands::Recover {
            message,
            signature,
            address,
        } => recover(&message, &signature, address.as_deref())?,
        Commands::Verify {
            key,
            endpoint,
            protocol,
        } => {
            let endpoint = endpoint.unwrap_or(config.verify_endpoint);
            let protocol = protocol.unwrap_or(config.protocol_name);
            verify(&key, &endpoint, &protocol).await?;
        }
    }

    Ok(())
}

fn load_key(path: &Path) -> Result<SecretKey> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file {}", path.display()))?;
    let hex_key = contents.trim();
    let hex_key = hex_key.strip_prefix("0x").unwrap_or(hex_key);
    SecretKey::from_str(hex_key).with_context(|| format!("Invalid secret key in {}", path.display()))
}

fn generate_key(output: &Path) -> Result<()> {
    if output.exists() {
        bail!("Refusing to overwrite existing key file {}", output.display());
    }

    let manager = SignatureManager::new();
    let (secret_key, address) = manager.generate_keypair();

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, secret_key.display_secret().to_string())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Key written to {}", output.display());
    println!("Address: {}", address.to_checksum());
    Ok(())
}

fn sign(key: &Path, message: Option<String>, protocol: &str) -> Result<()> {
    let manager = SignatureManager::new();
    let secret_key = load_key(key)?;
    let address = manager.address_from_secret(&secret_key);

    let message = message.unwrap_or_else(|| challenge_message(protocol, &address.to_checksum()));
    let signature = manager.sign_personal_message(&message, &secret_key)?;

    let output = json!({
        "address": address.to_checksum(),
        "message": message,
        "signature": signature,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn recover(message: &str, signature: &str, claimed: Option<&str>) -> Result<()> {
    let manager = SignatureManager::new();
    let recovered = manager.recover_signer(message, signature)?;

    println!("Recovered: {}", recovered.to_checksum());
    if let Some(claimed) = claimed {
        if recovered.matches(claimed) {
            println!("Matches claimed address {}", claimed);
        } else {
            bail!("Signature was made by {}, not {}", recovered, claimed);
        }
    }
    Ok(())
}

async fn verify(key: &Path, endpoint: &str, protocol: &str) -> Result<()> {
    let wallet = LocalWallet::new(load_key(key)?);
    println!("Wallet: {}", wallet.address().to_checksum());
    println!("Endpoint: {}", endpoint);

    let agent: Arc<dyn WalletAgent> = Arc::new(wallet);
    let mut flow = VerificationFlow::new(
        Some(agent),
        Arc::new(HttpTransport::new(endpoint)),
        protocol,
    );

    let result = flow.verify().await;
    for status in flow.history() {
        println!("  {}", status.label());
    }

    match result {
        Ok(address) => {
            println!("Wallet verified: {}", address);
            Ok(())
        }
        Err(err) => bail!("Verification failed: {}", err),
    }
}
