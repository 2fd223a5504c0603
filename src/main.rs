use std::fs;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tinychain_node::config::Config;
use tinychain_node::crypto::{address, hash, keypair};
use tinychain_node::node::coordinator::Coordinator;
use tinychain_node::node::gateway::HttpGateway;
use tinychain_node::web::WebServer;
use tinychain_node::Result;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const WALLET_FILE: &str = "wallet.json";

#[derive(Debug, Parser)]
#[command(name = "tinychain-node")]
struct Opt {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "create-wallet", about = "Generate a new keypair and address")]
    CreateWallet,
    #[command(name = "list-addresses", about = "List locally stored wallet addresses")]
    ListAddresses,
    #[command(name = "print-chain", about = "Fetch and print a running node's chain")]
    PrintChain {
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        node: String,
    },
    #[command(name = "start-node", about = "Start a blockchain node")]
    StartNode {
        #[arg(long, default_value_t = 5000)]
        port: u16,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long)]
        mining_address: Option<String>,
    },
}

fn initialize_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

#[derive(serde::Serialize, serde::Deserialize, Default)]
struct WalletFile {
    entries: Vec<WalletEntry>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WalletEntry {
    address: String,
    pkcs8_hex: String,
}

fn load_wallet_file() -> WalletFile {
    fs::read_to_string(WALLET_FILE)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn save_wallet_file(wallet: &WalletFile) -> Result<()> {
    let raw = serde_json::to_string_pretty(wallet)
        .map_err(|e| tinychain_node::NodeError::SerializationError(e.to_string()))?;
    fs::write(WALLET_FILE, raw).map_err(|e| tinychain_node::NodeError::SerializationError(e.to_string()))
}

/// Generates a keypair, derives its address, and appends it to the local
/// wallet file — the minimal collaborator surface the node exposes addresses
/// through (the full wallet UI is out of scope, per spec Non-goals).
fn create_wallet() -> Result<String> {
    let pkcs8 = keypair::new_key_pair()?;
    let public_key = keypair::public_key_from_pkcs8(&pkcs8)?;
    let xy = keypair::public_key_xy(&public_key)?;
    let addr = address::address_from_public_key(&xy);

    let mut wallet = load_wallet_file();
    wallet.entries.push(WalletEntry {
        address: addr.clone(),
        pkcs8_hex: hash::to_hex(&pkcs8),
    });
    save_wallet_file(&wallet)?;

    Ok(addr)
}

fn list_addresses() -> Result<()> {
    let wallet = load_wallet_file();
    for entry in &wallet.entries {
        info!("{}", entry.address);
    }
    Ok(())
}

async fn print_chain(node: String) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/", node.trim_end_matches('/')))
        .send()
        .await
        .map_err(|e| tinychain_node::NodeError::PeerUnreachable(e.to_string()))?;
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| tinychain_node::NodeError::SerializationError(e.to_string()))?;

    if let Some(chain) = body.get("chain").and_then(|c| c.as_array()) {
        for block in chain {
            info!("block #{}: {}", block.get("number").unwrap_or(&serde_json::Value::Null), block);
        }
    }
    Ok(())
}

async fn start_node(host: String, port: u16, mining_address: Option<String>) -> Result<()> {
    let node_address = match mining_address {
        Some(addr) => addr,
        None => create_wallet()?,
    };

    let config = Config::new(host.clone(), port, node_address)?;
    info!(port = config.port, difficulty = config.difficulty, address = %config.node_address, "starting node");

    let gateway = Arc::new(HttpGateway::new(
        config.host.clone(),
        config.port,
        config.neighbor_ip_range,
        config.neighbor_port_range,
    ));

    let discovery_task = gateway.clone().spawn_discovery_loop();
    let (coordinator, miner_task, broadcast_task) = Coordinator::start(
        config.difficulty,
        config.miner_reward_sender.clone(),
        config.node_address.clone(),
        gateway,
    )
    .await;

    let state = Arc::new(coordinator);
    let web_server = WebServer::new(state, config.port);

    tokio::select! {
        result = web_server.start_with_shutdown() => {
            if let Err(e) = result {
                error!("web server error: {}", e);
            }
        }
        _ = miner_task => {
            info!("miner task stopped");
        }
        _ = broadcast_task => {
            info!("broadcast task stopped");
        }
        _ = discovery_task => {
            info!("discovery task stopped");
        }
    }

    Ok(())
}

async fn process_command(command: Command) -> Result<()> {
    match command {
        Command::CreateWallet => create_wallet().map(|addr| info!("new address: {}", addr)),
        Command::ListAddresses => list_addresses(),
        Command::PrintChain { node } => print_chain(node).await,
        Command::StartNode { port, host, mining_address } => start_node(host, port, mining_address).await,
    }
}

#[tokio::main]
async fn main() {
    initialize_logging();

    let opt = Opt::parse();
    if let Err(e) = process_command(opt.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
