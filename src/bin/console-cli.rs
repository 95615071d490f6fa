use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "console-cli")]
#[command(about = "Command-line client for the node console API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chain, mempool, mining and network summary
    Status,
    /// Mempool summary and txids
    Mempool,
    /// Node help text, optionally for one command
    Help { command: Option<String> },
    /// Block by height or hash
    Block { id: String },
    /// Decoded transaction
    Tx { txid: String },
    /// Loaded wallets
    Wallets,
    /// Wallets available in the wallet directory
    WalletDir,
    /// Load a wallet on the node
    Load { name: String },
    /// Unload a wallet on the node
    Unload { name: String },
    /// Show the selected wallet, or select one ("" for the default wallet)
    Use {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },
    /// Selected wallet's info
    Info,
    /// Selected wallet's balance
    Balance,
    /// Transaction history page
    History {
        #[arg(short, long, default_value_t = 0)]
        page: u32,
        #[arg(short = 's', long)]
        page_size: Option<u32>,
    },
    /// Unspent outputs
    Unspent,
    /// New receive address
    Address {
        #[arg(short = 't', long, default_value = "bech32")]
        address_type: String,
    },
    /// Send with wallet coin selection
    Send {
        address: String,
        /// BTC
        amount: f64,
        /// sat/vB
        #[arg(short, long)]
        fee_rate: f64,
        #[arg(long)]
        not_replaceable: bool,
        #[arg(long)]
        subtract_fee: bool,
    },
    /// Spend chosen outputs (txid:vout); previews unless --confirm
    SendAdvanced {
        #[arg(short, long = "input", required = true)]
        inputs: Vec<String>,
        address: String,
        /// BTC
        amount: f64,
        #[arg(long)]
        change_address: Option<String>,
        /// BTC
        #[arg(long)]
        change_amount: Option<f64>,
        #[arg(long)]
        confirm: bool,
    },
    /// Child-pays-for-parent from an unconfirmed output; previews unless --confirm
    Cpfp {
        txid: String,
        vout: u32,
        address: String,
        /// BTC
        amount: f64,
        #[arg(long)]
        confirm: bool,
    },
    /// Replace an unconfirmed transaction at a higher fee rate
    Bumpfee {
        txid: String,
        /// sat/vB
        #[arg(short, long)]
        fee_rate: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();
    let url = |path: &str| format!("{}{}", base, path);

    let request = match cli.command {
        Commands::Status => client.get(url("/api/node/status")),
        Commands::Mempool => client.get(url("/api/node/mempool")),
        Commands::Help { command } => {
            let request = client.get(url("/api/node/help"));
            match command {
                Some(command) => request.query(&[("command", command)]),
                None => request,
            }
        }
        Commands::Block { id } => match id.parse::<u64>() {
            Ok(height) => client.get(url(&format!("/api/blocks/height/{}", height))),
            Err(_) => client.get(url(&format!("/api/blocks/{}", id))),
        },
        Commands::Tx { txid } => client.get(url(&format!("/api/tx/{}", txid))),
        Commands::Wallets => client.get(url("/api/wallets")),
        Commands::WalletDir => client.get(url("/api/wallets/dir")),
        Commands::Load { name } => client.post(url(&format!("/api/wallets/{}/load", name))),
        Commands::Unload { name } => client.post(url(&format!("/api/wallets/{}/unload", name))),
        Commands::Use { name: None, clear: false } => client.get(url("/api/session")),
        Commands::Use { name, .. } => client
            .put(url("/api/session"))
            .json(&json!({ "wallet": name })),
        Commands::Info => client.get(url("/api/wallet/info")),
        Commands::Balance => client.get(url("/api/wallet/balance")),
        Commands::History { page, page_size } => {
            let request = client
                .get(url("/api/wallet/transactions"))
                .query(&[("page", page)]);
            match page_size {
                Some(size) => request.query(&[("page_size", size)]),
                None => request,
            }
        }
        Commands::Unspent => client.get(url("/api/wallet/unspent")),
        Commands::Address { address_type } => client
            .post(url("/api/wallet/addresses"))
            .json(&json!({ "address_type": address_type })),
        Commands::Send {
            address,
            amount,
            fee_rate,
            not_replaceable,
            subtract_fee,
        } => client.post(url("/api/wallet/send")).json(&json!({
            "address": address,
            "amount": amount,
            "fee_rate": fee_rate,
            "replaceable": !not_replaceable,
            "subtract_fee_from_amount": subtract_fee,
        })),
        Commands::SendAdvanced {
            inputs,
            address,
            amount,
            change_address,
            change_amount,
            confirm,
        } => {
            let inputs = inputs
                .iter()
                .map(|input| parse_outpoint(input))
                .collect::<Result<Vec<_>, _>>()?;
            let path = if confirm {
                "/api/wallet/send-advanced"
            } else {
                "/api/wallet/send-advanced/preview"
            };
            client.post(url(path)).json(&json!({
                "inputs": inputs,
                "address": address,
                "amount": amount,
                "change_address": change_address,
                "change_amount": change_amount,
            }))
        }
        Commands::Cpfp {
            txid,
            vout,
            address,
            amount,
            confirm,
        } => {
            let path = if confirm {
                "/api/wallet/cpfp"
            } else {
                "/api/wallet/cpfp/preview"
            };
            client.post(url(path)).json(&json!({
                "txid": txid,
                "vout": vout,
                "address": address,
                "amount": amount,
            }))
        }
        Commands::Bumpfee { txid, fee_rate } => client
            .post(url("/api/wallet/bumpfee"))
            .json(&json!({ "txid": txid, "fee_rate": fee_rate })),
    };

    let res = request.send().await?;
    print_response(res).await
}

fn parse_outpoint(input: &str) -> Result<Value, String> {
    let (txid, vout) = input
        .rsplit_once(':')
        .ok_or_else(|| format!("expected txid:vout, got '{}'", input))?;
    let vout: u32 = vout
        .parse()
        .map_err(|e| format!("invalid vout in '{}': {}", input, e))?;
    Ok(json!({ "txid": txid, "vout": vout }))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text)
        .map(|json| serde_json::to_string_pretty(&json))
        .unwrap_or_else(|_| Ok(text.clone()))?;

    if status.is_success() {
        println!("{}", body);
        Ok(())
    } else {
        eprintln!("Error: console API returned status {}", status);
        eprintln!("{}", body);
        std::process::exit(1);
    }
}
