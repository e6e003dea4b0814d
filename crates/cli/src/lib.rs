pub mod args;
mod cancel;
mod order;
mod orders;
mod quote;
mod tokens;
mod witness;

use std::{path::PathBuf, time::Duration};

use alloy::{
    network::EthereumWallet,
    primitives::{
        Address, U256,
        utils::{format_units, parse_units},
    },
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use args::Cli;
use dca_sdk::{
    Chain,
    address::{is_native, token_metadata},
    cache::OrderCache,
    client::DcaClient,
    config::DcaConfig,
    storage::FileStorage,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::args::Commands;

const DEFAULT_STORAGE_PATH: &str = ".dca";

/// Installs the log subscriber, `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => DcaConfig::from_file(path).context("loading config")?,
        None => DcaConfig::default(),
    };

    // Needs no connection
    if let Commands::Witness = cli.command {
        return witness::render();
    }

    let signer = cli
        .private_key
        .map(|key| PrivateKeySigner::from_bytes(&key))
        .transpose()
        .context("invalid private key")?;
    let account = cli.account.or(signer.as_ref().map(|s| s.address()));

    let client = if let Some(throttle) = cli.rpc_throttle {
        RpcClient::builder()
            .layer(ThrottleLayer::new(throttle))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    };
    client.set_poll_interval(Duration::from_millis(500));
    let provider = match signer {
        Some(signer) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased(),
        None => ProviderBuilder::new().connect_client(client).erased(),
    };

    let chain_id = provider.get_chain_id().await.context("fetching chain ID")?;
    if let Some(expected) = cli.chain.filter(|expected| *expected != chain_id) {
        return Err(anyhow::anyhow!("RPC endpoint serves chain {chain_id}, expected {expected}"));
    }
    let chain = Chain::from_chain_id(chain_id)?;
    debug!(chain_id, name = chain.name(), ?account, "connected");

    let storage_path =
        config.storage_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));
    let cache = OrderCache::new(Box::new(FileStorage::new(storage_path)));

    let mut dca = DcaClient::new(chain, provider).with_config(config);
    if let Some(account) = account {
        dca = dca.with_account(account);
    }

    match cli.command {
        Commands::Quote { in_token, out_token, amount, slippage } => {
            quote::render(&dca, in_token, out_token, &amount, slippage).await?
        },
        Commands::Payload { order } => order::payload(&dca, &order).await?,
        Commands::Place { order, gas_price } => {
            order::place(&dca, &cache, &order, gas_price).await?
        },
        Commands::Cancel { id, cycle_json, payload_only, gas_price } => {
            cancel::run(&dca, id, &cycle_json, payload_only, gas_price).await?
        },
        Commands::Orders { status } => {
            orders::render_indexed(&dca, require_account(account)?, status.into()).await?
        },
        Commands::Saved => orders::render_saved(&dca, &cache, require_account(account)?).await?,
        Commands::Tokens => tokens::render(&dca),
        Commands::Witness => witness::render()?,
    }

    Ok(())
}

fn require_account(account: Option<Address>) -> anyhow::Result<Address> {
    account.ok_or_else(|| anyhow::anyhow!("no account provided, see `--account` or `--private-key`"))
}

/// Decimals of the token, from the token list when possible.
pub(crate) async fn token_decimals<P: Provider>(
    dca: &DcaClient<P>,
    token: Address,
) -> anyhow::Result<u8> {
    if is_native(token) {
        return Ok(18);
    }
    if let Some(entry) =
        dca.token_list().for_chain(dca.chain().chain_id()).find(|t| t.address == token)
    {
        return Ok(entry.decimals);
    }
    let metadata = token_metadata(dca.provider(), token, dca.token_overrides())
        .await
        .with_context(|| format!("reading metadata of {token}"))?;
    Ok(metadata.decimals)
}

pub(crate) fn parse_amount(amount: &str, decimals: u8) -> anyhow::Result<U256> {
    Ok(parse_units(amount, decimals)
        .with_context(|| format!("invalid amount: {amount}"))?
        .get_absolute())
}

pub(crate) fn format_amount(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

/// Gas price in wei, `gwei` if provided, network gas price otherwise.
pub(crate) async fn gas_price<P: Provider>(
    dca: &DcaClient<P>,
    gwei: Option<u64>,
) -> anyhow::Result<u128> {
    match gwei {
        Some(gwei) => Ok(u128::from(gwei) * 1_000_000_000),
        None => Ok(dca.provider().get_gas_price().await.context("fetching gas price")?),
    }
}
