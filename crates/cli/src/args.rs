use std::path::PathBuf;

use alloy::primitives::{Address, B256, U256};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dca_sdk::query::OrderQuery;

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "http://127.0.0.1:8545";

#[derive(Parser, Debug)]
#[command(name = "dca-cli", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RPC endpoint to connect to
    #[arg(long, global = true, env = "DCA_RPC_URL", default_value_t = DEFAULT_RPC_PROVIDER.to_string())]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: none]
    #[arg(long, global = true)]
    pub rpc_throttle: Option<u32>,

    /// Private key to submit and cancel orders with
    #[arg(long, global = true, env = "DCA_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<B256>,

    /// Account to show orders of [default: address of `--private-key`]
    #[arg(long, global = true)]
    pub account: Option<Address>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Expected chain ID, the command fails if the RPC endpoint serves a
    /// different chain
    #[arg(long, global = true)]
    pub chain: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote the minimum return of a single trade
    Quote {
        /// Token to sell, `0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE` for ETH
        #[arg(long)]
        in_token: Address,

        /// Token to buy
        #[arg(long)]
        out_token: Address,

        /// Amount to sell, in token units (e.g. `1.5`)
        #[arg(long)]
        amount: String,

        /// Slippage tolerance, bps [default: from config]
        #[arg(long)]
        slippage: Option<u64>,
    },
    /// Build an order submission without sending it
    Payload {
        #[command(flatten)]
        order: OrderArgs,
    },
    /// Submit an order and wait for it to be mined
    Place {
        #[command(flatten)]
        order: OrderArgs,

        /// Gas price, gwei [default: current network gas price]
        #[arg(long)]
        gas_price: Option<u64>,
    },
    /// Cancel a submitted order
    Cancel {
        /// Task ID of the order
        #[arg(long)]
        id: U256,

        /// On-chain order cycle as returned by the indexer (`cycleWrapper.cycle`)
        #[arg(long)]
        cycle_json: String,

        /// Print the cancellation transaction instead of sending it
        #[arg(long, default_value_t = false)]
        payload_only: bool,

        /// Gas price, gwei [default: current network gas price]
        #[arg(long)]
        gas_price: Option<u64>,
    },
    /// Show indexed orders
    Orders {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
    },
    /// Show orders saved locally on submission
    Saved,
    /// Generate a one-time witness and secret
    Witness,
    /// Show tokens accepted on the chain
    Tokens,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Token to sell, `0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE` for ETH
    #[arg(long)]
    pub in_token: Address,

    /// Token to buy
    #[arg(long)]
    pub out_token: Address,

    /// Amount sold per trade, in token units (e.g. `1.5`)
    #[arg(long)]
    pub amount_per_trade: String,

    #[arg(long)]
    pub num_trades: u64,

    /// Delay between trades, seconds
    #[arg(long)]
    pub delay: u64,

    /// Minimum slippage of the trades, bps
    #[arg(long, default_value_t = 50)]
    pub min_slippage: u64,

    /// Maximum slippage of the trades, bps
    #[arg(long, default_value_t = 1000)]
    pub max_slippage: u64,

    #[arg(long, default_value_t = Address::ZERO)]
    pub platform_wallet: Address,

    #[arg(long, default_value_t = 0)]
    pub platform_fee_bps: u64,

    /// Slippage tolerance of the first trade, bps [default: from config]
    #[arg(long)]
    pub slippage: Option<u64>,

    /// Warn when a single trade is worth less than this much ETH
    #[arg(long)]
    pub min_trade_eth: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    All,
    Open,
    Past,
    Executed,
    Cancelled,
}

impl From<StatusFilter> for OrderQuery {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => OrderQuery::All,
            StatusFilter::Open => OrderQuery::Open,
            StatusFilter::Past => OrderQuery::Past,
            StatusFilter::Executed => OrderQuery::Executed,
            StatusFilter::Cancelled => OrderQuery::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() { Cli::command().debug_assert(); }

    #[test]
    fn test_parse_cancel() {
        let cli = Cli::try_parse_from([
            "dca-cli",
            "cancel",
            "--id",
            "7",
            "--cycle-json",
            "{}",
            "--payload-only",
            "--chain",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.chain, Some(3));
        assert!(matches!(
            cli.command,
            Commands::Cancel { id, payload_only: true, .. } if id == U256::from(7)
        ));
    }

    #[test]
    fn test_parse_orders_status() {
        let cli = Cli::try_parse_from(["dca-cli", "orders", "--status", "open"]).unwrap();
        let Commands::Orders { status } = cli.command else { panic!("expected orders command") };
        assert_eq!(OrderQuery::from(status), OrderQuery::Open);
    }
}
