#[cfg(feature = "display")]
mod display;
mod indexed;
mod local;

use alloy::primitives::{Address, B256, Bytes, U256};
#[cfg(feature = "display")]
pub use display::*;
pub use indexed::*;
pub use local::LocalOrder;

use crate::abi::dca::GelatoDca;

/// DEX the order trades on, `uint8 _protocol` of `submitAndExec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Protocol {
    Kyber = 0,
    Uni = 1,
    Sushi = 2,
}

impl From<Protocol> for u8 {
    fn from(value: Protocol) -> Self { value as u8 }
}

/// Unsubmitted DCA order.
///
/// `amount_per_trade` is in the input token's native unit, `delay` is in
/// seconds, fee and slippage bounds are in basis points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSubmission {
    in_token: Address,
    out_token: Address,
    amount_per_trade: U256,
    num_trades: U256,
    delay: U256,
    platform_wallet: Address,
    platform_fee_bps: U256,
    min_slippage: U256,
    max_slippage: U256,
}

impl OrderSubmission {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        in_token: Address,
        out_token: Address,
        amount_per_trade: U256,
        num_trades: U256,
        delay: U256,
        platform_wallet: Address,
        platform_fee_bps: U256,
        min_slippage: U256,
        max_slippage: U256,
    ) -> Self {
        Self {
            in_token,
            out_token,
            amount_per_trade,
            num_trades,
            delay,
            platform_wallet,
            platform_fee_bps,
            min_slippage,
            max_slippage,
        }
    }

    pub fn in_token(&self) -> Address { self.in_token }

    pub fn out_token(&self) -> Address { self.out_token }

    pub fn amount_per_trade(&self) -> U256 { self.amount_per_trade }

    pub fn num_trades(&self) -> U256 { self.num_trades }

    pub fn delay(&self) -> U256 { self.delay }

    pub fn platform_wallet(&self) -> Address { self.platform_wallet }

    pub fn platform_fee_bps(&self) -> U256 { self.platform_fee_bps }

    pub fn min_slippage(&self) -> U256 { self.min_slippage }

    pub fn max_slippage(&self) -> U256 { self.max_slippage }

    /// Total input amount over all trades, `None` on overflow.
    pub fn total_amount(&self) -> Option<U256> {
        self.amount_per_trade.checked_mul(self.num_trades)
    }
}

impl From<&OrderSubmission> for GelatoDca::SubmitOrder {
    fn from(order: &OrderSubmission) -> Self {
        Self {
            inToken: order.in_token,
            outToken: order.out_token,
            amountPerTrade: order.amount_per_trade,
            numTrades: order.num_trades,
            minSlippage: order.min_slippage,
            maxSlippage: order.max_slippage,
            delay: order.delay,
            platformWallet: order.platform_wallet,
            platformFeeBps: order.platform_fee_bps,
        }
    }
}

/// One-time authorization keypair of a submitted order.
///
/// Whoever knows the `secret` can trigger execution of the order, so a
/// fresh pair must be generated for every submission, see
/// [`crate::witness::generate`].
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct WitnessAndSecret {
    #[debug("<redacted>")]
    pub secret: B256,
    pub witness: Address,
}

/// Unsigned transaction ready to be signed and sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionData {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
}

/// Order submission transaction together with its authorization keypair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDataWithSecret {
    pub tx_data: TransactionData,
    pub witness_and_secret: WitnessAndSecret,
}

impl TransactionDataWithSecret {
    pub fn secret(&self) -> B256 { self.witness_and_secret.secret }

    pub fn witness(&self) -> Address { self.witness_and_secret.witness }
}

/// On-chain state of a submitted order, argument of `cancel`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderCycle {
    pub user: Address,
    pub in_token: Address,
    pub out_token: Address,
    pub amount_per_trade: U256,
    pub n_trades_left: U256,
    pub min_slippage: U256,
    pub max_slippage: U256,
    pub delay: U256,
    pub last_execution_time: U256,
    pub platform_wallet: Address,
    pub platform_fee_bps: U256,
}

impl From<&OrderCycle> for GelatoDca::ExecOrder {
    fn from(cycle: &OrderCycle) -> Self {
        Self {
            user: cycle.user,
            inToken: cycle.in_token,
            outToken: cycle.out_token,
            amountPerTrade: cycle.amount_per_trade,
            nTradesLeft: cycle.n_trades_left,
            minSlippage: cycle.min_slippage,
            maxSlippage: cycle.max_slippage,
            delay: cycle.delay,
            lastExecutionTime: cycle.last_execution_time,
            platformWallet: cycle.platform_wallet,
            platformFeeBps: cycle.platform_fee_bps,
        }
    }
}

impl From<GelatoDca::ExecOrder> for OrderCycle {
    fn from(order: GelatoDca::ExecOrder) -> Self {
        Self {
            user: order.user,
            in_token: order.inToken,
            out_token: order.outToken,
            amount_per_trade: order.amountPerTrade,
            n_trades_left: order.nTradesLeft,
            min_slippage: order.minSlippage,
            max_slippage: order.maxSlippage,
            delay: order.delay,
            last_execution_time: order.lastExecutionTime,
            platform_wallet: order.platformWallet,
            platform_fee_bps: order.platformFeeBps,
        }
    }
}

impl From<&indexed::Cycle> for OrderCycle {
    fn from(cycle: &indexed::Cycle) -> Self {
        Self {
            user: cycle.user,
            in_token: cycle.in_token,
            out_token: cycle.out_token,
            amount_per_trade: cycle.amount_per_trade,
            n_trades_left: cycle.n_trades_left,
            min_slippage: cycle.min_slippage,
            max_slippage: cycle.max_slippage,
            delay: cycle.delay,
            last_execution_time: U256::from(cycle.last_execution_time),
            platform_wallet: cycle.platform_wallet,
            platform_fee_bps: cycle.platform_fee_bps,
        }
    }
}
