//! Order submission and cancellation.

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, U256},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::{Log, TransactionRequest},
    sol_types::{SolCall, SolEvent},
};
use alloy_sol_types::{SolType, sol_data};
use tracing::{debug, info, warn};

use crate::{
    Chain,
    abi::dca::GelatoDca,
    address::{NATIVE_TOKEN, TokenOverrides, allowance, is_native},
    config::DcaConfig,
    error::{DcaError, TokenSide},
    quote::{self, Quote},
    token_list::TokenList,
    types::{
        OrderCycle, OrderSubmission, Protocol, TransactionData, TransactionDataWithSecret,
        WitnessAndSecret,
    },
    witness,
};

/// Parameters of `submitAndExec` as sent on the wire: the declared
/// `(order, protocol, minReturn, tradePath)` followed by the
/// `(secret, witness)` pair.
pub type SubmitAndExecParams = (
    GelatoDca::SubmitOrder,
    sol_data::Uint<8>,
    sol_data::Uint<256>,
    sol_data::Array<sol_data::Address>,
    sol_data::FixedBytes<32>,
    sol_data::Address,
);

/// Encoded `submitAndExec` call with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitTxData {
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
    /// Quote the minimum return was taken from.
    pub quote: Quote,
}

/// Broadcasted order submission.
#[derive(Debug)]
pub struct PlacedOrder {
    pub pending: PendingTransactionBuilder<Ethereum>,
    /// Sent payload, including the secret, which is not recoverable
    /// afterwards.
    pub payload: TransactionDataWithSecret,
}

/// Result of [`DcaClient::order_size_check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderSizeCheck {
    /// Set when a single trade is below the minimum order size.
    pub warning: bool,
    /// Minimum size of a single trade, in input token units.
    pub min_order_size: U256,
}

/// Client of the `GelatoDca` contract on a particular chain.
///
/// Operations that send or estimate transactions need an account, see
/// [`DcaClient::with_account`]. Every operation reads the chain state it
/// needs anew, nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct DcaClient<P> {
    chain: Chain,
    provider: P,
    pricing_provider: Option<P>,
    account: Option<Address>,
    config: DcaConfig,
    token_list: TokenList,
    overrides: TokenOverrides,
}

impl<P: Provider> DcaClient<P> {
    pub fn new(chain: Chain, provider: P) -> Self {
        Self {
            chain,
            provider,
            pricing_provider: None,
            account: None,
            config: DcaConfig::default(),
            token_list: TokenList::embedded(),
            overrides: TokenOverrides::default(),
        }
    }

    /// Creates client for the deployment on the chain the provider is
    /// connected to.
    pub async fn connect(provider: P) -> Result<Self, DcaError> {
        let chain = Chain::from_chain_id(provider.get_chain_id().await?)?;
        Ok(Self::new(chain, provider))
    }

    /// Account orders are submitted and cancelled from.
    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_config(mut self, config: DcaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_token_list(mut self, token_list: TokenList) -> Self {
        self.token_list = token_list;
        self
    }

    pub fn with_token_overrides(mut self, overrides: TokenOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Provider of the pricing network, used for quotes when the client's
    /// chain has no pricing of its own.
    pub fn with_pricing_provider(mut self, provider: P) -> Self {
        self.pricing_provider = Some(provider);
        self
    }

    pub fn chain(&self) -> &Chain { &self.chain }

    pub fn provider(&self) -> &P { &self.provider }

    pub fn config(&self) -> &DcaConfig { &self.config }

    pub fn token_list(&self) -> &TokenList { &self.token_list }

    pub fn token_overrides(&self) -> &TokenOverrides { &self.overrides }

    pub fn account(&self) -> Option<Address> { self.account }

    fn require_account(&self) -> Result<Address, DcaError> {
        self.account
            .ok_or_else(|| DcaError::ProviderUnavailable("no account bound to client".to_string()))
    }

    /// Chain whose liquidity quotes are computed against.
    pub fn pricing_chain(&self) -> Result<Chain, DcaError> {
        if self.chain.has_quotes() {
            return Ok(self.chain.clone());
        }
        let chain = Chain::from_chain_id(self.config.pricing_network)?;
        if !chain.has_quotes() {
            return Err(DcaError::UnsupportedNetwork {
                chain_id: chain.chain_id(),
                reason: "no pricing available".to_string(),
            });
        }
        Ok(chain)
    }

    /// Quotes minimum output of swapping `amount_in` of `in_token`.
    pub async fn min_amount_out(
        &self,
        in_token: Address,
        out_token: Address,
        amount_in: U256,
        slippage_bps: u64,
    ) -> Result<Quote, DcaError> {
        check_slippage(slippage_bps)?;
        let pricing_chain = self.pricing_chain()?;
        let provider = self.pricing_provider.as_ref().unwrap_or(&self.provider);
        let quote = quote::quote(
            provider,
            &pricing_chain,
            self.chain.chain_id(),
            in_token,
            out_token,
            amount_in,
            slippage_bps,
            &self.overrides,
        )
        .await?;
        if quote.cross_network {
            warn!(
                chain = self.chain.chain_id(),
                pricing_chain = quote.pricing_chain_id,
                "quote priced on a different network"
            );
        }
        Ok(quote)
    }

    /// Encodes `submitAndExec` for the order, authorized by the witness.
    ///
    /// The call data is the `submitAndExec` selector followed by its
    /// declared arguments and the `(secret, witness)` pair.
    pub async fn tx_data(
        &self,
        order: &OrderSubmission,
        slippage_bps: u64,
        witness: &WitnessAndSecret,
    ) -> Result<SubmitTxData, DcaError> {
        let account = self.require_account()?;
        let total = self.check_order(order)?;
        if !is_native(order.in_token()) {
            let allowance =
                allowance(&self.provider, order.in_token(), account, self.chain.dca()).await?;
            if allowance < total {
                return Err(DcaError::InsufficientAllowance { required: total, allowance });
            }
        }
        self.check_listed(order)?;

        let quote = self
            .min_amount_out(order.in_token(), order.out_token(), order.amount_per_trade(), slippage_bps)
            .await?;

        let submit_order = GelatoDca::SubmitOrder::from(order);
        let protocol: u8 = Protocol::Uni.into();
        let data =
            submit_and_exec_calldata(&submit_order, protocol, quote.min_amount_out, &quote.path, witness);

        let value = if is_native(order.in_token()) { total } else { U256::ZERO };

        let estimate = GelatoDca::new(self.chain.dca(), &self.provider)
            .submitAndExec(submit_order, protocol, quote.min_amount_out, quote.path.clone())
            .value(value)
            .from(account)
            .estimate_gas()
            .await?;
        let gas_limit = self.config.gas.submit.apply(estimate);
        debug!(estimate, gas_limit, "estimated submitAndExec gas");

        Ok(SubmitTxData { data, value, gas_limit, quote })
    }

    /// Builds the order submission with a freshly generated witness.
    pub async fn order_payload_with_secret(
        &self,
        order: &OrderSubmission,
        slippage_bps: u64,
    ) -> Result<TransactionDataWithSecret, DcaError> {
        let witness_and_secret = witness::generate()?;
        let SubmitTxData { data, value, gas_limit, .. } =
            self.tx_data(order, slippage_bps, &witness_and_secret).await?;
        Ok(TransactionDataWithSecret {
            tx_data: TransactionData { to: self.chain.dca(), data, value, gas_limit },
            witness_and_secret,
        })
    }

    /// Builds the order submission, discarding the secret.
    pub async fn order_payload(
        &self,
        order: &OrderSubmission,
        slippage_bps: u64,
    ) -> Result<TransactionData, DcaError> {
        Ok(self.order_payload_with_secret(order, slippage_bps).await?.tx_data)
    }

    /// Builds and broadcasts the order submission.
    ///
    /// The caller is responsible for keeping the returned secret private.
    pub async fn place_order(
        &self,
        order: &OrderSubmission,
        slippage_bps: u64,
        gas_price: u128,
    ) -> Result<PlacedOrder, DcaError> {
        let account = self.require_account()?;
        let payload = self.order_payload_with_secret(order, slippage_bps).await?;
        let tx = TransactionRequest::default()
            .with_from(account)
            .with_to(payload.tx_data.to)
            .with_input(payload.tx_data.data.clone())
            .with_value(payload.tx_data.value)
            .with_gas_limit(payload.tx_data.gas_limit)
            .with_gas_price(gas_price);
        let pending = self.provider.send_transaction(tx).await?;
        info!(
            tx_hash = %pending.tx_hash(),
            witness = %payload.witness(),
            "submitted DCA order"
        );
        Ok(PlacedOrder { pending, payload })
    }

    /// Estimates and broadcasts cancellation of the order cycle.
    pub async fn cancel_order(
        &self,
        cycle: &OrderCycle,
        id: U256,
        gas_price: u128,
    ) -> Result<PendingTransactionBuilder<Ethereum>, DcaError> {
        let account = self.require_account()?;
        let dca = GelatoDca::new(self.chain.dca(), &self.provider);
        let call = dca.cancel(cycle.into(), id).from(account);
        let estimate = call.estimate_gas().await?;
        let gas_limit = self.config.gas.cancel.apply(estimate);
        let pending = call.gas(gas_limit).gas_price(gas_price).send().await?;
        info!(tx_hash = %pending.tx_hash(), %id, "cancelled DCA order");
        Ok(pending)
    }

    /// Builds an unsent cancellation of the order cycle.
    pub async fn cancel_order_payload(
        &self,
        cycle: &OrderCycle,
        id: U256,
    ) -> Result<TransactionData, DcaError> {
        let dca = GelatoDca::new(self.chain.dca(), &self.provider);
        let mut call = dca.cancel(cycle.into(), id);
        if let Some(account) = self.account {
            call = call.from(account);
        }
        let estimate = call.estimate_gas().await?;
        let gas_limit = self.config.gas.cancel_payload.apply(estimate);
        debug!(estimate, gas_limit, "estimated cancel gas");
        Ok(TransactionData {
            to: self.chain.dca(),
            data: cancel_calldata(cycle, id),
            value: U256::ZERO,
            gas_limit,
        })
    }

    /// Checks whether a single trade of the order is large enough to be
    /// worth executing.
    ///
    /// `threshold` is the minimum trade size in native token units, and is
    /// converted into input token units at the current price.
    pub async fn order_size_check(
        &self,
        in_token: Address,
        in_amount: U256,
        num_trades: U256,
        threshold: U256,
    ) -> Result<OrderSizeCheck, DcaError> {
        if !self.chain.has_quotes() {
            return Err(DcaError::UnsupportedNetwork {
                chain_id: self.chain.chain_id(),
                reason: "order size check is available on mainnet and ropsten only".to_string(),
            });
        }
        let min_order_size = if is_native(in_token) || in_token == self.chain.wrapped_native() {
            threshold
        } else {
            self.min_amount_out(NATIVE_TOKEN, in_token, threshold, 0)
                .await?
                .min_amount_out
        };
        let warning = !num_trades.is_zero() && in_amount / num_trades < min_order_size;
        Ok(OrderSizeCheck { warning, min_order_size })
    }

    /// Validates the order pair, returns total input amount.
    fn check_order(&self, order: &OrderSubmission) -> Result<U256, DcaError> {
        if order.num_trades().is_zero() {
            return Err(DcaError::InvalidInput("numTrades must be at least 1".to_string()));
        }
        let (in_token, out_token) = (order.in_token(), order.out_token());
        if in_token == out_token {
            return Err(DcaError::InvalidInput("inToken === outToken".to_string()));
        }
        let wrapped = self.chain.wrapped_native();
        if is_native(in_token) && out_token == wrapped {
            return Err(DcaError::InvalidInput("cannot trade ETH <> WETH".to_string()));
        }
        if in_token == wrapped && is_native(out_token) {
            return Err(DcaError::InvalidInput("cannot trade WETH <> ETH".to_string()));
        }
        order.total_amount().ok_or_else(|| {
            DcaError::InvalidInput("amountPerTrade * numTrades overflows".to_string())
        })
    }

    fn check_listed(&self, order: &OrderSubmission) -> Result<(), DcaError> {
        let chain_id = self.chain.chain_id();
        for (side, token) in [(TokenSide::In, order.in_token()), (TokenSide::Out, order.out_token())] {
            if !is_native(token) && !self.token_list.contains(chain_id, token) {
                return Err(DcaError::TokenNotListed { side, token });
            }
        }
        Ok(())
    }
}

fn check_slippage(slippage_bps: u64) -> Result<(), DcaError> {
    if slippage_bps > 10_000 {
        return Err(DcaError::InvalidInput(format!(
            "slippage must not exceed 10000 bps, got {slippage_bps}"
        )));
    }
    Ok(())
}

/// Call data of `submitAndExec` carrying the witness pair after the
/// declared arguments.
pub fn submit_and_exec_calldata(
    order: &GelatoDca::SubmitOrder,
    protocol: u8,
    min_amount_out: U256,
    path: &[Address],
    witness: &WitnessAndSecret,
) -> Bytes {
    let params = SubmitAndExecParams::abi_encode_params(&(
        order.clone(),
        protocol,
        min_amount_out,
        path.to_vec(),
        witness.secret,
        witness.witness,
    ));
    let mut data = GelatoDca::submitAndExecCall::SELECTOR.to_vec();
    data.extend_from_slice(&params);
    data.into()
}

/// Call data of `cancel(cycle, id)`.
pub fn cancel_calldata(cycle: &OrderCycle, id: U256) -> Bytes {
    GelatoDca::cancelCall { _order: cycle.into(), _id: id }.abi_encode().into()
}

/// Task IDs and cycles of orders submitted in the logs, see
/// [`alloy::rpc::types::TransactionReceipt`].
pub fn submitted_tasks<'a>(
    logs: impl IntoIterator<Item = &'a Log>,
    dca: Address,
) -> Vec<(U256, OrderCycle)> {
    logs.into_iter()
        .filter(|log| log.inner.address == dca)
        .filter_map(|log| GelatoDca::LogTaskSubmitted::decode_log(&log.inner).ok())
        .map(|log| (log.data.id, log.data.order.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");

    fn cycle() -> OrderCycle {
        OrderCycle {
            user: address!("0x90F79bf6EB2c4f870365E785982E1f101E93b906"),
            in_token: crate::address::NATIVE_TOKEN,
            out_token: DAI,
            amount_per_trade: U256::from(3),
            n_trades_left: U256::from(2),
            min_slippage: U256::from(50),
            max_slippage: U256::from(1000),
            delay: U256::from(120),
            last_execution_time: U256::from(1_621_000_000),
            platform_wallet: Address::ZERO,
            platform_fee_bps: U256::ZERO,
        }
    }

    #[test]
    fn test_cancel_calldata() {
        let data = cancel_calldata(&cycle(), U256::from(7));
        assert_eq!(data[..4], GelatoDca::cancelCall::SELECTOR);
        // 11 static struct words + id
        assert_eq!(data.len(), 4 + 12 * 32);

        let decoded = GelatoDca::cancelCall::abi_decode(&data).unwrap();
        assert_eq!(decoded._id, U256::from(7));
        assert_eq!(OrderCycle::from(decoded._order), cycle());
    }

    #[test]
    fn test_submitted_tasks() {
        let dca = Chain::mainnet().dca();
        let event = GelatoDca::LogTaskSubmitted {
            id: U256::from(42),
            order: (&cycle()).into(),
            isSubmitAndExec: true,
        };
        let log = |address| Log {
            inner: alloy::primitives::Log { address, data: event.encode_log_data() },
            ..Default::default()
        };
        let logs = [log(dca), log(Address::ZERO)];

        let tasks = submitted_tasks(&logs, dca);
        assert_eq!(tasks, vec![(U256::from(42), cycle())]);
    }

    #[test]
    fn test_submit_and_exec_calldata() {
        let order = GelatoDca::SubmitOrder {
            inToken: crate::address::NATIVE_TOKEN,
            outToken: DAI,
            amountPerTrade: U256::from(3),
            numTrades: U256::from(4),
            minSlippage: U256::from(50),
            maxSlippage: U256::from(1000),
            delay: U256::from(120),
            platformWallet: Address::ZERO,
            platformFeeBps: U256::ZERO,
        };
        let weth = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let pair = WitnessAndSecret {
            secret: alloy::primitives::B256::repeat_byte(0x11),
            witness: address!("0x2546BcD3c84621e976D8185a91A922aE77ECEc30"),
        };

        let data = submit_and_exec_calldata(&order, 1, U256::from(99), &[weth, DAI], &pair);
        assert_eq!(data[..4], GelatoDca::submitAndExecCall::SELECTOR);
        // 9 struct words, protocol, minReturn, path offset, secret, witness,
        // then path length and two entries
        assert_eq!(data.len(), 4 + (9 + 5) * 32 + 3 * 32);
        // protocol is a left-padded uint8 right after the struct
        assert_eq!(data[4 + 9 * 32..4 + 10 * 32 - 1], [0u8; 31]);
        assert_eq!(data[4 + 10 * 32 - 1], 1);

        let (decoded, protocol, min_return, path, secret, witness) =
            SubmitAndExecParams::abi_decode_params(&data[4..]).unwrap();
        assert_eq!(decoded, order);
        assert_eq!(protocol, 1);
        assert_eq!(min_return, U256::from(99));
        assert_eq!(path, vec![weth, DAI]);
        assert_eq!(secret, pair.secret);
        assert_eq!(witness, pair.witness);
    }

    #[test]
    fn test_check_slippage() {
        assert!(check_slippage(0).is_ok());
        assert!(check_slippage(10_000).is_ok());
        assert!(check_slippage(10_001).is_err());
    }
}
