//! Scripted JSON-RPC backend for exercising the client without a node.
//!
//! Every request consumes the next pushed response, in push order. Contract
//! reads issued by [`DcaClient`] are, per token, `name`, `symbol` and
//! `decimals`, followed by `getReserves` of the pair and the gas estimate.

use alloy::{
    primitives::{B256, Bytes, U64, U256},
    providers::{Provider, ProviderBuilder, mock::Asserter},
};
use alloy_sol_types::SolValue;

use crate::{Chain, client::DcaClient};

#[derive(Clone, Debug, Default)]
pub struct MockChain {
    asserter: Asserter,
}

impl MockChain {
    pub fn new() -> Self { Self::default() }

    pub fn asserter(&self) -> &Asserter { &self.asserter }

    /// Provider answering from the pushed responses, without transaction
    /// fillers so that no implicit requests are made.
    pub fn provider(&self) -> impl Provider + Clone + use<> {
        ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(self.asserter.clone())
    }

    pub fn client(&self, chain: Chain) -> DcaClient<impl Provider + Clone + use<>> {
        DcaClient::new(chain, self.provider())
    }

    /// Raw `eth_call` return data.
    pub fn push_call(&self, data: impl Into<Bytes>) {
        self.asserter.push_success(&data.into());
    }

    /// ERC20 `name`, `symbol` and `decimals` reads.
    pub fn push_token(&self, name: &str, symbol: &str, decimals: u8) {
        self.push_call(name.to_string().abi_encode());
        self.push_call(symbol.to_string().abi_encode());
        self.push_call(U256::from(decimals).abi_encode());
    }

    pub fn push_allowance(&self, allowance: U256) { self.push_call(allowance.abi_encode()); }

    /// `getReserves` of a pair, ordered by token address.
    pub fn push_reserves(&self, reserve0: U256, reserve1: U256) {
        self.push_call((reserve0, reserve1, U256::ZERO).abi_encode_params());
    }

    /// Empty `eth_call` result, as returned for an address without code.
    pub fn push_no_code(&self) { self.push_call(Bytes::new()); }

    pub fn push_gas_estimate(&self, gas: u64) { self.asserter.push_success(&U64::from(gas)); }

    pub fn push_chain_id(&self, chain_id: u64) { self.asserter.push_success(&U64::from(chain_id)); }

    /// `eth_sendTransaction` result.
    pub fn push_tx_hash(&self, tx_hash: B256) { self.asserter.push_success(&tx_hash); }
}
