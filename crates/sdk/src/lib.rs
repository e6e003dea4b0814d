//! [`Gelato DCA`] client SDK.
//!
//! # Overview
//!
//! Builds, submits and cancels dollar-cost-averaging orders against the
//! deployed `GelatoDca` contract, and reads their history back from the
//! hosted subgraph.
//!
//! Use [`client::DcaClient`] to prepare order payloads with
//! [`client::DcaClient::order_payload_with_secret`] or to place and cancel
//! orders directly. Use [`query::Indexer`] to read indexed orders and
//! [`cache::OrderCache`] to keep a local mirror of freshly submitted ones
//! until the indexer catches up.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Quotes are single-hop Uniswap V2 only, no multi-hop routing.
//!
//! * On networks without Uniswap liquidity quotes are priced against the
//!   configured pricing network (mainnet by default), see
//!   [`quote::Quote::cross_network`].
//!
//! * Indexer queries return the first page only.
//!
//! # Features
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `display` | yes | Enables [`std::fmt::Display`] and table rendering for order types. |
//! | `testing` | yes | Enables [`testing`] module. |
//!
//! [`testing`] module provides a scripted RPC backend to run the client
//! against without a node.
//!
//! [`Gelato DCA`]: https://www.gelato.network

pub mod abi;
pub mod address;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod quote;
pub mod storage;
#[cfg(feature = "testing")]
pub mod testing;
pub mod token_list;
pub mod types;
pub mod witness;

use alloy::primitives::{Address, address};

use crate::error::DcaError;

/// Chain ID of Ethereum mainnet.
pub const MAINNET: u64 = 1;
/// Chain ID of Ropsten testnet.
pub const ROPSTEN: u64 = 3;
/// Chain ID of a local Hardhat/Anvil mainnet fork.
pub const HARDHAT: u64 = 31337;

const MAINNET_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/gelatodigital/gelato-dca";
const ROPSTEN_SUBGRAPH_URL: &str =
    "https://api.thegraph.com/subgraphs/name/gelatodigital/gelato-dca-ropsten";

#[derive(Clone, Debug)]
/// Chain the DCA contract is deployed on.
pub struct Chain {
    chain_id: u64,
    name: String,
    dca: Address,
    wrapped_native: Address,
    subgraph_url: Option<String>,
}

impl Chain {
    pub fn mainnet() -> Self {
        Self {
            chain_id: MAINNET,
            name: "homestead".to_string(),
            dca: address!("0x1338548a1a6Ec68277496a710815D76A02838216"),
            wrapped_native: address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
            subgraph_url: Some(MAINNET_SUBGRAPH_URL.to_string()),
        }
    }

    pub fn ropsten() -> Self {
        Self {
            chain_id: ROPSTEN,
            name: "ropsten".to_string(),
            dca: address!("0x8E9918Fc02826aa2283f890F6cE439085c615665"),
            wrapped_native: address!("0xc778417E063141139Fce010982780140Aa0cD5Ab"),
            subgraph_url: Some(ROPSTEN_SUBGRAPH_URL.to_string()),
        }
    }

    /// Local fork of mainnet, sharing mainnet deployment and subgraph.
    pub fn hardhat() -> Self {
        Self { chain_id: HARDHAT, name: "hardhat".to_string(), ..Self::mainnet() }
    }

    pub fn custom(
        chain_id: u64,
        name: impl Into<String>,
        dca: Address,
        wrapped_native: Address,
        subgraph_url: Option<String>,
    ) -> Self {
        Self { chain_id, name: name.into(), dca, wrapped_native, subgraph_url }
    }

    /// Resolves one of the supported deployments by chain ID.
    pub fn from_chain_id(chain_id: u64) -> Result<Self, DcaError> {
        match chain_id {
            MAINNET => Ok(Self::mainnet()),
            ROPSTEN => Ok(Self::ropsten()),
            HARDHAT => Ok(Self::hardhat()),
            _ => Err(DcaError::UnsupportedNetwork {
                chain_id,
                reason: match network_name(chain_id) {
                    Some(name) => format!("GelatoDca is not available on {name}"),
                    None => "network not supported".to_string(),
                },
            }),
        }
    }

    pub fn chain_id(&self) -> u64 { self.chain_id }

    pub fn name(&self) -> &str { &self.name }

    /// Address of the `GelatoDca` contract.
    pub fn dca(&self) -> Address { self.dca }

    /// Address of the wrapped native asset (WETH).
    pub fn wrapped_native(&self) -> Address { self.wrapped_native }

    pub fn subgraph_url(&self) -> Option<&str> { self.subgraph_url.as_deref() }

    /// Whether Uniswap liquidity on this chain can be used for quotes.
    pub fn has_quotes(&self) -> bool { is_quote_network(self.chain_id) }
}

/// Networks with live Uniswap V2 pricing.
pub fn is_quote_network(chain_id: u64) -> bool { chain_id == MAINNET || chain_id == ROPSTEN }

/// Well-known network names, including the ones without a DCA deployment.
pub fn network_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("homestead"),
        3 => Some("ropsten"),
        4 => Some("rinkeby"),
        5 => Some("goerli"),
        42 => Some("kovan"),
        137 => Some("matic"),
        80001 => Some("mumbai"),
        31337 => Some("hardhat"),
        _ => None,
    }
}
