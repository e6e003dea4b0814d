//! Tokens accepted for DCA orders.

use std::sync::LazyLock;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::{error::DcaError, is_quote_network};

static EMBEDDED: LazyLock<TokenList> = LazyLock::new(|| {
    TokenList::from_json(include_str!("../data/tokenlist.json"))
        .expect("embedded token list is valid")
});

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
    pub chain_id: u64,
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Token list in the Uniswap token-lists format.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenList {
    pub name: String,
    pub tokens: Vec<TokenListEntry>,
}

impl TokenList {
    pub fn from_json(json: &str) -> Result<Self, DcaError> {
        serde_json::from_str(json)
            .map_err(|e| DcaError::InvalidInput(format!("invalid token list: {e}")))
    }

    /// Default Gelato DCA token list shipped with the SDK.
    pub fn embedded() -> Self { EMBEDDED.clone() }

    /// Tokens available on the chain.
    ///
    /// Lists for chains without a deployment of their own are not filtered.
    pub fn for_chain(&self, chain_id: u64) -> impl Iterator<Item = &TokenListEntry> {
        let filtered = is_quote_network(chain_id);
        self.tokens.iter().filter(move |t| !filtered || t.chain_id == chain_id)
    }

    pub fn contains(&self, chain_id: u64, token: Address) -> bool {
        self.for_chain(chain_id).any(|t| t.address == token)
    }
}

impl Default for TokenList {
    fn default() -> Self { Self::embedded() }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");
    const ROPSTEN_DAI: Address = address!("0xaD6D458402F60fD3Bd25163575031ACDce07538D");

    #[test]
    fn test_embedded_list() {
        let list = TokenList::embedded();
        assert!(!list.tokens.is_empty());
        assert!(list.contains(1, DAI));
        assert!(!list.contains(3, DAI));
        assert!(list.contains(3, ROPSTEN_DAI));
    }

    #[test]
    fn test_unfiltered_on_other_chains() {
        let list = TokenList::embedded();
        assert_eq!(list.for_chain(31337).count(), list.tokens.len());
        assert!(list.contains(31337, DAI));
        assert!(list.contains(31337, ROPSTEN_DAI));
    }
}
