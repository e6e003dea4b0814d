//! Address and ERC20 token utilities.

use std::{collections::HashMap, str::FromStr};

use alloy::{
    primitives::{Address, B256, U256, address},
    providers::Provider,
};
use tracing::debug;

use crate::{
    abi::erc20::{Erc20, Erc20Bytes32},
    error::DcaError,
};

/// Pseudo-address standing for the network gas token (ETH) in order pairs.
pub const NATIVE_TOKEN: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Sai Stablecoin, whose on-chain metadata is malformed.
pub const SAI: Address = address!("0x89d24A6b4CcB1B6fAA2625fE562bDD9a23260359");

/// Whether the address is the network gas token pseudo-address.
pub fn is_native(token: Address) -> bool { token == NATIVE_TOKEN }

/// Checks that the value is a syntactically valid address, ignoring case.
pub fn is_address(value: &str) -> bool { Address::from_str(&value.to_lowercase()).is_ok() }

/// Parses an address into its canonical form.
///
/// Mixed-case input must carry a valid EIP-55 checksum, all-lower and
/// all-upper case input is accepted as is.
pub fn parse_address(value: &str) -> Result<Address, DcaError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let mixed_case = digits.chars().any(|c| c.is_ascii_lowercase())
        && digits.chars().any(|c| c.is_ascii_uppercase());
    let parsed = if mixed_case {
        Address::parse_checksummed(value, None).ok()
    } else {
        Address::from_str(&value.to_lowercase()).ok()
    };
    parsed.ok_or_else(|| DcaError::InvalidAddress(value.to_string()))
}

/// Rejects the zero address where a token contract is expected.
pub fn ensure_token_address(token: Address) -> Result<Address, DcaError> {
    if token.is_zero() {
        return Err(DcaError::InvalidAddress(token.to_string()));
    }
    Ok(token)
}

/// ERC20 token metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Fixed name and symbol for a token with unreadable metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenOverride {
    pub name: String,
    pub symbol: String,
}

/// Per-address metadata consulted before reading the token contract.
#[derive(Clone, Debug)]
pub struct TokenOverrides(HashMap<Address, TokenOverride>);

impl TokenOverrides {
    pub fn empty() -> Self { Self(HashMap::new()) }

    pub fn with(mut self, token: Address, name: &str, symbol: &str) -> Self {
        self.0.insert(token, TokenOverride { name: name.to_string(), symbol: symbol.to_string() });
        self
    }

    pub fn get(&self, token: &Address) -> Option<&TokenOverride> { self.0.get(token) }
}

impl Default for TokenOverrides {
    fn default() -> Self { Self::empty().with(SAI, "Sai Stablecoin", "SAI") }
}

/// Reads token name, symbol and decimals.
///
/// Name and symbol fall back to `bytes32` reads for legacy tokens, decimals
/// has no fallback.
pub async fn token_metadata<P: Provider>(
    provider: &P,
    token: Address,
    overrides: &TokenOverrides,
) -> Result<TokenMetadata, DcaError> {
    let token = ensure_token_address(token)?;
    let (name, symbol) = match overrides.get(&token) {
        Some(o) => (o.name.clone(), o.symbol.clone()),
        None => (token_name(provider, token).await?, token_symbol(provider, token).await?),
    };
    let decimals = Erc20::new(token, provider).decimals().call().await?;
    debug!(%token, %symbol, decimals, "resolved token metadata");
    Ok(TokenMetadata { name, symbol, decimals })
}

async fn token_name<P: Provider>(provider: &P, token: Address) -> Result<String, DcaError> {
    match Erc20::new(token, provider).name().call().await {
        Ok(name) => Ok(name),
        Err(err) => {
            debug!(%token, %err, "string name() failed, trying bytes32");
            parse_bytes32_string(Erc20Bytes32::new(token, provider).name().call().await?)
        },
    }
}

async fn token_symbol<P: Provider>(provider: &P, token: Address) -> Result<String, DcaError> {
    match Erc20::new(token, provider).symbol().call().await {
        Ok(symbol) => Ok(symbol),
        Err(err) => {
            debug!(%token, %err, "string symbol() failed, trying bytes32");
            parse_bytes32_string(Erc20Bytes32::new(token, provider).symbol().call().await?)
        },
    }
}

/// Decodes a null-terminated UTF-8 string stored in `bytes32`.
pub fn parse_bytes32_string(value: B256) -> Result<String, DcaError> {
    if value[31] != 0 {
        return Err(DcaError::InvalidInput("bytes32 string has no null terminator".to_string()));
    }
    let len = value.iter().position(|b| *b == 0).unwrap_or(31);
    String::from_utf8(value[..len].to_vec())
        .map_err(|e| DcaError::InvalidInput(format!("bytes32 string is not UTF-8: {e}")))
}

/// Amount of `token` the `owner` allows `spender` to transfer.
pub async fn allowance<P: Provider>(
    provider: &P,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, DcaError> {
    let token = ensure_token_address(token)?;
    let allowance = Erc20::new(token, provider).allowance(owner, spender).call().await?;
    debug!(%token, %owner, %spender, %allowance, "read allowance");
    Ok(allowance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_address() {
        assert!(is_address("0x6B175474E89094C44Da98b954EedeAC495271d0F"));
        assert!(is_address("0x6b175474e89094c44da98b954eedeac495271d0f"));
        // Checksum is not enforced
        assert!(is_address("0x6b175474E89094C44Da98b954EedeAC495271d0F"));
        assert!(!is_address("0x6b175474e89094c44da98b954eedeac495271d0"));
        assert!(!is_address("not an address"));
        assert!(!is_address(""));
    }

    #[test]
    fn test_parse_address() {
        let dai = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");
        assert_eq!(parse_address("0x6B175474E89094C44Da98b954EedeAC495271d0F").unwrap(), dai);
        assert_eq!(parse_address("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap(), dai);
        assert_eq!(parse_address("0x6B175474E89094C44DA98B954EEDEAC495271D0F").unwrap(), dai);

        let err = parse_address("0x6b175474E89094C44Da98b954EedeAC495271d0F").unwrap_err();
        assert!(matches!(err, DcaError::InvalidAddress(_)));
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_zero_token_address() {
        assert!(matches!(
            ensure_token_address(Address::ZERO),
            Err(DcaError::InvalidAddress(_))
        ));
        assert_eq!(ensure_token_address(NATIVE_TOKEN).unwrap(), NATIVE_TOKEN);
    }

    #[test]
    fn test_parse_bytes32_string() {
        let mut raw = [0u8; 32];
        raw[..5].copy_from_slice(b"Maker");
        assert_eq!(parse_bytes32_string(B256::from(raw)).unwrap(), "Maker");

        assert_eq!(parse_bytes32_string(B256::ZERO).unwrap(), "");
        assert!(parse_bytes32_string(B256::repeat_byte(0x41)).is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides = TokenOverrides::default();
        assert_eq!(overrides.get(&SAI).unwrap().symbol, "SAI");
        assert_eq!(overrides.get(&NATIVE_TOKEN), None);
        assert!(TokenOverrides::empty().get(&SAI).is_none());
    }
}
