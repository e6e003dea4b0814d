//! Uniswap V2 price quotes.
//!
//! Quotes are computed from reserves of the direct pair of the two tokens,
//! with the native gas token standing in for its wrapped version. The
//! resulting minimum output is what `submitAndExec` expects as
//! `_minReturnOrRate`.

use alloy::{
    primitives::{Address, B256, U256, address, b256, keccak256},
    providers::Provider,
};
use tracing::debug;

use crate::{
    Chain,
    abi::uniswap::UniswapV2Pair,
    address::{NATIVE_TOKEN, TokenOverrides, is_native, token_metadata},
    error::DcaError,
};

/// Uniswap V2 factory, same address on mainnet and testnets.
pub const UNISWAP_V2_FACTORY: Address = address!("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");

/// Keccak of the `UniswapV2Pair` creation code.
pub const UNISWAP_V2_INIT_CODE_HASH: B256 =
    b256!("0x96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");

const BPS: u64 = 10_000;

/// Quote for an exact-input swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    /// Expected output before slippage.
    pub amount_out: U256,
    /// Smallest acceptable output under the requested slippage.
    pub min_amount_out: U256,
    /// Tokens of the route, with the native gas token as requested.
    pub path: Vec<Address>,
    pub in_decimals: u8,
    pub out_decimals: u8,
    /// Chain whose liquidity the quote is based on.
    pub pricing_chain_id: u64,
    /// Set when the quote was priced on a different chain than the order
    /// executes on, and thus is only an approximation.
    pub cross_network: bool,
}

/// Address of the Uniswap V2 pair for two tokens, in any order.
pub fn pair_address(token_a: Address, token_b: Address) -> Address {
    let (token0, token1) = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };
    let mut packed = [0u8; 40];
    packed[..20].copy_from_slice(token0.as_slice());
    packed[20..].copy_from_slice(token1.as_slice());
    UNISWAP_V2_FACTORY.create2(keccak256(packed).0, UNISWAP_V2_INIT_CODE_HASH.0)
}

/// Output of a swap through a constant-product pair with 0.3% fee.
///
/// Returns `None` when the pair cannot serve the swap.
pub fn amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return None;
    }
    let amount_in_with_fee = amount_in.checked_mul(U256::from(997))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in.checked_mul(U256::from(1000))?.checked_add(amount_in_with_fee)?;
    let out = numerator / denominator;
    (!out.is_zero()).then_some(out)
}

/// Applies slippage tolerance of `slippage_bps / 10000` to the output.
pub fn min_amount_out(amount_out: U256, slippage_bps: u64) -> U256 {
    amount_out * U256::from(BPS) / (U256::from(BPS) + U256::from(slippage_bps))
}

/// Quotes an exact-input swap of `amount_in` on the pricing chain.
///
/// `execution_chain_id` is the chain the order is going to be submitted
/// to, used only to flag cross-network quotes.
#[allow(clippy::too_many_arguments)]
pub async fn quote<P: Provider>(
    provider: &P,
    pricing_chain: &Chain,
    execution_chain_id: u64,
    in_token: Address,
    out_token: Address,
    amount_in: U256,
    slippage_bps: u64,
    overrides: &TokenOverrides,
) -> Result<Quote, DcaError> {
    let wrapped = pricing_chain.wrapped_native();
    let uni_in = if is_native(in_token) { wrapped } else { in_token };
    let uni_out = if is_native(out_token) { wrapped } else { out_token };
    if uni_in == uni_out {
        return Err(DcaError::InvalidInput(format!(
            "cannot quote {in_token} -> {out_token}, both resolve to {uni_in}"
        )));
    }

    let in_meta = token_metadata(provider, uni_in, overrides).await?;
    let out_meta = token_metadata(provider, uni_out, overrides).await?;

    let pair = pair_address(uni_in, uni_out);
    let no_route = |reason: String| DcaError::NoLiquidityRoute {
        in_token: uni_in,
        out_token: uni_out,
        reason,
    };
    let reserves = match UniswapV2Pair::new(pair, provider).getReserves().call().await {
        Ok(reserves) => reserves,
        Err(alloy::contract::Error::TransportError(err)) => return Err(err.into()),
        Err(err) => return Err(no_route(format!("pair {pair}: {err}"))),
    };
    let (reserve_in, reserve_out) = if uni_in < uni_out {
        (U256::from(reserves.reserve0), U256::from(reserves.reserve1))
    } else {
        (U256::from(reserves.reserve1), U256::from(reserves.reserve0))
    };

    let out = amount_out(amount_in, reserve_in, reserve_out)
        .ok_or_else(|| no_route(format!("insufficient reserves in pair {pair}")))?;
    let min_out = min_amount_out(out, slippage_bps);

    let mut path = vec![uni_in, uni_out];
    if is_native(in_token) && path[0] == wrapped {
        path[0] = NATIVE_TOKEN;
    }
    if is_native(out_token) && path[1] == wrapped {
        path[1] = NATIVE_TOKEN;
    }

    debug!(
        %pair,
        in_symbol = %in_meta.symbol,
        out_symbol = %out_meta.symbol,
        %amount_in,
        amount_out = %out,
        min_amount_out = %min_out,
        pricing_chain = pricing_chain.chain_id(),
        "quoted"
    );

    Ok(Quote {
        amount_out: out,
        min_amount_out: min_out,
        path,
        in_decimals: in_meta.decimals,
        out_decimals: out_meta.decimals,
        pricing_chain_id: pricing_chain.chain_id(),
        cross_network: pricing_chain.chain_id() != execution_chain_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");
    const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    #[test]
    fn test_pair_address() {
        assert_eq!(pair_address(DAI, WETH), address!("0xA478c2975Ab1Ea89e8196811F51A7B7Ade33eB11"));
        assert_eq!(pair_address(WETH, DAI), pair_address(DAI, WETH));
        assert_eq!(pair_address(USDC, WETH), address!("0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"));
    }

    #[test]
    fn test_amount_out() {
        // 1 ETH into 100 ETH / 200k DAI pool
        let e18 = U256::from(10).pow(U256::from(18));
        let out = amount_out(e18, U256::from(100) * e18, U256::from(200_000) * e18).unwrap();
        // 997 * 200000 / 100997 ≈ 1974.316...
        assert_eq!(out / e18, U256::from(1974));

        assert_eq!(amount_out(e18, U256::ZERO, e18), None);
        assert_eq!(amount_out(e18, e18, U256::ZERO), None);
        assert_eq!(amount_out(U256::from(1), e18, U256::from(1)), None);
    }

    #[test]
    fn test_min_amount_out() {
        assert_eq!(min_amount_out(U256::from(10_100), 100), U256::from(10_000));
        assert_eq!(min_amount_out(U256::from(10_000), 0), U256::from(10_000));
        // floor
        assert_eq!(min_amount_out(U256::from(101), 100), U256::from(100));
        assert_eq!(min_amount_out(U256::from(100), 100), U256::from(99));
        assert_eq!(min_amount_out(U256::from(20_000), 10_000), U256::from(10_000));
    }
}
