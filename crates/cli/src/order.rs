use alloy::{primitives::U256, providers::Provider};
use chrono::Utc;
use colored::Colorize;
use dca_sdk::{
    address::is_native,
    cache::OrderCache,
    client::{DcaClient, submitted_tasks},
    types::{LocalOrder, OrderSubmission},
};
use serde_json::json;
use tracing::{info, warn};

use crate::{args::OrderArgs, format_amount, gas_price, parse_amount, token_decimals};

/// ETH attached to the submission, present for native-input orders only.
fn eth_value(order: &OrderSubmission, value: U256) -> Option<String> {
    is_native(order.in_token()).then(|| format!("{} ETH", format_amount(value, 18)))
}

async fn submission<P: Provider>(
    dca: &DcaClient<P>,
    args: &OrderArgs,
) -> anyhow::Result<OrderSubmission> {
    let decimals = token_decimals(dca, args.in_token).await?;
    let amount_per_trade = parse_amount(&args.amount_per_trade, decimals)?;
    let order = OrderSubmission::new(
        args.in_token,
        args.out_token,
        amount_per_trade,
        U256::from(args.num_trades),
        U256::from(args.delay),
        args.platform_wallet,
        U256::from(args.platform_fee_bps),
        U256::from(args.min_slippage),
        U256::from(args.max_slippage),
    );

    if let Some(min_trade_eth) = &args.min_trade_eth {
        let threshold = parse_amount(min_trade_eth, 18)?;
        let total = order.total_amount().unwrap_or(U256::MAX);
        let check = dca
            .order_size_check(args.in_token, total, order.num_trades(), threshold)
            .await?;
        if check.warning {
            warn!(
                min_order_size = %format_amount(check.min_order_size, decimals),
                "trades are smaller than the minimum order size and may not be executed"
            );
        }
    }
    Ok(order)
}

pub(crate) async fn payload<P: Provider>(dca: &DcaClient<P>, args: &OrderArgs) -> anyhow::Result<()> {
    let order = submission(dca, args).await?;
    let slippage = args.slippage.unwrap_or(dca.config().default_slippage_bps);
    let payload = dca.order_payload_with_secret(&order, slippage).await?;

    let output = json!({
        "to": payload.tx_data.to,
        "data": payload.tx_data.data,
        "value": payload.tx_data.value,
        "gasLimit": payload.tx_data.gas_limit,
        "witness": payload.witness(),
        "secret": payload.secret(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    eprintln!("{}", "Keep the secret private, anyone knowing it can execute the order.".yellow());
    Ok(())
}

pub(crate) async fn place<P: Provider>(
    dca: &DcaClient<P>,
    cache: &OrderCache,
    args: &OrderArgs,
    gas_price_gwei: Option<u64>,
) -> anyhow::Result<()> {
    let account = dca
        .account()
        .ok_or_else(|| anyhow::anyhow!("no account provided, see `--private-key`"))?;
    let order = submission(dca, args).await?;
    let slippage = args.slippage.unwrap_or(dca.config().default_slippage_bps);
    let gas_price = gas_price(dca, gas_price_gwei).await?;

    let placed = dca.place_order(&order, slippage, gas_price).await?;
    let witness = placed.payload.witness();
    println!("{:<14}{}", "Transaction:", placed.pending.tx_hash());
    if let Some(value) = eth_value(&order, placed.payload.tx_data.value) {
        println!("{:<14}{value}", "Value:");
    }

    let receipt = placed.pending.get_receipt().await?;
    if !receipt.status() {
        return Err(anyhow::anyhow!("order submission {} reverted", receipt.transaction_hash));
    }
    for (id, _) in submitted_tasks(receipt.inner.logs(), dca.chain().dca()) {
        println!("{:<14}{}", "Task ID:", id.to_string().green());
    }

    let legs = LocalOrder::expand(&order, witness, receipt.transaction_hash, Utc::now())?;
    let saved = cache.save_orders(account, legs, dca.chain().chain_id()).await?;
    info!(saved, "saved submitted trades locally");
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, address};
    use dca_sdk::address::NATIVE_TOKEN;

    use super::*;

    fn order(in_token: Address) -> OrderSubmission {
        let dai = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");
        OrderSubmission::new(
            in_token,
            dai,
            U256::from(1),
            U256::from(3),
            U256::from(120),
            Address::ZERO,
            U256::ZERO,
            U256::from(50),
            U256::from(1000),
        )
    }

    #[test]
    fn test_eth_value() {
        let value = U256::from(3_000_000_000_000_000_000u128);
        assert!(eth_value(&order(NATIVE_TOKEN), value).unwrap().ends_with(" ETH"));

        let lowercase: Address = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee".parse().unwrap();
        assert!(eth_value(&order(lowercase), value).is_some());

        let weth = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        assert_eq!(eth_value(&order(weth), value), None);
    }
}
