use alloy::{primitives::U256, providers::Provider};
use anyhow::Context;
use colored::Colorize;
use dca_sdk::{
    client::DcaClient,
    types::{Cycle, OrderCycle},
};
use serde_json::json;

use crate::gas_price;

pub(crate) async fn run<P: Provider>(
    dca: &DcaClient<P>,
    id: U256,
    cycle_json: &str,
    payload_only: bool,
    gas_price_gwei: Option<u64>,
) -> anyhow::Result<()> {
    let cycle: Cycle = serde_json::from_str(cycle_json).context("parsing order cycle")?;
    let cycle = OrderCycle::from(&cycle);

    if payload_only {
        let payload = dca.cancel_order_payload(&cycle, id).await?;
        let output = json!({
            "to": payload.to,
            "data": payload.data,
            "value": payload.value,
            "gasLimit": payload.gas_limit,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let gas_price = gas_price(dca, gas_price_gwei).await?;
    let pending = dca.cancel_order(&cycle, id, gas_price).await?;
    println!("{:<14}{}", "Transaction:", pending.tx_hash());
    let receipt = pending.get_receipt().await?;
    if !receipt.status() {
        return Err(anyhow::anyhow!("cancellation of task {id} reverted"));
    }
    println!("{:<14}{}", "Cancelled:", id.to_string().green());
    Ok(())
}
