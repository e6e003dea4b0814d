use alloy::{primitives::Address, providers::Provider};
use colored::Colorize;
use dca_sdk::client::DcaClient;
use tracing::warn;

use crate::{format_amount, parse_amount, token_decimals};

pub(crate) async fn render<P: Provider>(
    dca: &DcaClient<P>,
    in_token: Address,
    out_token: Address,
    amount: &str,
    slippage: Option<u64>,
) -> anyhow::Result<()> {
    let slippage = slippage.unwrap_or(dca.config().default_slippage_bps);
    let amount_in = parse_amount(amount, token_decimals(dca, in_token).await?)?;
    let quote = dca.min_amount_out(in_token, out_token, amount_in, slippage).await?;

    if quote.cross_network {
        warn!(
            pricing_chain = quote.pricing_chain_id,
            "priced on another network, the quote is an approximation"
        );
    }
    println!("{}", format!("{:#^64}", " Quote ").bold().purple());
    let path: Vec<_> = quote.path.iter().map(|t| t.to_string()).collect();
    println!("{:<18}{}", "Path:", path.join(" -> "));
    println!("{:<18}{}", "Amount in:", format_amount(amount_in, quote.in_decimals));
    println!("{:<18}{}", "Amount out:", format_amount(quote.amount_out, quote.out_decimals).green());
    println!(
        "{:<18}{} ({} bps slippage)",
        "Min amount out:",
        format_amount(quote.min_amount_out, quote.out_decimals).yellow(),
        slippage
    );
    println!("{:<18}{}", "Priced on chain:", quote.pricing_chain_id);
    Ok(())
}
