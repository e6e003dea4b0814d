use alloy::{primitives::Address, providers::Provider};
use colored::Colorize;
use dca_sdk::{
    cache::OrderCache,
    client::DcaClient,
    query::{Indexer, OrderQuery},
    types::{local_orders_table, orders_table},
};

pub(crate) async fn render_indexed<P: Provider>(
    dca: &DcaClient<P>,
    account: Address,
    query: OrderQuery,
) -> anyhow::Result<()> {
    let indexer = Indexer::for_chain(dca.chain())?;
    let orders = indexer.orders(account, query).await?;

    println!("{}\n", format!("{:#^96}", format!(" Orders of {account} ")).bold().purple());
    if orders.is_empty() {
        println!("No orders");
        return Ok(());
    }
    println!("{}", orders_table(&orders));
    Ok(())
}

pub(crate) async fn render_saved<P: Provider>(
    dca: &DcaClient<P>,
    cache: &OrderCache,
    account: Address,
) -> anyhow::Result<()> {
    let orders = cache.saved_orders(account, dca.chain().chain_id()).await?;

    println!("{}\n", format!("{:#^96}", format!(" Saved orders of {account} ")).bold().purple());
    if orders.is_empty() {
        println!("No saved orders");
        return Ok(());
    }
    println!("{}", local_orders_table(&orders));
    Ok(())
}
