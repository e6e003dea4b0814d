use alloy::providers::Provider;
use colored::Colorize;
use dca_sdk::client::DcaClient;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct TokenRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Decimals")]
    decimals: u8,
}

pub(crate) fn render<P: Provider>(dca: &DcaClient<P>) {
    let chain = dca.chain();
    let rows: Vec<_> = dca
        .token_list()
        .for_chain(chain.chain_id())
        .map(|t| TokenRow {
            symbol: t.symbol.clone(),
            name: t.name.clone(),
            address: t.address.to_string(),
            decimals: t.decimals,
        })
        .collect();

    println!("{}\n", format!("{:#^96}", format!(" Tokens on {} ", chain.name())).bold().purple());
    println!("{}", Table::new(rows).with(Style::rounded()));
}
