use std::fmt::Display;

use chrono::DateTime;
use colored::Colorize;
use tabled::{Table, Tabled, settings::Style};

use super::{LocalOrder, Order, OrderStatus};

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            return write!(f, "{}", self.as_str());
        }
        let s = match self {
            OrderStatus::AwaitingExec => self.as_str().yellow(),
            OrderStatus::ExecSuccess => self.as_str().green(),
            OrderStatus::ExecReverted => self.as_str().red(),
            OrderStatus::Cancelled => self.as_str().bright_black(),
            OrderStatus::Unknown => self.as_str().normal(),
        };
        write!(f, "{s}")
    }
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "Trade")]
    trade: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "In")]
    in_token: String,
    #[tabled(rename = "Out")]
    out_token: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Received")]
    received: String,
    #[tabled(rename = "Est. Execution")]
    est_execution: String,
}

fn format_ts(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Renders indexed orders as a table.
pub fn orders_table(orders: &[Order]) -> Table {
    let rows = orders.iter().map(|o| OrderRow {
        trade: format!("{}/{}", o.index, o.cycle_wrapper.num_trades),
        status: o.status.to_string(),
        in_token: o.in_token.to_string(),
        out_token: o.out_token.to_string(),
        amount: o.amount.to_string(),
        received: o.amount_received.map(|a| a.to_string()).unwrap_or_default(),
        est_execution: format_ts(o.est_execution_date),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}

/// Renders locally cached orders as a table.
pub fn local_orders_table(orders: &[LocalOrder]) -> Table {
    let rows = orders.iter().map(|o| OrderRow {
        trade: o.index.clone(),
        status: o.status.yellow().to_string(),
        in_token: o.in_token.clone(),
        out_token: o.out_token.clone(),
        amount: o.amount.clone(),
        received: String::new(),
        est_execution: o
            .est_execution_date
            .parse()
            .map(format_ts)
            .unwrap_or_else(|_| o.est_execution_date.clone()),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}
