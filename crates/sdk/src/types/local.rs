use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderStatus, OrderSubmission};
use crate::error::DcaError;

/// Locally cached snapshot of one trade of a freshly submitted order.
///
/// Mirrors the shape of indexed [`super::Order`] with all values
/// string-serialized, so that UIs can render submitted orders before the
/// indexer catches up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalOrder {
    pub status: String,
    pub submission_date: String,
    pub submission_hash: String,
    pub est_execution_date: String,
    pub amount: String,
    pub in_token: String,
    pub out_token: String,
    pub min_slippage: String,
    pub max_slippage: String,
    pub index: String,
    pub witness: String,
    pub cycle_wrapper: LocalCycleWrapper,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCycleWrapper {
    pub cycle: LocalCycle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCycle {
    pub n_trades_left: String,
}

impl LocalOrder {
    /// Expands a submitted order into one record per trade.
    ///
    /// Trade `i` is estimated to execute at `now + delay * i`, trade indices
    /// count down from `num_trades` to 1 like the on-chain cycle does.
    /// `nTradesLeft` counts down with them, so each record holds the trades
    /// remaining after it executes rather than a `num_trades - 1` snapshot.
    pub fn expand(
        order: &OrderSubmission,
        witness: Address,
        submission_hash: TxHash,
        now: DateTime<Utc>,
    ) -> Result<Vec<LocalOrder>, DcaError> {
        let num_trades = u64::try_from(order.num_trades()).map_err(|_| {
            DcaError::InvalidInput(format!("too many trades: {}", order.num_trades()))
        })?;
        let submitted_at = U256::from(now.timestamp().max(0) as u64);
        let witness = witness.to_string().to_lowercase();

        (0..num_trades)
            .map(|i| {
                let est_execution_date = order
                    .delay()
                    .checked_mul(U256::from(i))
                    .and_then(|offset| offset.checked_add(submitted_at))
                    .ok_or_else(|| {
                        DcaError::InvalidInput(format!("delay overflows: {}", order.delay()))
                    })?;
                Ok(LocalOrder {
                    status: OrderStatus::AwaitingExec.as_str().to_string(),
                    submission_date: submitted_at.to_string(),
                    submission_hash: submission_hash.to_string().to_lowercase(),
                    est_execution_date: est_execution_date.to_string(),
                    amount: order.amount_per_trade().to_string(),
                    in_token: order.in_token().to_string().to_lowercase(),
                    out_token: order.out_token().to_string().to_lowercase(),
                    min_slippage: order.min_slippage().to_string(),
                    max_slippage: order.max_slippage().to_string(),
                    index: (num_trades - i).to_string(),
                    witness: format!("{witness}{i}"),
                    cycle_wrapper: LocalCycleWrapper {
                        cycle: LocalCycle { n_trades_left: (num_trades - i - 1).to_string() },
                    },
                })
            })
            .collect()
    }

    /// Identity of the record within the local cache.
    pub fn key(&self) -> (&str, &str) { (&self.submission_hash, &self.index) }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;
    use crate::address::NATIVE_TOKEN;

    #[test]
    fn test_expand() {
        let order = OrderSubmission::new(
            NATIVE_TOKEN,
            address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
            U256::from(3_000_000_000_000_000_000u128),
            U256::from(3),
            U256::from(120),
            Address::ZERO,
            U256::ZERO,
            U256::from(50),
            U256::from(1000),
        );
        let hash = b256!("0xAB00000000000000000000000000000000000000000000000000000000000001");
        let now = DateTime::<Utc>::from_timestamp(1_621_000_000, 0).unwrap();
        let witness = address!("0x2546BcD3c84621e976D8185a91A922aE77ECEc30");

        let legs = LocalOrder::expand(&order, witness, hash, now).unwrap();
        assert_eq!(legs.len(), 3);

        assert_eq!(legs[0].est_execution_date, "1621000000");
        assert_eq!(legs[1].est_execution_date, "1621000120");
        assert_eq!(legs[2].est_execution_date, "1621000240");

        assert_eq!(legs[0].index, "3");
        assert_eq!(legs[2].index, "1");
        assert_eq!(legs[0].cycle_wrapper.cycle.n_trades_left, "2");
        assert_eq!(legs[2].cycle_wrapper.cycle.n_trades_left, "0");

        assert_eq!(legs[1].witness, "0x2546bcd3c84621e976d8185a91a922ae77ecec301");
        assert!(legs.iter().all(|l| l.status == "awaitingExec"));
        assert!(legs.iter().all(|l| l.submission_hash.starts_with("0xab")));
        assert!(legs.iter().all(|l| l.in_token == "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::json!({
            "status": "awaitingExec",
            "submissionDate": "1",
            "submissionHash": "0x01",
            "estExecutionDate": "1",
            "amount": "1",
            "inToken": "0x00",
            "outToken": "0x00",
            "minSlippage": "50",
            "maxSlippage": "1000",
            "index": "1",
            "witness": "0x000",
            "cycleWrapper": { "cycle": { "nTradesLeft": "0" } }
        });
        let order: LocalOrder = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&order).unwrap(), json);
    }
}
