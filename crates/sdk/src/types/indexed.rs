use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Deserializer};

/// Status of a single trade of an order, as indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    AwaitingExec,
    ExecSuccess,
    ExecReverted,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingExec => "awaitingExec",
            OrderStatus::ExecSuccess => "execSuccess",
            OrderStatus::ExecReverted => "execReverted",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

/// Single trade of a DCA order cycle, as indexed by the subgraph.
///
/// Execution fields are empty until the trade gets executed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user: Address,
    pub status: OrderStatus,
    #[serde(deserialize_with = "de::u64")]
    pub submission_date: u64,
    pub submission_hash: B256,
    #[serde(deserialize_with = "de::u64")]
    pub est_execution_date: u64,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub execution_date: Option<u64>,
    #[serde(default)]
    pub execution_hash: Option<B256>,
    #[serde(default, deserialize_with = "de::opt_u256")]
    pub amount_received: Option<U256>,
    #[serde(default)]
    pub executor: Option<Address>,
    #[serde(default, deserialize_with = "de::opt_u256")]
    pub executor_fee: Option<U256>,
    #[serde(default)]
    pub fee_token: Option<Address>,
    pub in_token: Address,
    pub out_token: Address,
    #[serde(deserialize_with = "de::u256")]
    pub amount: U256,
    #[serde(deserialize_with = "de::u64")]
    pub index: u64,
    /// Submission witness suffixed with the trade position, not an address.
    pub witness: String,
    pub cycle_wrapper: CycleWrapper,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleWrapper {
    pub id: String,
    pub status: String,
    #[serde(deserialize_with = "de::u64")]
    pub start_date: u64,
    #[serde(deserialize_with = "de::u64")]
    pub num_trades: u64,
    pub cycle: Cycle,
}

/// Indexed copy of [`super::OrderCycle`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub user: Address,
    pub in_token: Address,
    pub out_token: Address,
    #[serde(deserialize_with = "de::u256")]
    pub amount_per_trade: U256,
    #[serde(deserialize_with = "de::u256")]
    pub n_trades_left: U256,
    #[serde(deserialize_with = "de::u256")]
    pub min_slippage: U256,
    #[serde(deserialize_with = "de::u256")]
    pub max_slippage: U256,
    #[serde(deserialize_with = "de::u256")]
    pub delay: U256,
    #[serde(deserialize_with = "de::u64")]
    pub last_execution_time: u64,
    pub platform_wallet: Address,
    #[serde(deserialize_with = "de::u256")]
    pub platform_fee_bps: U256,
}

/// Subgraph `BigInt`s arrive as decimal strings.
mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Str(String),
        Num(u64),
    }

    impl Numeric {
        fn into_u256<E: serde::de::Error>(self) -> Result<U256, E> {
            match self {
                Numeric::Str(s) => U256::from_str_radix(&s, 10)
                    .map_err(|e| E::custom(format!("invalid integer {s:?}: {e}"))),
                Numeric::Num(n) => Ok(U256::from(n)),
            }
        }

        fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
            match self {
                Numeric::Str(s) => {
                    s.parse().map_err(|e| E::custom(format!("invalid integer {s:?}: {e}")))
                },
                Numeric::Num(n) => Ok(n),
            }
        }
    }

    pub(super) fn u256<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        Numeric::deserialize(d)?.into_u256()
    }

    pub(super) fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Numeric::deserialize(d)?.into_u64()
    }

    pub(super) fn opt_u256<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        Option::<Numeric>::deserialize(d)?.map(Numeric::into_u256).transpose()
    }

    pub(super) fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Option::<Numeric>::deserialize(d)?.map(Numeric::into_u64).transpose()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_deserialize_awaiting_order() {
        let json = r#"{
            "id": "0x01-1",
            "user": "0x90f79bf6eb2c4f870365e785982e1f101e93b906",
            "status": "awaitingExec",
            "submissionDate": "1621000000",
            "submissionHash": "0x4c2b8b2c4ba3bf2b1d4fc79b1ddc1c7c4d04f0bb1c1d7cbd1cbf3d9b7e0c0a11",
            "estExecutionDate": "1621000120",
            "executionDate": null,
            "executionHash": null,
            "amountReceived": null,
            "executor": null,
            "executorFee": null,
            "feeToken": null,
            "inToken": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "outToken": "0x6b175474e89094c44da98b954eedeac495271d0f",
            "amount": "3000000000000000000",
            "index": "2",
            "witness": "0x2546bcd3c84621e976d8185a91a922ae77ecec302",
            "cycleWrapper": {
                "id": "0x01",
                "status": "awaitingExec",
                "startDate": "1621000000",
                "numTrades": "3",
                "cycle": {
                    "user": "0x90f79bf6eb2c4f870365e785982e1f101e93b906",
                    "inToken": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                    "outToken": "0x6b175474e89094c44da98b954eedeac495271d0f",
                    "amountPerTrade": "3000000000000000000",
                    "nTradesLeft": "2",
                    "minSlippage": "50",
                    "maxSlippage": "1000",
                    "delay": "120",
                    "lastExecutionTime": "1621000000",
                    "platformWallet": "0x90f79bf6eb2c4f870365e785982e1f101e93b906",
                    "platformFeeBps": "0"
                }
            }
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingExec);
        assert_eq!(order.submission_date, 1_621_000_000);
        assert_eq!(order.execution_date, None);
        assert_eq!(order.amount_received, None);
        assert_eq!(order.amount, U256::from(3_000_000_000_000_000_000u128));
        assert_eq!(order.out_token, address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"));
        assert_eq!(order.cycle_wrapper.num_trades, 3);
        assert_eq!(order.cycle_wrapper.cycle.delay, U256::from(120));
        assert_eq!(order.witness, "0x2546bcd3c84621e976d8185a91a922ae77ecec302");
    }

    #[test]
    fn test_unknown_status() {
        let status: OrderStatus = serde_json::from_str(r#""somethingNew""#).unwrap();
        assert_eq!(status, OrderStatus::Unknown);
        let status: OrderStatus = serde_json::from_str(r#""execSuccess""#).unwrap();
        assert_eq!(status, OrderStatus::ExecSuccess);
    }
}
