//! Indexed order history.
//!
//! Orders are read from the Gelato DCA subgraph with a fixed set of
//! queries differing only by status filter. Only the first page of results
//! is fetched.

use alloy::primitives::Address;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{Chain, error::DcaError, types::Order};

/// Page size of queries that set one explicitly.
pub const PAGE_SIZE: usize = 1000;

const TRADE_FIELDS: &str = "
      id
      user
      status
      submissionDate
      submissionHash
      estExecutionDate
      executionDate
      executionHash
      amountReceived
      executor
      executorFee
      feeToken
      inToken
      outToken
      amount
      index
      witness
      cycleWrapper {
        id
        status
        startDate
        numTrades
        cycle {
          user
          inToken
          outToken
          amountPerTrade
          nTradesLeft
          minSlippage
          maxSlippage
          delay
          lastExecutionTime
          platformWallet
          platformFeeBps
        }
      }";

/// Order filter, results are sorted by submission date, newest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderQuery {
    All,
    /// Trades awaiting execution.
    Open,
    /// Trades no longer awaiting execution.
    Past,
    Executed,
    Cancelled,
}

impl OrderQuery {
    fn name(&self) -> &'static str {
        match self {
            OrderQuery::All => "getAllOrdersByOwner",
            OrderQuery::Open => "getOpenOrdersByOwner",
            OrderQuery::Past => "getPastOrdersByOwner",
            OrderQuery::Executed => "getExecutedOrdersByOwner",
            OrderQuery::Cancelled => "getCancelledOrdersByOwner",
        }
    }

    fn filter(&self) -> &'static str {
        match self {
            OrderQuery::All => "",
            OrderQuery::Open => ", status: awaitingExec",
            OrderQuery::Past => ", status_not: awaitingExec",
            OrderQuery::Executed => ", status: execSuccess",
            OrderQuery::Cancelled => ", status: cancelled",
        }
    }

    /// Explicit page size, the rest use the indexer default.
    pub fn page_size(&self) -> Option<usize> {
        match self {
            OrderQuery::All | OrderQuery::Open => Some(PAGE_SIZE),
            _ => None,
        }
    }

    /// GraphQL document of the query, parameterized by `$owner`.
    pub fn document(&self) -> String {
        let first = self.page_size().map(|n| format!("\n      first: {n}")).unwrap_or_default();
        format!(
            "query {}($owner: String!) {{
  trades(
      where: {{ user: $owner{} }}
      orderBy: submissionDate
      orderDirection: desc{}
  ) {{{}
  }}
}}",
            self.name(),
            self.filter(),
            first,
            TRADE_FIELDS
        )
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<TradesData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct TradesData {
    trades: Vec<Order>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Parses a subgraph response into orders.
pub fn parse_response(body: &[u8]) -> Result<Vec<Order>, DcaError> {
    let response: GraphQlResponse = serde_json::from_slice(body)
        .map_err(|e| DcaError::Indexer(format!("invalid response: {e}")))?;
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(DcaError::Indexer(messages.join("; ")));
    }
    response
        .data
        .map(|d| d.trades)
        .ok_or_else(|| DcaError::Indexer("response has no data".to_string()))
}

/// Subgraph client.
#[derive(Clone, Debug)]
pub struct Indexer {
    client: reqwest::Client,
    url: String,
}

impl Indexer {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }

    pub fn for_chain(chain: &Chain) -> Result<Self, DcaError> {
        chain.subgraph_url().map(Self::new).ok_or_else(|| DcaError::UnsupportedNetwork {
            chain_id: chain.chain_id(),
            reason: "subgraph not available".to_string(),
        })
    }

    pub fn url(&self) -> &str { &self.url }

    pub async fn orders(&self, owner: Address, query: OrderQuery) -> Result<Vec<Order>, DcaError> {
        let owner = owner.to_string().to_lowercase();
        debug!(url = %self.url, %owner, ?query, "querying indexer");
        let body = self
            .client
            .post(&self.url)
            .json(&json!({ "query": query.document(), "variables": { "owner": owner } }))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let orders = parse_response(&body)?;
        debug!(?query, count = orders.len(), "indexer returned orders");
        Ok(orders)
    }

    pub async fn all_orders(&self, owner: Address) -> Result<Vec<Order>, DcaError> {
        self.orders(owner, OrderQuery::All).await
    }

    pub async fn open_orders(&self, owner: Address) -> Result<Vec<Order>, DcaError> {
        self.orders(owner, OrderQuery::Open).await
    }

    pub async fn past_orders(&self, owner: Address) -> Result<Vec<Order>, DcaError> {
        self.orders(owner, OrderQuery::Past).await
    }

    pub async fn executed_orders(&self, owner: Address) -> Result<Vec<Order>, DcaError> {
        self.orders(owner, OrderQuery::Executed).await
    }

    pub async fn cancelled_orders(&self, owner: Address) -> Result<Vec<Order>, DcaError> {
        self.orders(owner, OrderQuery::Cancelled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_documents() {
        let open = OrderQuery::Open.document();
        assert!(open.starts_with("query getOpenOrdersByOwner($owner: String!)"));
        assert!(open.contains("where: { user: $owner, status: awaitingExec }"));
        assert!(open.contains("orderDirection: desc"));
        assert!(open.contains("first: 1000"));
        assert!(open.contains("platformFeeBps"));

        let past = OrderQuery::Past.document();
        assert!(past.contains("status_not: awaitingExec"));
        assert!(!past.contains("first:"));

        assert!(OrderQuery::All.document().contains("where: { user: $owner }"));
        assert!(OrderQuery::Executed.document().contains("status: execSuccess"));
        assert!(OrderQuery::Cancelled.document().contains("status: cancelled"));
    }

    #[test]
    fn test_empty_response() {
        let orders = parse_response(br#"{"data":{"trades":[]}}"#).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_error_response() {
        let err = parse_response(br#"{"errors":[{"message":"bad owner"}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
        assert!(err.to_string().contains("bad owner"));

        assert!(parse_response(b"not json").is_err());
        assert!(parse_response(br#"{"data":null}"#).is_err());
    }

    #[test]
    fn test_for_chain() {
        assert!(Indexer::for_chain(&Chain::ropsten()).unwrap().url().ends_with("gelato-dca-ropsten"));
        let custom = Chain::custom(10, "optimism", Address::ZERO, Address::ZERO, None);
        assert_eq!(Indexer::for_chain(&custom).unwrap_err().kind(), ErrorKind::UnsupportedNetwork);
    }
}
