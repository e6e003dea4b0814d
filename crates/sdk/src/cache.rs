//! Local mirror of submitted orders.
//!
//! Orders show up in the indexer only after the submission gets indexed,
//! the cache allows displaying them right after submission. Records are
//! never updated or removed here, reconciling them with indexed orders is
//! up to the caller.
//!
//! Read-modify-write of a key is not atomic, concurrent saves for the same
//! account and chain may lose updates.

use alloy::primitives::Address;
use tracing::debug;

use crate::{
    error::DcaError,
    storage::{StorageError, StorageInterface},
    types::LocalOrder,
};

const KEY_PREFIX: &str = "dca_orders_";

/// Storage key of the orders of the account on the chain.
pub fn cache_key(account: Address, chain_id: u64) -> String {
    format!("{KEY_PREFIX}{account}{chain_id}")
}

pub struct OrderCache {
    storage: Box<dyn StorageInterface>,
}

impl OrderCache {
    pub fn new(storage: Box<dyn StorageInterface>) -> Self { Self { storage } }

    /// Appends the order unless a record with the same submission hash and
    /// trade index is already stored.
    ///
    /// Returns whether the order was appended.
    pub async fn save_order(
        &self,
        account: Address,
        order: LocalOrder,
        chain_id: u64,
    ) -> Result<bool, DcaError> {
        let key = cache_key(account, chain_id);
        let mut orders = self.load(&key).await?;
        if orders.iter().any(|o| o.key() == order.key()) {
            debug!(%key, index = %order.index, "order already cached");
            return Ok(false);
        }
        orders.push(order);
        self.store(&key, &orders).await?;
        Ok(true)
    }

    /// Saves all trades of an expanded order, see [`LocalOrder::expand`].
    ///
    /// Returns number of appended records.
    pub async fn save_orders(
        &self,
        account: Address,
        orders: Vec<LocalOrder>,
        chain_id: u64,
    ) -> Result<usize, DcaError> {
        let mut saved = 0;
        for order in orders {
            if self.save_order(account, order, chain_id).await? {
                saved += 1;
            }
        }
        Ok(saved)
    }

    /// Orders saved for the account on the chain, oldest first.
    pub async fn saved_orders(
        &self,
        account: Address,
        chain_id: u64,
    ) -> Result<Vec<LocalOrder>, DcaError> {
        let key = cache_key(account, chain_id);
        debug!(%key, "loading saved orders");
        self.load(&key).await
    }

    async fn load(&self, key: &str) -> Result<Vec<LocalOrder>, DcaError> {
        match self.storage.get_bytes(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()).into()),
            None => Ok(Vec::new()),
        }
    }

    async fn store(&self, key: &str, orders: &[LocalOrder]) -> Result<(), DcaError> {
        let bytes =
            serde_json::to_vec(orders).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(self.storage.set_bytes(key, bytes).await?)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{U256, address, b256};
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::{address::NATIVE_TOKEN, storage::MemoryStorage, types::OrderSubmission};

    const ACCOUNT: Address = address!("0x90F79bf6EB2c4f870365E785982E1f101E93b906");

    fn legs(now: i64) -> Vec<LocalOrder> {
        let order = OrderSubmission::new(
            NATIVE_TOKEN,
            address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
            U256::from(1000),
            U256::from(2),
            U256::from(60),
            ACCOUNT,
            U256::ZERO,
            U256::from(50),
            U256::from(1000),
        );
        LocalOrder::expand(
            &order,
            address!("0x2546BcD3c84621e976D8185a91A922aE77ECEc30"),
            b256!("0x0000000000000000000000000000000000000000000000000000000000000abc"),
            DateTime::<Utc>::from_timestamp(now, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(
            cache_key(ACCOUNT, 1),
            "dca_orders_0x90F79bf6EB2c4f870365E785982E1f101E93b9061"
        );
    }

    #[tokio::test]
    async fn test_empty() {
        let cache = OrderCache::new(Box::new(MemoryStorage::new()));
        assert!(cache.saved_orders(ACCOUNT, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_record_saved_once() {
        let cache = OrderCache::new(Box::new(MemoryStorage::new()));
        let order = legs(1_000).remove(0);

        assert!(cache.save_order(ACCOUNT, order.clone(), 1).await.unwrap());
        assert!(!cache.save_order(ACCOUNT, order, 1).await.unwrap());
        assert_eq!(cache.saved_orders(ACCOUNT, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_keyed_by_account_and_chain() {
        let cache = OrderCache::new(Box::new(MemoryStorage::new()));
        assert_eq!(cache.save_orders(ACCOUNT, legs(1_000), 1).await.unwrap(), 2);
        // Same submission re-expanded later dedups by hash and index
        assert_eq!(cache.save_orders(ACCOUNT, legs(2_000), 1).await.unwrap(), 0);

        assert_eq!(cache.saved_orders(ACCOUNT, 1).await.unwrap().len(), 2);
        assert!(cache.saved_orders(ACCOUNT, 3).await.unwrap().is_empty());
        assert!(cache.saved_orders(Address::ZERO, 1).await.unwrap().is_empty());
    }
}
