use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::storage::StorageError;

/// Side of the order a token was validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSide {
    In,
    Out,
}

impl std::fmt::Display for TokenSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSide::In => write!(f, "in"),
            TokenSide::Out => write!(f, "out"),
        }
    }
}

/// Coarse classification of [`DcaError`] to branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientAllowance,
    TokenNotListed,
    UnsupportedNetwork,
    NoLiquidityRoute,
    ProviderUnavailable,
    RemoteCallFailure,
}

#[derive(Debug, Error)]
pub enum DcaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient GelatoDca allowance: {allowance} < {required}")]
    InsufficientAllowance { required: U256, allowance: U256 },

    #[error("{side} token {token} is not in the DCA token list")]
    TokenNotListed { side: TokenSide, token: Address },

    #[error("unsupported network {chain_id}: {reason}")]
    UnsupportedNetwork { chain_id: u64, reason: String },

    #[error("no liquidity route {in_token} -> {out_token}: {reason}")]
    NoLiquidityRoute { in_token: Address, out_token: Address, reason: String },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),

    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),

    #[error(transparent)]
    Signer(#[from] alloy::signers::local::LocalSignerError),

    #[error("indexer: {0}")]
    Indexer(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DcaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DcaError::InvalidInput(_) | DcaError::InvalidAddress(_) | DcaError::Config(_) => {
                ErrorKind::InvalidInput
            },
            DcaError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            DcaError::TokenNotListed { .. } => ErrorKind::TokenNotListed,
            DcaError::UnsupportedNetwork { .. } => ErrorKind::UnsupportedNetwork,
            DcaError::NoLiquidityRoute { .. } => ErrorKind::NoLiquidityRoute,
            DcaError::ProviderUnavailable(_) => ErrorKind::ProviderUnavailable,
            DcaError::Contract(_)
            | DcaError::Transport(_)
            | DcaError::PendingTransaction(_)
            | DcaError::Abi(_)
            | DcaError::Signer(_)
            | DcaError::Indexer(_)
            | DcaError::Http(_)
            | DcaError::Storage(_) => ErrorKind::RemoteCallFailure,
        }
    }
}
