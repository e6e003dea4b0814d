//! One-time witness/secret keypairs authorizing order execution.

use alloy::{
    primitives::{Address, B256, hex},
    signers::local::PrivateKeySigner,
};
use rand::{RngCore, rngs::OsRng};

use crate::{error::DcaError, types::WitnessAndSecret};

/// Marker prefix of every generated secret (" pine.finance  " + tag).
const SECRET_PREFIX: [u8; 19] = hex!("2070696e652e66696e616e63652020d83ddc09");

const ENTROPY_LEN: usize = 32 - SECRET_PREFIX.len();

/// Generates a fresh keypair from 13 bytes of OS entropy.
pub fn generate() -> Result<WitnessAndSecret, DcaError> {
    let mut entropy = [0u8; ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);
    from_entropy(entropy)
}

fn from_entropy(entropy: [u8; ENTROPY_LEN]) -> Result<WitnessAndSecret, DcaError> {
    let mut secret = B256::ZERO;
    secret[..SECRET_PREFIX.len()].copy_from_slice(&SECRET_PREFIX);
    secret[SECRET_PREFIX.len()..].copy_from_slice(&entropy);
    Ok(WitnessAndSecret { secret, witness: derive_witness(secret)? })
}

/// Address of the key the secret stands for.
pub fn derive_witness(secret: B256) -> Result<Address, DcaError> {
    let signer = PrivateKeySigner::from_bytes(&secret)
        .map_err(|e| DcaError::InvalidInput(format!("secret is not a valid private key: {e}")))?;
    Ok(signer.address())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_witnesses_are_unique() {
        let pairs: Vec<_> = (0..1000).map(|_| generate().unwrap()).collect();
        let witnesses: HashSet<_> = pairs.iter().map(|p| p.witness).collect();
        assert_eq!(witnesses.len(), 1000);

        for pair in &pairs {
            assert_eq!(derive_witness(pair.secret).unwrap(), pair.witness);
            assert_eq!(pair.secret[..19], SECRET_PREFIX);
        }
    }

    #[test]
    fn test_known_key() {
        // Private key 0x...01 is the generator point.
        let mut one = B256::ZERO;
        one[31] = 1;
        assert_eq!(
            derive_witness(one).unwrap(),
            address!("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf")
        );
    }

    #[test]
    fn test_zero_secret_rejected() {
        let err = derive_witness(B256::ZERO).unwrap_err();
        assert!(matches!(err, DcaError::InvalidInput(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let pair = from_entropy([7u8; ENTROPY_LEN]).unwrap();
        let debug = format!("{pair:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex::encode(pair.secret)));
    }
}
