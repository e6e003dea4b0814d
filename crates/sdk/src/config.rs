//! SDK configuration.
//!
//! All values have defaults matching the current `GelatoDca` deployment, so
//! [`DcaConfig::default()`] is usable as is. Overrides are read from TOML:
//!
//! ```toml
//! pricing_network = 1
//! default_slippage_bps = 100
//! storage_path = "./data/orders"
//!
//! [gas.submit]
//! margin_percent = 55
//! floor = 400000
//!
//! [gas.cancel]
//! margin_percent = 40
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{MAINNET, error::DcaError};

/// Inflation applied to raw gas estimates.
///
/// Resulting limit is `max(floor, estimate * (100 + margin_percent) / 100 + extra)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GasPolicy {
    pub margin_percent: u64,
    pub extra: u64,
    pub floor: u64,
}

impl GasPolicy {
    pub const fn new(margin_percent: u64, extra: u64, floor: u64) -> Self {
        Self { margin_percent, extra, floor }
    }

    pub fn apply(&self, estimate: u64) -> u64 {
        let margin = estimate.saturating_mul(self.margin_percent) / 100;
        estimate.saturating_add(margin).saturating_add(self.extra).max(self.floor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Applied to `submitAndExec` estimates.
    pub submit: GasPolicy,
    /// Applied to `cancel` estimates before broadcasting.
    pub cancel: GasPolicy,
    /// Applied to `cancel` estimates of unsent payloads.
    pub cancel_payload: GasPolicy,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            submit: GasPolicy::new(55, 0, 400_000),
            cancel: GasPolicy::new(40, 0, 0),
            cancel_payload: GasPolicy::new(0, 50_000, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DcaConfig {
    /// Network whose liquidity is used for quotes when the active network
    /// has no Uniswap V2 pricing.
    pub pricing_network: u64,
    pub default_slippage_bps: u64,
    pub gas: GasConfig,
    /// Directory of the file-backed local order cache.
    pub storage_path: Option<PathBuf>,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            pricing_network: MAINNET,
            default_slippage_bps: 100,
            gas: GasConfig::default(),
            storage_path: None,
        }
    }
}

impl DcaConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, DcaError> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| DcaError::Config(format!("failed to parse: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DcaError> {
        let path = path.as_ref();
        debug!(?path, "loading configuration");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DcaError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), DcaError> {
        if self.default_slippage_bps > 10_000 {
            return Err(DcaError::Config(format!(
                "default_slippage_bps must not exceed 10000, got {}",
                self.default_slippage_bps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_policy() {
        let submit = GasConfig::default().submit;
        assert_eq!(submit.apply(100_000), 400_000);
        assert_eq!(submit.apply(1_000_000), 1_550_000);

        let cancel = GasConfig::default().cancel;
        assert_eq!(cancel.apply(50_000), 70_000);

        let payload = GasConfig::default().cancel_payload;
        assert_eq!(payload.apply(50_000), 100_000);

        for estimate in [0, 1, 21_000, 257_813, 3_000_000] {
            assert!(submit.apply(estimate) >= estimate + estimate * 55 / 100);
            assert!(submit.apply(estimate) >= 400_000);
        }
    }

    #[test]
    fn test_from_toml() {
        let config = DcaConfig::from_toml_str(
            r#"
            pricing_network = 3
            storage_path = "/tmp/dca"

            [gas.submit]
            margin_percent = 30
            floor = 500000
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing_network, 3);
        assert_eq!(config.default_slippage_bps, 100);
        assert_eq!(config.gas.submit, GasPolicy::new(30, 0, 500_000));
        assert_eq!(config.gas.cancel, GasConfig::default().cancel);
        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/dca")));

        assert_eq!(DcaConfig::from_toml_str("").unwrap(), DcaConfig::default());
        assert!(DcaConfig::from_toml_str("default_slippage_bps = 10001").is_err());
    }

    #[test]
    fn test_config_errors() {
        for contents in ["pricing_network = \"one\"", "[gas", "default_slippage_bps = 10001"] {
            let err = DcaConfig::from_toml_str(contents).unwrap_err();
            assert!(matches!(err, DcaError::Config(_)), "{contents}: {err}");
        }

        let err = DcaConfig::from_file("/nonexistent/dca.toml").unwrap_err();
        assert!(matches!(err, DcaError::Config(msg) if msg.contains("/nonexistent/dca.toml")));
    }
}
