//! # Service Configuration
//!
//! Configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CONCIERGE_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};

use concierge_core::{DEFAULT_CC_FEE_BPS, FLORIDA_TAX_BPS};

/// Service configuration.
///
/// Most fields have sensible defaults for development; production
/// deployments configure these through the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Business name shown on invoices.
    pub store_name: String,

    /// Sales tax applied to line items, in basis points.
    pub tax_rate_bps: u32,

    /// Default card-surcharge rate for new invoices, in basis points.
    pub cc_fee_rate_bps: u32,

    /// Currency code (ISO 4217).
    pub currency_code: String,
}

impl ServiceConfig {
    /// Loads configuration from `CONCIERGE_*` environment variables,
    /// falling back to defaults for anything unset or unparsable.
    ///
    /// ## Variables
    /// - `CONCIERGE_STORE_NAME`
    /// - `CONCIERGE_TAX_RATE_BPS`
    /// - `CONCIERGE_CC_FEE_BPS`
    /// - `CONCIERGE_CURRENCY`
    pub fn from_env() -> Self {
        let defaults = ServiceConfig::default();

        ServiceConfig {
            store_name: std::env::var("CONCIERGE_STORE_NAME")
                .unwrap_or(defaults.store_name),
            tax_rate_bps: std::env::var("CONCIERGE_TAX_RATE_BPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tax_rate_bps),
            cc_fee_rate_bps: std::env::var("CONCIERGE_CC_FEE_BPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cc_fee_rate_bps),
            currency_code: std::env::var("CONCIERGE_CURRENCY")
                .unwrap_or(defaults.currency_code),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            store_name: "Parkside Concierge".to_string(),
            tax_rate_bps: FLORIDA_TAX_BPS,
            cc_fee_rate_bps: DEFAULT_CC_FEE_BPS,
            currency_code: "USD".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.tax_rate_bps, 650);
        assert_eq!(config.cc_fee_rate_bps, 300);
        assert_eq!(config.currency_code, "USD");
    }
}
