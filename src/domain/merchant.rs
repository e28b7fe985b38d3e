use crate::error::{PurchaseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentNetwork {
    Visa,
    MasterCard,
    Amex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantCapability {
    ThreeDSecure,
    Emv,
}

/// Identity of the merchant presented on the payment sheet.
///
/// Loaded from a JSON file by the CLI; every field falls back to the built-in
/// default when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    pub merchant_identifier: String,
    pub display_name: String,
    pub country_code: String,
    pub currency_code: String,
    pub supported_networks: Vec<PaymentNetwork>,
    pub capabilities: Vec<MerchantCapability>,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        Self {
            merchant_identifier: "merchant.com.milkshakr".to_string(),
            display_name: "Milkshakr".to_string(),
            country_code: "US".to_string(),
            currency_code: "USD".to_string(),
            supported_networks: vec![
                PaymentNetwork::Visa,
                PaymentNetwork::MasterCard,
                PaymentNetwork::Amex,
            ],
            capabilities: vec![MerchantCapability::ThreeDSecure],
        }
    }
}

impl MerchantConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PurchaseError::ConfigError(format!("invalid merchant config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.merchant_identifier.trim().is_empty() {
            return Err(PurchaseError::ConfigError(
                "merchant_identifier must not be empty".to_string(),
            ));
        }
        if self.supported_networks.is_empty() {
            return Err(PurchaseError::ConfigError(
                "at least one payment network is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            MerchantConfig::from_json(r#"{"display_name": "Shake Shack", "currency_code": "EUR"}"#)
                .unwrap();
        assert_eq!(config.display_name, "Shake Shack");
        assert_eq!(config.currency_code, "EUR");
        assert_eq!(config.merchant_identifier, "merchant.com.milkshakr");
        assert_eq!(config.supported_networks.len(), 3);
    }

    #[test]
    fn test_config_rejects_empty_networks() {
        let result = MerchantConfig::from_json(r#"{"supported_networks": []}"#);
        assert!(matches!(result, Err(PurchaseError::ConfigError(_))));
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(MerchantConfig::from_json("{not json").is_err());
    }
}
