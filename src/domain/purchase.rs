use super::merchant::{MerchantCapability, MerchantConfig, PaymentNetwork};
use super::product::{Price, Product};
use super::session::PaymentToken;
use crate::error::{PurchaseError, Result};
use serde::{Deserialize, Serialize};

/// A single labelled amount shown on the payment sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Price,
}

impl From<&Product> for LineItem {
    fn from(product: &Product) -> Self {
        Self {
            label: product.name.clone(),
            amount: product.price,
        }
    }
}

/// What the payment provider is asked to authorize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub merchant_identifier: String,
    pub merchant_name: String,
    pub country_code: String,
    pub currency_code: String,
    pub supported_networks: Vec<PaymentNetwork>,
    pub capabilities: Vec<MerchantCapability>,
    /// One entry per product, in purchase order.
    pub line_items: Vec<LineItem>,
    pub total: Price,
}

impl PaymentRequest {
    /// Line items followed by the grand total labelled with the merchant name,
    /// which is how payment sheets expect the summary to be laid out.
    pub fn summary_items(&self) -> Vec<LineItem> {
        let mut items = self.line_items.clone();
        items.push(LineItem {
            label: self.merchant_name.clone(),
            amount: self.total,
        });
        items
    }
}

/// A replayable "buy these same items again" description handed to the
/// shortcut registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationSuggestion {
    pub product_identifiers: Vec<String>,
    pub title: String,
    pub invocation_phrase: String,
}

/// A usage signal: the user just performed the suggested automation by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub suggestion: AutomationSuggestion,
    pub total: Price,
}

/// The part of a purchase that gets persisted once payment is authorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub transaction_identifier: String,
    pub items: Vec<LineItem>,
    pub total: Price,
    pub currency_code: String,
}

/// Immutable description of what is being bought.
///
/// Every projection (`payment_request`, `automation_suggestion`, `record`) is a
/// pure function of the product list, so they can be recomputed at will.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    items: Vec<Product>,
}

impl Purchase {
    pub fn new(items: Vec<Product>) -> Result<Self> {
        if items.is_empty() {
            return Err(PurchaseError::InvalidPurchase(
                "a purchase needs at least one product".to_string(),
            ));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn total(&self) -> Price {
        self.items.iter().map(|p| p.price).sum()
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.items.iter().map(LineItem::from).collect()
    }

    pub fn payment_request(&self, merchant: &MerchantConfig) -> PaymentRequest {
        PaymentRequest {
            merchant_identifier: merchant.merchant_identifier.clone(),
            merchant_name: merchant.display_name.clone(),
            country_code: merchant.country_code.clone(),
            currency_code: merchant.currency_code.clone(),
            supported_networks: merchant.supported_networks.clone(),
            capabilities: merchant.capabilities.clone(),
            line_items: self.line_items(),
            total: self.total(),
        }
    }

    pub fn automation_suggestion(&self) -> AutomationSuggestion {
        // `new` guarantees at least one item.
        let first = &self.items[0].name;
        let title = match self.items.len() {
            1 => format!("Buy {first}"),
            n => format!("Buy {first} and {} more", n - 1),
        };
        AutomationSuggestion {
            product_identifiers: self.items.iter().map(|p| p.identifier.clone()).collect(),
            title,
            invocation_phrase: format!("Order {first}"),
        }
    }

    pub fn interaction(&self) -> Interaction {
        Interaction {
            suggestion: self.automation_suggestion(),
            total: self.total(),
        }
    }

    pub fn record(&self, token: &PaymentToken, currency_code: &str) -> PurchaseRecord {
        PurchaseRecord {
            transaction_identifier: token.transaction_identifier.clone(),
            items: self.line_items(),
            total: self.total(),
            currency_code: currency_code.to_string(),
        }
    }
}
