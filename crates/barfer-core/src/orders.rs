use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Sales pathway of an order. Comes from order metadata, never from item text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Retail,
    SameDay,
    Wholesale,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Retail => write!(f, "retail"),
            Channel::SameDay => write!(f, "same_day"),
            Channel::Wholesale => write!(f, "wholesale"),
        }
    }
}

/// A line item exactly as it was typed or selected at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLineItem {
    pub product_label: String,
    #[serde(default)]
    pub option_label: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl RawLineItem {
    #[must_use]
    pub fn new(product_label: &str, option_label: &str, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_label: product_label.to_string(),
            option_label: option_label.to_string(),
            quantity,
            unit_price,
        }
    }

    /// `unit_price × quantity`, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Order-level metadata every line item of the order is reported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    pub order_id: String,
    pub channel: Channel,
    pub placed_at: DateTime<Utc>,
    pub point_of_sale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub channel: Channel,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub point_of_sale: Option<String>,
    pub items: Vec<RawLineItem>,
}

impl Order {
    #[must_use]
    pub fn context(&self) -> OrderContext {
        OrderContext {
            order_id: self.id.clone(),
            channel: self.channel,
            placed_at: self.placed_at,
            point_of_sale: self.point_of_sale.clone(),
        }
    }

    #[must_use]
    pub fn revenue(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.revenue()))
    }
}

/// Load an order export (a JSON array of orders) from disk.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if any line
/// item has a zero quantity or a negative unit price.
pub fn load_orders(path: &Path) -> Result<Vec<Order>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let orders: Vec<Order> = serde_json::from_str(&content)?;
    validate_orders(&orders)?;
    Ok(orders)
}

fn validate_orders(orders: &[Order]) -> Result<(), ConfigError> {
    for order in orders {
        for (idx, item) in order.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(ConfigError::Validation(format!(
                    "order '{}' item {idx} ('{}') has quantity 0",
                    order.id, item.product_label
                )));
            }
            if item.unit_price.is_sign_negative() {
                return Err(ConfigError::Validation(format!(
                    "order '{}' item {idx} ('{}') has a negative unit price",
                    order.id, item.product_label
                )));
            }
        }
    }
    Ok(())
}
