use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Home,
    Office,
    Other,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Office => "office",
            AddressType::Other => "other",
        }
    }
}

/// Per-user collection of addresses of one kind.
///
/// Deserializes from the route segment (`address`, `shipping-address`,
/// `billing-address`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AddressBook {
    #[serde(rename = "address")]
    General,
    #[serde(rename = "shipping-address")]
    Shipping,
    #[serde(rename = "billing-address")]
    Billing,
}

impl AddressBook {
    pub fn table(&self) -> &'static str {
        match self {
            AddressBook::General => "addresses",
            AddressBook::Shipping => "shipping_addresses",
            AddressBook::Billing => "billing_addresses",
        }
    }

    /// Whether the book keeps a single default address per user.
    pub fn has_default(&self) -> bool {
        !matches!(self, AddressBook::General)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AddressBook::General => "Address",
            AddressBook::Shipping => "Shipping address",
            AddressBook::Billing => "Billing address",
        }
    }
}

/// Address row from any book; `is_default` is absent for the general book.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub address_line1: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub address_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied address columns.
#[derive(Debug, Clone)]
pub struct AddressFields {
    pub address_line1: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
    pub address_type: AddressType,
}
