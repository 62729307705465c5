use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::{Address, AddressFields, AddressType};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressInput {
    #[validate(length(min = 1, message = "Address line is required"))]
    pub address_line1: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

impl From<AddressInput> for AddressFields {
    fn from(input: AddressInput) -> Self {
        AddressFields {
            address_line1: input.address_line1,
            city: input.city,
            country: input.country,
            postal_code: input.postal_code,
            address_type: input.address_type,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddressCreatedResponse {
    pub message: String,
    pub address_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

#[derive(Debug, Serialize)]
pub struct AddressListResponse {
    pub message: String,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub address: Address,
}

#[derive(Debug, Serialize)]
pub struct AddressMessageResponse {
    pub message: String,
    pub address_id: i64,
}
