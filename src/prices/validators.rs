// src/prices/validators.rs

use super::models::DerivePricePointsRequest;
use crate::common::{ValidationResult, Validator};

/// Upper bound on line items per request; receipts do not get this long
const MAX_ITEMS: usize = 200;

const MAX_STORE_NAME_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 60;

pub struct DeriveRequestValidator;

impl Validator<DerivePricePointsRequest> for DeriveRequestValidator {
    fn validate(&self, data: &DerivePricePointsRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Note: an empty item list or blank store name is NOT an error
        // here; derivation treats those as a silent no-op.

        if data.items.len() > MAX_ITEMS {
            result.add_error("items", "Too many line items in one request");
        }

        if data.store_name.len() > MAX_STORE_NAME_LEN {
            result.add_error("store_name", "Store name is too long");
        }

        if let Some(category) = &data.category {
            if category.len() > MAX_CATEGORY_LEN {
                result.add_error("category", "Category is too long");
            }
        }

        for item in &data.items {
            if item.description.len() > MAX_DESCRIPTION_LEN {
                result.add_error("items", "Item description is too long");
                break;
            }
        }

        result
    }
}
